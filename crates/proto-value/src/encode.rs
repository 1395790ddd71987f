//! Protobuf wire encoding of single fields

use crate::{EncodeError, IsDefault, Scalar, ScalarType, WireType, wire_type::WIRE_TYPE_BITS};

/// Value handed to [`encode_message`]: one scalar, or a list that is always
/// written packed.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Single(Scalar),
    Repeated(Vec<Scalar>),
}

impl From<Scalar> for FieldValue {
    #[inline]
    fn from(value: Scalar) -> Self { Self::Single(value) }
}

impl<T: Into<Scalar>> From<Vec<T>> for FieldValue {
    #[inline]
    fn from(values: Vec<T>) -> Self { Self::Repeated(values.into_iter().map(Into::into).collect()) }
}

macro_rules! impl_from_for_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                #[inline]
                fn from(value: $ty) -> Self { Self::Single(value.into()) }
            }
        )*
    };
}

impl_from_for_field_value!(String, &str, bool, i32, i64, u32, u64, f32, f64);

/// Number of bytes `value` occupies as a varint.
#[inline]
pub const fn varint_len(value: u64) -> usize {
    // 1 + floor(bits / 7), with 0 taking one byte
    ((64 - (value | 1).leading_zeros() as usize) + 6) / 7
}

/// Appends `value` as a base-128 varint, least significant group first.
#[inline]
pub fn put_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Encodes an unsigned varint.
///
/// Negative numbers are written the way protobuf writes them in `int32` and
/// `int64` fields: cast to `u64` first (`-1i64 as u64`), which always takes
/// ten bytes.
///
/// ```
/// assert_eq!(proto_value::encode_varint(150), [0x96, 0x01]);
/// assert_eq!(proto_value::encode_varint(-1i64 as u64).len(), 10);
/// ```
#[inline]
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_len(value));
    put_varint(value, &mut buf);
    buf
}

#[inline]
pub fn put_key(field_number: u32, wire_type: WireType, buf: &mut Vec<u8>) {
    put_varint((u64::from(field_number) << WIRE_TYPE_BITS) | wire_type as u64, buf)
}

/// Encodes a field key. Field numbers are not range checked: 0 and values
/// above protobuf's 2^29 - 1 limit are written as given.
#[inline]
pub fn encode_key(field_number: u32, wire_type: WireType) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    put_key(field_number, wire_type, &mut buf);
    buf
}

#[inline]
pub const fn zigzag_encode32(value: i32) -> u32 { ((value << 1) ^ (value >> 31)) as u32 }

#[inline]
pub const fn zigzag_encode64(value: i64) -> u64 { ((value << 1) ^ (value >> 63)) as u64 }

/// Zigzag-encodes `value` as a `bits`-wide signed integer.
///
/// Returns `None` when `bits` is neither 32 nor 64, or when `value` does not
/// fit in `bits` signed bits.
#[inline]
pub fn encode_zigzag(value: i64, bits: u32) -> Option<u64> {
    match bits {
        32 => i32::try_from(value).ok().map(|v| u64::from(zigzag_encode32(v))),
        64 => Some(zigzag_encode64(value)),
        _ => None,
    }
}

#[inline]
fn mismatch(scalar_type: ScalarType, value: &Scalar) -> EncodeError {
    EncodeError::TypeMismatch { scalar_type, found: value.kind() }
}

fn integer_in(
    scalar_type: ScalarType,
    value: &Scalar,
    min: i128,
    max: i128,
) -> Result<i128, EncodeError> {
    let Some(v) = value.as_integer() else {
        return Err(mismatch(scalar_type, value));
    };
    if v < min || v > max {
        return Err(EncodeError::OutOfRange { scalar_type, value: v });
    }
    Ok(v)
}

const I32: (i128, i128) = (i32::MIN as i128, i32::MAX as i128);
const I64: (i128, i128) = (i64::MIN as i128, i64::MAX as i128);
// 32/64-bit wide fields accept both the signed and the unsigned reading.
const BITS32: (i128, i128) = (i32::MIN as i128, u32::MAX as i128);
const BITS64: (i128, i128) = (i64::MIN as i128, u64::MAX as i128);

fn float_of(scalar_type: ScalarType, value: &Scalar) -> Result<f64, EncodeError> {
    match *value {
        Scalar::Float(v) => Ok(f64::from(v)),
        Scalar::Double(v) => Ok(v),
        Scalar::Int(v) => Ok(v as f64),
        Scalar::UInt(v) => Ok(v as f64),
        _ => Err(mismatch(scalar_type, value)),
    }
}

/// Infinities and NaN pass through; finite values must stay finite as `f32`.
#[inline]
fn narrow_float(value: f64) -> Result<f32, EncodeError> {
    let narrowed = value as f32;
    if value.is_finite() && narrowed.is_infinite() {
        return Err(EncodeError::FloatOutOfRange { value });
    }
    Ok(narrowed)
}

/// Appends the payload of `value` (no key) encoded as `scalar_type`.
pub fn encode_scalar(
    scalar_type: ScalarType,
    value: &Scalar,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    match scalar_type {
        ScalarType::String | ScalarType::Bytes => {
            let bytes: &[u8] = match value {
                Scalar::String(s) => s.as_bytes(),
                Scalar::Bytes(b) => b,
                _ => return Err(mismatch(scalar_type, value)),
            };
            put_varint(bytes.len() as u64, buf);
            buf.extend_from_slice(bytes);
        }
        ScalarType::Bool => match *value {
            Scalar::Bool(b) => put_varint(b as u64, buf),
            _ => return Err(mismatch(scalar_type, value)),
        },
        ScalarType::Int | ScalarType::Int64 => {
            let v = integer_in(scalar_type, value, BITS64.0, BITS64.1)?;
            put_varint(v as u64, buf);
        }
        ScalarType::Int32 => {
            // sign-extended to 64 bits, as protobuf does for negative int32
            let v = integer_in(scalar_type, value, I32.0, I32.1)?;
            put_varint(v as i64 as u64, buf);
        }
        ScalarType::Sint32 => {
            let v = integer_in(scalar_type, value, I32.0, I32.1)?;
            put_varint(u64::from(zigzag_encode32(v as i32)), buf);
        }
        ScalarType::Sint64 => {
            let v = integer_in(scalar_type, value, I64.0, I64.1)?;
            put_varint(zigzag_encode64(v as i64), buf);
        }
        ScalarType::Fixed32 | ScalarType::Sfixed32 => {
            let v = integer_in(scalar_type, value, BITS32.0, BITS32.1)?;
            buf.extend_from_slice(&(v as u32).to_le_bytes());
        }
        ScalarType::Fixed64 | ScalarType::Sfixed64 => {
            let v = integer_in(scalar_type, value, BITS64.0, BITS64.1)?;
            buf.extend_from_slice(&(v as u64).to_le_bytes());
        }
        ScalarType::Float => {
            let v = narrow_float(float_of(scalar_type, value)?)?;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        ScalarType::Double => {
            let v = float_of(scalar_type, value)?;
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    Ok(())
}

/// Encodes one field: key plus payload.
///
/// A single default value (`0`, `0.0`, `false`, empty) yields no bytes at
/// all. A list yields one length-delimited record holding every element
/// back to back, whatever the scalar type, and an empty list yields no
/// bytes. Elements inside a list are written even when they are defaults.
///
/// ```
/// use proto_value::{ScalarType, encode_message};
///
/// assert_eq!(encode_message(1, ScalarType::Int32, 150).unwrap(), [0x08, 0x96, 0x01]);
/// assert_eq!(encode_message(1, ScalarType::String, "").unwrap(), b"");
/// assert_eq!(
///     encode_message(14, ScalarType::Int32, vec![1, 2, 3]).unwrap(),
///     [0x72, 0x03, 0x01, 0x02, 0x03]
/// );
/// ```
pub fn encode_message(
    field_number: u32,
    scalar_type: ScalarType,
    value: impl Into<FieldValue>,
) -> Result<Vec<u8>, EncodeError> {
    match value.into() {
        FieldValue::Single(value) => {
            let mut payload = Vec::new();
            encode_scalar(scalar_type, &value, &mut payload)?;
            if value.is_default() {
                return Ok(Vec::new());
            }
            let mut buf = Vec::with_capacity(5 + payload.len());
            put_key(field_number, scalar_type.wire_type(), &mut buf);
            buf.extend_from_slice(&payload);
            Ok(buf)
        }
        FieldValue::Repeated(values) => {
            if values.is_empty() {
                return Ok(Vec::new());
            }
            let mut payload = Vec::new();
            for value in &values {
                encode_scalar(scalar_type, value, &mut payload)?;
            }
            let len = payload.len() as u64;
            let mut buf = Vec::with_capacity(5 + varint_len(len) + payload.len());
            put_key(field_number, WireType::LengthDelimited, &mut buf);
            put_varint(len, &mut buf);
            buf.extend_from_slice(&payload);
            Ok(buf)
        }
    }
}

/// Encodes command-line style literals: one literal is a single value, any
/// other count is a packed list.
pub fn encode_literals<S: AsRef<str>>(
    field_number: u32,
    scalar_type: ScalarType,
    literals: &[S],
) -> Result<Vec<u8>, EncodeError> {
    let value = match literals {
        [single] => FieldValue::Single(Scalar::parse(scalar_type, single.as_ref())?),
        many => FieldValue::Repeated(
            many.iter()
                .map(|text| Scalar::parse(scalar_type, text.as_ref()))
                .collect::<Result<_, _>>()?,
        ),
    };
    encode_message(field_number, scalar_type, value)
}
