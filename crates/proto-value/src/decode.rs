//! Schema-free protobuf record reader

use std::io::{ErrorKind, Read};

use crate::{DecodeError, Scalar, ScalarType, WireType, wire_type::check_wire_type};

/// Payload of one record, as framed by its wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Varint(u64),
    Fixed64([u8; 8]),
    LengthDelimited(Vec<u8>),
    Fixed32([u8; 4]),
}

impl Payload {
    #[inline]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::SixtyFourBit,
            Self::LengthDelimited(_) => WireType::LengthDelimited,
            Self::Fixed32(_) => WireType::ThirtyTwoBit,
        }
    }
}

/// One tagged field read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub field_number: u32,
    pub payload: Payload,
}

impl Record {
    #[inline]
    pub const fn wire_type(&self) -> WireType { self.payload.wire_type() }

    /// Decodes the payload as `scalar_type`, checking the wire type first.
    #[inline]
    pub fn decode_scalar(&self, scalar_type: ScalarType) -> Result<Scalar, DecodeError> {
        decode_scalar(self.field_number, scalar_type, &self.payload)
    }

    /// Returns the payload bytes if this is a length-delimited record.
    #[inline]
    pub fn into_bytes(self) -> Result<Vec<u8>, Self> {
        match self.payload {
            Payload::LengthDelimited(bytes) => Ok(bytes),
            _ => Err(self),
        }
    }
}

/// Reads one byte, `None` at end of input. `Interrupted` is retried.
fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<Option<u8>, DecodeError> {
    let mut byte = [0u8; 1];
    loop {
        return match reader.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => Err(DecodeError::Io(e)),
        };
    }
}

/// Fills `buf` completely, reporting how far it got when input ends early.
pub fn read_exact_or_truncated<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    step: &'static str,
) -> Result<(), DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(DecodeError::Truncated {
                    step,
                    expected: buf.len() as u64,
                    actual: filled as u64,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(())
}

/// Reads exactly `len` bytes into a fresh buffer.
///
/// The length comes off the wire, so the buffer grows as data arrives rather
/// than being allocated up front.
pub fn read_len_or_truncated<R: Read + ?Sized>(
    reader: &mut R,
    len: u64,
    step: &'static str,
) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::with_capacity(len.min(8 * 1024) as usize);
    (&mut *reader).take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(DecodeError::Truncated { step, expected: len, actual: buf.len() as u64 });
    }
    Ok(buf)
}

/// Continues a varint whose first byte has already been read.
fn finish_varint<R: Read + ?Sized>(reader: &mut R, first: u8) -> Result<u64, DecodeError> {
    let mut value = u64::from(first & 0x7f);
    let mut byte = first;
    let mut shift = 7u32;
    let mut consumed = 1u64;
    while byte & 0x80 != 0 {
        byte = read_byte(reader)?.ok_or(DecodeError::Truncated {
            step: "varint",
            expected: consumed + 1,
            actual: consumed,
        })?;
        consumed += 1;
        // groups past bit 63 cannot be represented and are dropped
        if shift < 64 {
            value |= u64::from(byte & 0x7f) << shift;
        }
        shift = shift.saturating_add(7);
    }
    Ok(value)
}

/// Reads one varint. End of input anywhere, including before the first
/// byte, is a truncation.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> Result<u64, DecodeError> {
    match read_byte(reader)? {
        Some(first) => finish_varint(reader, first),
        None => Err(DecodeError::Truncated { step: "varint", expected: 1, actual: 0 }),
    }
}

/// Reads the next record.
///
/// Returns `Ok(None)` when the input ends cleanly on a record boundary. Input
/// that ends anywhere inside a record is [`DecodeError::Truncated`].
pub fn read_record<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Record>, DecodeError> {
    let Some(first) = read_byte(reader)? else {
        return Ok(None);
    };
    let tag = finish_varint(reader, first)?;
    let (wire_type, field_number) = WireType::try_from_tag(tag)?;
    let payload = match wire_type {
        WireType::Varint => Payload::Varint(read_varint(reader)?),
        WireType::SixtyFourBit => {
            let mut buf = [0u8; 8];
            read_exact_or_truncated(reader, &mut buf, "fixed64")?;
            Payload::Fixed64(buf)
        }
        WireType::ThirtyTwoBit => {
            let mut buf = [0u8; 4];
            read_exact_or_truncated(reader, &mut buf, "fixed32")?;
            Payload::Fixed32(buf)
        }
        WireType::LengthDelimited => {
            let len = read_varint(reader)?;
            Payload::LengthDelimited(read_len_or_truncated(reader, len, "length-delimited")?)
        }
    };
    tracing::trace!(field_number, wire_type = wire_type.as_str(), "record");
    Ok(Some(Record { field_number, payload }))
}

/// Lazy record sequence over a reader, see [`decode_stream`].
///
/// Ends after the first clean end of input or the first error.
#[derive(Debug)]
pub struct Records<R> {
    reader: R,
    done: bool,
}

impl<R: Read> Records<R> {
    #[inline]
    pub fn new(reader: R) -> Self { Self { reader, done: false } }

    #[inline]
    pub fn into_inner(self) -> R { self.reader }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_record(&mut self.reader) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> core::iter::FusedIterator for Records<R> {}

/// Scans `reader` into records, one per call to `next`.
///
/// ```
/// let mut records = proto_value::decode_stream(&b"\x08\x96\x01"[..]);
/// let record = records.next().unwrap().unwrap();
/// assert_eq!(record.field_number, 1);
/// assert_eq!(record.payload, proto_value::Payload::Varint(150));
/// assert!(records.next().is_none());
/// ```
#[inline]
pub fn decode_stream<R: Read>(reader: R) -> Records<R> { Records::new(reader) }

/// Reads every record of an in-memory buffer.
pub fn parse_records(mut bytes: &[u8]) -> Result<Vec<Record>, DecodeError> {
    let mut records = Vec::new();
    while let Some(record) = read_record(&mut bytes)? {
        records.push(record);
    }
    Ok(records)
}

#[inline]
pub const fn zigzag_decode(value: u64) -> i64 { ((value >> 1) as i64) ^ -((value & 1) as i64) }

/// Decodes a payload as `scalar_type`.
///
/// `int`, `int32` and `int64` hand back the raw varint untouched, so a
/// negative value written by a protobuf encoder reads as its unsigned 64-bit
/// pattern.
pub fn decode_scalar(
    field_number: u32,
    scalar_type: ScalarType,
    payload: &Payload,
) -> Result<Scalar, DecodeError> {
    check_wire_type(field_number, scalar_type.wire_type(), payload.wire_type())?;
    Ok(match (scalar_type, payload) {
        (ScalarType::String, Payload::LengthDelimited(bytes)) => match core::str::from_utf8(bytes) {
            Ok(s) => Scalar::String(s.to_owned()),
            Err(source) => return Err(DecodeError::InvalidUtf8 { field_number, source }),
        },
        (ScalarType::Bytes, Payload::LengthDelimited(bytes)) => Scalar::Bytes(bytes.clone()),
        (ScalarType::Bool, &Payload::Varint(v)) => match v {
            0 => Scalar::Bool(false),
            1 => Scalar::Bool(true),
            value => return Err(DecodeError::InvalidBool { field_number, value }),
        },
        (ScalarType::Int | ScalarType::Int32 | ScalarType::Int64, &Payload::Varint(v)) => {
            Scalar::UInt(v)
        }
        (ScalarType::Sint32 | ScalarType::Sint64, &Payload::Varint(v)) => {
            Scalar::Int(zigzag_decode(v))
        }
        (ScalarType::Fixed32, Payload::Fixed32(b)) => Scalar::UInt(u64::from(u32::from_le_bytes(*b))),
        (ScalarType::Sfixed32, Payload::Fixed32(b)) => Scalar::Int(i64::from(i32::from_le_bytes(*b))),
        (ScalarType::Float, Payload::Fixed32(b)) => Scalar::Float(f32::from_le_bytes(*b)),
        (ScalarType::Fixed64, Payload::Fixed64(b)) => Scalar::UInt(u64::from_le_bytes(*b)),
        (ScalarType::Sfixed64, Payload::Fixed64(b)) => Scalar::Int(i64::from_le_bytes(*b)),
        (ScalarType::Double, Payload::Fixed64(b)) => Scalar::Double(f64::from_le_bytes(*b)),
        // every remaining pair has mismatched wire types, rejected above
        _ => {
            return Err(DecodeError::WireTypeMismatch {
                field_number,
                expected: scalar_type.wire_type(),
                actual: payload.wire_type(),
            });
        }
    })
}

/// Decodes the body of a packed repeated field into its elements.
///
/// String and bytes are never packed, so for them the whole body is a single
/// element.
pub fn decode_packed(
    field_number: u32,
    scalar_type: ScalarType,
    mut bytes: &[u8],
) -> Result<Vec<Scalar>, DecodeError> {
    if !scalar_type.is_packable() {
        let payload = Payload::LengthDelimited(bytes.to_vec());
        return Ok(vec![decode_scalar(field_number, scalar_type, &payload)?]);
    }
    let mut values = Vec::new();
    while !bytes.is_empty() {
        let payload = match scalar_type.wire_type() {
            WireType::ThirtyTwoBit => {
                let mut buf = [0u8; 4];
                read_exact_or_truncated(&mut bytes, &mut buf, "packed fixed32")?;
                Payload::Fixed32(buf)
            }
            WireType::SixtyFourBit => {
                let mut buf = [0u8; 8];
                read_exact_or_truncated(&mut bytes, &mut buf, "packed fixed64")?;
                Payload::Fixed64(buf)
            }
            _ => Payload::Varint(read_varint(&mut bytes)?),
        };
        values.push(decode_scalar(field_number, scalar_type, &payload)?);
    }
    Ok(values)
}
