use crate::{EncodeError, WireType};

/// Protobuf scalar types understood by the codec.
///
/// `Int`, `Int32` and `Int64` share the plain varint encoding; the `S*`
/// variants zigzag-encode first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    String,
    Bytes,
    Bool,
    Int,
    Int32,
    Int64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
}

impl ScalarType {
    pub const ALL: [ScalarType; 14] = [
        Self::String,
        Self::Bytes,
        Self::Bool,
        Self::Int,
        Self::Int32,
        Self::Int64,
        Self::Sint32,
        Self::Sint64,
        Self::Fixed32,
        Self::Fixed64,
        Self::Sfixed32,
        Self::Sfixed64,
        Self::Float,
        Self::Double,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Looks up a type by its protobuf name. Names are case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "sint32" => Self::Sint32,
            "sint64" => Self::Sint64,
            "fixed32" => Self::Fixed32,
            "fixed64" => Self::Fixed64,
            "sfixed32" => Self::Sfixed32,
            "sfixed64" => Self::Sfixed64,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }

    /// The wire type a single (unpacked) value of this type is written with.
    #[inline]
    pub const fn wire_type(self) -> WireType {
        match self {
            Self::String | Self::Bytes => WireType::LengthDelimited,
            Self::Bool
            | Self::Int
            | Self::Int32
            | Self::Int64
            | Self::Sint32
            | Self::Sint64 => WireType::Varint,
            Self::Fixed32 | Self::Sfixed32 | Self::Float => WireType::ThirtyTwoBit,
            Self::Fixed64 | Self::Sfixed64 | Self::Double => WireType::SixtyFourBit,
        }
    }

    /// Whether several values can share one length-delimited record.
    #[inline]
    pub const fn is_packable(self) -> bool { !matches!(self, Self::String | Self::Bytes) }
}

impl core::fmt::Display for ScalarType {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed value, either about to be encoded or freshly decoded.
///
/// Signed integer types decode to `Int`, `fixed32`/`fixed64` to `UInt`.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    String(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
}

impl Scalar {
    #[inline]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Bool(_) => "bool",
            Self::Int(_) => "signed integer",
            Self::UInt(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
        }
    }

    /// Parses command-line style text as a value of `scalar_type`.
    ///
    /// `bool` accepts `true`/`false` in any case. Floating point types accept
    /// `inf`, `-inf` and `nan`. `string` and `bytes` take the text verbatim.
    pub fn parse(scalar_type: ScalarType, text: &str) -> Result<Self, EncodeError> {
        let invalid = || EncodeError::InvalidLiteral { scalar_type, literal: text.to_owned() };
        let trimmed = text.trim();
        match scalar_type {
            ScalarType::String => Ok(Self::String(text.to_owned())),
            ScalarType::Bytes => Ok(Self::Bytes(text.as_bytes().to_vec())),
            ScalarType::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Self::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Self::Bool(false))
                } else {
                    Err(invalid())
                }
            }
            ScalarType::Float => match trimmed.parse::<f32>() {
                // a finite literal beyond f32 range parses to an infinity
                Ok(v) if v.is_infinite() && trimmed.parse::<f64>().is_ok_and(f64::is_finite) => {
                    Err(invalid())
                }
                Ok(v) => Ok(Self::Float(v)),
                Err(_) => Err(invalid()),
            },
            ScalarType::Double => trimmed.parse().map(Self::Double).map_err(|_| invalid()),
            ScalarType::Int
            | ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Sint32
            | ScalarType::Sint64
            | ScalarType::Fixed32
            | ScalarType::Fixed64
            | ScalarType::Sfixed32
            | ScalarType::Sfixed64 => match trimmed.parse::<i64>() {
                Ok(v) => Ok(Self::Int(v)),
                Err(_) => trimmed.parse::<u64>().map(Self::UInt).map_err(|_| invalid()),
            },
        }
    }

    /// Integer view used by the integer encoders. Booleans count as 0/1.
    #[inline]
    pub(crate) fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Int(v) => Some(v as i128),
            Self::UInt(v) => Some(v as i128),
            Self::Bool(b) => Some(b as i128),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                #[inline]
                fn from(value: $ty) -> Self { Self::$variant(value.into()) }
            }
        )*
    };
}

impl_from_for_scalar!(
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Double,
);
