use crate::{ScalarType, WireType};

/// Failure while reading records or decoding scalar payloads.
#[derive(Debug)]
pub enum DecodeError {
    /// Input ended inside a multi-byte field.
    Truncated { step: &'static str, expected: u64, actual: u64 },
    /// Tag carried a group marker or an undefined wire type.
    UnsupportedWireType { field_number: u32, wire_type: u8 },
    /// Tag encodes a field number that does not fit in 32 bits.
    FieldNumberOverflow { tag: u64 },
    /// Record wire type differs from the one the requested scalar type uses.
    WireTypeMismatch { field_number: u32, expected: WireType, actual: WireType },
    /// A `bool` varint other than 0 or 1.
    InvalidBool { field_number: u32, value: u64 },
    /// A `string` payload that is not UTF-8.
    InvalidUtf8 { field_number: u32, source: core::str::Utf8Error },
    /// The underlying reader failed for a reason other than end of input.
    Io(std::io::Error),
}

impl DecodeError {
    #[inline]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "truncated_input",
            Self::UnsupportedWireType { .. } | Self::FieldNumberOverflow { .. } => "malformed_tag",
            Self::WireTypeMismatch { .. } => "wire_type_mismatch",
            Self::InvalidBool { .. } => "invalid_bool",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::Io(_) => "io",
        }
    }

    #[inline]
    pub const fn is_truncated(&self) -> bool { matches!(self, Self::Truncated { .. }) }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { step, expected, actual } => write!(
                f,
                "Unexpected EOF while reading {step}: expected {expected} bytes, got {actual}"
            ),
            Self::UnsupportedWireType { field_number, wire_type } => {
                write!(f, "Unsupported wire type {wire_type} on field {field_number}")
            }
            Self::FieldNumberOverflow { tag } => {
                write!(f, "Tag {tag:#x} has a field number above 32 bits")
            }
            Self::WireTypeMismatch { field_number, expected, actual } => write!(
                f,
                "Field {field_number}: expected wire type {expected}, got {actual}"
            ),
            Self::InvalidBool { field_number, value } => {
                write!(f, "Field {field_number}: {value} is not a valid bool")
            }
            Self::InvalidUtf8 { field_number, source } => {
                write!(f, "Field {field_number}: invalid UTF-8: {source}")
            }
            Self::Io(err) => write!(f, "Read failed: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUtf8 { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    #[inline]
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}

/// Failure while turning a value into wire bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// The value's kind cannot be written as the requested scalar type.
    TypeMismatch { scalar_type: ScalarType, found: &'static str },
    /// The integer does not fit the requested scalar type's width.
    OutOfRange { scalar_type: ScalarType, value: i128 },
    /// A finite number too large for a `float`.
    FloatOutOfRange { value: f64 },
    /// A textual literal could not be parsed as the requested scalar type.
    InvalidLiteral { scalar_type: ScalarType, literal: String },
}

impl EncodeError {
    #[inline]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::OutOfRange { .. } | Self::FloatOutOfRange { .. } => "out_of_range",
            Self::InvalidLiteral { .. } => "invalid_literal",
        }
    }
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TypeMismatch { scalar_type, found } => {
                write!(f, "Cannot encode {found} value as {scalar_type}")
            }
            Self::OutOfRange { scalar_type, value } => {
                write!(f, "Value {value} is out of range for {scalar_type}")
            }
            Self::FloatOutOfRange { value } => write!(f, "Value {value} is out of range for float"),
            Self::InvalidLiteral { scalar_type, literal } => {
                write!(f, "'{literal}' is not a valid {scalar_type} literal")
            }
        }
    }
}

impl std::error::Error for EncodeError {}
