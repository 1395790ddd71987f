use grpc_stream::FrameError;
use proto_value::{DecodeError, EncodeError};

/// What was wrong with a field spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorKind {
    /// An opening bracket without its closer, or a closer with no opener.
    UnmatchedBracket,
    /// A leaf type that is not one of the scalar type names.
    UnknownScalar,
    /// Something other than `,` after a complete field.
    MissingSeparator,
    /// A field without `:` between number and type.
    MissingColon,
    /// A field number that is not a positive 32-bit integer.
    InvalidFieldNumber,
    /// Nothing where a field was expected.
    EmptyField,
    /// `[...]` holding zero or several fields.
    RepeatedArity,
    /// `[...]` directly holding another `[...]`.
    NestedRepeated,
}

impl SpecErrorKind {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnmatchedBracket => "unmatched_bracket",
            Self::UnknownScalar => "unknown_scalar",
            Self::MissingSeparator => "missing_separator",
            Self::MissingColon => "missing_colon",
            Self::InvalidFieldNumber => "invalid_field_number",
            Self::EmptyField => "empty_field",
            Self::RepeatedArity => "repeated_arity",
            Self::NestedRepeated => "nested_repeated",
        }
    }
}

/// Syntax error in a field spec, with the text it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    pub kind: SpecErrorKind,
    pub fragment: String,
}

impl SpecError {
    #[inline]
    pub(crate) fn new(kind: SpecErrorKind, fragment: &str) -> Self {
        Self { kind, fragment: fragment.to_owned() }
    }

    #[inline]
    pub const fn error_type(&self) -> &'static str { self.kind.as_str() }
}

impl core::fmt::Display for SpecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let fragment = &self.fragment;
        match self.kind {
            SpecErrorKind::UnmatchedBracket => write!(f, "Unmatched bracket in '{fragment}'"),
            SpecErrorKind::UnknownScalar => write!(f, "Unknown scalar type '{fragment}'"),
            SpecErrorKind::MissingSeparator => write!(f, "Expected ',' before '{fragment}'"),
            SpecErrorKind::MissingColon => write!(f, "Expected ':' in field '{fragment}'"),
            SpecErrorKind::InvalidFieldNumber => write!(f, "Invalid field number '{fragment}'"),
            SpecErrorKind::EmptyField => write!(f, "Empty field in '{fragment}'"),
            SpecErrorKind::RepeatedArity => {
                write!(f, "Repeated field '{fragment}' must hold exactly one field")
            }
            SpecErrorKind::NestedRepeated => {
                write!(f, "Repeated field '{fragment}' cannot directly repeat another list")
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// Any failure of this crate's operations.
#[derive(Debug)]
pub enum Error {
    Spec(SpecError),
    Encode(EncodeError),
    Decode(DecodeError),
    Frame(FrameError),
}

impl Error {
    #[inline]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Spec(err) => err.error_type(),
            Self::Encode(err) => err.error_type(),
            Self::Decode(err) => err.error_type(),
            Self::Frame(err) => err.error_type(),
        }
    }
}

impl core::fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spec(err) => core::fmt::Display::fmt(err, f),
            Self::Encode(err) => core::fmt::Display::fmt(err, f),
            Self::Decode(err) => core::fmt::Display::fmt(err, f),
            Self::Frame(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Frame(err) => Some(err),
        }
    }
}

macro_rules! impl_from_error {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                #[inline]
                fn from(err: $ty) -> Self { Self::$variant(err) }
            }
        )*
    };
}

impl_from_error!(
    Spec(SpecError),
    Encode(EncodeError),
    Decode(DecodeError),
    Frame(FrameError),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type() {
        let err: Error = SpecError::new(SpecErrorKind::UnknownScalar, "int128").into();
        assert_eq!(err.error_type(), "unknown_scalar");
        assert_eq!(err.to_string(), "Unknown scalar type 'int128'");

        let err: Error = FrameError::UnsupportedFlag(1).into();
        assert_eq!(err.error_type(), "unsupported_frame_flag");
        assert!(std::error::Error::source(&err).is_some());
    }
}
