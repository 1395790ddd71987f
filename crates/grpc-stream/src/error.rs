use proto_value::{DecodeError, EncodeError, WireType};

/// Failure while framing or unframing gRPC messages.
#[derive(Debug)]
pub enum FrameError {
    /// Input ended inside a frame header or payload.
    Truncated { step: &'static str, expected: u64, actual: u64 },
    /// Compression flag other than 0; compressed frames are not supported.
    UnsupportedFlag(u8),
    /// Payload longer than the 4-byte length field can describe.
    PayloadTooLarge(usize),
    /// A record fed to `wrap_stream` was not length-delimited.
    NotLengthDelimited { field_number: u32, wire_type: WireType },
    /// The record stream fed to `wrap_stream` was malformed.
    Record(DecodeError),
    /// An unwrapped payload could not be re-encoded as a field.
    Encode(EncodeError),
    /// Reading or writing the underlying stream failed.
    Io(std::io::Error),
}

impl FrameError {
    #[inline]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "truncated_input",
            Self::UnsupportedFlag(_) => "unsupported_frame_flag",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::NotLengthDelimited { .. } => "not_length_delimited",
            Self::Record(err) => err.error_type(),
            Self::Encode(err) => err.error_type(),
            Self::Io(_) => "io",
        }
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { step, expected, actual } => write!(
                f,
                "Unexpected EOF while reading {step}: expected {expected} bytes, got {actual}"
            ),
            Self::UnsupportedFlag(flag) => {
                write!(f, "Unsupported frame flag {flag:#04x}, only uncompressed frames are accepted")
            }
            Self::PayloadTooLarge(len) => {
                write!(f, "Payload of {len} bytes does not fit a 4-byte frame length")
            }
            Self::NotLengthDelimited { field_number, wire_type } => {
                write!(f, "Field {field_number} has wire type {wire_type}, expected length-delimited")
            }
            Self::Record(err) => write!(f, "Malformed record stream: {err}"),
            Self::Encode(err) => write!(f, "Failed to re-encode payload: {err}"),
            Self::Io(err) => write!(f, "Stream I/O failed: {err}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Record(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FrameError {
    #[inline]
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}

impl From<EncodeError> for FrameError {
    #[inline]
    fn from(err: EncodeError) -> Self { Self::Encode(err) }
}

impl From<DecodeError> for FrameError {
    /// Truncation and I/O keep their frame-level meaning; anything else is a
    /// malformed record.
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Truncated { step, expected, actual } => {
                Self::Truncated { step, expected, actual }
            }
            DecodeError::Io(err) => Self::Io(err),
            err => Self::Record(err),
        }
    }
}
