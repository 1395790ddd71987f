//! Environment configuration
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `PROTOWIRE_FIELD_NUMBER` | field number used by [`Config::encode`] | `1` |
//! | `PROTOWIRE_UNWRAP_TAG` | field number given to unwrapped frames | `1` |
//! | `PROTOWIRE_STRICT_FRAMES` | fail on records that cannot be framed | `true` |

use std::{
    io::{Read, Write},
    sync::LazyLock,
};

use proto_value::{EncodeError, FieldValue, ScalarType, encode_message};

use crate::Error;

pub const FIELD_NUMBER_KEY: &str = "PROTOWIRE_FIELD_NUMBER";
pub const UNWRAP_TAG_KEY: &str = "PROTOWIRE_UNWRAP_TAG";
pub const STRICT_FRAMES_KEY: &str = "PROTOWIRE_STRICT_FRAMES";

const DEFAULT_FIELD_NUMBER: u32 = 1;
const DEFAULT_UNWRAP_TAG: u32 = 1;
const DEFAULT_STRICT_FRAMES: bool = true;

/// A value that can be read from one environment variable.
pub trait ParseFromEnv: Sized {
    /// Parses an already trimmed, non-empty value.
    fn parse_env_value(value: &str) -> Option<Self>;

    #[inline]
    fn parse_from_env(key: &str) -> Option<Self> {
        let value = std::env::var(key).ok()?;
        let value = value.trim();
        if value.is_empty() { None } else { Self::parse_env_value(value) }
    }

    #[inline]
    fn parse_from_env_or(key: &str, default: Self) -> Self {
        Self::parse_from_env(key).unwrap_or(default)
    }
}

impl ParseFromEnv for bool {
    #[inline]
    fn parse_env_value(value: &str) -> Option<bool> {
        if value.eq_ignore_ascii_case("true") || value == "1" {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") || value == "0" {
            Some(false)
        } else {
            None
        }
    }
}

macro_rules! impl_parse_num_from_env {
    ($($ty:ty)*) => {
        $(
            impl ParseFromEnv for $ty {
                #[inline]
                fn parse_env_value(value: &str) -> Option<$ty> { value.parse().ok() }
            }
        )*
    };
}

impl_parse_num_from_env!(u32);

/// Reads `key`, falling back to `default` when unset, blank or unparsable.
#[inline]
pub fn parse_from_env<T: ParseFromEnv>(key: &str, default: T) -> T {
    T::parse_from_env_or(key, default)
}

/// Defaults for the operations that take a field number or a framing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub field_number: u32,
    pub unwrap_tag: u32,
    pub strict_frames: bool,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            field_number: DEFAULT_FIELD_NUMBER,
            unwrap_tag: DEFAULT_UNWRAP_TAG,
            strict_frames: DEFAULT_STRICT_FRAMES,
        }
    }
}

static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);

impl Config {
    /// Reads the process environment only.
    pub fn from_env() -> Self {
        let config = Self {
            field_number: parse_from_env(FIELD_NUMBER_KEY, DEFAULT_FIELD_NUMBER),
            unwrap_tag: parse_from_env(UNWRAP_TAG_KEY, DEFAULT_UNWRAP_TAG),
            strict_frames: parse_from_env(STRICT_FRAMES_KEY, DEFAULT_STRICT_FRAMES),
        };
        tracing::debug!(?config, "loaded configuration");
        config
    }

    /// Loads `.env` from the working directory, if any, then reads the
    /// environment.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
        Self::from_env()
    }

    /// Process-wide configuration, loaded on first use.
    #[inline]
    pub fn global() -> &'static Self { &CONFIG }

    /// Encodes `value` under the configured field number.
    #[inline]
    pub fn encode(
        &self,
        scalar_type: ScalarType,
        value: impl Into<FieldValue>,
    ) -> Result<Vec<u8>, EncodeError> {
        encode_message(self.field_number, scalar_type, value)
    }

    /// Frames the length-delimited records of `reader`, honouring
    /// `strict_frames`.
    #[inline]
    pub fn wrap_stream<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<usize, Error>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        Ok(grpc_stream::wrap_stream_with(reader, writer, self.strict_frames)?)
    }

    /// Unwraps every frame of `reader` into a field numbered `unwrap_tag`.
    #[inline]
    pub fn unwrap_stream<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<usize, Error>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        Ok(grpc_stream::unwrap_stream(reader, writer, self.unwrap_tag)?)
    }
}
