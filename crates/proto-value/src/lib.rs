//! Protobuf wire values without a schema
//!
//! Encodes single scalar or repeated fields straight to wire bytes, and reads
//! an arbitrary byte stream back into tagged records.
//!
//! # Example
//!
//! ```
//! use proto_value::{Payload, Scalar, ScalarType, decode_stream, encode_message};
//!
//! let mut bytes = encode_message(1, ScalarType::String, "hello").unwrap();
//! bytes.extend(encode_message(4, ScalarType::Sint32, -100).unwrap());
//!
//! let records: Vec<_> = decode_stream(&bytes[..]).collect::<Result<_, _>>().unwrap();
//! assert_eq!(records[0].payload, Payload::LengthDelimited(b"hello".to_vec()));
//! assert_eq!(records[1].decode_scalar(ScalarType::Sint32).unwrap(), Scalar::Int(-100));
//! ```

mod decode;
mod encode;
mod error;
mod is_default;
mod scalar;
#[cfg(feature = "serde")]
mod serde_impls;
mod value;
pub mod wire_type;

// Public API
pub use decode::{
    Payload, Record, Records, decode_packed, decode_scalar, decode_stream, parse_records,
    read_exact_or_truncated, read_len_or_truncated, read_record, read_varint, zigzag_decode,
};
pub use encode::{
    FieldValue, encode_key, encode_literals, encode_message, encode_scalar, encode_varint,
    encode_zigzag, put_key, put_varint, varint_len, zigzag_encode32, zigzag_encode64,
};
pub use error::{DecodeError, EncodeError};
pub use is_default::IsDefault;
pub use scalar::{Scalar, ScalarType};
pub use value::{Fields, Value};
pub use wire_type::WireType;
