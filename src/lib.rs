//! Schema-free protobuf and gRPC framing toolkit
//!
//! Builds protobuf wire bytes straight from values, reads arbitrary messages
//! back through a compact field spec, and converts between record streams and
//! gRPC frames.
//!
//! # Example
//!
//! ```
//! use protowire::{Scalar, ScalarType, Value, decode_with_spec, encode_message, parse_spec};
//!
//! let mut inner = encode_message(2, ScalarType::Float, 0.5f32).unwrap();
//! inner.extend(encode_message(4, ScalarType::Sfixed32, -3).unwrap());
//!
//! let mut message = encode_message(2, ScalarType::String, "point").unwrap();
//! message.extend(encode_message(3, ScalarType::Bytes, Scalar::Bytes(inner)).unwrap());
//!
//! let spec = parse_spec("2:string,3:{2:float,4:[1:sfixed32]}").unwrap();
//! let value = decode_with_spec(&message, &spec).unwrap();
//!
//! let nested = value.get(3).unwrap();
//! assert_eq!(nested.get(2), Some(&Value::Scalar(Scalar::Float(0.5))));
//! assert_eq!(nested.get(4), Some(&Value::List(vec![Value::Scalar(Scalar::Int(-3))])));
//!
//! // the same message, framed for a gRPC transport
//! let frame = protowire::wrap(&message).unwrap();
//! assert_eq!(protowire::unwrap(&mut &frame[..]).unwrap(), Some(message));
//! ```

mod config;
mod error;
mod spec;

// Public API
pub use config::{Config, ParseFromEnv, parse_from_env};
pub use error::{Error, SpecError, SpecErrorKind};
pub use spec::{MessageSpec, SpecNode, decode_with_spec, interpret, parse_spec};

pub use grpc_stream::{
    FrameError, FrameReader, StreamDecoder, unwrap, unwrap_stream, unwrap_to, wrap, wrap_stream,
    wrap_stream_with,
};
pub use proto_value::{
    DecodeError, EncodeError, FieldValue, Fields, Payload, Record, Records, Scalar, ScalarType,
    Value, WireType, decode_stream, encode_key, encode_literals, encode_message, encode_varint,
    encode_zigzag, read_record, read_varint, zigzag_decode,
};
