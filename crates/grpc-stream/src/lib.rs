//! gRPC length-prefixed framing
//!
//! Wraps messages in uncompressed gRPC frames and reads them back, either from
//! a blocking reader or incrementally from chunks pushed by a transport.
//!
//! # Example
//!
//! ```
//! use grpc_stream::{FrameReader, StreamDecoder, wrap};
//!
//! let stream = [wrap(b"first").unwrap(), wrap(b"second").unwrap()].concat();
//!
//! // pull-based
//! let payloads: Vec<_> = FrameReader::new(&stream[..]).collect::<Result<_, _>>().unwrap();
//! assert_eq!(payloads, [&b"first"[..], b"second"]);
//!
//! // push-based
//! let mut decoder = StreamDecoder::new();
//! let mut pushed = Vec::new();
//! for chunk in stream.chunks(4) {
//!     pushed.extend(decoder.decode(chunk).unwrap());
//! }
//! decoder.finish().unwrap();
//! assert_eq!(pushed, [&b"first"[..], b"second"]);
//! ```

mod buffer;
mod decoder;
mod error;
mod frame;
mod reader;
mod stream;

// Public API
pub use buffer::{Buffer, FrameIter};
pub use decoder::StreamDecoder;
pub use error::FrameError;
pub use frame::{FLAG_UNCOMPRESSED, HEADER_LEN, RawFrame, encode_header, wrap};
pub use reader::{FrameReader, unwrap, unwrap_to};
pub use stream::{unwrap_stream, wrap_stream, wrap_stream_with};
