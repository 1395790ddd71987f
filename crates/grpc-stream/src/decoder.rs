//! Streaming frame decoder

use bytes::Bytes;

use crate::{FrameError, buffer::Buffer, frame::HEADER_LEN};

/// Push-based gRPC frame decoder
///
/// Accepts data chunks of any size as they arrive from a transport and hands
/// back every payload that became complete. Compressed frames are rejected.
///
/// # Example
///
/// ```
/// use grpc_stream::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
///
/// // a frame split across two chunks
/// assert!(decoder.decode(&[0, 0, 0, 0, 2, b'h']).unwrap().is_empty());
/// let payloads = decoder.decode(&[b'i']).unwrap();
/// assert_eq!(payloads, [&b"hi"[..]]);
///
/// decoder.finish().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Buffer,
}

impl StreamDecoder {
    /// Create new decoder
    #[inline]
    pub fn new() -> Self { Self { buffer: Buffer::new() } }

    /// Decode data chunk with custom processor
    ///
    /// # Parameters
    /// - `data`: Received data chunk
    /// - `processor`: Called with each complete payload, in arrival order
    ///
    /// # Returns
    /// Processor results for the frames completed by this chunk. The first
    /// error stops decoding: frames handed out before it are consumed, the
    /// failing frame and everything after it stay buffered.
    pub fn decode_with<T, F>(&mut self, data: &[u8], mut processor: F) -> Result<Vec<T>, FrameError>
    where F: FnMut(&[u8]) -> Result<T, FrameError> {
        self.buffer.extend_from_slice(data);

        let mut iter = self.buffer.frames();
        let mut messages = Vec::with_capacity(iter.len());
        let mut result = Ok(());

        // offset of the first frame not handed out
        let consumed = loop {
            let start = iter.offset();
            let Some(frame) = iter.next() else { break start };
            if frame.flag != crate::FLAG_UNCOMPRESSED {
                result = Err(FrameError::UnsupportedFlag(frame.flag));
                break start;
            }
            match processor(frame.data) {
                Ok(msg) => messages.push(msg),
                Err(e) => {
                    result = Err(e);
                    break start;
                }
            }
        };

        self.buffer.advance(consumed);
        result.map(|()| messages)
    }

    /// Decode data chunk, returning the raw payloads
    #[inline]
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<Bytes>, FrameError> {
        self.decode_with(data, |payload| Ok(Bytes::copy_from_slice(payload)))
    }

    /// Bytes received but not yet handed out as a frame
    #[inline]
    pub fn pending(&self) -> usize { self.buffer.len() }

    /// Checks that the input ended on a frame boundary
    pub fn finish(&self) -> Result<(), FrameError> {
        let pending = self.buffer.as_ref();
        if pending.is_empty() {
            return Ok(());
        }
        if pending.len() < HEADER_LEN {
            return Err(FrameError::Truncated {
                step: "frame header",
                expected: HEADER_LEN as u64,
                actual: pending.len() as u64,
            });
        }
        let len = u32::from_be_bytes([pending[1], pending[2], pending[3], pending[4]]);
        Err(FrameError::Truncated {
            step: "frame payload",
            expected: u64::from(len),
            actual: (pending.len() - HEADER_LEN) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap;

    #[test]
    fn test_decode_chunks() {
        let mut stream = wrap(b"first").unwrap();
        stream.extend(wrap(b"").unwrap());
        stream.extend(wrap(b"third").unwrap());

        let mut decoder = StreamDecoder::new();
        let mut payloads = Vec::new();
        for chunk in stream.chunks(3) {
            payloads.extend(decoder.decode(chunk).unwrap());
        }
        assert_eq!(payloads, [&b"first"[..], b"", b"third"]);
        assert_eq!(decoder.pending(), 0);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_decode_with_processor() {
        let stream = [wrap(b"\x08\x96\x01").unwrap(), wrap(b"\x08\x01").unwrap()].concat();
        let mut decoder = StreamDecoder::new();
        let counts = decoder
            .decode_with(&stream, |payload| Ok(proto_value::parse_records(payload)?.len()))
            .unwrap();
        assert_eq!(counts, [1, 1]);
    }

    #[test]
    fn test_compressed_rejected() {
        let mut decoder = StreamDecoder::new();
        let mut stream = wrap(b"ok").unwrap();
        stream.extend([1, 0, 0, 0, 1, b'z']);
        assert!(matches!(decoder.decode(&stream), Err(FrameError::UnsupportedFlag(1))));
        // the good frame before it was consumed, the rejected one kept
        assert_eq!(decoder.pending(), 6);
        assert!(matches!(decoder.decode(&[]), Err(FrameError::UnsupportedFlag(1))));
        assert_eq!(decoder.pending(), 6);
    }

    #[test]
    fn test_processor_error_keeps_frame() {
        let stream = [wrap(b"\x08\x01").unwrap(), wrap(b"\x0a\x05ab").unwrap()].concat();
        let mut decoder = StreamDecoder::new();
        let result = decoder.decode_with(&stream, |payload| Ok(proto_value::parse_records(payload)?.len()));
        assert!(matches!(result, Err(FrameError::Record(_))));
        assert_eq!(decoder.pending(), stream.len() - 7);

        let mut decoder = StreamDecoder::new();
        let result = decoder.decode_with(&stream, |_| Err::<(), _>(FrameError::UnsupportedFlag(9)));
        assert!(result.is_err());
        assert_eq!(decoder.pending(), stream.len());
    }

    #[test]
    fn test_finish_reports_truncation() {
        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0, 0, 0]).unwrap();
        assert!(matches!(
            decoder.finish(),
            Err(FrameError::Truncated { step: "frame header", expected: 5, actual: 3 })
        ));

        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0, 0, 0, 0, 4, b'a']).unwrap();
        assert!(matches!(
            decoder.finish(),
            Err(FrameError::Truncated { step: "frame payload", expected: 4, actual: 1 })
        ));
    }
}
