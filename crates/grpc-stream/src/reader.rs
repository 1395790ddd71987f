//! Blocking, pull-based frame reading

use std::io::{ErrorKind, Read, Write};

use proto_value::{read_exact_or_truncated, read_len_or_truncated};

use crate::{FLAG_UNCOMPRESSED, FrameError};

/// Reads the flag byte; `None` at a clean end of input.
fn read_flag<R: Read + ?Sized>(reader: &mut R) -> Result<Option<u8>, FrameError> {
    let mut flag = [0u8; 1];
    loop {
        return match reader.read(&mut flag) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(flag[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => Err(FrameError::Io(e)),
        };
    }
}

/// Reads the next frame and returns its payload.
///
/// End of input before the flag byte is a clean end (`Ok(None)`). Anywhere
/// else inside the frame it is [`FrameError::Truncated`].
///
/// # Example
///
/// ```
/// let stream = [0x00, 0x00, 0x00, 0x00, 0x02, 0x08, 0x01];
/// let mut reader = &stream[..];
///
/// assert_eq!(grpc_stream::unwrap(&mut reader).unwrap(), Some(vec![0x08, 0x01]));
/// assert_eq!(grpc_stream::unwrap(&mut reader).unwrap(), None);
/// ```
pub fn unwrap<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameError> {
    let Some(flag) = read_flag(reader)? else {
        return Ok(None);
    };
    if flag != FLAG_UNCOMPRESSED {
        tracing::debug!(flag, "rejecting compressed frame");
        return Err(FrameError::UnsupportedFlag(flag));
    }

    let mut len = [0u8; 4];
    read_exact_or_truncated(reader, &mut len, "frame length")?;
    let len = u32::from_be_bytes(len);

    let payload = read_len_or_truncated(reader, u64::from(len), "frame payload")?;
    tracing::trace!(len, "unwrapped frame");
    Ok(Some(payload))
}

/// Unwraps a single frame and copies its payload to `writer`.
///
/// Returns the number of payload bytes written; an empty input writes
/// nothing and returns 0.
pub fn unwrap_to<R, W>(reader: &mut R, writer: &mut W) -> Result<usize, FrameError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    match unwrap(reader)? {
        Some(payload) => {
            writer.write_all(&payload)?;
            Ok(payload.len())
        }
        None => Ok(0),
    }
}

/// Iterator over the payloads of consecutive frames
///
/// Ends at a clean end of input and after the first error.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    #[inline]
    pub fn new(reader: R) -> Self { Self { reader, done: false } }

    #[inline]
    pub fn into_inner(self) -> R { self.reader }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Vec<u8>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = unwrap(&mut self.reader).transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<R: Read> core::iter::FusedIterator for FrameReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap;

    #[test]
    fn test_unwrap_identity() {
        for payload in [&b""[..], b"\x08\x01", &[0xabu8; 300][..]] {
            let frame = wrap(payload).unwrap();
            let mut reader = &frame[..];
            assert_eq!(unwrap(&mut reader).unwrap().as_deref(), Some(payload));
            assert_eq!(unwrap(&mut reader).unwrap(), None);
        }
    }

    #[test]
    fn test_unwrap_empty_input() {
        let mut reader: &[u8] = &[];
        assert_eq!(unwrap(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_unwrap_rejects_flag() {
        let mut reader: &[u8] = &[0x01, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(unwrap(&mut reader), Err(FrameError::UnsupportedFlag(1))));
    }

    #[test]
    fn test_unwrap_truncated() {
        let mut reader: &[u8] = &[0x00, 0x00, 0x00];
        assert!(matches!(
            unwrap(&mut reader),
            Err(FrameError::Truncated { step: "frame length", expected: 4, actual: 2 })
        ));

        let mut reader: &[u8] = &[0x00, 0x00, 0x00, 0x00, 0x04, 0xde, 0xad];
        assert!(matches!(
            unwrap(&mut reader),
            Err(FrameError::Truncated { step: "frame payload", expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_unwrap_to() {
        let frame = wrap(b"payload").unwrap();
        let mut out = Vec::new();
        assert_eq!(unwrap_to(&mut &frame[..], &mut out).unwrap(), 7);
        assert_eq!(out, b"payload");

        let mut out = Vec::new();
        assert_eq!(unwrap_to(&mut &b""[..], &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_frame_reader() {
        let stream = [wrap(b"a").unwrap(), wrap(b"").unwrap(), wrap(b"bc").unwrap()].concat();
        let payloads: Vec<_> = FrameReader::new(&stream[..]).collect::<Result<_, _>>().unwrap();
        assert_eq!(payloads, [&b"a"[..], b"", b"bc"]);
    }

    #[test]
    fn test_frame_reader_stops_after_error() {
        let mut stream = wrap(b"a").unwrap();
        stream.extend([0x00, 0x00, 0x00, 0x00, 0x40, 0x01]);
        stream.extend(wrap(b"never").unwrap());

        let mut frames = FrameReader::new(&stream[..]);
        assert_eq!(frames.next().unwrap().unwrap(), b"a");
        // the declared length runs past the end of the stream
        assert!(frames.next().unwrap().is_err());
        assert!(frames.next().is_none());
    }
}
