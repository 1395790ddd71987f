//! Whole-stream conversion between length-delimited records and frames

use std::io::{Read, Write};

use proto_value::{Scalar, ScalarType, encode_message, read_record};

use crate::{FrameError, frame::encode_header, reader::unwrap};

/// Frames every length-delimited record read from `reader`.
///
/// Field numbers are ignored; each payload becomes one frame, in order. Any
/// other wire type fails with [`FrameError::NotLengthDelimited`].
///
/// Returns the number of frames written.
///
/// # Example
///
/// ```
/// // field 1 = "hi"
/// let mut out = Vec::new();
/// let frames = grpc_stream::wrap_stream(&mut &[0x0a, 0x02, b'h', b'i'][..], &mut out).unwrap();
///
/// assert_eq!(frames, 1);
/// assert_eq!(out, [0x00, 0x00, 0x00, 0x00, 0x02, b'h', b'i']);
/// ```
#[inline]
pub fn wrap_stream<R, W>(reader: &mut R, writer: &mut W) -> Result<usize, FrameError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    wrap_stream_with(reader, writer, true)
}

/// Like [`wrap_stream`], but with `strict == false` records of other wire
/// types are skipped instead of failing the stream.
pub fn wrap_stream_with<R, W>(reader: &mut R, writer: &mut W, strict: bool) -> Result<usize, FrameError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut frames = 0;
    while let Some(record) = read_record(reader)? {
        let field_number = record.field_number;
        let payload = match record.into_bytes() {
            Ok(payload) => payload,
            Err(record) => {
                let wire_type = record.wire_type();
                if strict {
                    tracing::debug!(field_number, %wire_type, "record cannot be framed");
                    return Err(FrameError::NotLengthDelimited { field_number, wire_type });
                }
                tracing::debug!(field_number, %wire_type, "skipping record");
                continue;
            }
        };
        writer.write_all(&encode_header(payload.len())?)?;
        writer.write_all(&payload)?;
        tracing::trace!(field_number, len = payload.len(), "wrapped record");
        frames += 1;
    }
    tracing::trace!(frames, "wrap stream finished");
    Ok(frames)
}

/// Unwraps every frame read from `reader` and writes each payload as a
/// `bytes` field numbered `tag`.
///
/// The concatenated output is a message whose field `tag` repeats once per
/// frame. An empty payload is the default `bytes` value and produces no
/// output. A frame that fails to read writes nothing; output of the frames
/// before it stays written.
///
/// Returns the number of frames read.
pub fn unwrap_stream<R, W>(reader: &mut R, writer: &mut W, tag: u32) -> Result<usize, FrameError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut frames = 0;
    while let Some(payload) = unwrap(reader)? {
        let len = payload.len();
        let encoded = encode_message(tag, ScalarType::Bytes, Scalar::Bytes(payload))?;
        writer.write_all(&encoded)?;
        tracing::trace!(tag, len, "unwrapped frame into field");
        frames += 1;
    }
    tracing::trace!(frames, "unwrap stream finished");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap;
    use proto_value::WireType;

    fn unhex(text: &str) -> Vec<u8> {
        hex::decode(text.split_whitespace().collect::<String>()).unwrap()
    }

    #[test]
    fn test_wrap_stream() {
        // field 1 = {1: "hello"}, field 1 = {2: [3, 5]}
        let input = unhex("0a070a0568656c6c6f 0a0412020305");
        let mut out = Vec::new();
        assert_eq!(wrap_stream(&mut &input[..], &mut out).unwrap(), 2);
        assert_eq!(out, unhex("0000000007 0a0568656c6c6f 0000000004 12020305"));
    }

    #[test]
    fn test_wrap_stream_ignores_field_numbers() {
        let input = [
            encode_message(7, ScalarType::String, "a").unwrap(),
            encode_message(300, ScalarType::Bytes, Scalar::Bytes(vec![0x01, 0x02])).unwrap(),
        ]
        .concat();
        let mut out = Vec::new();
        wrap_stream(&mut &input[..], &mut out).unwrap();

        let payloads: Vec<_> = crate::FrameReader::new(&out[..]).collect::<Result<_, _>>().unwrap();
        assert_eq!(payloads, [&b"a"[..], &[0x01u8, 0x02][..]]);
    }

    #[test]
    fn test_wrap_stream_rejects_varint() {
        let input = unhex("0a0161 1001");
        let mut out = Vec::new();
        assert!(matches!(
            wrap_stream(&mut &input[..], &mut out),
            Err(FrameError::NotLengthDelimited { field_number: 2, wire_type: WireType::Varint })
        ));
        // the record before the failure was already written
        assert_eq!(out, unhex("0000000001 61"));
    }

    #[test]
    fn test_wrap_stream_lenient() {
        let input = unhex("1001 0a0161 1d00000000");
        let mut out = Vec::new();
        assert_eq!(wrap_stream_with(&mut &input[..], &mut out, false).unwrap(), 1);
        assert_eq!(out, unhex("0000000001 61"));
    }

    #[test]
    fn test_wrap_stream_truncated() {
        let input = unhex("0a05 6869");
        let mut out = Vec::new();
        assert!(matches!(
            wrap_stream(&mut &input[..], &mut out),
            Err(FrameError::Truncated { expected: 5, actual: 2, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unwrap_stream() {
        let input = unhex("0000000002 1801 0000000004 12020305");
        let mut out = Vec::new();
        assert_eq!(unwrap_stream(&mut &input[..], &mut out, 1).unwrap(), 2);
        assert_eq!(out, unhex("0a021801 0a0412020305"));
    }

    #[test]
    fn test_unwrap_stream_large_message() {
        let input = wrap(&[0x42; 200]).unwrap();
        let mut out = Vec::new();
        unwrap_stream(&mut &input[..], &mut out, 1).unwrap();
        assert_eq!(out.len(), 203);
        assert_eq!(&out[..3], [0x0a, 0xc8, 0x01]);
    }

    #[test]
    fn test_unwrap_stream_elides_empty_payload() {
        let input = [wrap(b"").unwrap(), wrap(b"x").unwrap()].concat();
        let mut out = Vec::new();
        assert_eq!(unwrap_stream(&mut &input[..], &mut out, 3).unwrap(), 2);
        assert_eq!(out, [0x1a, 0x01, b'x']);
    }

    #[test]
    fn test_unwrap_stream_stops_on_bad_frame() {
        let mut input = wrap(b"ok").unwrap();
        input.extend([0x00, 0x00, 0x00, 0x00, 0x03, b'n']);
        let mut out = Vec::new();
        assert!(matches!(
            unwrap_stream(&mut &input[..], &mut out, 1),
            Err(FrameError::Truncated { step: "frame payload", .. })
        ));
        assert_eq!(out, [0x0a, 0x02, b'o', b'k']);
    }

    #[test]
    fn test_round_trip() {
        let messages = [&b"\x08\x01"[..], b"\x12\x03abc", &[0u8; 0]];
        let framed: Vec<u8> = messages.iter().flat_map(|m| wrap(m).unwrap()).collect();

        let mut fields = Vec::new();
        unwrap_stream(&mut &framed[..], &mut fields, 1).unwrap();
        let mut reframed = Vec::new();
        wrap_stream(&mut &fields[..], &mut reframed).unwrap();

        // the empty message does not survive as a field
        let expected: Vec<u8> = messages[..2].iter().flat_map(|m| wrap(m).unwrap()).collect();
        assert_eq!(reframed, expected);
    }
}
