//! Raw message frame definition

use crate::FrameError;

/// Frame header size: 1 flag byte + 4 length bytes.
pub const HEADER_LEN: usize = 5;

/// The only flag value accepted: payload is not compressed.
pub const FLAG_UNCOMPRESSED: u8 = 0x00;

/// Raw frame of a gRPC message
///
/// Contains the frame flag and a reference to the payload.
///
/// # Frame Format
///
/// ```text
/// +------+----------+----------------+
/// | flag | length   | data           |
/// | 1B   | 4B (BE)  | length bytes   |
/// +------+----------+----------------+
/// ```
///
/// - `flag`: compression flag, must be `0`
/// - `length`: payload length (big-endian)
/// - `data`: payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFrame<'b> {
    /// Compression flag (0 = uncompressed)
    pub flag: u8,

    /// Payload data
    pub data: &'b [u8],
}

impl RawFrame<'_> {
    /// Calculate total bytes this frame occupies on the wire
    ///
    /// Includes 5-byte frame header + payload length
    ///
    /// # Example
    ///
    /// ```
    /// # use grpc_stream::RawFrame;
    /// let frame = RawFrame { flag: 0, data: &[1, 2, 3] };
    /// assert_eq!(frame.total_size(), 8); // 5 + 3
    /// ```
    #[inline]
    pub const fn total_size(&self) -> usize { HEADER_LEN + self.data.len() }
}

/// Builds the 5-byte header for a payload of `len` bytes.
#[inline]
pub fn encode_header(len: usize) -> Result<[u8; HEADER_LEN], FrameError> {
    let Ok(len32) = u32::try_from(len) else {
        return Err(FrameError::PayloadTooLarge(len));
    };
    let [a, b, c, d] = len32.to_be_bytes();
    Ok([FLAG_UNCOMPRESSED, a, b, c, d])
}

/// Wraps `message` in one uncompressed frame.
///
/// # Example
///
/// ```
/// let frame = grpc_stream::wrap(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
/// assert_eq!(frame, [0x00, 0x00, 0x00, 0x00, 0x04, 0xde, 0xad, 0xbe, 0xef]);
/// ```
#[inline]
pub fn wrap(message: &[u8]) -> Result<Vec<u8>, FrameError> {
    let header = encode_header(message.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + message.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(message);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap(&[0xde, 0xad, 0xbe, 0xef]).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0x04, 0xde, 0xad, 0xbe, 0xef]
        );
        assert_eq!(wrap(&[]).unwrap(), [0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_header_big_endian() {
        assert_eq!(encode_header(0xdeadbeef).unwrap(), [0x00, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(encode_header(300).unwrap(), [0x00, 0x00, 0x00, 0x01, 0x2c]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_header_too_large() {
        assert!(matches!(
            encode_header(u32::MAX as usize + 1),
            Err(FrameError::PayloadTooLarge(_))
        ));
    }
}
