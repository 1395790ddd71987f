//! Internal buffer management

use bytes::{Buf as _, BytesMut};
use core::iter::FusedIterator;

use crate::frame::{HEADER_LEN, RawFrame};

/// Frame buffer for incrementally arriving data
#[derive(Debug, Default)]
pub struct Buffer {
    inner: BytesMut,
}

impl Buffer {
    #[inline]
    pub fn new() -> Self { Self { inner: BytesMut::new() } }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: BytesMut::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize { self.inner.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    #[inline]
    pub fn extend_from_slice(&mut self, data: &[u8]) { self.inner.extend_from_slice(data) }

    /// Drops `cnt` consumed bytes from the front.
    ///
    /// `cnt` must not exceed [`len`](Self::len); callers pass
    /// [`FrameIter::offset`].
    #[inline]
    pub fn advance(&mut self, cnt: usize) { self.inner.advance(cnt) }

    /// Iterates over the complete frames currently buffered.
    #[inline]
    pub fn frames(&self) -> FrameIter<'_> { FrameIter { buffer: &self.inner, offset: 0 } }
}

impl AsRef<[u8]> for Buffer {
    #[inline]
    fn as_ref(&self) -> &[u8] { &self.inner }
}

/// Reads the header at `offset`, if all 5 bytes are there.
#[inline]
fn header_at(buffer: &[u8], offset: usize) -> Option<(u8, usize)> {
    let header = buffer.get(offset..offset.checked_add(HEADER_LEN)?)?;
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    Some((header[0], len))
}

/// Iterator over complete frames in a byte slice
#[derive(Debug, Clone)]
pub struct FrameIter<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> FrameIter<'b> {
    /// Returns the number of bytes consumed so far
    #[inline]
    pub fn offset(&self) -> usize { self.offset }
}

impl<'b> Iterator for FrameIter<'b> {
    type Item = RawFrame<'b>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (flag, len) = header_at(self.buffer, self.offset)?;
        let start = self.offset + HEADER_LEN;
        // stop at an incomplete frame; more data may arrive later
        let data = self.buffer.get(start..start.checked_add(len)?)?;
        self.offset = start + len;
        Some(RawFrame { flag, data })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.len();
        (count, Some(count))
    }
}

impl ExactSizeIterator for FrameIter<'_> {
    #[inline]
    fn len(&self) -> usize {
        // count remaining complete frames
        let mut count = 0;
        let mut offset = self.offset;
        while let Some((_, len)) = header_at(self.buffer, offset) {
            let end = offset + HEADER_LEN + len;
            if end > self.buffer.len() {
                break;
            }
            count += 1;
            offset = end;
        }
        count
    }
}

impl FusedIterator for FrameIter<'_> {}

impl<'b> IntoIterator for &'b Buffer {
    type Item = RawFrame<'b>;
    type IntoIter = FrameIter<'b>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.frames() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_keep_flag() {
        let mut buffer = Buffer::with_capacity(16);
        buffer.extend_from_slice(&[0, 0, 0, 0, 3, b'a', b'b', b'c']);
        buffer.extend_from_slice(&[1, 0, 0, 0, 0]);

        let iter = buffer.frames();
        assert_eq!(iter.size_hint(), (2, Some(2)));

        let frames: Vec<_> = iter.collect();
        assert_eq!((frames[0].flag, frames[0].data), (0, &b"abc"[..]));
        assert_eq!((frames[1].flag, frames[1].data), (1, &b""[..]));
    }

    #[test]
    fn test_incomplete_frame_not_yielded() {
        let mut buffer = Buffer::new();
        buffer.extend_from_slice(&[0, 0, 0, 0, 1, b'a', 0, 0, 0, 0, 4, b'x']);

        let mut iter = buffer.frames();
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next().map(|f| f.data), Some(&b"a"[..]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.offset(), 6);

        buffer.advance(6);
        assert_eq!(buffer.len(), 6);
        buffer.extend_from_slice(b"yzw");
        assert_eq!(buffer.frames().next().map(|f| f.data), Some(&b"xyzw"[..]));
    }

    #[test]
    fn test_partial_header_stays_pending() {
        let mut buffer = Buffer::new();
        buffer.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0]);

        let mut iter = (&buffer).into_iter();
        assert_eq!(iter.next().map(|f| f.data), Some(&b""[..]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.offset(), 5);
    }

    #[test]
    fn test_clone_resumes_at_offset() {
        let mut buffer = Buffer::new();
        buffer.extend_from_slice(&[0, 0, 0, 0, 1, b'a', 0, 0, 0, 0, 1, b'b']);

        let mut iter = buffer.frames();
        iter.next();
        let rest = iter.clone();
        assert_eq!(rest.offset(), 6);
        assert_eq!(rest.map(|f| f.data).collect::<Vec<_>>(), [&b"b"[..]]);
        assert_eq!(iter.len(), 1);
    }
}
