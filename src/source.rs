//! Octet sources the reader front-end can pull from (§4.5.1).
//!
//! All three implementations buffer consumed octets rather than discard
//! them, so `mark`/`reset` is a matter of rewinding a cursor. That gives the
//! required "atomic restore of position on underflow" behavior uniformly:
//! a read that fails with [`Error::TruncatedSource`] never loses data the
//! caller already supplied.

use bytes::Bytes;
use std::io::Read;

use crate::error::{Error, Result};

/// An octet source the reader can pull tag/length/value bytes from.
pub trait Source {
    /// Absolute offset of the next unread octet, for error reporting.
    fn offset(&self) -> usize;

    /// Captures the current read position.
    fn mark(&self) -> usize;

    /// Rewinds to a position previously returned by [`Source::mark`].
    fn reset(&mut self, mark: usize);

    /// Reads exactly one octet, advancing the position.
    fn read_u8(&mut self) -> Result<u8>;

    /// Reads exactly `n` octets, advancing the position.
    fn read_exact(&mut self, n: usize) -> Result<Bytes>;

    /// True once every octet has been consumed.
    fn is_empty(&self) -> bool;
}

/// The common case: a fully-materialized, already-buffered TLV (an APDU
/// response, a cached certificate blob).
pub struct SliceSource {
    data: Bytes,
    pos: usize,
}

impl SliceSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl Source for SliceSource {
    fn offset(&self) -> usize {
        self.pos
    }

    fn mark(&self) -> usize {
        self.pos
    }

    fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: 1,
            });
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        if self.pos + n > self.data.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: (self.pos + n) - self.data.len(),
            });
        }
        let out = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// A random-access buffer that may grow between reads (e.g. an in-progress
/// card-reader response assembled a few bytes at a time by the caller).
/// `feed` appends more octets without disturbing the current read
/// position, so a `TruncatedSource` error can be retried once more data is
/// available.
pub struct CursorSource {
    data: Vec<u8>,
    pos: usize,
}

impl CursorSource {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
        }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn feed(&mut self, more: &[u8]) {
        self.data.extend_from_slice(more);
    }
}

impl Default for CursorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for CursorSource {
    fn offset(&self) -> usize {
        self.pos
    }

    fn mark(&self) -> usize {
        self.pos
    }

    fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: 1,
            });
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        if self.pos + n > self.data.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: (self.pos + n) - self.data.len(),
            });
        }
        let out = Bytes::copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(out)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// Wraps an arbitrary blocking [`Read`], pulling in more octets on demand
/// and buffering everything read so far (mirroring [`CursorSource`]'s
/// rewind semantics). A short read from the underlying reader surfaces as
/// [`Error::TruncatedSource`].
pub struct ReaderSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    fn fill_to(&mut self, needed_len: usize) -> Result<()> {
        while self.buf.len() < needed_len && !self.eof {
            let mut chunk = [0u8; 4096];
            let n = self
                .reader
                .read(&mut chunk)
                .map_err(|_| Error::TruncatedSource {
                    offset: self.buf.len(),
                    needed: needed_len - self.buf.len(),
                })?;
            if n == 0 {
                self.eof = true;
                break;
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn offset(&self) -> usize {
        self.pos
    }

    fn mark(&self) -> usize {
        self.pos
    }

    fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.fill_to(self.pos + 1)?;
        if self.pos >= self.buf.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: 1,
            });
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        self.fill_to(self.pos + n)?;
        if self.pos + n > self.buf.len() {
            return Err(Error::TruncatedSource {
                offset: self.pos,
                needed: (self.pos + n) - self.buf.len(),
            });
        }
        let out = Bytes::copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(out)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len() && self.eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_underflow_does_not_move_position() {
        let mut s = SliceSource::new(&b"\x01\x02"[..]);
        let mark = s.mark();
        assert!(s.read_exact(5).is_err());
        assert_eq!(s.mark(), mark);
    }

    #[test]
    fn cursor_source_retries_after_feed() {
        let mut s = CursorSource::new();
        s.feed(&[0x01]);
        let mark = s.mark();
        assert!(s.read_exact(2).is_err());
        s.reset(mark);
        s.feed(&[0x02]);
        assert_eq!(s.read_exact(2).unwrap().as_ref(), &[0x01, 0x02]);
    }

    #[test]
    fn reader_source_reads_from_std_io_read() {
        let data: &[u8] = b"\xAA\xBB\xCC";
        let mut s = ReaderSource::new(data);
        assert_eq!(s.read_exact(3).unwrap().as_ref(), data);
        assert!(s.is_empty());
    }
}
