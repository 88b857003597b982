//! OSC stream codec
//!
//! Big-endian, 4-byte aligned reader and writer for OSC atomic values.
//!
//! ```text
//! string: bytes | NUL | NUL padding to a multiple of 4
//! blob:   int32 length | bytes | NUL padding to a multiple of 4
//! ```
//!
//! Both halves own a cursor that advances by exactly the bytes consumed or
//! produced, padding included, so a cursor that starts aligned stays aligned
//! after every string or blob operation.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// OSC alignment unit
pub const ALIGNMENT: usize = 4;

/// Round `len` up to the next multiple of four
#[inline(always)]
pub fn padded_len(len: usize) -> usize {
    (len + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Encoded size of an OSC string holding `len` bytes (terminator included)
#[inline(always)]
pub fn string_len(len: usize) -> usize {
    padded_len(len + 1)
}

/// The bytes of `s` that go on the wire: everything before the first NUL
#[inline]
pub fn wire_str(s: &str) -> &[u8] {
    let bytes = s.as_bytes();
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Convert a payload length to its `int32` prefix
pub fn length_prefix(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::LengthOverflow(len))
}

// ============================================================================
// WRITER
// ============================================================================

/// Append-only OSC writer
#[derive(Debug, Default)]
pub struct OscWriter {
    buf: BytesMut,
}

impl OscWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    /// Write string bytes, a NUL terminator and NUL padding.
    ///
    /// A string with an interior NUL is cut there, as a reader would see it.
    pub fn write_string(&mut self, s: &str) {
        let bytes = wire_str(s);
        self.buf.extend_from_slice(bytes);
        self.put_zeros(string_len(bytes.len()) - bytes.len());
    }

    /// Write a length-prefixed blob followed by NUL padding.
    ///
    /// The length prefix does not count toward the padding.
    pub fn write_blob(&mut self, data: &[u8]) {
        self.write_length(data.len());
        self.buf.extend_from_slice(data);
        self.put_zeros(padded_len(data.len()) - data.len());
    }

    /// Write an `int32` length prefix.
    ///
    /// Callers encoding untrusted sizes check [`length_prefix`] first; see
    /// [`OscPacket::try_encode`](crate::OscPacket::try_encode).
    pub fn write_length(&mut self, len: usize) {
        debug_assert!(length_prefix(len).is_ok(), "length {} overflows int32", len);
        self.buf.put_i32(length_prefix(len).unwrap_or(i32::MAX));
    }

    /// Write raw bytes with no length prefix or padding
    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    #[inline]
    fn put_zeros(&mut self, count: usize) {
        self.buf.put_bytes(0, count);
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

// ============================================================================
// READER
// ============================================================================

/// Cursor-based OSC reader over a borrowed buffer
#[derive(Debug, Clone)]
pub struct OscReader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> OscReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Look at the next byte without consuming it
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    #[inline(always)]
    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(Error::TruncatedBuffer {
                needed,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn advance(&mut self, count: usize) {
        self.buf.advance(count);
        self.position += count;
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        self.position += 4;
        Ok(self.buf.get_i32())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.position += 4;
        Ok(self.buf.get_u32())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        self.position += 8;
        Ok(self.buf.get_i64())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        self.position += 8;
        Ok(self.buf.get_u64())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        self.position += 4;
        Ok(self.buf.get_f32())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        self.position += 8;
        Ok(self.buf.get_f64())
    }

    /// Read a NUL-terminated string and skip its padding.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let raw = self.read_str_bytes()?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Read a NUL-terminated string as raw bytes and skip its padding
    pub fn read_str_bytes(&mut self) -> Result<&'a [u8]> {
        let buf: &'a [u8] = self.buf;
        let len = buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::MissingTerminator)?;
        self.ensure(string_len(len))?;
        self.advance(string_len(len));
        Ok(&buf[..len])
    }

    /// Read a length-prefixed blob and skip its padding
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length()?;
        self.ensure(padded_len(len))?;
        let data = self.buf[..len].to_vec();
        self.advance(padded_len(len));
        Ok(data)
    }

    /// Read an `int32` length prefix, rejecting negative values
    pub fn read_length(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::InvalidLength(len));
        }
        Ok(len as usize)
    }

    /// Borrow the next `count` bytes unpadded
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let buf: &'a [u8] = self.buf;
        self.advance(count);
        Ok(&buf[..count])
    }
}
