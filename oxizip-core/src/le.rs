//! Fixed little-endian field writer and reader.
//!
//! ZIP records are sequences of little-endian integers and raw byte runs.
//! Instead of poking values at hand-computed offsets, headers are written
//! and read field by field in declaration order, so every offset follows
//! from the sizes of the fields before it. Byte order is explicit and does
//! not depend on the host.
//!
//! ```rust
//! use oxizip_core::le::{LeReader, LeWriter};
//!
//! let mut w = LeWriter::new();
//! w.put_u32(0x04034B50);
//! w.put_u16(99);
//! let bytes = w.into_inner();
//! assert_eq!(bytes, [0x50, 0x4B, 0x03, 0x04, 99, 0]);
//!
//! let mut r = LeReader::new(&bytes);
//! r.expect_u32(0x04034B50, "signature").unwrap();
//! assert_eq!(r.u16().unwrap(), 99);
//! ```

use crate::error::{OxiZipError, Result};

/// Appends little-endian fields to a growable buffer.
#[derive(Debug, Default, Clone)]
pub struct LeWriter {
    buf: Vec<u8>,
}

impl LeWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a single byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a 16-bit little-endian integer.
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a 32-bit little-endian integer.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes written so far, i.e. the offset of the next field.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Consume the writer and return the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads little-endian fields from a byte slice.
///
/// Every failure is a [`OxiZipError::BadFormat`] carrying the absolute
/// offset of the field that could not be read or did not match.
#[derive(Debug, Clone)]
pub struct LeReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LeReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read `len` raw bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(OxiZipError::bad_format(
                self.pos,
                format!(
                    "unexpected end of data: need {} bytes, have {}",
                    len,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Read a 16-bit little-endian integer.
    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Read a 32-bit little-endian integer.
    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Read a byte and require it to equal `expected`.
    pub fn expect_u8(&mut self, expected: u8, field: &str) -> Result<()> {
        let offset = self.pos;
        let found = self.u8()?;
        check(offset, field, u32::from(expected), u32::from(found))
    }

    /// Read a 16-bit integer and require it to equal `expected`.
    pub fn expect_u16(&mut self, expected: u16, field: &str) -> Result<()> {
        let offset = self.pos;
        let found = self.u16()?;
        check(offset, field, u32::from(expected), u32::from(found))
    }

    /// Read a 32-bit integer and require it to equal `expected`.
    pub fn expect_u32(&mut self, expected: u32, field: &str) -> Result<()> {
        let offset = self.pos;
        let found = self.u32()?;
        check(offset, field, expected, found)
    }
}

fn check(offset: usize, field: &str, expected: u32, found: u32) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(OxiZipError::bad_format(
            offset,
            format!("{field}: expected {expected:#x}, found {found:#x}"),
        ))
    }
}
