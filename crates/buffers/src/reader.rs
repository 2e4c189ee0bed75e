//! Binary buffer reader with cursor tracking.
//!
//! Unlike a panicking slice reader, every method returns a
//! [`BufferError`] on truncated input so that wire decoding can surface
//! malformed data to the caller instead of aborting.

use std::str;

use crate::{unzigzag, BufferError};

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader maintains a cursor position and provides methods for
/// reading fixed-width primitives, varints, and length-prefixed strings.
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of remaining bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        if self.size() < length {
            return Err(BufferError::EndOfBuffer);
        }
        self.x += length;
        Ok(())
    }

    /// Returns a subslice of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        if self.size() < size {
            return Err(BufferError::EndOfBuffer);
        }
        let x = self.x;
        self.x = x + size;
        Ok(&self.uint8[x..x + size])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        if self.x >= self.uint8.len() {
            return Err(BufferError::EndOfBuffer);
        }
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a 32-bit floating point number, little-endian.
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        let bytes = self.buf(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a 64-bit floating point number, little-endian.
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        let bytes = self.buf(8)?;
        Ok(f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Reads an unsigned LEB128 varint (at most 10 bytes).
    pub fn var_u64(&mut self) -> Result<u64, BufferError> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.u8()?;
            if shift == 63 && byte > 1 {
                return Err(BufferError::VarintOverflow);
            }
            value |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(BufferError::VarintOverflow);
            }
        }
    }

    /// Reads a zigzag varint as a signed integer.
    #[inline]
    pub fn var_i64(&mut self) -> Result<i64, BufferError> {
        Ok(unzigzag(self.var_u64()?))
    }

    /// Reads a varint-length-prefixed UTF-8 string.
    pub fn utf8(&mut self) -> Result<&'a str, BufferError> {
        let len = self.var_u64()?;
        if len > self.size() as u64 {
            return Err(BufferError::EndOfBuffer);
        }
        let bytes = self.buf(len as usize)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Reads a varint-length-prefixed byte sequence.
    pub fn bin(&mut self) -> Result<&'a [u8], BufferError> {
        let len = self.var_u64()?;
        if len > self.size() as u64 {
            return Err(BufferError::EndOfBuffer);
        }
        self.buf(len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Writer;

    #[test]
    fn reads_what_writer_wrote() {
        let mut w = Writer::new();
        w.u8(7);
        w.var_u64(16384);
        w.var_i64(-42);
        w.utf8("héllo");
        w.f64(1.5);
        let data = w.flush();

        let mut r = Reader::new(&data);
        assert_eq!(r.u8().unwrap(), 7);
        assert_eq!(r.var_u64().unwrap(), 16384);
        assert_eq!(r.var_i64().unwrap(), -42);
        assert_eq!(r.utf8().unwrap(), "héllo");
        assert_eq!(r.f64().unwrap(), 1.5);
        assert_eq!(r.size(), 0);
    }

    #[test]
    fn truncated_input_is_end_of_buffer() {
        let mut r = Reader::new(&[0x80]);
        assert_eq!(r.var_u64(), Err(BufferError::EndOfBuffer));

        let mut r = Reader::new(&[0x05, b'a', b'b']);
        assert_eq!(r.utf8(), Err(BufferError::EndOfBuffer));

        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.f32(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        // length 2, then an invalid continuation sequence
        let mut r = Reader::new(&[0x02, 0xc3, 0x28]);
        assert_eq!(r.utf8(), Err(BufferError::InvalidUtf8));
    }

    #[test]
    fn varint_wider_than_u64_is_overflow() {
        let data = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let mut r = Reader::new(&data);
        assert_eq!(r.var_u64(), Err(BufferError::VarintOverflow));
    }

    #[test]
    fn huge_length_prefix_does_not_allocate() {
        // declares u64::MAX bytes follow; must fail fast, not reserve memory
        let mut w = Writer::new();
        w.var_u64(u64::MAX);
        let data = w.flush();
        let mut r = Reader::new(&data);
        assert_eq!(r.bin(), Err(BufferError::EndOfBuffer));
    }
}
