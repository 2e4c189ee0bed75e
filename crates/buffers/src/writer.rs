//! Binary buffer writer with an auto-growing backing array.

use crate::zigzag;

/// A binary buffer writer that appends data to an auto-growing byte buffer.
///
/// The writer maintains a cursor position `x` into its backing array and
/// grows the array on demand. `flush()` returns the written prefix and
/// leaves the writer ready for reuse after `reset()`.
pub struct Writer {
    /// The backing byte array.
    pub uint8: Vec<u8>,
    /// Current cursor position.
    pub x: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a writer with a small default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a writer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: vec![0; capacity],
            x: 0,
        }
    }

    /// Resets the cursor to the start of the buffer.
    pub fn reset(&mut self) {
        self.x = 0;
    }

    /// Returns the written bytes and resets the writer.
    pub fn flush(&mut self) -> Vec<u8> {
        let out = self.uint8[..self.x].to_vec();
        self.x = 0;
        out
    }

    /// Ensures at least `capacity` more bytes can be written without growth checks.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let needed = self.x + capacity;
        if needed > self.uint8.len() {
            let new_len = needed.max(self.uint8.len() * 2);
            self.uint8.resize(new_len, 0);
        }
    }

    /// Writes a single byte.
    #[inline]
    pub fn u8(&mut self, byte: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = byte;
        self.x += 1;
    }

    /// Writes a 32-bit float, little-endian.
    #[inline]
    pub fn f32(&mut self, value: f32) {
        self.buf(&value.to_le_bytes());
    }

    /// Writes a 64-bit float, little-endian.
    #[inline]
    pub fn f64(&mut self, value: f64) {
        self.buf(&value.to_le_bytes());
    }

    /// Writes raw bytes.
    #[inline]
    pub fn buf(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.uint8[self.x..self.x + bytes.len()].copy_from_slice(bytes);
        self.x += bytes.len();
    }

    /// Writes an unsigned LEB128 varint (at most 10 bytes).
    pub fn var_u64(&mut self, mut value: u64) {
        self.ensure_capacity(10);
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.uint8[self.x] = byte;
                self.x += 1;
                return;
            }
            self.uint8[self.x] = byte | 0x80;
            self.x += 1;
        }
    }

    /// Writes a signed integer as a zigzag varint.
    #[inline]
    pub fn var_i64(&mut self, value: i64) {
        self.var_u64(zigzag(value));
    }

    /// Writes a string as varint byte length followed by UTF-8 bytes.
    pub fn utf8(&mut self, s: &str) {
        self.var_u64(s.len() as u64);
        self.buf(s.as_bytes());
    }

    /// Writes a byte sequence as varint length followed by the raw bytes.
    pub fn bin(&mut self, bytes: &[u8]) {
        self.var_u64(bytes.len() as u64);
        self.buf(bytes);
    }
}
