//! Bit-level reading and writing for packed Huffman code streams.
//!
//! Bits are packed MSB-first: the first bit written lands in bit 7 of the
//! first byte. The final partial byte is zero-padded; callers track the
//! valid bit count separately.

/// Accumulates individual bits into a byte buffer, MSB-first.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Total bits written so far.
    bit_len: u64,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with capacity for roughly `bits` bits.
    pub fn with_capacity(bits: u64) -> Self {
        Self {
            buf: Vec::with_capacity(usize::try_from(bits.div_ceil(8)).unwrap_or(0)),
            bit_len: 0,
        }
    }

    /// Append a single bit. Any nonzero value is treated as a one bit.
    pub fn push_bit(&mut self, bit: u8) {
        let offset = (self.bit_len % 8) as u8;
        if offset == 0 {
            self.buf.push(0);
        }
        if bit != 0 {
            // Safe index: the byte was pushed above when offset wrapped.
            let last = self.buf.len() - 1;
            self.buf[last] |= 1 << (7 - offset);
        }
        self.bit_len += 1;
    }

    /// Append every bit of a code, in order.
    pub fn push_code(&mut self, code: &[u8]) {
        for &bit in code {
            self.push_bit(bit);
        }
    }

    /// Number of bits written.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Consume the writer, returning the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads individual bits from a byte slice, MSB-first.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Next bit position to read.
    pos: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read the next bit, or `None` when the buffer is exhausted.
    pub fn next_bit(&mut self) -> Option<u8> {
        let byte_index = usize::try_from(self.pos / 8).ok()?;
        if byte_index >= self.data.len() {
            return None;
        }
        let offset = (self.pos % 8) as u8;
        self.pos += 1;
        Some((self.data[byte_index] >> (7 - offset)) & 1)
    }

    /// Bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_packs_msb_first() {
        let mut w = BitWriter::new();
        // 1010_0000
        w.push_bit(1);
        w.push_bit(0);
        w.push_bit(1);
        assert_eq!(w.bit_len(), 3);
        assert_eq!(w.into_bytes(), vec![0b1010_0000]);
    }

    #[test]
    fn test_writer_spans_byte_boundary() {
        let mut w = BitWriter::new();
        for _ in 0..9 {
            w.push_bit(1);
        }
        assert_eq!(w.bit_len(), 9);
        assert_eq!(w.into_bytes(), vec![0xff, 0b1000_0000]);
    }

    #[test]
    fn test_reader_roundtrip() {
        let bits = [1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1];
        let mut w = BitWriter::new();
        w.push_code(&bits);
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        for &expected in &bits {
            assert_eq!(r.next_bit(), Some(expected));
        }
        assert_eq!(r.bits_read(), bits.len() as u64);
    }

    #[test]
    fn test_reader_exhaustion() {
        let mut r = BitReader::new(&[0xff]);
        for _ in 0..8 {
            assert!(r.next_bit().is_some());
        }
        assert_eq!(r.next_bit(), None);
    }
}
