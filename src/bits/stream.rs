//! Bit-level cursor and builder shared by segment encoding and decoding.

/// Append-only bit sequence builder, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u32, count: usize) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Bits written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Consume the writer and return the bit sequence.
    pub fn into_bits(self) -> Vec<bool> {
        self.bits
    }
}

/// Forward-only cursor over a bit sequence with save/restore support.
#[derive(Debug)]
pub struct BitReader<'a> {
    bits: &'a [bool],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader at the start of `bits`.
    pub fn new(bits: &'a [bool]) -> Self {
        Self { bits, pos: 0 }
    }

    /// Bits left to read.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying sequence.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when the underlying sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Move the cursor to an absolute position (used to rewind to the
    /// start of a terminator once one is recognized).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.bits.len());
    }

    /// Read `count` bits as a big-endian value, or `None` when fewer
    /// remain. The cursor does not move on failure.
    pub fn read_bits(&mut self, count: usize) -> Option<u32> {
        debug_assert!(count <= 32);
        if self.remaining() < count {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.bits[self.pos] as u32;
            self.pos += 1;
        }
        Some(value)
    }
}

/// Pack a bit sequence into codewords, most significant bit first.
/// A trailing partial byte (remainder bits) is dropped.
pub fn bits_to_codewords(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect()
}

/// Unpack codewords into a bit sequence, most significant bit first.
pub fn codewords_to_bits(codewords: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(codewords.len() * 8);
    for &byte in codewords {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_msb_first() {
        let mut w = BitWriter::new();
        w.push_bits(0b101, 3);
        w.push_bits(0b01, 2);
        assert_eq!(w.into_bits(), vec![true, false, true, false, true]);
    }

    #[test]
    fn test_reader_reads_what_writer_wrote() {
        let mut w = BitWriter::new();
        w.push_bits(0b0001, 4);
        w.push_bits(123, 10);
        let bits = w.into_bits();

        let mut r = BitReader::new(&bits);
        assert_eq!(r.read_bits(4), Some(1));
        assert_eq!(r.read_bits(10), Some(123));
        assert_eq!(r.remaining(), 0);
        assert_eq!(r.read_bits(1), None);
    }

    #[test]
    fn test_reader_seek() {
        let bits = vec![true, false, true, true];
        let mut r = BitReader::new(&bits);
        r.read_bits(3);
        r.seek(1);
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_bits(3), Some(0b011));
    }

    #[test]
    fn test_failed_read_does_not_advance() {
        let bits = vec![true, true];
        let mut r = BitReader::new(&bits);
        assert_eq!(r.read_bits(5), None);
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_bits(2), Some(0b11));
    }

    #[test]
    fn test_codeword_packing() {
        let bits = codewords_to_bits(&[0x40, 0xE5]);
        assert_eq!(bits_to_codewords(&bits), vec![0x40, 0xE5]);

        // Remainder bits are dropped.
        let mut with_tail = bits.clone();
        with_tail.extend([true, false, true]);
        assert_eq!(bits_to_codewords(&with_tail), vec![0x40, 0xE5]);
    }
}
