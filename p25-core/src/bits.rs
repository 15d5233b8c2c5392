//! Bit-addressable message buffer.
//!
//! Bit 0 is the most significant bit of the first byte, which is the order
//! bits come off the air. Reads past the end of the buffer return zero rather
//! than panicking: a short burst decodes to well-typed garbage and is caught
//! by the CRC gate, never by a crash in the decode loop.

use std::ops::Range;

use crate::types::{hex_decode, hex_encode, P25Error, Result};

/// A fixed-length sequence of bits backed by bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryMessage {
    bytes: Vec<u8>,
    size: usize,
}

impl BinaryMessage {
    /// All-zero message of `size` bits.
    pub fn new(size: usize) -> Self {
        BinaryMessage {
            bytes: vec![0; size.div_ceil(8)],
            size,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        BinaryMessage {
            bytes: bytes.to_vec(),
            size: bytes.len() * 8,
        }
    }

    /// Parse a hex string, requiring exactly `expected_bits` bits.
    pub fn from_hex(hex: &str, expected_bits: usize) -> Result<Self> {
        let bytes = hex_decode(hex)?;
        if bytes.len() * 8 != expected_bits {
            return Err(P25Error::InvalidLength {
                expected: expected_bits,
                actual: bytes.len() * 8,
            });
        }
        Ok(BinaryMessage::from_bytes(&bytes))
    }

    /// Length in bits.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.bytes)
    }

    pub fn get(&self, index: usize) -> bool {
        if index >= self.size {
            return false;
        }
        self.bytes[index / 8] & (0x80 >> (index % 8)) != 0
    }

    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.size {
            return;
        }
        let mask = 0x80 >> (index % 8);
        if value {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
    }

    pub fn flip(&mut self, index: usize) {
        if index < self.size {
            self.bytes[index / 8] ^= 0x80 >> (index % 8);
        }
    }

    /// Unsigned value of the bits in `range`, MSB first. At most 32 bits wide.
    pub fn get_int(&self, range: Range<usize>) -> u32 {
        debug_assert!(range.len() <= 32);
        self.get_long(range) as u32
    }

    /// Unsigned value of the bits in `range`, MSB first. At most 64 bits wide.
    pub fn get_long(&self, range: Range<usize>) -> u64 {
        debug_assert!(range.len() <= 64);
        range.fold(0u64, |acc, index| (acc << 1) | self.get(index) as u64)
    }

    /// Unsigned value assembled from an ordered list of bit positions.
    pub fn get_int_positions(&self, positions: &[usize]) -> u32 {
        positions
            .iter()
            .fold(0u32, |acc, &index| (acc << 1) | self.get(index) as u32)
    }

    /// Write the low `range.len()` bits of `value` into `range`, MSB first.
    pub fn set_int(&mut self, range: Range<usize>, value: u64) {
        let width = range.len();
        for (offset, index) in range.enumerate() {
            let shift = width - 1 - offset;
            self.set(index, (value >> shift) & 1 == 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_msb_first() {
        let msg = BinaryMessage::from_bytes(&[0b1010_0000, 0x01]);
        assert!(msg.get(0));
        assert!(!msg.get(1));
        assert!(msg.get(2));
        assert!(msg.get(15));
        assert_eq!(msg.size(), 16);
    }

    #[test]
    fn test_get_int_across_bytes() {
        // 0000_1010 0100_0101 -> bits 5..16 = 0x245
        let msg = BinaryMessage::from_bytes(&[0x0A, 0x45]);
        assert_eq!(msg.get_int(5..16), 0x245);
        assert_eq!(msg.get_int(0..8), 0x0A);
    }

    #[test]
    fn test_get_int_positions() {
        let msg = BinaryMessage::from_bytes(&[0b1100_0000]);
        assert_eq!(msg.get_int_positions(&[0, 1, 2]), 0b110);
        assert_eq!(msg.get_int_positions(&[2, 0]), 0b01);
    }

    #[test]
    fn test_set_int_then_read() {
        let mut msg = BinaryMessage::new(96);
        msg.set_int(56..80, 0xABCDEF);
        msg.set_int(2..8, 0x3C);
        assert_eq!(msg.get_int(56..80), 0xABCDEF);
        assert_eq!(msg.get_int(2..8), 0x3C);
        assert_eq!(msg.get_int(8..16), 0);
    }

    #[test]
    fn test_flip() {
        let mut msg = BinaryMessage::new(16);
        msg.flip(9);
        assert!(msg.get(9));
        assert_eq!(msg.as_bytes(), &[0x00, 0x40]);
        msg.flip(9);
        assert!(!msg.get(9));
    }

    #[test]
    fn test_out_of_range_reads_zero() {
        let mut msg = BinaryMessage::from_bytes(&[0xFF]);
        assert!(!msg.get(8));
        assert_eq!(msg.get_int(4..12), 0xF0);
        msg.set(100, true);
        msg.flip(100);
        assert_eq!(msg.size(), 8);
    }

    #[test]
    fn test_from_hex() {
        let msg = BinaryMessage::from_hex("80000000000000000000ABCD", 96).unwrap();
        assert!(msg.get(0));
        assert_eq!(msg.get_int(80..96), 0xABCD);
        assert_eq!(msg.to_hex(), "80000000000000000000ABCD");
    }

    #[test]
    fn test_from_hex_wrong_length() {
        let err = BinaryMessage::from_hex("8000", 96).unwrap_err();
        assert!(matches!(
            err,
            P25Error::InvalidLength {
                expected: 96,
                actual: 16
            }
        ));
        assert!(matches!(
            BinaryMessage::from_hex("80X0", 16),
            Err(P25Error::InvalidHex { offset: 2, .. })
        ));
    }
}
