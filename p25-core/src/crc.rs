//! CRC-CCITT protection for 80-bit trunking signalling blocks.
//!
//! Generator: x^16 + x^12 + x^5 + 1 (0x1021), initial value 0, checksum
//! inverted before transmission. The 16 checksum bits follow the 80 protected
//! bits directly.
//!
//! CRC-CCITT has minimum distance 4 at this length, so every single-bit error
//! has a unique syndrome and no double-bit error shares one: one error can be
//! corrected while two are still detected.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::bits::BinaryMessage;

const GENERATOR: u16 = 0x1021;
const FINAL_XOR: u16 = 0xFFFF;

/// Protected bits per block.
pub const PROTECTED_BITS: usize = 80;
/// Checksum bits following the protected range.
pub const CHECKSUM_BITS: usize = 16;

/// Result of [`correct_ccitt80`] for a block with an error it cannot fix.
pub const UNCORRECTABLE: usize = 2;

// ---------------------------------------------------------------------------
// Core CRC functions
// ---------------------------------------------------------------------------

/// Bitwise polynomial division of `len` bits starting at `start`.
fn crc_bits(message: &BinaryMessage, start: usize, len: usize) -> u16 {
    let mut crc = 0u16;
    for index in start..start + len {
        let feedback = (crc >> 15) ^ message.get(index) as u16;
        crc <<= 1;
        if feedback & 1 == 1 {
            crc ^= GENERATOR;
        }
    }
    crc
}

/// Checksum the transmitter would send for the 80 bits at `start`.
pub fn ccitt80(message: &BinaryMessage, start: usize) -> u16 {
    crc_bits(message, start, PROTECTED_BITS) ^ FINAL_XOR
}

/// Checksum carried in the message after the 80 bits at `start`.
pub fn transmitted_checksum(message: &BinaryMessage, start: usize) -> u16 {
    let from = start + PROTECTED_BITS;
    message.get_int(from..from + CHECKSUM_BITS) as u16
}

/// Syndrome of the block: 0 when the checksum matches.
pub fn syndrome(message: &BinaryMessage, start: usize) -> u16 {
    ccitt80(message, start) ^ transmitted_checksum(message, start)
}

/// True if the block at `start` passes the CRC without correction.
pub fn validate_ccitt80(message: &BinaryMessage, start: usize) -> bool {
    syndrome(message, start) == 0
}

/// Overwrite the checksum field with the correct value for the current bits.
pub fn apply_ccitt80(message: &mut BinaryMessage, start: usize) {
    let checksum = ccitt80(message, start);
    let from = start + PROTECTED_BITS;
    message.set_int(from..from + CHECKSUM_BITS, checksum as u64);
}

// ---------------------------------------------------------------------------
// Syndrome table for error correction
// ---------------------------------------------------------------------------

/// Maps the syndrome of every single-bit error to the offset of that bit
/// within the 96-bit block (protected bits and checksum).
fn build_syndrome_table() -> HashMap<u16, usize> {
    let mut table = HashMap::with_capacity(PROTECTED_BITS + CHECKSUM_BITS);

    for bit in 0..PROTECTED_BITS {
        let mut msg = BinaryMessage::new(PROTECTED_BITS);
        msg.set(bit, true);
        table.insert(crc_bits(&msg, 0, PROTECTED_BITS), bit);
    }

    for bit in 0..CHECKSUM_BITS {
        table.insert(0x8000 >> bit, PROTECTED_BITS + bit);
    }

    table
}

static SYNDROME_TABLE: LazyLock<HashMap<u16, usize>> = LazyLock::new(build_syndrome_table);

/// Detect and correct bit errors in the 96-bit block at `start`.
///
/// Returns the error count: 0 for a clean block, 1 when a single bit error
/// was found and flipped back in place, [`UNCORRECTABLE`] when the syndrome
/// matches no single-bit pattern. The message is only modified when the
/// correction is verified.
pub fn correct_ccitt80(message: &mut BinaryMessage, start: usize) -> usize {
    let syndrome = syndrome(message, start);
    if syndrome == 0 {
        return 0;
    }

    let Some(&offset) = SYNDROME_TABLE.get(&syndrome) else {
        return UNCORRECTABLE;
    };

    message.flip(start + offset);

    if !validate_ccitt80(message, start) {
        message.flip(start + offset);
        return UNCORRECTABLE;
    }

    1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> BinaryMessage {
        let mut msg = BinaryMessage::new(96);
        msg.set_int(0..8, 0x80);
        msg.set_int(16..80, 0x0012_3456_0789_ABCD);
        apply_ccitt80(&mut msg, 0);
        msg
    }

    #[test]
    fn test_crc_check_value() {
        // CRC-16/XMODEM check value (same polynomial, no inversion)
        let msg = BinaryMessage::from_bytes(b"123456789");
        assert_eq!(crc_bits(&msg, 0, 72), 0x31C3);
    }

    #[test]
    fn test_all_zero_block_checksum() {
        let msg = BinaryMessage::new(96);
        assert_eq!(ccitt80(&msg, 0), 0xFFFF);
        assert!(!validate_ccitt80(&msg, 0));
    }

    #[test]
    fn test_apply_then_validate() {
        let msg = sample_block();
        assert!(validate_ccitt80(&msg, 0));
        assert_eq!(syndrome(&msg, 0), 0);
    }

    #[test]
    fn test_syndrome_table_unique() {
        // every single-bit error position has its own syndrome
        assert_eq!(SYNDROME_TABLE.len(), PROTECTED_BITS + CHECKSUM_BITS);
        assert!(!SYNDROME_TABLE.contains_key(&0));
    }

    #[test]
    fn test_correct_clean() {
        let mut msg = sample_block();
        assert_eq!(correct_ccitt80(&mut msg, 0), 0);
        assert_eq!(msg, sample_block());
    }

    #[test]
    fn test_correct_every_single_bit_error() {
        let original = sample_block();
        for bit in 0..96 {
            let mut msg = original.clone();
            msg.flip(bit);
            assert_eq!(correct_ccitt80(&mut msg, 0), 1, "bit {bit}");
            assert_eq!(msg, original, "bit {bit} not restored");
        }
    }

    #[test]
    fn test_double_bit_errors_detected() {
        let original = sample_block();
        for a in 0..96 {
            for b in a + 1..96 {
                let mut msg = original.clone();
                msg.flip(a);
                msg.flip(b);
                let corrupted = msg.clone();
                assert_eq!(correct_ccitt80(&mut msg, 0), UNCORRECTABLE, "bits {a},{b}");
                assert_eq!(msg, corrupted, "bits {a},{b}: uncorrectable block changed");
            }
        }
    }

    #[test]
    fn test_correct_with_offset() {
        let mut msg = BinaryMessage::new(112);
        msg.set_int(16..24, 0xA5);
        apply_ccitt80(&mut msg, 16);
        let original = msg.clone();
        msg.flip(50);
        assert_eq!(correct_ccitt80(&mut msg, 16), 1);
        assert_eq!(msg, original);
    }
}
