//! Shared error enum and hex helpers for p25-core.

use thiserror::Error;

/// All errors produced by p25-core.
///
/// Radio-channel conditions (CRC failure, unknown opcode, unknown vendor) are
/// never errors: they are carried as data on the decoded block. These variants
/// cover input that cannot even be turned into a burst.
#[derive(Debug, Error)]
pub enum P25Error {
    #[error("invalid hex digit at offset {offset} in {text:?}")]
    InvalidHex { text: String, offset: usize },
    #[error("invalid burst length: expected {expected} bits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unrecognized direction: {0}")]
    UnknownDirection(String),
    #[error("unrecognized data unit: {0}")]
    UnknownDataUnit(String),
    #[error("unrecognized burst field: {0}")]
    InvalidField(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, P25Error>;

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive; surrounding whitespace
/// is ignored. An odd digit count is reported at the offset of the missing
/// digit.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    let digits = hex.trim().as_bytes();
    let invalid = |offset: usize| P25Error::InvalidHex {
        text: hex.trim().to_string(),
        offset,
    };
    if !digits.len().is_multiple_of(2) {
        return Err(invalid(digits.len()));
    }

    let nibble = |offset: usize| {
        (digits[offset] as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| invalid(offset))
    };
    (0..digits.len())
        .step_by(2)
        .map(|i| -> Result<u8> { Ok((nibble(i)? << 4) | nibble(i + 1)?) })
        .collect()
}

/// Encode bytes as an uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
