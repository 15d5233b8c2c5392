//! Burst file input for tsbk-decode.
//!
//! One burst per line, hex last, optional tags before it:
//!
//! ```text
//! [timestamp] [ISP|OSP|inbound|outbound] [TSBK1|TSBK2|TSBK3] [NAC] <24 hex digits>
//! ```
//!
//! A timestamp is any decimal number with a fractional part or longer than
//! three digits; a NAC is up to three hex digits, optionally `0x`-prefixed.

use std::fs;
use std::path::{Path, PathBuf};

use p25_core::{BinaryMessage, DataUnitId, Direction, P25Error, Result};

use crate::config::parse_nac;

/// Bits in one trunking signalling block.
pub const TSBK_BITS: usize = 96;

/// Spacing of synthesized timestamps for lines without one.
const LINE_INTERVAL: f64 = 0.001;

/// One burst parsed from a capture line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBurst {
    pub line: usize,
    pub timestamp: f64,
    pub direction: Direction,
    pub duid: DataUnitId,
    pub nac: u16,
    pub message: BinaryMessage,
}

/// Values used for tags a line leaves out.
#[derive(Debug, Clone, Copy)]
pub struct LineDefaults {
    pub direction: Direction,
    pub nac: u16,
    pub start_time: f64,
}

/// Read bursts from a capture file.
pub struct BurstReader {
    path: PathBuf,
    defaults: LineDefaults,
}

impl BurstReader {
    pub fn new(path: &Path, defaults: LineDefaults) -> Self {
        BurstReader {
            path: path.to_path_buf(),
            defaults,
        }
    }

    /// Read every line, returning parsed bursts and the lines that failed
    /// (1-based line number and error).
    pub fn read_all(&self) -> Result<(Vec<RawBurst>, Vec<(usize, P25Error)>)> {
        let content = fs::read_to_string(&self.path)?;
        let mut bursts = Vec::new();
        let mut rejected = Vec::new();

        for (index, line) in content.lines().enumerate() {
            match parse_line(line, index, &self.defaults) {
                Ok(Some(burst)) => bursts.push(burst),
                Ok(None) => {}
                Err(e) => rejected.push((index + 1, e)),
            }
        }

        Ok((bursts, rejected))
    }
}

/// Parse one capture line. Blank lines and `#` comments give `Ok(None)`.
pub fn parse_line(line: &str, index: usize, defaults: &LineDefaults) -> Result<Option<RawBurst>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(hex) = tokens.pop() else {
        return Ok(None);
    };
    let message = BinaryMessage::from_hex(hex, TSBK_BITS)?;

    let mut burst = RawBurst {
        line: index + 1,
        timestamp: defaults.start_time + index as f64 * LINE_INTERVAL,
        direction: defaults.direction,
        duid: DataUnitId::Tsbk1,
        nac: defaults.nac,
        message,
    };

    for token in tokens {
        if let Ok(direction) = token.parse::<Direction>() {
            burst.direction = direction;
        } else if let Ok(duid) = token.parse::<DataUnitId>() {
            burst.duid = duid;
        } else if let Some(nac) = nac_token(token) {
            burst.nac = nac;
        } else if let Ok(timestamp) = token.parse::<f64>() {
            burst.timestamp = timestamp;
        } else {
            return Err(P25Error::InvalidField(token.to_string()));
        }
    }

    Ok(Some(burst))
}

fn nac_token(token: &str) -> Option<u16> {
    let prefixed = token.starts_with("0x") || token.starts_with("0X");
    if prefixed || token.len() <= 3 {
        parse_nac(token)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEX: &str = "0000106410650ABC00000000";

    fn defaults() -> LineDefaults {
        LineDefaults {
            direction: Direction::Outbound,
            nac: 0x293,
            start_time: 100.0,
        }
    }

    #[test]
    fn test_parse_line_hex_only() {
        let burst = parse_line(HEX, 4, &defaults()).unwrap().unwrap();
        assert_eq!(burst.line, 5);
        assert_eq!(burst.direction, Direction::Outbound);
        assert_eq!(burst.duid, DataUnitId::Tsbk1);
        assert_eq!(burst.nac, 0x293);
        assert!((burst.timestamp - 100.004).abs() < 1e-9);
        assert_eq!(burst.message.size(), TSBK_BITS);
    }

    #[test]
    fn test_parse_line_all_fields() {
        let line = format!("1700000000.25 ISP TSBK3 0x1F3 {HEX}");
        let burst = parse_line(&line, 0, &defaults()).unwrap().unwrap();
        assert_eq!(burst.timestamp, 1700000000.25);
        assert_eq!(burst.direction, Direction::Inbound);
        assert_eq!(burst.duid, DataUnitId::Tsbk3);
        assert_eq!(burst.nac, 0x1F3);
    }

    #[test]
    fn test_parse_line_short_nac() {
        let line = format!("outbound 293 {HEX}");
        let burst = parse_line(&line, 0, &defaults()).unwrap().unwrap();
        assert_eq!(burst.nac, 0x293);
    }

    #[test]
    fn test_parse_line_skips_comments() {
        assert!(parse_line("# capture start", 0, &defaults()).unwrap().is_none());
        assert!(parse_line("   ", 0, &defaults()).unwrap().is_none());
    }

    #[test]
    fn test_parse_line_rejects_bad_hex() {
        assert!(parse_line("ZZZZ", 0, &defaults()).is_err());
        assert!(parse_line("00112233", 0, &defaults()).is_err());
    }

    #[test]
    fn test_parse_line_rejects_unknown_field() {
        let line = format!("sideways {HEX}");
        assert!(parse_line(&line, 0, &defaults()).is_err());
    }

    #[test]
    fn test_reader_collects_rejects() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# test capture").unwrap();
        writeln!(file, "OSP {HEX}").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "ISP TSBK2 {HEX}").unwrap();

        let reader = BurstReader::new(file.path(), defaults());
        let (bursts, rejected) = reader.read_all().unwrap();
        assert_eq!(bursts.len(), 2);
        assert_eq!(bursts[1].direction, Direction::Inbound);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 3);
    }
}
