//! Reference codes: traffic direction, data unit tag, and vendor (MFID).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::types::P25Error;

/// Traffic direction. Supplied by the caller from the channel context; it is
/// never derived from the burst itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Inbound signalling packet (ISP): mobile to infrastructure.
    Inbound,
    /// Outbound signalling packet (OSP): infrastructure to mobile.
    Outbound,
}

impl Direction {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Inbound => Direction::Outbound,
            Direction::Outbound => Direction::Inbound,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "ISP"),
            Direction::Outbound => write!(f, "OSP"),
        }
    }
}

impl FromStr for Direction {
    type Err = P25Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "isp" | "in" | "inbound" => Ok(Direction::Inbound),
            "osp" | "out" | "outbound" => Ok(Direction::Outbound),
            _ => Err(P25Error::UnknownDirection(s.to_string())),
        }
    }
}

/// Physical data unit that carried the block. A signalling unit spans one to
/// three bursts; all three carry the same logical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataUnitId {
    Tsbk1,
    Tsbk2,
    Tsbk3,
}

impl DataUnitId {
    /// Zero-based position of the burst within its signalling unit.
    pub fn block_index(self) -> usize {
        match self {
            DataUnitId::Tsbk1 => 0,
            DataUnitId::Tsbk2 => 1,
            DataUnitId::Tsbk3 => 2,
        }
    }
}

impl fmt::Display for DataUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TSBK{}", self.block_index() + 1)
    }
}

impl FromStr for DataUnitId {
    type Err = P25Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TSBK1" | "TSBK" => Ok(DataUnitId::Tsbk1),
            "TSBK2" => Ok(DataUnitId::Tsbk2),
            "TSBK3" => Ok(DataUnitId::Tsbk3),
            _ => Err(P25Error::UnknownDataUnit(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Vendor
// ---------------------------------------------------------------------------

/// Manufacturer ID field. `Standard` selects the baseline command set; any
/// other value may redefine the opcode space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vendor {
    Standard,
    StandardV1,
    Motorola,
    Harris,
    Tait,
    /// Raw value not in the vendor table.
    Unrecognized(u8),
}

/// Known vendor table: (raw MFID, vendor, label).
const VENDOR_TABLE: &[(u8, Vendor, &str)] = &[
    (0x00, Vendor::Standard, "STANDARD"),
    (0x01, Vendor::StandardV1, "STANDARD V1"),
    (0x90, Vendor::Motorola, "MOTOROLA"),
    (0xA4, Vendor::Harris, "HARRIS"),
    (0xD8, Vendor::Tait, "TAIT"),
];

impl Vendor {
    /// Map the 8-bit vendor field. Never fails.
    pub fn from_value(value: u8) -> Vendor {
        VENDOR_TABLE
            .iter()
            .find(|(raw, _, _)| *raw == value)
            .map(|(_, vendor, _)| *vendor)
            .unwrap_or(Vendor::Unrecognized(value))
    }

    /// Raw 8-bit value.
    pub fn value(self) -> u8 {
        match self {
            Vendor::Unrecognized(v) => v,
            known => VENDOR_TABLE
                .iter()
                .find(|(_, vendor, _)| *vendor == known)
                .map(|(raw, _, _)| *raw)
                .unwrap_or_default(),
        }
    }
}

/// Display label for a vendor.
pub fn vendor_label(vendor: Vendor) -> &'static str {
    VENDOR_TABLE
        .iter()
        .find(|(_, v, _)| *v == vendor)
        .map(|(_, _, label)| *label)
        .unwrap_or("UNKNOWN")
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Unrecognized(v) => write!(f, "UNKNOWN({v:02X})"),
            known => f.write_str(vendor_label(*known)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
