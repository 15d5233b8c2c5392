//! p25-core: Pure decode library for APCO-25 trunking signalling blocks.
//!
//! No async, no I/O, no logging. Callers hand in a 96-bit burst plus the
//! channel direction and get back a [`Tsbk`] with its CRC status, header
//! fields, decoded body, and ordered identifiers.

pub mod bits;
pub mod crc;
pub mod identifier;
pub mod opcode;
pub mod reference;
pub mod tsbk;
pub mod types;

// Re-export commonly used types at crate root
pub use bits::BinaryMessage;
pub use identifier::{Channel, Form, Identifier, NodeAddress, Role, Value};
pub use opcode::{opcode_label, Opcode};
pub use reference::{vendor_label, DataUnitId, Direction, Vendor};
pub use tsbk::factory::create;
pub use tsbk::{Body, Tsbk, TsbkBody, VerifiedBurst};
pub use types::*;
