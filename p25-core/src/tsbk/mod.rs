//! Trunking signalling block (TSBK) envelope.
//!
//! A TSBK is 96 bits: a 16-bit header (last-block flag, encryption flag,
//! opcode, vendor), 64 argument bits, and a 16-bit CRC-CCITT. Building one is
//! a two-stage process: [`VerifiedBurst::verify`] runs error correction over
//! the raw bits exactly once, then the dispatcher in [`factory`] decodes the
//! corrected bits into a [`Body`]. Everything after verification is read-only.

pub mod factory;
pub mod isp;
pub mod layout;
pub mod osp;

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::bits::BinaryMessage;
use crate::crc;
use crate::identifier::Identifier;
use crate::opcode::{opcode_label, Opcode};
use crate::reference::{vendor_label, DataUnitId, Direction, Vendor};

use layout::{
    ChannelUnitPair, ChannelUpdates, ExplicitGroupGrant, GroupGrant, ServiceUnitPair,
    StatusExchange, UnitPair,
};

pub const LAST_BLOCK_FLAG: usize = 0;
pub const ENCRYPTION_FLAG: usize = 1;
pub const OPCODE: Range<usize> = 2..8;
pub const VENDOR: Range<usize> = 8..16;
pub const ARGUMENTS: Range<usize> = 16..80;

/// Stub shown for a block whose CRC could not be repaired.
pub const CRC_FAILED: &str = "**CRC-FAILED**";

/// Most bit errors a valid block may have had corrected.
const MAX_CORRECTED: usize = 1;

/// Behaviour shared by every decoded message body.
pub trait TsbkBody: fmt::Display {
    /// Identifiers in a fixed order: source before target, then channel and
    /// payload identifiers. Position follows the identifier's role, not its
    /// offset in the argument bits.
    fn identifiers(&self) -> Vec<Identifier>;
}

// ---------------------------------------------------------------------------
// Header fields
// ---------------------------------------------------------------------------

pub fn read_last_block(message: &BinaryMessage) -> bool {
    message.get(LAST_BLOCK_FLAG)
}

pub fn read_encrypted(message: &BinaryMessage) -> bool {
    message.get(ENCRYPTION_FLAG)
}

pub fn read_vendor(message: &BinaryMessage) -> Vendor {
    Vendor::from_value(message.get_int(VENDOR) as u8)
}

/// Raw 6-bit opcode field.
pub fn read_opcode_value(message: &BinaryMessage) -> u8 {
    message.get_int(OPCODE) as u8
}

/// Opcode resolved in the given direction. Unassigned codes resolve to the
/// direction's unknown sentinel.
pub fn read_opcode(message: &BinaryMessage, direction: Direction) -> Opcode {
    Opcode::from_value(read_opcode_value(message), direction)
}

// ---------------------------------------------------------------------------
// Verified burst
// ---------------------------------------------------------------------------

/// A received burst after error correction. The corrected bits never change
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedBurst {
    duid: DataUnitId,
    #[serde(skip)]
    message: BinaryMessage,
    nac: u16,
    timestamp: f64,
    corrected_bits: usize,
}

impl VerifiedBurst {
    /// Run CRC error correction over the first 80 bits and record the outcome:
    /// 0 for a clean block, 1 for a single repaired bit, 2 when the block
    /// could not be repaired.
    pub fn verify(duid: DataUnitId, mut message: BinaryMessage, nac: u16, timestamp: f64) -> Self {
        let corrected_bits = crc::correct_ccitt80(&mut message, 0);
        VerifiedBurst {
            duid,
            message,
            nac,
            timestamp,
            corrected_bits,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.corrected_bits <= MAX_CORRECTED
    }

    pub fn corrected_bits(&self) -> usize {
        self.corrected_bits
    }

    pub fn message(&self) -> &BinaryMessage {
        &self.message
    }

    pub fn duid(&self) -> DataUnitId {
        self.duid
    }

    pub fn nac(&self) -> u16 {
        self.nac
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

// ---------------------------------------------------------------------------
// Message bodies
// ---------------------------------------------------------------------------

/// Body of a block whose encryption flag is set. The resolved opcode is kept
/// so the message stays identifiable; the arguments are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedPayload {
    pub opcode: Opcode,
    pub arguments: u64,
}

impl TsbkBody for EncryptedPayload {
    fn identifiers(&self) -> Vec<Identifier> {
        Vec::new()
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PAYLOAD:{:016X}", self.arguments)
    }
}

/// Body of a block with an opcode that has no decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownMessage {
    pub opcode: u8,
    pub arguments: u64,
}

impl TsbkBody for UnknownMessage {
    fn identifiers(&self) -> Vec<Identifier> {
        Vec::new()
    }
}

impl fmt::Display for UnknownMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OPCODE:{:02X} ARGS:{:016X}", self.opcode, self.arguments)
    }
}

/// Decoded contents of a TSBK, one variant per (direction, opcode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "message", content = "fields", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Body {
    // Inbound
    GroupVoiceServiceRequest(isp::GroupServiceRequest),
    UnitToUnitVoiceServiceRequest(ServiceUnitPair),
    UnitToUnitAnswerResponse(isp::UnitToUnitAnswerResponse),
    TelephoneInterconnectPstnRequest(isp::PstnRequest),
    TelephoneInterconnectAnswerResponse(isp::TelephoneAnswerResponse),
    IndividualDataServiceRequest(ServiceUnitPair),
    StatusUpdateRequest(StatusExchange),
    StatusQueryResponse(StatusExchange),
    StatusQueryRequest(UnitPair),
    MessageUpdateRequest(isp::MessageUpdate),
    RadioUnitMonitorRequest(isp::RadioUnitMonitorRequest),
    CallAlertRequest(UnitPair),
    UnitAcknowledgeResponse(isp::UnitAcknowledge),
    CancelServiceRequest(isp::CancelServiceRequest),
    ExtendedFunctionResponse(isp::ExtendedFunctionResponse),
    EmergencyAlarmRequest(isp::EmergencyAlarmRequest),
    GroupAffiliationRequest(isp::GroupAffiliationRequest),
    GroupAffiliationQueryResponse(isp::GroupAffiliationQueryResponse),
    UnitDeRegistrationRequest(isp::NodeRequest),
    UnitRegistrationRequest(isp::UnitRegistrationRequest),
    LocationRegistrationRequest(isp::LocationRegistrationRequest),
    ProtectionParameterRequest(isp::ProtectionParameterRequest),
    IdentifierUpdateRequest(isp::IdentifierUpdateRequest),
    RoamingAddressRequest(isp::NodeRequest),
    RoamingAddressResponse(isp::RoamingAddressResponse),
    AuthenticationQuery(UnitPair),

    // Outbound
    GroupVoiceChannelGrant(GroupGrant),
    GroupVoiceChannelGrantUpdate(ChannelUpdates),
    GroupVoiceChannelGrantUpdateExplicit(ExplicitGroupGrant),
    UnitToUnitVoiceChannelGrant(ChannelUnitPair),
    UnitToUnitAnswerRequest(ServiceUnitPair),
    UnitToUnitVoiceChannelGrantUpdate(ChannelUnitPair),
    TelephoneInterconnectVoiceChannelGrant(osp::TelephoneGrant),
    TelephoneInterconnectVoiceChannelGrantUpdate(osp::TelephoneGrant),
    TelephoneInterconnectAnswerRequest(osp::TelephoneAnswerRequest),
    IndividualDataChannelGrant(ChannelUnitPair),
    GroupDataChannelGrant(GroupGrant),
    GroupDataChannelAnnouncement(ChannelUpdates),
    GroupDataChannelAnnouncementExplicit(ExplicitGroupGrant),
    CallAlert(UnitPair),
    AcknowledgeResponse(osp::AcknowledgeResponse),
    ExtendedFunctionCommand(osp::ExtendedFunctionCommand),
    DenyResponse(osp::DenyResponse),
    GroupAffiliationResponse(osp::GroupAffiliationResponse),
    GroupAffiliationQuery(UnitPair),
    AuthenticationCommand(osp::AuthenticationCommand),
    AdjacentStatusBroadcast(osp::AdjacentStatusBroadcast),

    // Fallbacks
    EncryptedInbound(EncryptedPayload),
    EncryptedOutbound(EncryptedPayload),
    UnknownInbound(UnknownMessage),
    UnknownOutbound(UnknownMessage),
}

impl Body {
    fn as_body(&self) -> &dyn TsbkBody {
        match self {
            Body::GroupVoiceServiceRequest(b) => b,
            Body::UnitToUnitVoiceServiceRequest(b) => b,
            Body::UnitToUnitAnswerResponse(b) => b,
            Body::TelephoneInterconnectPstnRequest(b) => b,
            Body::TelephoneInterconnectAnswerResponse(b) => b,
            Body::IndividualDataServiceRequest(b) => b,
            Body::StatusUpdateRequest(b) => b,
            Body::StatusQueryResponse(b) => b,
            Body::StatusQueryRequest(b) => b,
            Body::MessageUpdateRequest(b) => b,
            Body::RadioUnitMonitorRequest(b) => b,
            Body::CallAlertRequest(b) => b,
            Body::UnitAcknowledgeResponse(b) => b,
            Body::CancelServiceRequest(b) => b,
            Body::ExtendedFunctionResponse(b) => b,
            Body::EmergencyAlarmRequest(b) => b,
            Body::GroupAffiliationRequest(b) => b,
            Body::GroupAffiliationQueryResponse(b) => b,
            Body::UnitDeRegistrationRequest(b) => b,
            Body::UnitRegistrationRequest(b) => b,
            Body::LocationRegistrationRequest(b) => b,
            Body::ProtectionParameterRequest(b) => b,
            Body::IdentifierUpdateRequest(b) => b,
            Body::RoamingAddressRequest(b) => b,
            Body::RoamingAddressResponse(b) => b,
            Body::AuthenticationQuery(b) => b,
            Body::GroupVoiceChannelGrant(b) => b,
            Body::GroupVoiceChannelGrantUpdate(b) => b,
            Body::GroupVoiceChannelGrantUpdateExplicit(b) => b,
            Body::UnitToUnitVoiceChannelGrant(b) => b,
            Body::UnitToUnitAnswerRequest(b) => b,
            Body::UnitToUnitVoiceChannelGrantUpdate(b) => b,
            Body::TelephoneInterconnectVoiceChannelGrant(b) => b,
            Body::TelephoneInterconnectVoiceChannelGrantUpdate(b) => b,
            Body::TelephoneInterconnectAnswerRequest(b) => b,
            Body::IndividualDataChannelGrant(b) => b,
            Body::GroupDataChannelGrant(b) => b,
            Body::GroupDataChannelAnnouncement(b) => b,
            Body::GroupDataChannelAnnouncementExplicit(b) => b,
            Body::CallAlert(b) => b,
            Body::AcknowledgeResponse(b) => b,
            Body::ExtendedFunctionCommand(b) => b,
            Body::DenyResponse(b) => b,
            Body::GroupAffiliationResponse(b) => b,
            Body::GroupAffiliationQuery(b) => b,
            Body::AuthenticationCommand(b) => b,
            Body::AdjacentStatusBroadcast(b) => b,
            Body::EncryptedInbound(b) => b,
            Body::EncryptedOutbound(b) => b,
            Body::UnknownInbound(b) => b,
            Body::UnknownOutbound(b) => b,
        }
    }

    pub fn identifiers(&self) -> Vec<Identifier> {
        self.as_body().identifiers()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Body::UnknownInbound(_) | Body::UnknownOutbound(_))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Body::EncryptedInbound(_) | Body::EncryptedOutbound(_))
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_body(), f)
    }
}

// ---------------------------------------------------------------------------
// Tsbk
// ---------------------------------------------------------------------------

/// A decoded trunking signalling block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tsbk {
    #[serde(flatten)]
    burst: VerifiedBurst,
    direction: Direction,
    body: Body,
}

impl Tsbk {
    pub(crate) fn new(burst: VerifiedBurst, direction: Direction, body: Body) -> Self {
        Tsbk {
            burst,
            direction,
            body,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.burst.is_valid()
    }

    /// Bit errors repaired during verification (2 means unrepairable).
    pub fn corrected_bits(&self) -> usize {
        self.burst.corrected_bits()
    }

    pub fn is_last_block(&self) -> bool {
        read_last_block(self.message())
    }

    pub fn is_encrypted(&self) -> bool {
        read_encrypted(self.message())
    }

    pub fn vendor(&self) -> Vendor {
        read_vendor(self.message())
    }

    pub fn opcode(&self) -> Opcode {
        read_opcode(self.message(), self.direction)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn duid(&self) -> DataUnitId {
        self.burst.duid()
    }

    pub fn nac(&self) -> u16 {
        self.burst.nac()
    }

    pub fn timestamp(&self) -> f64 {
        self.burst.timestamp()
    }

    /// Corrected 96-bit message.
    pub fn message(&self) -> &BinaryMessage {
        self.burst.message()
    }

    /// The 64 argument bits between the header and the CRC.
    pub fn arguments(&self) -> u64 {
        self.message().get_long(ARGUMENTS)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn identifiers(&self) -> Vec<Identifier> {
        self.body.identifiers()
    }

    /// One-line header summary: the CRC sentinel for invalid blocks, the
    /// encryption marker for protected ones, otherwise label and vendor.
    pub fn message_stub(&self) -> String {
        if !self.is_valid() {
            return CRC_FAILED.to_string();
        }
        let label = opcode_label(self.opcode());
        if self.is_encrypted() {
            format!("{label} ENCRYPTED")
        } else {
            format!("{label} VENDOR:{}", vendor_label(self.vendor()))
        }
    }
}

impl fmt::Display for Tsbk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message_stub())?;
        if self.is_valid() {
            write!(f, " {}", self.body)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
