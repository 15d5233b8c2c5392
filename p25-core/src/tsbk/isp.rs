//! Inbound signalling packet (ISP) layouts: requests and responses sent by
//! subscriber units to the infrastructure.
//!
//! Identifier order: source unit first, then target unit or group, then
//! network and payload identifiers.

use std::fmt;

use serde::Serialize;

use crate::bits::BinaryMessage;
use crate::identifier::{Form, Identifier, NodeAddress, Role, Value};
use crate::opcode::Opcode;
use crate::reference::Direction;

use super::layout::{ServiceOptions, SOURCE_ADDRESS, SYSTEM, TARGET_ADDRESS, WACN};
use super::TsbkBody;

/// Answer carried by unit-to-unit and telephone answer responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Answer {
    Proceed,
    Deny,
    Wait,
    Unknown(u8),
}

impl Answer {
    pub fn from_value(value: u8) -> Self {
        match value {
            0x20 => Answer::Proceed,
            0x21 => Answer::Deny,
            0x22 => Answer::Wait,
            other => Answer::Unknown(other),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Proceed => f.write_str("PROCEED"),
            Answer::Deny => f.write_str("DENY"),
            Answer::Wait => f.write_str("WAIT"),
            Answer::Unknown(v) => write!(f, "UNKNOWN({v:02X})"),
        }
    }
}

fn node(wacn: u32, system: u16) -> NodeAddress {
    NodeAddress {
        wacn: Some(wacn),
        system,
        rfss: None,
        site: None,
    }
}

// ---------------------------------------------------------------------------
// Call requests
// ---------------------------------------------------------------------------

/// 0x00 group voice service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupServiceRequest {
    pub options: ServiceOptions,
    pub group: u32,
    pub source: u32,
}

impl GroupServiceRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        GroupServiceRequest {
            options: ServiceOptions::decode(message),
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for GroupServiceRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.group, Role::To),
        ]
    }
}

impl fmt::Display for GroupServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} TO:{} {}", self.source, self.group, self.options)
    }
}

/// 0x05 unit-to-unit answer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitToUnitAnswerResponse {
    pub options: ServiceOptions,
    pub answer: Answer,
    pub target: u32,
    pub source: u32,
}

impl UnitToUnitAnswerResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        UnitToUnitAnswerResponse {
            options: ServiceOptions::decode(message),
            answer: Answer::from_value(message.get_int(24..32) as u8),
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for UnitToUnitAnswerResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
        ]
    }
}

impl fmt::Display for UnitToUnitAnswerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} ANSWER:{} {}",
            self.source, self.target, self.answer, self.options
        )
    }
}

/// 0x08 telephone interconnect request using a pre-programmed PSTN address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PstnRequest {
    pub options: ServiceOptions,
    pub pstn_address: u8,
    pub source: u32,
}

impl PstnRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        PstnRequest {
            options: ServiceOptions::decode(message),
            pstn_address: message.get_int(32..40) as u8,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for PstnRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::new(
                Form::TelephoneNumber,
                Role::To,
                Value::Code(self.pstn_address as u32),
            ),
        ]
    }
}

impl fmt::Display for PstnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} PSTN ADDRESS:{} {}",
            self.source, self.pstn_address, self.options
        )
    }
}

/// 0x0A telephone interconnect answer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephoneAnswerResponse {
    pub options: ServiceOptions,
    pub answer: Answer,
    pub source: u32,
}

impl TelephoneAnswerResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        TelephoneAnswerResponse {
            options: ServiceOptions::decode(message),
            answer: Answer::from_value(message.get_int(24..32) as u8),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for TelephoneAnswerResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![Identifier::unit(self.source, Role::From)]
    }
}

impl fmt::Display for TelephoneAnswerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} ANSWER:{} {}", self.source, self.answer, self.options)
    }
}

/// 0x27 emergency alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyAlarmRequest {
    pub group: u32,
    pub source: u32,
}

impl EmergencyAlarmRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        EmergencyAlarmRequest {
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for EmergencyAlarmRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.group, Role::To),
        ]
    }
}

impl fmt::Display for EmergencyAlarmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} TO:{}", self.source, self.group)
    }
}

// ---------------------------------------------------------------------------
// Short data and supplementary services
// ---------------------------------------------------------------------------

/// 0x1C message update request: 16-bit short message code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageUpdate {
    pub message: u16,
    pub target: u32,
    pub source: u32,
}

impl MessageUpdate {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        MessageUpdate {
            message: message.get_int(16..32) as u16,
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for MessageUpdate {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
            Identifier::short_data_message(self.message as u32, Role::Any),
        ]
    }
}

impl fmt::Display for MessageUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} MSG:{:04X}",
            self.source, self.target, self.message
        )
    }
}

/// 0x1D radio unit monitor request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioUnitMonitorRequest {
    pub silent: bool,
    pub tx_multiplier: u8,
    pub target: u32,
    pub source: u32,
}

impl RadioUnitMonitorRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        RadioUnitMonitorRequest {
            silent: message.get(16),
            tx_multiplier: message.get_int(30..32) as u8,
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for RadioUnitMonitorRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
        ]
    }
}

impl fmt::Display for RadioUnitMonitorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} TX MULTIPLIER:{}",
            self.source, self.target, self.tx_multiplier
        )?;
        if self.silent {
            f.write_str(" SILENT")?;
        }
        Ok(())
    }
}

/// 0x20 unit acknowledge response. The service type names the outbound
/// message being acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitAcknowledge {
    pub additional_info_valid: bool,
    pub extended: bool,
    pub service: Opcode,
    pub target: u32,
    pub source: u32,
}

impl UnitAcknowledge {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        UnitAcknowledge {
            additional_info_valid: message.get(16),
            extended: message.get(17),
            service: Opcode::from_value(message.get_int(18..24) as u8, Direction::Outbound),
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for UnitAcknowledge {
    fn identifiers(&self) -> Vec<Identifier> {
        let mut ids = vec![Identifier::unit(self.source, Role::From)];
        if self.additional_info_valid {
            ids.push(Identifier::unit(self.target, Role::To));
        }
        ids
    }
}

impl fmt::Display for UnitAcknowledge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{}", self.source)?;
        if self.additional_info_valid {
            write!(f, " TO:{}", self.target)?;
        }
        write!(f, " ACKNOWLEDGING:{}", self.service)
    }
}

/// 0x23 cancel service request. The service type names the inbound request
/// being cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelServiceRequest {
    pub additional_info_valid: bool,
    pub service: Opcode,
    pub reason: u8,
    pub additional_info: u32,
    pub source: u32,
}

impl CancelServiceRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        CancelServiceRequest {
            additional_info_valid: message.get(16),
            service: Opcode::from_value(message.get_int(18..24) as u8, Direction::Inbound),
            reason: message.get_int(24..32) as u8,
            additional_info: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for CancelServiceRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        let mut ids = vec![Identifier::unit(self.source, Role::From)];
        if self.additional_info_valid {
            ids.push(Identifier::unit(self.additional_info, Role::To));
        }
        ids
    }
}

impl fmt::Display for CancelServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} CANCEL:{} REASON:{:02X}",
            self.source, self.service, self.reason
        )
    }
}

/// 0x24 extended function response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedFunctionResponse {
    pub function: u16,
    pub argument: u32,
    pub source: u32,
}

impl ExtendedFunctionResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ExtendedFunctionResponse {
            function: message.get_int(16..32) as u16,
            argument: message.get_int(32..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for ExtendedFunctionResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![Identifier::unit(self.source, Role::From)]
    }
}

impl fmt::Display for ExtendedFunctionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} FUNCTION:{:04X} ARGUMENT:{:06X}",
            self.source, self.function, self.argument
        )
    }
}

// ---------------------------------------------------------------------------
// Affiliation and registration
// ---------------------------------------------------------------------------

/// 0x28 group affiliation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAffiliationRequest {
    pub system: u16,
    pub group: u32,
    pub source: u32,
}

impl GroupAffiliationRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        GroupAffiliationRequest {
            system: message.get_int(28..40) as u16,
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for GroupAffiliationRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.group, Role::To),
            Identifier::node(NodeAddress {
                wacn: None,
                system: self.system,
                rfss: None,
                site: None,
            }),
        ]
    }
}

impl fmt::Display for GroupAffiliationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} SYSTEM:{:03X}",
            self.source, self.group, self.system
        )
    }
}

/// 0x29 group affiliation query response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAffiliationQueryResponse {
    pub announcement_group: u32,
    pub group: u32,
    pub source: u32,
}

impl GroupAffiliationQueryResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        GroupAffiliationQueryResponse {
            announcement_group: message.get_int(24..40),
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for GroupAffiliationQueryResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.announcement_group, Role::Broadcast),
            Identifier::talkgroup(self.group, Role::Any),
        ]
    }
}

impl fmt::Display for GroupAffiliationQueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} GROUP:{} ANNOUNCEMENT GROUP:{}",
            self.source, self.group, self.announcement_group
        )
    }
}

/// WACN and system plus source unit: de-registration and roaming address
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRequest {
    pub wacn: u32,
    pub system: u16,
    pub source: u32,
}

impl NodeRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        NodeRequest {
            wacn: message.get_int(WACN),
            system: message.get_int(SYSTEM) as u16,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for NodeRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::node(node(self.wacn, self.system)),
        ]
    }
}

impl fmt::Display for NodeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} NETWORK:{}", self.source, node(self.wacn, self.system))
    }
}

/// 0x2C unit registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRegistrationRequest {
    pub capability: u8,
    pub wacn: u32,
    pub system: u16,
    pub source: u32,
}

impl UnitRegistrationRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        UnitRegistrationRequest {
            capability: message.get_int(16..24) as u8,
            wacn: message.get_int(WACN),
            system: message.get_int(SYSTEM) as u16,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }

    /// Emergency flag in the capability field.
    pub fn emergency(&self) -> bool {
        self.capability & 0x80 != 0
    }
}

impl TsbkBody for UnitRegistrationRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::node(node(self.wacn, self.system)),
        ]
    }
}

impl fmt::Display for UnitRegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} NETWORK:{}", self.source, node(self.wacn, self.system))?;
        if self.emergency() {
            f.write_str(" EMERGENCY")?;
        }
        Ok(())
    }
}

/// 0x2D location registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRegistrationRequest {
    pub location_registration_area: u8,
    pub group: u32,
    pub source: u32,
}

impl LocationRegistrationRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        LocationRegistrationRequest {
            location_registration_area: message.get_int(24..32) as u8,
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for LocationRegistrationRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.group, Role::To),
        ]
    }
}

impl fmt::Display for LocationRegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} LRA:{}",
            self.source, self.group, self.location_registration_area
        )
    }
}

/// 0x37 roaming address response, one of a numbered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoamingAddressResponse {
    pub last_message: bool,
    pub sequence: u8,
    pub wacn: u32,
    pub system: u16,
    pub source: u32,
}

impl RoamingAddressResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        RoamingAddressResponse {
            last_message: message.get(16),
            sequence: message.get_int(20..24) as u8,
            wacn: message.get_int(WACN),
            system: message.get_int(SYSTEM) as u16,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for RoamingAddressResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::node(node(self.wacn, self.system)),
        ]
    }
}

impl fmt::Display for RoamingAddressResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} NETWORK:{} SEQUENCE:{}",
            self.source,
            node(self.wacn, self.system),
            self.sequence
        )?;
        if self.last_message {
            f.write_str(" LAST")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

/// 0x30 protection parameter request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionParameterRequest {
    pub algorithm: u8,
    pub key_id: u16,
    pub source: u32,
}

impl ProtectionParameterRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ProtectionParameterRequest {
            algorithm: message.get_int(24..32) as u8,
            key_id: message.get_int(32..48) as u16,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for ProtectionParameterRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![Identifier::unit(self.source, Role::From)]
    }
}

impl fmt::Display for ProtectionParameterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} ALGORITHM:{:02X} KEY:{:04X}",
            self.source, self.algorithm, self.key_id
        )
    }
}

/// 0x32 identifier update request: asks for the band plan of one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierUpdateRequest {
    pub band: u8,
    pub source: u32,
}

impl IdentifierUpdateRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        IdentifierUpdateRequest {
            band: message.get_int(52..56) as u8,
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for IdentifierUpdateRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::frequency_band(self.band),
        ]
    }
}

impl fmt::Display for IdentifierUpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} BAND:{}", self.source, self.band)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn message(fields: &[(std::ops::Range<usize>, u64)]) -> BinaryMessage {
        let mut msg = BinaryMessage::new(96);
        for (range, value) in fields {
            msg.set_int(range.clone(), *value);
        }
        msg
    }

    #[test]
    fn test_answer_codes() {
        assert_eq!(Answer::from_value(0x20), Answer::Proceed);
        assert_eq!(Answer::from_value(0x21), Answer::Deny);
        assert_eq!(Answer::from_value(0x22), Answer::Wait);
        assert_eq!(Answer::from_value(0x05), Answer::Unknown(0x05));
    }

    #[test]
    fn test_group_service_request() {
        let msg = message(&[(16..24, 0x80), (40..56, 300), (56..80, 9001)]);
        let req = GroupServiceRequest::decode(&msg);
        assert!(req.options.emergency());
        assert_eq!(
            req.identifiers(),
            vec![
                Identifier::unit(9001, Role::From),
                Identifier::talkgroup(300, Role::To)
            ]
        );
    }

    #[test]
    fn test_unit_acknowledge_service_is_outbound() {
        // service type 0x1F: call alert outbound, call alert request inbound
        let msg = message(&[(16..17, 1), (18..24, 0x1F), (32..56, 5), (56..80, 6)]);
        let ack = UnitAcknowledge::decode(&msg);
        assert_eq!(ack.service, Opcode::OspCallAlert);
        assert_eq!(ack.identifiers().len(), 2);
        assert_eq!(ack.to_string(), "FM:6 TO:5 ACKNOWLEDGING:CALL ALERT");
    }

    #[test]
    fn test_unit_acknowledge_without_target() {
        let msg = message(&[(18..24, 0x1F), (32..56, 5), (56..80, 6)]);
        let ack = UnitAcknowledge::decode(&msg);
        assert_eq!(ack.identifiers(), vec![Identifier::unit(6, Role::From)]);
    }

    #[test]
    fn test_cancel_service_request() {
        let msg = message(&[(18..24, 0x04), (24..32, 0x10), (56..80, 77)]);
        let cancel = CancelServiceRequest::decode(&msg);
        assert_eq!(cancel.service, Opcode::IspUnitToUnitVoiceServiceRequest);
        assert_eq!(cancel.reason, 0x10);
        assert_eq!(cancel.identifiers().len(), 1);
    }

    #[test]
    fn test_message_update() {
        let msg = message(&[(16..32, 0xBEEF), (32..56, 10), (56..80, 20)]);
        let update = MessageUpdate::decode(&msg);
        let ids = update.identifiers();
        assert_eq!(ids[2].form, Form::ShortDataMessage);
        assert_eq!(ids[2].value, Value::Code(0xBEEF));
        assert_eq!(update.to_string(), "FM:20 TO:10 MSG:BEEF");
    }

    #[test]
    fn test_unit_registration_request() {
        let msg = message(&[(16..24, 0x80), (24..44, 0xBEE00), (44..56, 0x123), (56..80, 42)]);
        let reg = UnitRegistrationRequest::decode(&msg);
        assert!(reg.emergency());
        assert_eq!(reg.wacn, 0xBEE00);
        assert_eq!(reg.system, 0x123);
        assert_eq!(reg.identifiers()[1].form, Form::Node);
        assert_eq!(reg.to_string(), "FM:42 NETWORK:BEE00.123 EMERGENCY");
    }

    #[test]
    fn test_roaming_address_response() {
        let msg = message(&[(16..17, 1), (20..24, 3), (24..44, 1), (44..56, 2), (56..80, 3)]);
        let rsp = RoamingAddressResponse::decode(&msg);
        assert!(rsp.last_message);
        assert_eq!(rsp.sequence, 3);
        assert!(rsp.to_string().ends_with("SEQUENCE:3 LAST"));
    }

    #[test]
    fn test_identifier_update_request() {
        let msg = message(&[(52..56, 0xA), (56..80, 1000)]);
        let req = IdentifierUpdateRequest::decode(&msg);
        assert_eq!(req.identifiers()[1], Identifier::frequency_band(0xA));
    }

    #[test]
    fn test_group_affiliation_query_response_order() {
        let msg = message(&[(24..40, 1), (40..56, 2), (56..80, 3)]);
        let ids = GroupAffiliationQueryResponse::decode(&msg).identifiers();
        assert_eq!(ids[1], Identifier::talkgroup(1, Role::Broadcast));
        assert_eq!(ids[2], Identifier::talkgroup(2, Role::Any));
    }
}
