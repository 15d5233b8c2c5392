//! Outbound signalling packet (OSP) layouts that are specific to a single
//! message. Grants and announcements that share a layout live in
//! [`super::layout`].

use std::fmt;

use serde::Serialize;

use crate::bits::BinaryMessage;
use crate::identifier::{Channel, Identifier, NodeAddress, Role};
use crate::opcode::Opcode;
use crate::reference::Direction;

use super::layout::{channel_at, ServiceOptions, SYSTEM, WACN};
use super::TsbkBody;

/// Address of the unit a message is sent to, in the last 24 argument bits.
const TARGET: std::ops::Range<usize> = 56..80;

// ---------------------------------------------------------------------------
// Telephone interconnect
// ---------------------------------------------------------------------------

/// 0x08 and 0x09 telephone interconnect voice channel grant (and update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephoneGrant {
    pub options: ServiceOptions,
    pub channel: Channel,
    /// Call timer in units of 100 ms. Zero means no timeout.
    pub call_timer: u16,
    pub address: u32,
}

impl TelephoneGrant {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        TelephoneGrant {
            options: ServiceOptions::decode(message),
            channel: channel_at(message, 24),
            call_timer: message.get_int(40..56) as u16,
            address: message.get_int(TARGET),
        }
    }

    pub fn call_timer_ms(&self) -> u32 {
        self.call_timer as u32 * 100
    }
}

impl TsbkBody for TelephoneGrant {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.address, Role::Any),
            Identifier::channel(self.channel),
        ]
    }
}

impl fmt::Display for TelephoneGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNIT:{} CHAN:{}", self.address, self.channel)?;
        if self.call_timer > 0 {
            write!(f, " TIMER:{}ms", self.call_timer_ms())?;
        }
        write!(f, " {}", self.options)
    }
}

/// Map a 4-bit dialled digit. `None` marks the end of the number.
fn telephone_digit(nibble: u32) -> Option<char> {
    match nibble {
        0..=9 => char::from_digit(nibble, 10),
        0xA => Some('*'),
        0xB => Some('#'),
        _ => None,
    }
}

/// 0x0A telephone interconnect answer request: an incoming PSTN call for a
/// unit, with up to ten digits of the calling number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephoneAnswerRequest {
    pub digits: String,
    pub target: u32,
}

impl TelephoneAnswerRequest {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        let digits = (0..10)
            .map(|i| message.get_int(16 + i * 4..20 + i * 4))
            .map_while(telephone_digit)
            .collect();
        TelephoneAnswerRequest {
            digits,
            target: message.get_int(TARGET),
        }
    }
}

impl TsbkBody for TelephoneAnswerRequest {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::telephone_number(self.digits.clone(), Role::From),
            Identifier::unit(self.target, Role::To),
        ]
    }
}

impl fmt::Display for TelephoneAnswerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} TO:{}", self.digits, self.target)
    }
}

// ---------------------------------------------------------------------------
// Acknowledge, deny, and extended functions
// ---------------------------------------------------------------------------

/// 0x20 acknowledge response. The service type names the inbound request
/// being acknowledged. With the extended flag set the source field is
/// replaced by the network address of the target's home system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcknowledgeResponse {
    pub additional_info_valid: bool,
    pub extended: bool,
    pub service: Opcode,
    pub source: Option<u32>,
    pub network: Option<NodeAddress>,
    pub target: u32,
}

impl AcknowledgeResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        let extended = message.get(17);
        let (source, network) = if extended {
            let node = NodeAddress {
                wacn: Some(message.get_int(WACN)),
                system: message.get_int(SYSTEM) as u16,
                rfss: None,
                site: None,
            };
            (None, Some(node))
        } else {
            (Some(message.get_int(32..56)), None)
        };
        AcknowledgeResponse {
            additional_info_valid: message.get(16),
            extended,
            service: Opcode::from_value(message.get_int(18..24) as u8, Direction::Inbound),
            source,
            network,
            target: message.get_int(TARGET),
        }
    }
}

impl TsbkBody for AcknowledgeResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        let mut ids = Vec::with_capacity(3);
        if self.additional_info_valid {
            if let Some(source) = self.source {
                ids.push(Identifier::unit(source, Role::From));
            }
        }
        ids.push(Identifier::unit(self.target, Role::To));
        if let Some(network) = self.network {
            ids.push(Identifier::node(network));
        }
        ids
    }
}

impl fmt::Display for AcknowledgeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.additional_info_valid {
            if let Some(source) = self.source {
                write!(f, "FM:{source} ")?;
            }
        }
        write!(f, "TO:{}", self.target)?;
        if let Some(network) = self.network {
            write!(f, " NETWORK:{network}")?;
        }
        write!(f, " ACKNOWLEDGING:{}", self.service)
    }
}

/// Known deny reason codes: (raw, label).
const DENY_REASONS: &[(u8, &str)] = &[
    (0x10, "REQUESTING UNIT NOT VALID"),
    (0x11, "REQUESTING UNIT NOT AUTHORIZED FOR SERVICE"),
    (0x20, "TARGET UNIT NOT VALID"),
    (0x21, "TARGET UNIT NOT AUTHORIZED FOR SERVICE"),
    (0x2F, "TARGET UNIT REFUSED CALL"),
    (0x30, "TARGET GROUP NOT VALID"),
    (0x31, "TARGET GROUP NOT AUTHORIZED FOR SERVICE"),
    (0x40, "INVALID DIALING"),
    (0x41, "TELEPHONE NUMBER NOT AUTHORIZED"),
    (0x42, "PSTN ADDRESS NOT VALID"),
    (0x50, "CALL TIMEOUT"),
    (0x51, "LANDLINE TERMINATED CALL"),
    (0x52, "SUBSCRIBER UNIT TERMINATED CALL"),
    (0x5F, "CALL PREEMPTED"),
    (0x60, "SITE ACCESS DENIAL"),
    (0x61, "PTT COLLIDE"),
    (0xF0, "SYSTEM DEFINED"),
];

/// Display label for a deny reason code.
pub fn deny_reason_label(reason: u8) -> &'static str {
    DENY_REASONS
        .iter()
        .find(|(raw, _)| *raw == reason)
        .map(|(_, label)| *label)
        .unwrap_or("UNKNOWN REASON")
}

/// 0x27 deny response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenyResponse {
    pub additional_info_valid: bool,
    pub service: Opcode,
    pub reason: u8,
    pub additional_info: u32,
    pub target: u32,
}

impl DenyResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        DenyResponse {
            additional_info_valid: message.get(16),
            service: Opcode::from_value(message.get_int(18..24) as u8, Direction::Inbound),
            reason: message.get_int(24..32) as u8,
            additional_info: message.get_int(32..56),
            target: message.get_int(TARGET),
        }
    }
}

impl TsbkBody for DenyResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        let mut ids = Vec::with_capacity(2);
        if self.additional_info_valid {
            ids.push(Identifier::unit(self.additional_info, Role::From));
        }
        ids.push(Identifier::unit(self.target, Role::To));
        ids
    }
}

impl fmt::Display for DenyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TO:{} DENIED:{} REASON:{}",
            self.target,
            self.service,
            deny_reason_label(self.reason)
        )
    }
}

/// 0x24 extended function command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedFunctionCommand {
    pub function: u16,
    pub argument: u32,
    pub target: u32,
}

impl ExtendedFunctionCommand {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ExtendedFunctionCommand {
            function: message.get_int(16..32) as u16,
            argument: message.get_int(32..56),
            target: message.get_int(TARGET),
        }
    }
}

impl TsbkBody for ExtendedFunctionCommand {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![Identifier::unit(self.target, Role::To)]
    }
}

impl fmt::Display for ExtendedFunctionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TO:{} FUNCTION:{:04X} ARGUMENT:{:06X}",
            self.target, self.function, self.argument
        )
    }
}

// ---------------------------------------------------------------------------
// Affiliation and authentication
// ---------------------------------------------------------------------------

/// Group affiliation value (GAV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AffiliationValue {
    Accepted,
    Failed,
    Denied,
    Refused,
}

impl AffiliationValue {
    pub fn from_value(value: u8) -> Self {
        match value & 0x3 {
            0 => AffiliationValue::Accepted,
            1 => AffiliationValue::Failed,
            2 => AffiliationValue::Denied,
            _ => AffiliationValue::Refused,
        }
    }
}

impl fmt::Display for AffiliationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffiliationValue::Accepted => f.write_str("ACCEPTED"),
            AffiliationValue::Failed => f.write_str("FAILED"),
            AffiliationValue::Denied => f.write_str("DENIED"),
            AffiliationValue::Refused => f.write_str("REFUSED"),
        }
    }
}

/// 0x28 group affiliation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAffiliationResponse {
    /// Set when the affiliation is valid system-wide rather than site-local.
    pub global: bool,
    pub value: AffiliationValue,
    pub announcement_group: u32,
    pub group: u32,
    pub target: u32,
}

impl GroupAffiliationResponse {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        GroupAffiliationResponse {
            global: message.get(16),
            value: AffiliationValue::from_value(message.get_int(22..24) as u8),
            announcement_group: message.get_int(24..40),
            group: message.get_int(40..56),
            target: message.get_int(TARGET),
        }
    }
}

impl TsbkBody for GroupAffiliationResponse {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.target, Role::To),
            Identifier::talkgroup(self.announcement_group, Role::Broadcast),
            Identifier::talkgroup(self.group, Role::Any),
        ]
    }
}

impl fmt::Display for GroupAffiliationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TO:{} GROUP:{} ANNOUNCEMENT GROUP:{} {} {}",
            self.target,
            self.group,
            self.announcement_group,
            if self.global { "GLOBAL" } else { "LOCAL" },
            self.value
        )
    }
}

/// 0x31 authentication command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationCommand {
    pub wacn: u32,
    pub system: u16,
    pub target: u32,
}

impl AuthenticationCommand {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        AuthenticationCommand {
            wacn: message.get_int(WACN),
            system: message.get_int(SYSTEM) as u16,
            target: message.get_int(TARGET),
        }
    }

    fn network(&self) -> NodeAddress {
        NodeAddress {
            wacn: Some(self.wacn),
            system: self.system,
            rfss: None,
            site: None,
        }
    }
}

impl TsbkBody for AuthenticationCommand {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.target, Role::To),
            Identifier::node(self.network()),
        ]
    }
}

impl fmt::Display for AuthenticationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TO:{} NETWORK:{}", self.target, self.network())
    }
}

// ---------------------------------------------------------------------------
// Adjacent sites
// ---------------------------------------------------------------------------

/// Site status flags: conventional, failure, valid, active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteFlags(pub u8);

impl SiteFlags {
    pub fn conventional(&self) -> bool {
        self.0 & 0x8 != 0
    }
    pub fn failure(&self) -> bool {
        self.0 & 0x4 != 0
    }
    pub fn valid(&self) -> bool {
        self.0 & 0x2 != 0
    }
    pub fn active_network(&self) -> bool {
        self.0 & 0x1 != 0
    }
}

impl fmt::Display for SiteFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.conventional() {
            parts.push("CONVENTIONAL");
        }
        if self.failure() {
            parts.push("FAILURE");
        }
        if self.valid() {
            parts.push("VALID");
        }
        if self.active_network() {
            parts.push("NETWORK ACTIVE");
        }
        f.write_str(&parts.join(" "))
    }
}

/// System service class bits: (mask, label).
const SERVICE_CLASSES: &[(u8, &str)] = &[
    (0x01, "COMPOSITE CONTROL"),
    (0x02, "UPDATES ONLY"),
    (0x04, "BACKUP CONTROL"),
    (0x10, "DATA"),
    (0x20, "VOICE"),
    (0x40, "REGISTRATION"),
    (0x80, "AUTHENTICATION"),
];

/// Labels for the service class bits that are set.
pub fn service_class_labels(services: u8) -> Vec<&'static str> {
    SERVICE_CLASSES
        .iter()
        .filter(|(mask, _)| services & mask != 0)
        .map(|(_, label)| *label)
        .collect()
}

/// 0x3C adjacent status broadcast: a neighbour site's identity and control
/// channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacentStatusBroadcast {
    pub location_registration_area: u8,
    pub flags: SiteFlags,
    pub system: u16,
    pub rfss: u8,
    pub site: u8,
    pub channel: Channel,
    pub services: u8,
}

impl AdjacentStatusBroadcast {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        AdjacentStatusBroadcast {
            location_registration_area: message.get_int(16..24) as u8,
            flags: SiteFlags(message.get_int(24..28) as u8),
            system: message.get_int(28..40) as u16,
            rfss: message.get_int(40..48) as u8,
            site: message.get_int(48..56) as u8,
            channel: channel_at(message, 56),
            services: message.get_int(72..80) as u8,
        }
    }

    pub fn node(&self) -> NodeAddress {
        NodeAddress {
            wacn: None,
            system: self.system,
            rfss: Some(self.rfss),
            site: Some(self.site),
        }
    }
}

impl TsbkBody for AdjacentStatusBroadcast {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![Identifier::node(self.node()), Identifier::channel(self.channel)]
    }
}

impl fmt::Display for AdjacentStatusBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SITE:{} LRA:{} CHAN:{}",
            self.node(),
            self.location_registration_area,
            self.channel
        )?;
        if self.flags.0 != 0 {
            write!(f, " {}", self.flags)?;
        }
        let services = service_class_labels(self.services);
        if !services.is_empty() {
            write!(f, " SERVICES:{}", services.join("/"))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{Form, Value};

    fn message(fields: &[(std::ops::Range<usize>, u64)]) -> BinaryMessage {
        let mut msg = BinaryMessage::new(96);
        for (range, value) in fields {
            msg.set_int(range.clone(), *value);
        }
        msg
    }

    #[test]
    fn test_telephone_grant_timer() {
        let msg = message(&[(24..40, 0x2010), (40..56, 600), (56..80, 4242)]);
        let grant = TelephoneGrant::decode(&msg);
        assert_eq!(grant.call_timer_ms(), 60_000);
        assert_eq!(grant.channel, Channel::from_field(0x2010));
        assert_eq!(grant.identifiers()[1], Identifier::channel(grant.channel));
    }

    #[test]
    fn test_telephone_digits_stop_at_terminator() {
        // 9 1 1 * # F 0 0 0 0
        let msg = message(&[(16..56, 0x911AB_F0000), (56..80, 77)]);
        let req = TelephoneAnswerRequest::decode(&msg);
        assert_eq!(req.digits, "911*#");
        let ids = req.identifiers();
        assert_eq!(ids[0].form, Form::TelephoneNumber);
        assert_eq!(ids[0].value, Value::Text("911*#".into()));
        assert_eq!(ids[1], Identifier::unit(77, Role::To));
    }

    #[test]
    fn test_telephone_digits_full_length() {
        let msg = message(&[(16..56, 0x0123456789)]);
        assert_eq!(TelephoneAnswerRequest::decode(&msg).digits, "0123456789");
    }

    #[test]
    fn test_acknowledge_response_with_source() {
        let msg = message(&[(16..17, 1), (18..24, 0x04), (32..56, 100), (56..80, 200)]);
        let ack = AcknowledgeResponse::decode(&msg);
        assert_eq!(ack.service, Opcode::IspUnitToUnitVoiceServiceRequest);
        assert_eq!(
            ack.identifiers(),
            vec![
                Identifier::unit(100, Role::From),
                Identifier::unit(200, Role::To)
            ]
        );
    }

    #[test]
    fn test_acknowledge_response_extended() {
        let msg = message(&[
            (16..17, 1),
            (17..18, 1),
            (18..24, 0x2C),
            (24..44, 0xBEE00),
            (44..56, 0x1A2),
            (56..80, 200),
        ]);
        let ack = AcknowledgeResponse::decode(&msg);
        assert!(ack.extended);
        assert_eq!(ack.source, None);
        assert_eq!(ack.service, Opcode::IspUnitRegistrationRequest);
        let ids = ack.identifiers();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1].form, Form::Node);
        assert_eq!(
            ack.to_string(),
            "TO:200 NETWORK:BEE00.1A2 ACKNOWLEDGING:UNIT REGISTRATION REQUEST"
        );
    }

    #[test]
    fn test_deny_response() {
        let msg = message(&[(18..24, 0x00), (24..32, 0x31), (56..80, 5)]);
        let deny = DenyResponse::decode(&msg);
        assert_eq!(deny.service, Opcode::IspGroupVoiceServiceRequest);
        assert_eq!(
            deny.to_string(),
            "TO:5 DENIED:GROUP VOICE SERVICE REQUEST REASON:TARGET GROUP NOT AUTHORIZED FOR SERVICE"
        );
        assert_eq!(deny_reason_label(0x99), "UNKNOWN REASON");
    }

    #[test]
    fn test_group_affiliation_response() {
        let msg = message(&[(16..17, 1), (22..24, 2), (24..40, 10), (40..56, 20), (56..80, 30)]);
        let rsp = GroupAffiliationResponse::decode(&msg);
        assert!(rsp.global);
        assert_eq!(rsp.value, AffiliationValue::Denied);
        assert_eq!(rsp.identifiers()[0], Identifier::unit(30, Role::To));
        assert_eq!(rsp.to_string(), "TO:30 GROUP:20 ANNOUNCEMENT GROUP:10 GLOBAL DENIED");
    }

    #[test]
    fn test_adjacent_status_broadcast() {
        let msg = message(&[
            (16..24, 0x12),
            (24..28, 0x3),
            (28..40, 0x1A2),
            (40..48, 4),
            (48..56, 9),
            (56..72, 0x1064),
            (72..80, 0x30),
        ]);
        let adj = AdjacentStatusBroadcast::decode(&msg);
        assert!(adj.flags.valid());
        assert!(adj.flags.active_network());
        assert!(!adj.flags.failure());
        assert_eq!(service_class_labels(adj.services), vec!["DATA", "VOICE"]);
        assert_eq!(
            adj.identifiers(),
            vec![
                Identifier::node(NodeAddress {
                    wacn: None,
                    system: 0x1A2,
                    rfss: Some(4),
                    site: Some(9),
                }),
                Identifier::channel(Channel::Standard { band: 1, number: 100 }),
            ]
        );
        assert_eq!(
            adj.to_string(),
            "SITE:1A2.4.9 LRA:18 CHAN:1-100 VALID NETWORK ACTIVE SERVICES:DATA/VOICE"
        );
    }
}
