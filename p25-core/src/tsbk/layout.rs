//! Field layouts shared by several opcodes.
//!
//! Many TSBK messages differ only in meaning, not in shape: a call alert and
//! a status query request both carry a target and a source address. Each
//! layout class decodes once here and is wrapped by the message-specific
//! [`Body`](super::Body) variants.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::bits::BinaryMessage;
use crate::identifier::{Channel, Identifier, Role};

use super::TsbkBody;

pub(crate) const SERVICE_OPTIONS: Range<usize> = 16..24;
pub(crate) const TARGET_ADDRESS: Range<usize> = 32..56;
pub(crate) const SOURCE_ADDRESS: Range<usize> = 56..80;
pub(crate) const WACN: Range<usize> = 24..44;
pub(crate) const SYSTEM: Range<usize> = 44..56;

/// Read a standard 16-bit channel field starting at `start`.
pub(crate) fn channel_at(message: &BinaryMessage, start: usize) -> Channel {
    Channel::from_field(message.get_int(start..start + 16))
}

// ---------------------------------------------------------------------------
// Service options
// ---------------------------------------------------------------------------

/// 8-bit service options field carried by call requests and grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceOptions(pub u8);

impl ServiceOptions {
    pub fn emergency(&self) -> bool {
        self.0 & 0x80 != 0
    }
    pub fn encrypted(&self) -> bool {
        self.0 & 0x40 != 0
    }
    pub fn duplex(&self) -> bool {
        self.0 & 0x20 != 0
    }
    pub fn packet_switched(&self) -> bool {
        self.0 & 0x10 != 0
    }
    pub fn priority(&self) -> u8 {
        self.0 & 0x07
    }

    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ServiceOptions(message.get_int(SERVICE_OPTIONS) as u8)
    }
}

impl fmt::Display for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.emergency() {
            f.write_str("EMERGENCY ")?;
        }
        if self.encrypted() {
            f.write_str("ENCRYPTED ")?;
        }
        f.write_str(if self.duplex() { "FULL-DUPLEX " } else { "HALF-DUPLEX " })?;
        if self.packet_switched() {
            f.write_str("PACKET ")?;
        }
        write!(f, "PRI:{}", self.priority())
    }
}

// ---------------------------------------------------------------------------
// Unit-to-unit layouts
// ---------------------------------------------------------------------------

/// Target and source unit addresses (bits 32..56, 56..80).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitPair {
    pub target: u32,
    pub source: u32,
}

impl UnitPair {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        UnitPair {
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for UnitPair {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
        ]
    }
}

impl fmt::Display for UnitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} TO:{}", self.source, self.target)
    }
}

/// Service options followed by target and source unit addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceUnitPair {
    pub options: ServiceOptions,
    pub target: u32,
    pub source: u32,
}

impl ServiceUnitPair {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ServiceUnitPair {
            options: ServiceOptions::decode(message),
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for ServiceUnitPair {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
        ]
    }
}

impl fmt::Display for ServiceUnitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM:{} TO:{} {}", self.source, self.target, self.options)
    }
}

/// Channel followed by target and source unit addresses (paired-address grant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelUnitPair {
    pub channel: Channel,
    pub target: u32,
    pub source: u32,
}

impl ChannelUnitPair {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ChannelUnitPair {
            channel: channel_at(message, 16),
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for ChannelUnitPair {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
            Identifier::channel(self.channel),
        ]
    }
}

impl fmt::Display for ChannelUnitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} CHAN:{}",
            self.source, self.target, self.channel
        )
    }
}

// ---------------------------------------------------------------------------
// Group layouts
// ---------------------------------------------------------------------------

/// Single-address group grant: options, channel, group, source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupGrant {
    pub options: ServiceOptions,
    pub channel: Channel,
    pub group: u32,
    pub source: u32,
}

impl GroupGrant {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        GroupGrant {
            options: ServiceOptions::decode(message),
            channel: channel_at(message, 24),
            group: message.get_int(40..56),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for GroupGrant {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::talkgroup(self.group, Role::To),
            Identifier::channel(self.channel),
        ]
    }
}

impl fmt::Display for GroupGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} CHAN:{} {}",
            self.source, self.group, self.channel, self.options
        )
    }
}

/// One (channel, group) pair of a grant update or announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupChannel {
    pub channel: Channel,
    pub group: u32,
}

/// Two (channel, group) pairs. The second pair is dropped when it repeats
/// the first, which is how a single update is padded on air.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelUpdates {
    pub first: GroupChannel,
    pub second: Option<GroupChannel>,
}

impl ChannelUpdates {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        let first = GroupChannel {
            channel: channel_at(message, 16),
            group: message.get_int(32..48),
        };
        let second = GroupChannel {
            channel: channel_at(message, 48),
            group: message.get_int(64..80),
        };
        ChannelUpdates {
            first,
            second: (second != first).then_some(second),
        }
    }
}

impl TsbkBody for ChannelUpdates {
    fn identifiers(&self) -> Vec<Identifier> {
        std::iter::once(self.first)
            .chain(self.second)
            .flat_map(|pair| {
                [
                    Identifier::talkgroup(pair.group, Role::To),
                    Identifier::channel(pair.channel),
                ]
            })
            .collect()
    }
}

impl fmt::Display for ChannelUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TG:{} CHAN:{}", self.first.group, self.first.channel)?;
        if let Some(second) = self.second {
            write!(f, " TG:{} CHAN:{}", second.group, second.channel)?;
        }
        Ok(())
    }
}

/// Explicit single-address grant: options, downlink and uplink channels, group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplicitGroupGrant {
    pub options: ServiceOptions,
    pub channel: Channel,
    pub group: u32,
}

impl ExplicitGroupGrant {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        ExplicitGroupGrant {
            options: ServiceOptions::decode(message),
            channel: Channel::explicit(message.get_int(32..48), message.get_int(48..64)),
            group: message.get_int(64..80),
        }
    }
}

impl TsbkBody for ExplicitGroupGrant {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::talkgroup(self.group, Role::To),
            Identifier::channel(self.channel),
        ]
    }
}

impl fmt::Display for ExplicitGroupGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TG:{} CHAN:{} {}", self.group, self.channel, self.options)
    }
}

// ---------------------------------------------------------------------------
// Status exchange
// ---------------------------------------------------------------------------

/// Unit and user status codes plus target and source addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusExchange {
    pub unit_status: u8,
    pub user_status: u8,
    pub target: u32,
    pub source: u32,
}

impl StatusExchange {
    pub(crate) fn decode(message: &BinaryMessage) -> Self {
        StatusExchange {
            unit_status: message.get_int(16..24) as u8,
            user_status: message.get_int(24..32) as u8,
            target: message.get_int(TARGET_ADDRESS),
            source: message.get_int(SOURCE_ADDRESS),
        }
    }
}

impl TsbkBody for StatusExchange {
    fn identifiers(&self) -> Vec<Identifier> {
        vec![
            Identifier::unit(self.source, Role::From),
            Identifier::unit(self.target, Role::To),
            Identifier::status(self.unit_status as u32),
            Identifier::status(self.user_status as u32),
        ]
    }
}

impl fmt::Display for StatusExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FM:{} TO:{} UNIT STATUS:{} USER STATUS:{}",
            self.source, self.target, self.unit_status, self.user_status
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{Form, Value};

    fn message(fields: &[(Range<usize>, u64)]) -> BinaryMessage {
        let mut msg = BinaryMessage::new(96);
        for (range, value) in fields {
            msg.set_int(range.clone(), *value);
        }
        msg
    }

    #[test]
    fn test_service_options_bits() {
        let opts = ServiceOptions(0b1010_0101);
        assert!(opts.emergency());
        assert!(!opts.encrypted());
        assert!(opts.duplex());
        assert!(!opts.packet_switched());
        assert_eq!(opts.priority(), 5);
        assert_eq!(opts.to_string(), "EMERGENCY FULL-DUPLEX PRI:5");
    }

    #[test]
    fn test_unit_pair_order() {
        let msg = message(&[(TARGET_ADDRESS, 200), (SOURCE_ADDRESS, 100)]);
        let pair = UnitPair::decode(&msg);
        let ids = pair.identifiers();
        assert_eq!(ids[0], Identifier::unit(100, Role::From));
        assert_eq!(ids[1], Identifier::unit(200, Role::To));
        assert_eq!(pair.to_string(), "FM:100 TO:200");
    }

    #[test]
    fn test_group_grant() {
        let msg = message(&[
            (SERVICE_OPTIONS, 0x04),
            (24..40, 0x1064),
            (40..56, 4001),
            (SOURCE_ADDRESS, 1_234_567),
        ]);
        let grant = GroupGrant::decode(&msg);
        assert_eq!(grant.group, 4001);
        assert_eq!(grant.channel, Channel::Standard { band: 1, number: 100 });
        let forms: Vec<Form> = grant.identifiers().iter().map(|i| i.form).collect();
        assert_eq!(forms, [Form::LogicalLinkId, Form::Talkgroup, Form::Channel]);
    }

    #[test]
    fn test_channel_updates_pairs() {
        let msg = message(&[(16..32, 0x1001), (32..48, 10), (48..64, 0x1002), (64..80, 20)]);
        let updates = ChannelUpdates::decode(&msg);
        let ids = updates.identifiers();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[0], Identifier::talkgroup(10, Role::To));
        assert_eq!(ids[2], Identifier::talkgroup(20, Role::To));
        assert_eq!(ids[3].value, Value::Channel(Channel::from_field(0x1002)));
    }

    #[test]
    fn test_channel_updates_duplicate_dropped() {
        let msg = message(&[(16..32, 0x1001), (32..48, 10), (48..64, 0x1001), (64..80, 10)]);
        let updates = ChannelUpdates::decode(&msg);
        assert!(updates.second.is_none());
        assert_eq!(updates.identifiers().len(), 2);
    }

    #[test]
    fn test_explicit_grant() {
        let msg = message(&[(32..48, 0x2010), (48..64, 0x3010), (64..80, 777)]);
        let grant = ExplicitGroupGrant::decode(&msg);
        assert_eq!(
            grant.channel,
            Channel::Explicit {
                downlink_band: 2,
                downlink_number: 16,
                uplink_band: 3,
                uplink_number: 16,
            }
        );
        assert_eq!(grant.to_string(), "TG:777 CHAN:2-16/3-16 HALF-DUPLEX PRI:0");
    }

    #[test]
    fn test_status_exchange() {
        let msg = message(&[(16..24, 3), (24..32, 9), (TARGET_ADDRESS, 1), (SOURCE_ADDRESS, 2)]);
        let status = StatusExchange::decode(&msg);
        let ids = status.identifiers();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[2], Identifier::status(3));
        assert_eq!(ids[3], Identifier::status(9));
    }
}
