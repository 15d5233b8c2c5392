//! Identifiers extracted from decoded messages.
//!
//! An identifier is an immutable value tagged with a semantic [`Form`] (what
//! kind of thing it is) and a [`Role`] (what part it plays in the exchange).
//! Consumers rely on list order when two identifiers share a form, so
//! decoders must emit them in a fixed, documented order.

use std::fmt;

use serde::Serialize;

/// Kind of entity an identifier describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Form {
    Channel,
    Esn,
    FrequencyBand,
    LogicalLinkId,
    Node,
    ShortDataMessage,
    Status,
    Talkgroup,
    TelephoneNumber,
    Any,
}

const FORM_LABELS: &[(Form, &str)] = &[
    (Form::Channel, "CHANNEL"),
    (Form::Esn, "ESN"),
    (Form::FrequencyBand, "FREQUENCY BAND"),
    (Form::LogicalLinkId, "LLID"),
    (Form::Node, "NODE"),
    (Form::ShortDataMessage, "SDM"),
    (Form::Status, "STATUS"),
    (Form::Talkgroup, "TG"),
    (Form::TelephoneNumber, "TEL"),
    (Form::Any, "ANY"),
];

/// Display label for a form.
pub fn form_label(form: Form) -> &'static str {
    FORM_LABELS
        .iter()
        .find(|(f, _)| *f == form)
        .map(|(_, label)| *label)
        .unwrap_or("ANY")
}

/// Part an identifier plays in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    From,
    To,
    Broadcast,
    Any,
}

/// A P25 channel: 4-bit band identifier plus 12-bit channel number.
///
/// Explicit channels carry separate downlink and uplink descriptors so the
/// receiver does not have to derive the uplink from the band plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Channel {
    Standard {
        band: u8,
        number: u16,
    },
    Explicit {
        downlink_band: u8,
        downlink_number: u16,
        uplink_band: u8,
        uplink_number: u16,
    },
}

impl Channel {
    /// Build a standard channel from the 16-bit on-air field.
    pub fn from_field(field: u32) -> Self {
        Channel::Standard {
            band: ((field >> 12) & 0xF) as u8,
            number: (field & 0xFFF) as u16,
        }
    }

    /// Build an explicit channel from the downlink and uplink 16-bit fields.
    pub fn explicit(downlink: u32, uplink: u32) -> Self {
        Channel::Explicit {
            downlink_band: ((downlink >> 12) & 0xF) as u8,
            downlink_number: (downlink & 0xFFF) as u16,
            uplink_band: ((uplink >> 12) & 0xF) as u8,
            uplink_number: (uplink & 0xFFF) as u16,
        }
    }

    /// Band identifier and channel number used to derive the downlink.
    pub fn downlink(&self) -> (u8, u16) {
        match *self {
            Channel::Standard { band, number } => (band, number),
            Channel::Explicit {
                downlink_band,
                downlink_number,
                ..
            } => (downlink_band, downlink_number),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Channel::Standard { band, number } => write!(f, "{band}-{number}"),
            Channel::Explicit {
                downlink_band,
                downlink_number,
                uplink_band,
                uplink_number,
            } => write!(
                f,
                "{downlink_band}-{downlink_number}/{uplink_band}-{uplink_number}"
            ),
        }
    }
}

/// Network node: WACN, system, and optionally RFSS and site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeAddress {
    pub wacn: Option<u32>,
    pub system: u16,
    pub rfss: Option<u8>,
    pub site: Option<u8>,
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(wacn) = self.wacn {
            write!(f, "{wacn:05X}.")?;
        }
        write!(f, "{:03X}", self.system)?;
        if let Some(rfss) = self.rfss {
            write!(f, ".{rfss}")?;
        }
        if let Some(site) = self.site {
            write!(f, ".{site}")?;
        }
        Ok(())
    }
}

/// Payload carried by an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Address(u32),
    Channel(Channel),
    FrequencyBand(u8),
    Node(NodeAddress),
    Code(u32),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(a) => write!(f, "{a}"),
            Value::Channel(c) => write!(f, "{c}"),
            Value::FrequencyBand(b) => write!(f, "{b}"),
            Value::Node(n) => write!(f, "{n}"),
            Value::Code(c) => write!(f, "{c:#X}"),
            Value::Text(t) => f.write_str(t),
        }
    }
}

/// One typed piece of information from a decoded message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub form: Form,
    pub role: Role,
    pub value: Value,
}

impl Identifier {
    pub fn new(form: Form, role: Role, value: Value) -> Self {
        Identifier { form, role, value }
    }

    /// 16-bit talkgroup address.
    pub fn talkgroup(group: u32, role: Role) -> Self {
        Identifier::new(Form::Talkgroup, role, Value::Address(group))
    }

    /// 24-bit radio unit address (logical link ID).
    pub fn unit(address: u32, role: Role) -> Self {
        Identifier::new(Form::LogicalLinkId, role, Value::Address(address))
    }

    pub fn channel(channel: Channel) -> Self {
        Identifier::new(Form::Channel, Role::Any, Value::Channel(channel))
    }

    pub fn node(node: NodeAddress) -> Self {
        Identifier::new(Form::Node, Role::Any, Value::Node(node))
    }

    pub fn frequency_band(band: u8) -> Self {
        Identifier::new(Form::FrequencyBand, Role::Any, Value::FrequencyBand(band))
    }

    pub fn status(code: u32) -> Self {
        Identifier::new(Form::Status, Role::Any, Value::Code(code))
    }

    pub fn short_data_message(code: u32, role: Role) -> Self {
        Identifier::new(Form::ShortDataMessage, role, Value::Code(code))
    }

    pub fn telephone_number(number: String, role: Role) -> Self {
        Identifier::new(Form::TelephoneNumber, role, Value::Text(number))
    }

    /// Numeric ID of a numbers-only identifier (units, groups, codes).
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            Value::Address(v) | Value::Code(v) => Some(v),
            Value::FrequencyBand(b) => Some(b as u32),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.role {
            Role::From => "FROM ",
            Role::To => "TO ",
            Role::Broadcast => "BCAST ",
            Role::Any => "",
        };
        write!(f, "{prefix}{}:{}", form_label(self.form), self.value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_field() {
        let ch = Channel::from_field(0x1234);
        assert_eq!(ch, Channel::Standard { band: 1, number: 0x234 });
        assert_eq!(ch.downlink(), (1, 0x234));
        assert_eq!(ch.to_string(), "1-564");
    }

    #[test]
    fn test_channel_explicit() {
        let ch = Channel::explicit(0x2010, 0x3020);
        assert_eq!(ch.downlink(), (2, 0x010));
        assert_eq!(ch.to_string(), "2-16/3-32");
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::talkgroup(100, Role::To).to_string(), "TO TG:100");
        assert_eq!(
            Identifier::unit(1234567, Role::From).to_string(),
            "FROM LLID:1234567"
        );
        assert_eq!(
            Identifier::channel(Channel::from_field(0x1005)).to_string(),
            "CHANNEL:1-5"
        );
    }

    #[test]
    fn test_node_display() {
        let node = NodeAddress {
            wacn: Some(0xBEE00),
            system: 0x1A2,
            rfss: Some(3),
            site: Some(7),
        };
        assert_eq!(node.to_string(), "BEE00.1A2.3.7");
    }

    #[test]
    fn test_as_u32() {
        assert_eq!(Identifier::unit(42, Role::To).as_u32(), Some(42));
        assert_eq!(Identifier::frequency_band(9).as_u32(), Some(9));
        assert_eq!(
            Identifier::telephone_number("911".into(), Role::From).as_u32(),
            None
        );
    }

    #[test]
    fn test_form_labels_cover_all_forms() {
        assert_eq!(form_label(Form::Talkgroup), "TG");
        assert_eq!(form_label(Form::TelephoneNumber), "TEL");
        assert_eq!(FORM_LABELS.len(), 10);
    }

    #[test]
    fn test_serialize_identifier() {
        let id = Identifier::talkgroup(100, Role::To);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"form":"TALKGROUP","role":"TO","value":100}"#);
    }
}
