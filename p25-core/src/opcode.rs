//! Standard TSBK opcodes.
//!
//! The 6-bit opcode is meaningless without the traffic direction: inbound and
//! outbound packets assign the same numbers independently (0x00 is a group
//! voice service request inbound and a group voice channel grant outbound).
//! Every (code, direction) pair resolves to some opcode; codes missing from
//! the table resolve to the direction's unknown sentinel.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

use crate::reference::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    // Inbound signalling packets
    IspGroupVoiceServiceRequest,
    IspUnitToUnitVoiceServiceRequest,
    IspUnitToUnitAnswerResponse,
    IspTelephoneInterconnectPstnRequest,
    IspTelephoneInterconnectAnswerResponse,
    IspIndividualDataServiceRequest,
    IspStatusUpdateRequest,
    IspStatusQueryResponse,
    IspStatusQueryRequest,
    IspMessageUpdateRequest,
    IspRadioUnitMonitorRequest,
    IspCallAlertRequest,
    IspUnitAcknowledgeResponse,
    IspCancelServiceRequest,
    IspExtendedFunctionResponse,
    IspEmergencyAlarmRequest,
    IspGroupAffiliationRequest,
    IspGroupAffiliationQueryResponse,
    IspUnitDeRegistrationRequest,
    IspUnitRegistrationRequest,
    IspLocationRegistrationRequest,
    IspProtectionParameterRequest,
    IspIdentifierUpdateRequest,
    IspRoamingAddressRequest,
    IspRoamingAddressResponse,
    IspAuthenticationQuery,
    IspUnknown,

    // Outbound signalling packets
    OspGroupVoiceChannelGrant,
    OspGroupVoiceChannelGrantUpdate,
    OspGroupVoiceChannelGrantUpdateExplicit,
    OspUnitToUnitVoiceChannelGrant,
    OspUnitToUnitAnswerRequest,
    OspUnitToUnitVoiceChannelGrantUpdate,
    OspTelephoneInterconnectVoiceChannelGrant,
    OspTelephoneInterconnectVoiceChannelGrantUpdate,
    OspTelephoneInterconnectAnswerRequest,
    OspIndividualDataChannelGrant,
    OspGroupDataChannelGrant,
    OspGroupDataChannelAnnouncement,
    OspGroupDataChannelAnnouncementExplicit,
    OspCallAlert,
    OspAcknowledgeResponse,
    OspExtendedFunctionCommand,
    OspDenyResponse,
    OspGroupAffiliationResponse,
    OspGroupAffiliationQuery,
    OspAuthenticationCommand,
    OspAdjacentStatusBroadcast,
    OspUnknown,
}

/// Metadata for a standard opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub opcode: Opcode,
    pub direction: Direction,
    pub code: u8,
    pub label: &'static str,
}

const fn isp(opcode: Opcode, code: u8, label: &'static str) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        direction: Direction::Inbound,
        code,
        label,
    }
}

const fn osp(opcode: Opcode, code: u8, label: &'static str) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        direction: Direction::Outbound,
        code,
        label,
    }
}

/// Known standard opcode table.
pub const OPCODE_TABLE: &[OpcodeInfo] = &[
    isp(Opcode::IspGroupVoiceServiceRequest, 0x00, "GROUP VOICE SERVICE REQUEST"),
    isp(Opcode::IspUnitToUnitVoiceServiceRequest, 0x04, "UNIT-TO-UNIT VOICE SERVICE REQUEST"),
    isp(Opcode::IspUnitToUnitAnswerResponse, 0x05, "UNIT-TO-UNIT ANSWER RESPONSE"),
    isp(Opcode::IspTelephoneInterconnectPstnRequest, 0x08, "TELEPHONE INTERCONNECT PSTN REQUEST"),
    isp(
        Opcode::IspTelephoneInterconnectAnswerResponse,
        0x0A,
        "TELEPHONE INTERCONNECT ANSWER RESPONSE",
    ),
    isp(Opcode::IspIndividualDataServiceRequest, 0x10, "INDIVIDUAL DATA SERVICE REQUEST"),
    isp(Opcode::IspStatusUpdateRequest, 0x18, "STATUS UPDATE REQUEST"),
    isp(Opcode::IspStatusQueryResponse, 0x19, "STATUS QUERY RESPONSE"),
    isp(Opcode::IspStatusQueryRequest, 0x1A, "STATUS QUERY REQUEST"),
    isp(Opcode::IspMessageUpdateRequest, 0x1C, "MESSAGE UPDATE REQUEST"),
    isp(Opcode::IspRadioUnitMonitorRequest, 0x1D, "RADIO UNIT MONITOR REQUEST"),
    isp(Opcode::IspCallAlertRequest, 0x1F, "CALL ALERT REQUEST"),
    isp(Opcode::IspUnitAcknowledgeResponse, 0x20, "UNIT ACKNOWLEDGE RESPONSE"),
    isp(Opcode::IspCancelServiceRequest, 0x23, "CANCEL SERVICE REQUEST"),
    isp(Opcode::IspExtendedFunctionResponse, 0x24, "EXTENDED FUNCTION RESPONSE"),
    isp(Opcode::IspEmergencyAlarmRequest, 0x27, "EMERGENCY ALARM REQUEST"),
    isp(Opcode::IspGroupAffiliationRequest, 0x28, "GROUP AFFILIATION REQUEST"),
    isp(Opcode::IspGroupAffiliationQueryResponse, 0x29, "GROUP AFFILIATION QUERY RESPONSE"),
    isp(Opcode::IspUnitDeRegistrationRequest, 0x2B, "UNIT DE-REGISTRATION REQUEST"),
    isp(Opcode::IspUnitRegistrationRequest, 0x2C, "UNIT REGISTRATION REQUEST"),
    isp(Opcode::IspLocationRegistrationRequest, 0x2D, "LOCATION REGISTRATION REQUEST"),
    isp(Opcode::IspProtectionParameterRequest, 0x30, "PROTECTION PARAMETER REQUEST"),
    isp(Opcode::IspIdentifierUpdateRequest, 0x32, "IDENTIFIER UPDATE REQUEST"),
    isp(Opcode::IspRoamingAddressRequest, 0x36, "ROAMING ADDRESS REQUEST"),
    isp(Opcode::IspRoamingAddressResponse, 0x37, "ROAMING ADDRESS RESPONSE"),
    isp(Opcode::IspAuthenticationQuery, 0x38, "AUTHENTICATION QUERY"),
    osp(Opcode::OspGroupVoiceChannelGrant, 0x00, "GROUP VOICE CHANNEL GRANT"),
    osp(Opcode::OspGroupVoiceChannelGrantUpdate, 0x02, "GROUP VOICE CHANNEL GRANT UPDATE"),
    osp(
        Opcode::OspGroupVoiceChannelGrantUpdateExplicit,
        0x03,
        "GROUP VOICE CHANNEL GRANT UPDATE EXPLICIT",
    ),
    osp(Opcode::OspUnitToUnitVoiceChannelGrant, 0x04, "UNIT-TO-UNIT VOICE CHANNEL GRANT"),
    osp(Opcode::OspUnitToUnitAnswerRequest, 0x05, "UNIT-TO-UNIT ANSWER REQUEST"),
    osp(
        Opcode::OspUnitToUnitVoiceChannelGrantUpdate,
        0x06,
        "UNIT-TO-UNIT VOICE CHANNEL GRANT UPDATE",
    ),
    osp(
        Opcode::OspTelephoneInterconnectVoiceChannelGrant,
        0x08,
        "TELEPHONE INTERCONNECT VOICE CHANNEL GRANT",
    ),
    osp(
        Opcode::OspTelephoneInterconnectVoiceChannelGrantUpdate,
        0x09,
        "TELEPHONE INTERCONNECT VOICE CHANNEL GRANT UPDATE",
    ),
    osp(
        Opcode::OspTelephoneInterconnectAnswerRequest,
        0x0A,
        "TELEPHONE INTERCONNECT ANSWER REQUEST",
    ),
    osp(Opcode::OspIndividualDataChannelGrant, 0x10, "INDIVIDUAL DATA CHANNEL GRANT"),
    osp(Opcode::OspGroupDataChannelGrant, 0x11, "GROUP DATA CHANNEL GRANT"),
    osp(Opcode::OspGroupDataChannelAnnouncement, 0x12, "GROUP DATA CHANNEL ANNOUNCEMENT"),
    osp(
        Opcode::OspGroupDataChannelAnnouncementExplicit,
        0x13,
        "GROUP DATA CHANNEL ANNOUNCEMENT EXPLICIT",
    ),
    osp(Opcode::OspCallAlert, 0x1F, "CALL ALERT"),
    osp(Opcode::OspAcknowledgeResponse, 0x20, "ACKNOWLEDGE RESPONSE"),
    osp(Opcode::OspExtendedFunctionCommand, 0x24, "EXTENDED FUNCTION COMMAND"),
    osp(Opcode::OspDenyResponse, 0x27, "DENY RESPONSE"),
    osp(Opcode::OspGroupAffiliationResponse, 0x28, "GROUP AFFILIATION RESPONSE"),
    osp(Opcode::OspGroupAffiliationQuery, 0x2A, "GROUP AFFILIATION QUERY"),
    osp(Opcode::OspAuthenticationCommand, 0x31, "AUTHENTICATION COMMAND"),
    osp(Opcode::OspAdjacentStatusBroadcast, 0x3C, "ADJACENT STATUS BROADCAST"),
];

const UNKNOWN_ISP_LABEL: &str = "UNKNOWN ISP OPCODE";
const UNKNOWN_OSP_LABEL: &str = "UNKNOWN OSP OPCODE";

static BY_CODE: LazyLock<HashMap<(u8, Direction), Opcode>> = LazyLock::new(|| {
    OPCODE_TABLE
        .iter()
        .map(|info| ((info.code, info.direction), info.opcode))
        .collect()
});

impl Opcode {
    /// Resolve a raw 6-bit code in the given direction. Never fails.
    pub fn from_value(code: u8, direction: Direction) -> Opcode {
        BY_CODE
            .get(&(code & 0x3F, direction))
            .copied()
            .unwrap_or(Opcode::unknown(direction))
    }

    /// Unknown sentinel for a direction.
    pub fn unknown(direction: Direction) -> Opcode {
        match direction {
            Direction::Inbound => Opcode::IspUnknown,
            Direction::Outbound => Opcode::OspUnknown,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Opcode::IspUnknown | Opcode::OspUnknown)
    }
}

/// Look up opcode metadata. Returns `None` for the unknown sentinels.
pub fn opcode_info(opcode: Opcode) -> Option<&'static OpcodeInfo> {
    OPCODE_TABLE.iter().find(|info| info.opcode == opcode)
}

/// Display label for an opcode.
pub fn opcode_label(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::IspUnknown => UNKNOWN_ISP_LABEL,
        Opcode::OspUnknown => UNKNOWN_OSP_LABEL,
        known => opcode_info(known)
            .map(|info| info.label)
            .unwrap_or(UNKNOWN_OSP_LABEL),
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(opcode_label(*self))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_roundtrip() {
        for info in OPCODE_TABLE {
            assert_eq!(
                Opcode::from_value(info.code, info.direction),
                info.opcode,
                "{}",
                info.label
            );
        }
    }

    #[test]
    fn test_table_unique_per_direction() {
        assert_eq!(BY_CODE.len(), OPCODE_TABLE.len());
        let isp_count = OPCODE_TABLE
            .iter()
            .filter(|i| i.direction == Direction::Inbound)
            .count();
        assert_eq!(isp_count, 26);
        assert_eq!(OPCODE_TABLE.len() - isp_count, 21);
    }

    #[test]
    fn test_direction_sensitive() {
        assert_eq!(
            Opcode::from_value(0x00, Direction::Inbound),
            Opcode::IspGroupVoiceServiceRequest
        );
        assert_eq!(
            Opcode::from_value(0x00, Direction::Outbound),
            Opcode::OspGroupVoiceChannelGrant
        );
        assert_eq!(
            Opcode::from_value(0x3C, Direction::Inbound),
            Opcode::IspUnknown
        );
        assert_eq!(
            Opcode::from_value(0x3C, Direction::Outbound),
            Opcode::OspAdjacentStatusBroadcast
        );
    }

    #[test]
    fn test_every_code_maps_to_some_opcode() {
        for code in 0..64u8 {
            for direction in [Direction::Inbound, Direction::Outbound] {
                let opcode = Opcode::from_value(code, direction);
                match opcode_info(opcode) {
                    Some(info) => assert_eq!(info.direction, direction),
                    None => assert_eq!(opcode, Opcode::unknown(direction)),
                }
            }
        }
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(opcode_label(Opcode::IspUnknown), "UNKNOWN ISP OPCODE");
        assert_eq!(opcode_label(Opcode::OspUnknown), "UNKNOWN OSP OPCODE");
        assert!(Opcode::OspUnknown.is_unknown());
        assert!(opcode_info(Opcode::IspUnknown).is_none());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(
            Opcode::OspGroupVoiceChannelGrant.to_string(),
            "GROUP VOICE CHANNEL GRANT"
        );
    }
}
