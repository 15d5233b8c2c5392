//! TSBK dispatcher: verify the burst, resolve vendor and opcode, and decode
//! the arguments with the matching layout.
//!
//! Decoders live in a static table keyed by [`Opcode`]. Opcodes already carry
//! their direction, so an outbound layout can never be looked up for an
//! inbound burst. Opcodes without an entry fall back to the direction's
//! unknown body.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::bits::BinaryMessage;
use crate::opcode::Opcode;
use crate::reference::{DataUnitId, Direction, Vendor};

use super::layout::{
    ChannelUnitPair, ChannelUpdates, ExplicitGroupGrant, GroupGrant, ServiceUnitPair,
    StatusExchange, UnitPair,
};
use super::{
    isp, osp, read_encrypted, read_opcode, read_opcode_value, read_vendor, Body,
    EncryptedPayload, Tsbk, UnknownMessage, VerifiedBurst, ARGUMENTS,
};

type DecodeFn = fn(&BinaryMessage) -> Body;

fn build_standard_table() -> HashMap<Opcode, DecodeFn> {
    let entries: [(Opcode, DecodeFn); 47] = [
        // Inbound
        (Opcode::IspGroupVoiceServiceRequest, |m| {
            Body::GroupVoiceServiceRequest(isp::GroupServiceRequest::decode(m))
        }),
        (Opcode::IspUnitToUnitVoiceServiceRequest, |m| {
            Body::UnitToUnitVoiceServiceRequest(ServiceUnitPair::decode(m))
        }),
        (Opcode::IspUnitToUnitAnswerResponse, |m| {
            Body::UnitToUnitAnswerResponse(isp::UnitToUnitAnswerResponse::decode(m))
        }),
        (Opcode::IspTelephoneInterconnectPstnRequest, |m| {
            Body::TelephoneInterconnectPstnRequest(isp::PstnRequest::decode(m))
        }),
        (Opcode::IspTelephoneInterconnectAnswerResponse, |m| {
            Body::TelephoneInterconnectAnswerResponse(isp::TelephoneAnswerResponse::decode(m))
        }),
        (Opcode::IspIndividualDataServiceRequest, |m| {
            Body::IndividualDataServiceRequest(ServiceUnitPair::decode(m))
        }),
        (Opcode::IspStatusUpdateRequest, |m| Body::StatusUpdateRequest(StatusExchange::decode(m))),
        (Opcode::IspStatusQueryResponse, |m| Body::StatusQueryResponse(StatusExchange::decode(m))),
        (Opcode::IspStatusQueryRequest, |m| Body::StatusQueryRequest(UnitPair::decode(m))),
        (Opcode::IspMessageUpdateRequest, |m| {
            Body::MessageUpdateRequest(isp::MessageUpdate::decode(m))
        }),
        (Opcode::IspRadioUnitMonitorRequest, |m| {
            Body::RadioUnitMonitorRequest(isp::RadioUnitMonitorRequest::decode(m))
        }),
        (Opcode::IspCallAlertRequest, |m| Body::CallAlertRequest(UnitPair::decode(m))),
        (Opcode::IspUnitAcknowledgeResponse, |m| {
            Body::UnitAcknowledgeResponse(isp::UnitAcknowledge::decode(m))
        }),
        (Opcode::IspCancelServiceRequest, |m| {
            Body::CancelServiceRequest(isp::CancelServiceRequest::decode(m))
        }),
        (Opcode::IspExtendedFunctionResponse, |m| {
            Body::ExtendedFunctionResponse(isp::ExtendedFunctionResponse::decode(m))
        }),
        (Opcode::IspEmergencyAlarmRequest, |m| {
            Body::EmergencyAlarmRequest(isp::EmergencyAlarmRequest::decode(m))
        }),
        (Opcode::IspGroupAffiliationRequest, |m| {
            Body::GroupAffiliationRequest(isp::GroupAffiliationRequest::decode(m))
        }),
        (Opcode::IspGroupAffiliationQueryResponse, |m| {
            Body::GroupAffiliationQueryResponse(isp::GroupAffiliationQueryResponse::decode(m))
        }),
        (Opcode::IspUnitDeRegistrationRequest, |m| {
            Body::UnitDeRegistrationRequest(isp::NodeRequest::decode(m))
        }),
        (Opcode::IspUnitRegistrationRequest, |m| {
            Body::UnitRegistrationRequest(isp::UnitRegistrationRequest::decode(m))
        }),
        (Opcode::IspLocationRegistrationRequest, |m| {
            Body::LocationRegistrationRequest(isp::LocationRegistrationRequest::decode(m))
        }),
        (Opcode::IspProtectionParameterRequest, |m| {
            Body::ProtectionParameterRequest(isp::ProtectionParameterRequest::decode(m))
        }),
        (Opcode::IspIdentifierUpdateRequest, |m| {
            Body::IdentifierUpdateRequest(isp::IdentifierUpdateRequest::decode(m))
        }),
        (Opcode::IspRoamingAddressRequest, |m| {
            Body::RoamingAddressRequest(isp::NodeRequest::decode(m))
        }),
        (Opcode::IspRoamingAddressResponse, |m| {
            Body::RoamingAddressResponse(isp::RoamingAddressResponse::decode(m))
        }),
        (Opcode::IspAuthenticationQuery, |m| Body::AuthenticationQuery(UnitPair::decode(m))),
        // Outbound
        (Opcode::OspGroupVoiceChannelGrant, |m| {
            Body::GroupVoiceChannelGrant(GroupGrant::decode(m))
        }),
        (Opcode::OspGroupVoiceChannelGrantUpdate, |m| {
            Body::GroupVoiceChannelGrantUpdate(ChannelUpdates::decode(m))
        }),
        (Opcode::OspGroupVoiceChannelGrantUpdateExplicit, |m| {
            Body::GroupVoiceChannelGrantUpdateExplicit(ExplicitGroupGrant::decode(m))
        }),
        (Opcode::OspUnitToUnitVoiceChannelGrant, |m| {
            Body::UnitToUnitVoiceChannelGrant(ChannelUnitPair::decode(m))
        }),
        (Opcode::OspUnitToUnitAnswerRequest, |m| {
            Body::UnitToUnitAnswerRequest(ServiceUnitPair::decode(m))
        }),
        (Opcode::OspUnitToUnitVoiceChannelGrantUpdate, |m| {
            Body::UnitToUnitVoiceChannelGrantUpdate(ChannelUnitPair::decode(m))
        }),
        (Opcode::OspTelephoneInterconnectVoiceChannelGrant, |m| {
            Body::TelephoneInterconnectVoiceChannelGrant(osp::TelephoneGrant::decode(m))
        }),
        (Opcode::OspTelephoneInterconnectVoiceChannelGrantUpdate, |m| {
            Body::TelephoneInterconnectVoiceChannelGrantUpdate(osp::TelephoneGrant::decode(m))
        }),
        (Opcode::OspTelephoneInterconnectAnswerRequest, |m| {
            Body::TelephoneInterconnectAnswerRequest(osp::TelephoneAnswerRequest::decode(m))
        }),
        (Opcode::OspIndividualDataChannelGrant, |m| {
            Body::IndividualDataChannelGrant(ChannelUnitPair::decode(m))
        }),
        (Opcode::OspGroupDataChannelGrant, |m| Body::GroupDataChannelGrant(GroupGrant::decode(m))),
        (Opcode::OspGroupDataChannelAnnouncement, |m| {
            Body::GroupDataChannelAnnouncement(ChannelUpdates::decode(m))
        }),
        (Opcode::OspGroupDataChannelAnnouncementExplicit, |m| {
            Body::GroupDataChannelAnnouncementExplicit(ExplicitGroupGrant::decode(m))
        }),
        (Opcode::OspCallAlert, |m| Body::CallAlert(UnitPair::decode(m))),
        (Opcode::OspAcknowledgeResponse, |m| {
            Body::AcknowledgeResponse(osp::AcknowledgeResponse::decode(m))
        }),
        (Opcode::OspExtendedFunctionCommand, |m| {
            Body::ExtendedFunctionCommand(osp::ExtendedFunctionCommand::decode(m))
        }),
        (Opcode::OspDenyResponse, |m| Body::DenyResponse(osp::DenyResponse::decode(m))),
        (Opcode::OspGroupAffiliationResponse, |m| {
            Body::GroupAffiliationResponse(osp::GroupAffiliationResponse::decode(m))
        }),
        (Opcode::OspGroupAffiliationQuery, |m| Body::GroupAffiliationQuery(UnitPair::decode(m))),
        (Opcode::OspAuthenticationCommand, |m| {
            Body::AuthenticationCommand(osp::AuthenticationCommand::decode(m))
        }),
        (Opcode::OspAdjacentStatusBroadcast, |m| {
            Body::AdjacentStatusBroadcast(osp::AdjacentStatusBroadcast::decode(m))
        }),
    ];
    entries.into_iter().collect()
}

static STANDARD_DECODERS: LazyLock<HashMap<Opcode, DecodeFn>> =
    LazyLock::new(build_standard_table);

/// Decoders for a vendor's command set.
fn decoders_for(vendor: Vendor) -> &'static HashMap<Opcode, DecodeFn> {
    match vendor {
        Vendor::Standard => &STANDARD_DECODERS,
        // No vendor-specific command sets are decoded yet; their blocks are
        // read with the standard layouts.
        _ => &STANDARD_DECODERS,
    }
}

fn encrypted_body(message: &BinaryMessage, opcode: Opcode, direction: Direction) -> Body {
    let payload = EncryptedPayload {
        opcode,
        arguments: message.get_long(ARGUMENTS),
    };
    match direction {
        Direction::Inbound => Body::EncryptedInbound(payload),
        Direction::Outbound => Body::EncryptedOutbound(payload),
    }
}

fn unknown_body(message: &BinaryMessage, direction: Direction) -> Body {
    let unknown = UnknownMessage {
        opcode: read_opcode_value(message),
        arguments: message.get_long(ARGUMENTS),
    };
    match direction {
        Direction::Inbound => Body::UnknownInbound(unknown),
        Direction::Outbound => Body::UnknownOutbound(unknown),
    }
}

/// Decode one received TSBK.
///
/// Never fails: damaged blocks come back invalid, unassigned opcodes come
/// back as the direction's unknown body, and encrypted blocks keep their
/// arguments uninterpreted.
pub fn create(
    direction: Direction,
    duid: DataUnitId,
    message: BinaryMessage,
    nac: u16,
    timestamp: f64,
) -> Tsbk {
    let burst = VerifiedBurst::verify(duid, message, nac, timestamp);
    let corrected = burst.message();

    let vendor = read_vendor(corrected);
    let opcode = read_opcode(corrected, direction);

    let body = match decoders_for(vendor).get(&opcode) {
        None => unknown_body(corrected, direction),
        Some(_) if read_encrypted(corrected) => encrypted_body(corrected, opcode, direction),
        Some(decode) => decode(corrected),
    };

    Tsbk::new(burst, direction, body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;
    use crate::identifier::{Channel, Form, Identifier, Role};
    use crate::opcode::OPCODE_TABLE;
    use crate::tsbk::tests::block;
    use crate::tsbk::{ENCRYPTION_FLAG, OPCODE};

    fn decode(direction: Direction, msg: BinaryMessage) -> Tsbk {
        create(direction, DataUnitId::Tsbk1, msg, 0x1F3, 10.0)
    }

    #[test]
    fn test_every_known_opcode_has_decoder() {
        for info in OPCODE_TABLE {
            assert!(
                STANDARD_DECODERS.contains_key(&info.opcode),
                "missing decoder for {}",
                info.label
            );
        }
        assert_eq!(STANDARD_DECODERS.len(), OPCODE_TABLE.len());
    }

    #[test]
    fn test_decoded_opcode_matches_table() {
        for info in OPCODE_TABLE {
            let tsbk = decode(info.direction, block(false, info.code, 0x00, 0));
            assert_eq!(tsbk.opcode(), info.opcode, "{}", info.label);
            assert!(!tsbk.body().is_unknown(), "{}", info.label);
        }
    }

    #[test]
    fn test_unknown_inbound_fallback() {
        let tsbk = decode(Direction::Inbound, block(false, 0x3C, 0x00, 0xABCD));
        assert_eq!(tsbk.opcode(), Opcode::IspUnknown);
        assert_eq!(
            tsbk.body(),
            &Body::UnknownInbound(UnknownMessage {
                opcode: 0x3C,
                arguments: 0xABCD
            })
        );
        assert!(tsbk.identifiers().is_empty());
        assert_eq!(tsbk.message_stub(), "UNKNOWN ISP OPCODE VENDOR:STANDARD");
    }

    #[test]
    fn test_unknown_outbound_fallback() {
        let tsbk = decode(Direction::Outbound, block(false, 0x3F, 0x00, 1));
        assert!(matches!(tsbk.body(), Body::UnknownOutbound(u) if u.opcode == 0x3F));
        assert!(tsbk.identifiers().is_empty());
    }

    #[test]
    fn test_unknown_opcode_stays_unknown_when_encrypted() {
        let tsbk = decode(Direction::Inbound, block(true, 0x3C, 0x00, 0));
        assert!(tsbk.body().is_unknown());
    }

    #[test]
    fn test_direction_flip_changes_variant() {
        let msg = block(false, 0x00, 0x00, 0x0010_6400_6400_0000);
        let outbound = decode(Direction::Outbound, msg.clone());
        let inbound = decode(Direction::Inbound, msg);
        assert!(matches!(outbound.body(), Body::GroupVoiceChannelGrant(_)));
        assert!(matches!(inbound.body(), Body::GroupVoiceServiceRequest(_)));
        assert_ne!(outbound.opcode(), inbound.opcode());
        assert_ne!(outbound.identifiers(), inbound.identifiers());
    }

    #[test]
    fn test_direction_flip_changes_encrypted_variant() {
        let msg = block(true, 0x00, 0x00, 0x0210_6400_6412_3456);
        let outbound = decode(Direction::Outbound, msg.clone());
        let inbound = decode(Direction::Inbound, msg);
        assert_eq!(
            outbound.body(),
            &Body::EncryptedOutbound(EncryptedPayload {
                opcode: Opcode::OspGroupVoiceChannelGrant,
                arguments: 0x0210_6400_6412_3456,
            })
        );
        assert_eq!(
            inbound.body(),
            &Body::EncryptedInbound(EncryptedPayload {
                opcode: Opcode::IspGroupVoiceServiceRequest,
                arguments: 0x0210_6400_6412_3456,
            })
        );
        assert_ne!(outbound.body(), inbound.body());
        assert!(outbound.body().is_encrypted() && inbound.body().is_encrypted());
        assert!(outbound.identifiers().is_empty());
    }

    #[test]
    fn test_explicit_grant_scenario() {
        // SO 0, reserved, DL channel 0x1064, UL channel 0x1065, group 0x0ABC
        let tsbk = decode(
            Direction::Outbound,
            block(false, 0x03, 0x00, 0x0000_1064_1065_0ABC),
        );
        assert!(tsbk.is_valid());
        let ids = tsbk.identifiers();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].form, Form::Talkgroup);
        assert_eq!(ids[0].as_u32(), Some(0x0ABC));
        assert_eq!(ids[1].form, Form::Channel);
        assert_eq!(
            ids[1],
            Identifier::channel(Channel::explicit(0x1064, 0x1065))
        );
    }

    #[test]
    fn test_group_grant_identifier_order() {
        // SO 0x02, CH 0x1064, group 100, source 0x123456
        let tsbk = decode(
            Direction::Outbound,
            block(false, 0x00, 0x00, 0x0210_6400_6412_3456),
        );
        assert_eq!(
            tsbk.identifiers(),
            vec![
                Identifier::unit(0x123456, Role::From),
                Identifier::talkgroup(100, Role::To),
                Identifier::channel(Channel::Standard { band: 1, number: 100 }),
            ]
        );
    }

    #[test]
    fn test_vendor_routes_to_standard_table() {
        for vendor in [0x01, 0x90, 0xA4, 0xD8, 0x42] {
            let tsbk = decode(Direction::Outbound, block(false, 0x1F, vendor, 0));
            assert!(matches!(tsbk.body(), Body::CallAlert(_)));
            assert_eq!(tsbk.vendor().value(), vendor);
        }
    }

    #[test]
    fn test_opcode_read_after_correction() {
        // A single error in the opcode field must not misroute the block.
        let mut msg = block(false, 0x00, 0x00, 0x0210_6400_6412_3456);
        msg.flip(OPCODE.start + 5);
        let tsbk = decode(Direction::Outbound, msg);
        assert_eq!(tsbk.corrected_bits(), 1);
        assert!(matches!(tsbk.body(), Body::GroupVoiceChannelGrant(_)));
    }

    #[test]
    fn test_encryption_flag_after_correction() {
        let mut msg = block(false, 0x00, 0x00, 0);
        msg.flip(ENCRYPTION_FLAG);
        let tsbk = decode(Direction::Outbound, msg);
        assert!(!tsbk.is_encrypted());
        assert!(matches!(tsbk.body(), Body::GroupVoiceChannelGrant(_)));
    }

    #[test]
    fn test_invalid_block_still_decodes_body() {
        let mut msg = block(false, 0x1F, 0x00, 0);
        msg.flip(30);
        msg.flip(31);
        let tsbk = decode(Direction::Outbound, msg);
        assert!(!tsbk.is_valid());
        assert_eq!(tsbk.corrected_bits(), crc::UNCORRECTABLE);
        assert!(matches!(tsbk.body(), Body::CallAlert(_)));
    }
}
