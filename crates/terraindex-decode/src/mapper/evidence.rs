use terraindex_core::{AddressRole, SubsetEvent};

use super::{account, address, decode, event, timestamp_text, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::{Equivocation, MsgSubmitEvidence};
use crate::wire::unpack;

const EQUIVOCATION_TAGS: &[&str] = &[
    "cosmos-sdk/Equivocation",
    "evidence/Equivocation",
    "/cosmos.evidence.v1beta1.Equivocation",
];

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::EvidenceSubmitEvidence, submit_evidence);
}

fn submit_evidence(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSubmitEvidence = decode(bytes, "MsgSubmitEvidence")?;
    let mut se = event(MsgKind::EvidenceSubmitEvidence)
        .with_node("submitter", account(&msg.submitter, ctx, "submitter")?);

    if msg.evidence.is_empty() {
        return Ok(se);
    }
    let evidence = unpack(&msg.evidence, ctx.encoding)?;
    se = se.with_additional("evidence_type", vec![evidence.type_tag.clone()]);

    if EQUIVOCATION_TAGS.contains(&evidence.type_tag.as_str()) {
        let eq: Equivocation = decode(&evidence.payload, "Equivocation")?;
        let consensus = address(
            &eq.consensus_address,
            AddressRole::ValidatorConsensus,
            ctx,
            "consensus_address",
        )?;
        se = se
            .with_additional("evidence_height", vec![eq.height.to_string()])
            .with_additional("evidence_validator_power", vec![eq.power.to_string()])
            .with_additional("evidence_consensus", vec![consensus]);
        if let Some(time) = eq.time.as_ref().and_then(timestamp_text) {
            se = se.with_additional("evidence_time", vec![time]);
        }
    }
    Ok(se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;
    use crate::wire::amino::pack_interface;
    use crate::wire::msgs::Timestamp;
    use crate::wire::proto::Any;
    use prost::Message;

    #[test]
    fn amino_equivocation() {
        let eq = Equivocation {
            height: 1200,
            time: Some(Timestamp {
                seconds: 1_600_000_000,
                nanos: 0,
            }),
            power: 42,
            consensus_address: VALOPER.to_vec(),
        };
        let msg = MsgSubmitEvidence {
            submitter: FROM.to_vec(),
            evidence: pack_interface("cosmos-sdk/Equivocation", &eq.encode_to_vec()),
        };
        let se = map_amino(MsgKind::EvidenceSubmitEvidence, &msg).unwrap();
        assert_eq!(se.node["submitter"][0].id, bech(&FROM, "terra"));
        assert_eq!(se.additional["evidence_height"], vec!["1200"]);
        assert_eq!(se.additional["evidence_validator_power"], vec!["42"]);
        assert_eq!(se.additional["evidence_consensus"], vec![bech(&VALOPER, "terravalcons")]);
        assert_eq!(se.additional["evidence_time"], vec!["2020-09-13T12:26:40Z"]);
    }

    #[test]
    fn proto_unknown_evidence_keeps_type() {
        let msg = MsgSubmitEvidence {
            submitter: b"terra1s".to_vec(),
            evidence: Any {
                type_url: "/custom.Evidence".into(),
                value: vec![1],
            }
            .encode_to_vec(),
        };
        let se = map_proto(MsgKind::EvidenceSubmitEvidence, &msg).unwrap();
        assert_eq!(se.additional["evidence_type"], vec!["/custom.Evidence"]);
        assert!(!se.additional.contains_key("evidence_height"));
    }
}
