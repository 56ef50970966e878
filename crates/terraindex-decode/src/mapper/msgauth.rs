//! Delegated authorizations: grant, revoke and execute-on-behalf.
//!
//! Columbus-4 uses the `msgauth` module; columbus-5 the `authz` module. Both
//! map onto the same three kinds.

use terraindex_core::{Encoding, SubsetEvent};

use super::{account, decode, event, timestamp_text, MapContext, MessageRef, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::{
    AminoMsgGrantAuthorization, GenericAuthorization, MsgExecAuthorized, MsgRevokeAuthorization,
    ProtoMsgGrant,
};
use crate::wire::unpack;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::MsgauthGrantAuthorization, grant_authorization);
    registry.register(MsgKind::MsgauthRevokeAuthorization, revoke_authorization);
    registry.register(MsgKind::MsgauthExecDelegated, exec_delegated);
}

/// Message type an authorization covers.
fn authorized_type(bytes: &[u8], ctx: &MapContext<'_>) -> Result<String, MapError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    let auth = unpack(bytes, ctx.encoding)?;
    Ok(match auth.type_tag.as_str() {
        "msgauth/SendAuthorization" => "send".to_string(),
        "/cosmos.bank.v1beta1.SendAuthorization" => "/cosmos.bank.v1beta1.MsgSend".to_string(),
        "msgauth/GenericAuthorization" | "/cosmos.authz.v1beta1.GenericAuthorization" => {
            decode::<GenericAuthorization>(&auth.payload, "GenericAuthorization")?.msg
        }
        other => other.to_string(),
    })
}

fn grant_authorization(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    match ctx.encoding {
        Encoding::Amino => {
            let msg: AminoMsgGrantAuthorization = decode(bytes, "MsgGrantAuthorization")?;
            Ok(event(MsgKind::MsgauthGrantAuthorization)
                .with_node("grantee", account(&msg.grantee, ctx, "grantee")?)
                .with_node("granter", account(&msg.granter, ctx, "granter")?)
                .with_additional("type", vec![authorized_type(&msg.authorization, ctx)?])
                .with_additional("period", vec![period_text(msg.period)]))
        }
        Encoding::Proto => {
            let msg: ProtoMsgGrant = decode(bytes, "MsgGrant")?;
            let grant = msg.grant.unwrap_or_default();
            let mut se = event(MsgKind::MsgauthGrantAuthorization)
                .with_node("grantee", account(&msg.grantee, ctx, "grantee")?)
                .with_node("granter", account(&msg.granter, ctx, "granter")?)
                .with_additional("type", vec![authorized_type(&grant.authorization, ctx)?]);
            if let Some(expiration) = grant.expiration.as_ref().and_then(timestamp_text) {
                se = se.with_additional("expiration", vec![expiration]);
            }
            Ok(se)
        }
    }
}

/// Grant period in whole seconds, e.g. `31536000s`.
fn period_text(nanos: i64) -> String {
    format!("{}s", nanos / 1_000_000_000)
}

fn revoke_authorization(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgRevokeAuthorization = decode(bytes, "MsgRevokeAuthorization")?;
    Ok(event(MsgKind::MsgauthRevokeAuthorization)
        .with_node("grantee", account(&msg.grantee, ctx, "grantee")?)
        .with_node("granter", account(&msg.granter, ctx, "granter")?)
        .with_additional("type", vec![msg.msg_type]))
}

fn exec_delegated(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgExecAuthorized = decode(bytes, "MsgExecAuthorized")?;
    let inner_ctx = ctx.nested()?;

    let mut se = event(MsgKind::MsgauthExecDelegated)
        .with_node("grantee", account(&msg.grantee, ctx, "grantee")?);
    for (index, raw) in msg.msgs.iter().enumerate() {
        let wrap = |source: MapError| MapError::Nested {
            index,
            source: Box::new(source),
        };
        let inner = MessageRef::resolve(unpack(raw, ctx.encoding).map_err(|e| wrap(e.into()))?);
        let sub = ctx.registry.map(&inner, &inner_ctx).map_err(wrap)?;
        se.sub.push(sub);
    }
    Ok(se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;
    use crate::mapper::MAX_NESTING_DEPTH;
    use crate::wire::amino::pack_interface;
    use crate::wire::msgs::{MsgSend, ProtoGrant, Timestamp};
    use crate::wire::proto::Any;
    use crate::wire::Coin;
    use prost::Message;

    fn proto_send() -> Vec<u8> {
        Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".into(),
            value: MsgSend {
                from_address: b"terra1granter".to_vec(),
                to_address: b"terra1to".to_vec(),
                amount: vec![Coin::new("uluna", "9")],
            }
            .encode_to_vec(),
        }
        .encode_to_vec()
    }

    fn proto_exec(msgs: Vec<Vec<u8>>) -> Vec<u8> {
        Any {
            type_url: "/cosmos.authz.v1beta1.MsgExec".into(),
            value: MsgExecAuthorized {
                grantee: b"terra1grantee".to_vec(),
                msgs,
            }
            .encode_to_vec(),
        }
        .encode_to_vec()
    }

    #[test]
    fn amino_grant_generic() {
        let msg = AminoMsgGrantAuthorization {
            granter: FROM.to_vec(),
            grantee: TO.to_vec(),
            authorization: pack_interface(
                "msgauth/GenericAuthorization",
                &GenericAuthorization { msg: "swap".into() }.encode_to_vec(),
            ),
            period: 31_536_000_000_000_000,
        };
        let se = map_amino(MsgKind::MsgauthGrantAuthorization, &msg).unwrap();
        assert_eq!(se.node["granter"][0].id, bech(&FROM, "terra"));
        assert_eq!(se.node["grantee"][0].id, bech(&TO, "terra"));
        assert_eq!(se.additional["type"], vec!["swap"]);
        assert_eq!(se.additional["period"], vec!["31536000s"]);
    }

    #[test]
    fn proto_grant_send_authorization() {
        let msg = ProtoMsgGrant {
            granter: b"terra1granter".to_vec(),
            grantee: b"terra1grantee".to_vec(),
            grant: Some(ProtoGrant {
                authorization: Any {
                    type_url: "/cosmos.bank.v1beta1.SendAuthorization".into(),
                    value: vec![],
                }
                .encode_to_vec(),
                expiration: Some(Timestamp {
                    seconds: 0,
                    nanos: 0,
                }),
            }),
        };
        let se = map_proto(MsgKind::MsgauthGrantAuthorization, &msg).unwrap();
        assert_eq!(se.additional["type"], vec!["/cosmos.bank.v1beta1.MsgSend"]);
        assert_eq!(se.additional["expiration"], vec!["1970-01-01T00:00:00Z"]);
    }

    #[test]
    fn revoke_keeps_type() {
        let msg = MsgRevokeAuthorization {
            granter: b"terra1a".to_vec(),
            grantee: b"terra1b".to_vec(),
            msg_type: "/cosmos.bank.v1beta1.MsgSend".into(),
        };
        let se = map_proto(MsgKind::MsgauthRevokeAuthorization, &msg).unwrap();
        assert_eq!(se.additional["type"], vec!["/cosmos.bank.v1beta1.MsgSend"]);
    }

    #[test]
    fn exec_maps_inner_messages() {
        let msg = MsgExecAuthorized {
            grantee: b"terra1grantee".to_vec(),
            msgs: vec![proto_send(), proto_send()],
        };
        let se = map_proto(MsgKind::MsgauthExecDelegated, &msg).unwrap();
        assert_eq!(se.node["grantee"][0].id, "terra1grantee");
        assert_eq!(se.sub.len(), 2);
        assert_eq!(se.sub[0].primary_type(), "send");
        assert_eq!(se.sub[1].sender[0].account.id, "terra1granter");
    }

    #[test]
    fn amino_exec_resolves_prefixes() {
        let send = MsgSend {
            from_address: FROM.to_vec(),
            to_address: TO.to_vec(),
            amount: vec![],
        };
        let msg = MsgExecAuthorized {
            grantee: TO.to_vec(),
            msgs: vec![pack_interface("bank/MsgSend", &send.encode_to_vec())],
        };
        let se = map_amino(MsgKind::MsgauthExecDelegated, &msg).unwrap();
        assert_eq!(se.sub[0].recipient[0].account.id, bech(&TO, "terra"));
    }

    #[test]
    fn allowed_nesting_depth() {
        let mut inner = proto_send();
        for _ in 0..MAX_NESTING_DEPTH - 1 {
            inner = proto_exec(vec![inner]);
        }
        let msg = MsgExecAuthorized {
            grantee: b"terra1grantee".to_vec(),
            msgs: vec![inner],
        };
        assert!(map_proto(MsgKind::MsgauthExecDelegated, &msg).is_ok());
    }

    #[test]
    fn excessive_nesting_is_broken() {
        let mut inner = proto_send();
        for _ in 0..MAX_NESTING_DEPTH + 1 {
            inner = proto_exec(vec![inner]);
        }
        let msg = MsgExecAuthorized {
            grantee: b"terra1grantee".to_vec(),
            msgs: vec![inner],
        };
        let err = map_proto(MsgKind::MsgauthExecDelegated, &msg).unwrap_err();
        assert!(!err.is_unknown());
        let mut cause = &err;
        while let MapError::Nested { source, .. } = cause {
            cause = &**source;
        }
        assert!(matches!(cause, MapError::NestingTooDeep { max: 4 }));
    }

    #[test]
    fn unknown_inner_message_is_broken() {
        let msg = MsgExecAuthorized {
            grantee: b"terra1grantee".to_vec(),
            msgs: vec![Any {
                type_url: "/cosmos.feegrant.v1beta1.MsgGrantAllowance".into(),
                value: vec![],
            }
            .encode_to_vec()],
        };
        let err = map_proto(MsgKind::MsgauthExecDelegated, &msg).unwrap_err();
        assert!(matches!(err, MapError::Nested { index: 0, .. }));
        assert!(!err.is_unknown());
    }
}
