//! Delegation and validator lifecycle messages.

use terraindex_core::{Account, AccountDetails, DecimalAmount, SubsetEvent};

use super::{account, coin, dec, decode, event, required, validator, with_transfers, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::transfers::KIND_REWARD;
use crate::wire::msgs::{Description, MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator};

/// Bonded tokens leave through this module account on undelegation; the
/// movement is not a reward.
pub const UNBONDED_POOL: &str = "terra1tygms3xhhs3yv487phx3dw4a95jn7t7l8l07dr";

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::StakingBeginUnbonding, begin_unbonding);
    registry.register(MsgKind::StakingDelegate, delegate);
    registry.register(MsgKind::StakingBeginRedelegate, begin_redelegate);
    registry.register(MsgKind::StakingCreateValidator, create_validator);
    registry.register(MsgKind::StakingEditValidator, edit_validator);
}

fn begin_unbonding(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgDelegate = decode(bytes, "MsgUndelegate")?;
    let se = event(MsgKind::StakingBeginUnbonding)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node("validator", validator(&msg.validator_address, ctx, "validator_address")?)
        .with_amount("undelegate", coin(required(&msg.amount, "amount")?, "amount")?);
    with_transfers(se, KIND_REWARD, UNBONDED_POOL, ctx)
}

fn delegate(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgDelegate = decode(bytes, "MsgDelegate")?;
    let se = event(MsgKind::StakingDelegate)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node("validator", validator(&msg.validator_address, ctx, "validator_address")?)
        .with_amount("delegate", coin(required(&msg.amount, "amount")?, "amount")?);
    with_transfers(se, KIND_REWARD, "", ctx)
}

fn begin_redelegate(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgBeginRedelegate = decode(bytes, "MsgBeginRedelegate")?;
    let se = event(MsgKind::StakingBeginRedelegate)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node(
            "validator_destination",
            validator(&msg.validator_dst_address, ctx, "validator_dst_address")?,
        )
        .with_node(
            "validator_source",
            validator(&msg.validator_src_address, ctx, "validator_src_address")?,
        )
        .with_amount("delegate", coin(required(&msg.amount, "amount")?, "amount")?);
    with_transfers(se, KIND_REWARD, "", ctx)
}

fn with_details(mut account: Account, description: Option<Description>) -> Account {
    account.details = description.map(|d| AccountDetails {
        moniker: d.moniker,
        identity: d.identity,
        website: d.website,
        security_contact: d.security_contact,
        details: d.details,
    });
    account
}

fn create_validator(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgCreateValidator = decode(bytes, "MsgCreateValidator")?;
    let operator = validator(&msg.validator_address, ctx, "validator_address")?;
    let commission = msg.commission.unwrap_or_default();

    Ok(event(MsgKind::StakingCreateValidator)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node("validator", with_details(operator, msg.description))
        .with_amount("self_delegation", coin(required(&msg.value, "value")?, "value")?)
        .with_amount(
            "self_delegation_min",
            DecimalAmount::parse(&msg.min_self_delegation, "").map_err(|source| MapError::Amount {
                field: "min_self_delegation",
                source,
            })?,
        )
        .with_amount("commission_rate", dec(&commission.rate, "", "commission.rate")?)
        .with_amount("commission_max_rate", dec(&commission.max_rate, "", "commission.max_rate")?)
        .with_amount(
            "commission_max_change_rate",
            dec(&commission.max_change_rate, "", "commission.max_change_rate")?,
        ))
}

fn edit_validator(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgEditValidator = decode(bytes, "MsgEditValidator")?;
    let operator = validator(&msg.validator_address, ctx, "validator_address")?;

    let mut se = event(MsgKind::StakingEditValidator).with_node("validator", with_details(operator, msg.description));
    if !msg.min_self_delegation.is_empty() {
        let min = DecimalAmount::parse(&msg.min_self_delegation, "").map_err(|source| MapError::Amount {
            field: "min_self_delegation",
            source,
        })?;
        se = se.with_amount("self_delegation_min", min);
    }
    if !msg.commission_rate.is_empty() {
        se = se.with_amount("commission_rate", dec(&msg.commission_rate, "", "commission_rate")?);
    }
    Ok(se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;
    use crate::wire::msgs::CommissionRates;
    use crate::wire::Coin;
    use terraindex_core::Encoding;

    const UNBOND_LOG: &str = r#"[{"msg_index":0,"log":"","events":[{"type":"transfer","attributes":[
        {"key":"recipient","value":"terra1tygms3xhhs3yv487phx3dw4a95jn7t7l8l07dr"},
        {"key":"amount","value":"100uluna"},
        {"key":"recipient","value":"terra1delegator"},
        {"key":"amount","value":"7uluna"}]}]}]"#;

    #[test]
    fn undelegate_skips_the_unbonded_pool() {
        let msg = MsgDelegate {
            delegator_address: b"terra1delegator".to_vec(),
            validator_address: b"terravaloper1v".to_vec(),
            amount: Some(Coin::new("uluna", "100")),
        };
        let se = map_with(MsgKind::StakingBeginUnbonding, &msg, Encoding::Proto, &log(UNBOND_LOG)).unwrap();
        assert_eq!(se.amount["undelegate"].text, "100");
        let rewards = &se.transfers["reward"];
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].account.id, "terra1delegator");
        assert_eq!(rewards[0].amounts[0].text, "7");
    }

    #[test]
    fn delegate_nodes_and_amount() {
        let msg = MsgDelegate {
            delegator_address: FROM.to_vec(),
            validator_address: VALOPER.to_vec(),
            amount: Some(Coin::new("uluna", "5")),
        };
        let se = map_amino(MsgKind::StakingDelegate, &msg).unwrap();
        assert_eq!(se.node["delegator"][0].id, bech(&FROM, "terra"));
        assert_eq!(se.node["validator"][0].id, bech(&VALOPER, "terravaloper"));
        assert_eq!(se.amount["delegate"].currency, "uluna");
        assert!(se.transfers.is_empty());
    }

    #[test]
    fn redelegate_has_both_validators() {
        let msg = MsgBeginRedelegate {
            delegator_address: FROM.to_vec(),
            validator_src_address: VALOPER.to_vec(),
            validator_dst_address: TO.to_vec(),
            amount: Some(Coin::new("uluna", "5")),
        };
        let se = map_amino(MsgKind::StakingBeginRedelegate, &msg).unwrap();
        assert_eq!(se.node["validator_source"][0].id, bech(&VALOPER, "terravaloper"));
        assert_eq!(se.node["validator_destination"][0].id, bech(&TO, "terravaloper"));
    }

    #[test]
    fn create_validator_in_staking_module() {
        let msg = MsgCreateValidator {
            description: Some(Description {
                moniker: "node".into(),
                website: "https://node.example".into(),
                ..Default::default()
            }),
            commission: Some(CommissionRates {
                rate: "100000000000000000".into(),
                max_rate: "200000000000000000".into(),
                max_change_rate: "10000000000000000".into(),
            }),
            min_self_delegation: "1".into(),
            delegator_address: FROM.to_vec(),
            validator_address: VALOPER.to_vec(),
            value: Some(Coin::new("uluna", "1000000")),
        };
        let se = map_amino(MsgKind::StakingCreateValidator, &msg).unwrap();
        assert_eq!(se.module, "staking");
        let details = se.node["validator"][0].details.as_ref().unwrap();
        assert_eq!(details.moniker, "node");
        assert_eq!(se.amount["commission_rate"].text, "0.100000000000000000");
        assert_eq!(se.amount["self_delegation_min"].text, "1");
        assert_eq!(se.amount["self_delegation"].currency, "uluna");
    }

    #[test]
    fn edit_validator_optional_amounts() {
        let msg = MsgEditValidator {
            description: None,
            validator_address: b"terravaloper1v".to_vec(),
            commission_rate: String::new(),
            min_self_delegation: "10".into(),
        };
        let se = map_proto(MsgKind::StakingEditValidator, &msg).unwrap();
        assert!(se.node["validator"][0].details.is_none());
        assert!(se.amount.contains_key("self_delegation_min"));
        assert!(!se.amount.contains_key("commission_rate"));
    }
}
