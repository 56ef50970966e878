//! Price oracle votes and feeder delegation.

use terraindex_core::{DecimalAmount, SubsetEvent};

use super::{account, dec, decode, event, hex_text, validator, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::{
    MsgAggregateExchangeRatePrevote, MsgAggregateExchangeRateVote, MsgDelegateFeedConsent,
    MsgExchangeRatePrevote, MsgExchangeRateVote,
};

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::OracleExchangeRateVote, exchange_rate_vote);
    registry.register(MsgKind::OracleExchangeRatePrevote, exchange_rate_prevote);
    registry.register(MsgKind::OracleDelegateFeeder, delegate_feeder);
    registry.register(MsgKind::OracleAggregateExchangeRatePrevote, aggregate_prevote);
    registry.register(MsgKind::OracleAggregateExchangeRateVote, aggregate_vote);
}

/// Validator and feeder nodes, present in every vote message.
fn voter(kind: MsgKind, validator_raw: &[u8], feeder: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    Ok(event(kind)
        .with_node("validator", validator(validator_raw, ctx, "validator")?)
        .with_node("feeder", account(feeder, ctx, "feeder")?))
}

fn exchange_rate_vote(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgExchangeRateVote = decode(bytes, "MsgExchangeRateVote")?;
    let rate = dec(&msg.exchange_rate, &msg.denom, "exchange_rate")?;
    Ok(voter(MsgKind::OracleExchangeRateVote, &msg.validator, &msg.feeder, ctx)?
        .with_amount("exchangeRate", rate)
        .with_additional("salt", vec![msg.salt]))
}

fn exchange_rate_prevote(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgExchangeRatePrevote = decode(bytes, "MsgExchangeRatePrevote")?;
    let denom = DecimalAmount {
        currency: msg.denom,
        ..DecimalAmount::default()
    };
    Ok(voter(MsgKind::OracleExchangeRatePrevote, &msg.validator, &msg.feeder, ctx)?
        .with_amount("denom", denom)
        .with_additional("hash", vec![hex_text(&msg.hash, ctx.encoding)]))
}

fn delegate_feeder(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgDelegateFeedConsent = decode(bytes, "MsgDelegateFeedConsent")?;
    Ok(event(MsgKind::OracleDelegateFeeder)
        .with_node("operator", validator(&msg.operator, ctx, "operator")?)
        .with_node("delegate", account(&msg.delegate, ctx, "delegate")?))
}

fn aggregate_prevote(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgAggregateExchangeRatePrevote = decode(bytes, "MsgAggregateExchangeRatePrevote")?;
    Ok(
        voter(MsgKind::OracleAggregateExchangeRatePrevote, &msg.validator, &msg.feeder, ctx)?
            .with_additional("hash", vec![hex_text(&msg.hash, ctx.encoding)]),
    )
}

fn aggregate_vote(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgAggregateExchangeRateVote = decode(bytes, "MsgAggregateExchangeRateVote")?;
    let rates = msg.exchange_rates.split(',').map(str::to_string).collect();
    Ok(voter(MsgKind::OracleAggregateExchangeRateVote, &msg.validator, &msg.feeder, ctx)?
        .with_additional("salt", vec![msg.salt])
        .with_additional("exchangeRates", rates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;

    #[test]
    fn vote_rate_is_scaled_dec() {
        let msg = MsgExchangeRateVote {
            exchange_rate: "8512340000000000000".into(),
            salt: "abcd".into(),
            denom: "ukrw".into(),
            feeder: FROM.to_vec(),
            validator: VALOPER.to_vec(),
        };
        let se = map_amino(MsgKind::OracleExchangeRateVote, &msg).unwrap();
        assert_eq!(se.node["validator"][0].id, bech(&VALOPER, "terravaloper"));
        assert_eq!(se.node["feeder"][0].id, bech(&FROM, "terra"));
        let rate = &se.amount["exchangeRate"];
        assert_eq!(rate.currency, "ukrw");
        assert_eq!(rate.text, "8.512340000000000000");
    }

    #[test]
    fn prevote_hash_is_hex_under_amino() {
        let msg = MsgExchangeRatePrevote {
            hash: vec![0xde, 0xad],
            denom: "uusd".into(),
            feeder: FROM.to_vec(),
            validator: VALOPER.to_vec(),
        };
        let se = map_amino(MsgKind::OracleExchangeRatePrevote, &msg).unwrap();
        assert_eq!(se.additional["hash"], vec!["dead"]);
        assert_eq!(se.amount["denom"].currency, "uusd");
        assert_eq!(se.amount["denom"].text, "");
    }

    #[test]
    fn aggregate_prevote_hash_is_text_under_proto() {
        let msg = MsgAggregateExchangeRatePrevote {
            hash: b"19c3d0f1".to_vec(),
            feeder: b"terra1feeder".to_vec(),
            validator: b"terravaloper1val".to_vec(),
        };
        let se = map_proto(MsgKind::OracleAggregateExchangeRatePrevote, &msg).unwrap();
        assert_eq!(se.primary_type(), "aggregateexchangerateprevote");
        assert_eq!(se.additional["hash"], vec!["19c3d0f1"]);
    }

    #[test]
    fn aggregate_vote_splits_rates() {
        let msg = MsgAggregateExchangeRateVote {
            salt: "89b8".into(),
            exchange_rates: "1000.0ukrw,0.5uusd".into(),
            feeder: b"terra1feeder".to_vec(),
            validator: b"terravaloper1val".to_vec(),
        };
        let se = map_proto(MsgKind::OracleAggregateExchangeRateVote, &msg).unwrap();
        assert_eq!(se.primary_type(), "aggregateexchangeratevote");
        assert_eq!(se.additional["exchangeRates"], vec!["1000.0ukrw", "0.5uusd"]);
        assert_eq!(se.additional["salt"], vec!["89b8"]);
    }

    #[test]
    fn delegate_feeder_roles() {
        let msg = MsgDelegateFeedConsent {
            operator: VALOPER.to_vec(),
            delegate: TO.to_vec(),
        };
        let se = map_amino(MsgKind::OracleDelegateFeeder, &msg).unwrap();
        assert_eq!(se.node["operator"][0].id, bech(&VALOPER, "terravaloper"));
        assert_eq!(se.node["delegate"][0].id, bech(&TO, "terra"));
    }
}
