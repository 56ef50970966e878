//! Transfer extraction from `transfer` log events.

use indexmap::IndexMap;
use terraindex_core::decimal::parse_amount_list;
use terraindex_core::{Account, DecimalError, EventTransfer, SubsetEvent};

use crate::log::LogEntry;

/// Transfer kind for plain value movements.
pub const KIND_SEND: &str = "send";
/// Transfer kind for reward payouts triggered by staking messages.
pub const KIND_REWARD: &str = "reward";

/// Collect the movements recorded by `transfer` events into
/// `event.transfers[kind]`, grouped by recipient in first-seen order.
///
/// `recipient[i]` pairs with `amount[i]`; recipients without an amount and
/// the `skip` address are ignored. Nothing is stored when no movement
/// remains.
pub fn produce_transfers(
    event: &mut SubsetEvent,
    kind: &str,
    skip: &str,
    log: &LogEntry,
) -> Result<(), DecimalError> {
    let mut grouped: IndexMap<String, EventTransfer> = IndexMap::new();

    for ev in log.events_of("transfer") {
        let attrs = &ev.attributes;
        for (recipient, amount) in attrs.recipient.iter().zip(attrs.amount.iter()) {
            if !skip.is_empty() && recipient == skip {
                continue;
            }
            let amounts = parse_amount_list(amount)?;
            grouped
                .entry(recipient.clone())
                .or_insert_with(|| EventTransfer {
                    account: Account::new(recipient.clone()),
                    amounts: Vec::new(),
                })
                .amounts
                .extend(amounts);
        }
    }

    if !grouped.is_empty() {
        event
            .transfers
            .insert(kind.to_string(), grouped.into_values().collect());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::parse_log;

    fn log(json: &str) -> LogEntry {
        parse_log(json).unwrap().remove(0)
    }

    #[test]
    fn groups_by_recipient() {
        let entry = log(
            r#"[{"msg_index":0,"success":true,"events":[{"type":"transfer","attributes":[
                {"key":"recipient","value":"terra1a"},{"key":"amount","value":"2896ukrw,16uluna"},
                {"key":"recipient","value":"terra1b"},{"key":"amount","value":"5uluna"},
                {"key":"recipient","value":"terra1a"},{"key":"amount","value":"1umnt"}]}]}]"#,
        );
        let mut ev = SubsetEvent::new("send", "bank");
        produce_transfers(&mut ev, KIND_SEND, "", &entry).unwrap();

        let transfers = &ev.transfers["send"];
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].account.id, "terra1a");
        let currencies: Vec<_> = transfers[0].amounts.iter().map(|a| a.currency.as_str()).collect();
        assert_eq!(currencies, vec!["ukrw", "uluna", "umnt"]);
        assert_eq!(transfers[0].amounts[0].text, "2896");
        assert_eq!(transfers[1].account.id, "terra1b");
    }

    #[test]
    fn skips_address_and_missing_amounts() {
        let entry = log(
            r#"[{"msg_index":0,"success":true,"events":[{"type":"transfer","attributes":[
                {"key":"recipient","value":"terra1pool"},{"key":"amount","value":"10uluna"},
                {"key":"recipient","value":"terra1delegator"},{"key":"amount","value":"3uluna"},
                {"key":"recipient","value":"terra1dangling"}]}]}]"#,
        );
        let mut ev = SubsetEvent::new("begin_unbonding", "staking");
        produce_transfers(&mut ev, KIND_REWARD, "terra1pool", &entry).unwrap();
        let transfers = &ev.transfers["reward"];
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].account.id, "terra1delegator");
    }

    #[test]
    fn nothing_stored_without_transfers() {
        let entry = log(r#"[{"msg_index":0,"success":true,"events":[{"type":"message","attributes":[{"key":"action","value":"send"}]}]}]"#);
        let mut ev = SubsetEvent::new("send", "bank");
        produce_transfers(&mut ev, KIND_SEND, "", &entry).unwrap();
        assert!(ev.transfers.is_empty());
    }

    #[test]
    fn unparsable_amount_is_an_error() {
        let entry = log(
            r#"[{"msg_index":0,"success":true,"events":[{"type":"transfer","attributes":[
                {"key":"recipient","value":"terra1a"},{"key":"amount","value":"ten luna"}]}]}]"#,
        );
        let mut ev = SubsetEvent::new("send", "bank");
        assert!(produce_transfers(&mut ev, KIND_SEND, "", &entry).is_err());
    }
}
