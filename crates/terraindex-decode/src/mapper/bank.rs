use terraindex_core::SubsetEvent;

use super::{account, coins, decode, event, transfer, with_transfers, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::transfers::KIND_SEND;
use crate::wire::msgs::{MsgMultiSend, MsgSend};

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::BankSend, send);
    registry.register(MsgKind::BankMultiSend, multisend);
}

fn send(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSend = decode(bytes, "MsgSend")?;
    let amounts = coins(&msg.amount, "amount")?;

    let mut se = event(MsgKind::BankSend);
    se.sender
        .push(transfer(account(&msg.from_address, ctx, "from_address")?, amounts.clone()));
    se.recipient
        .push(transfer(account(&msg.to_address, ctx, "to_address")?, amounts));
    with_transfers(se, KIND_SEND, "", ctx)
}

fn multisend(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgMultiSend = decode(bytes, "MsgMultiSend")?;

    let mut se = event(MsgKind::BankMultiSend);
    for input in &msg.inputs {
        se.sender.push(transfer(
            account(&input.address, ctx, "inputs.address")?,
            coins(&input.coins, "inputs.coins")?,
        ));
    }
    for output in &msg.outputs {
        se.recipient.push(transfer(
            account(&output.address, ctx, "outputs.address")?,
            coins(&output.coins, "outputs.coins")?,
        ));
    }
    with_transfers(se, KIND_SEND, "", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;
    use crate::wire::msgs::BankIo;
    use crate::wire::Coin;
    use terraindex_core::Encoding;

    #[test]
    fn send_amino_encodes_addresses() {
        let msg = MsgSend {
            from_address: FROM.to_vec(),
            to_address: TO.to_vec(),
            amount: vec![Coin::new("uluna", "1000")],
        };
        let log = log(
            r#"[{"msg_index":0,"success":true,"events":[{"type":"transfer","attributes":[
                {"key":"recipient","value":"terra1to"},{"key":"amount","value":"1000uluna"}]}]}]"#,
        );
        let se = map_with(MsgKind::BankSend, &msg, Encoding::Amino, &log).unwrap();
        assert_eq!(se.r#type, vec!["send"]);
        assert_eq!(se.module, "bank");
        assert_eq!(se.sender[0].account.id, bech(&FROM, "terra"));
        assert_eq!(se.recipient[0].account.id, bech(&TO, "terra"));
        assert_eq!(se.recipient[0].amounts[0].currency, "uluna");
        assert_eq!(se.transfers["send"][0].account.id, "terra1to");
    }

    #[test]
    fn send_proto_keeps_text_addresses() {
        let msg = MsgSend {
            from_address: b"terra1from".to_vec(),
            to_address: b"terra1to".to_vec(),
            amount: vec![Coin::new("ukrw", "5")],
        };
        let se = map_proto(MsgKind::BankSend, &msg).unwrap();
        assert_eq!(se.sender[0].account.id, "terra1from");
        assert_eq!(se.recipient[0].account.id, "terra1to");
        assert!(se.transfers.is_empty());
    }

    #[test]
    fn multisend_lists_every_side() {
        let msg = MsgMultiSend {
            inputs: vec![BankIo {
                address: b"terra1a".to_vec(),
                coins: vec![Coin::new("uluna", "3")],
            }],
            outputs: vec![
                BankIo {
                    address: b"terra1b".to_vec(),
                    coins: vec![Coin::new("uluna", "1")],
                },
                BankIo {
                    address: b"terra1c".to_vec(),
                    coins: vec![Coin::new("uluna", "2")],
                },
            ],
        };
        let se = map_proto(MsgKind::BankMultiSend, &msg).unwrap();
        assert_eq!(se.sender.len(), 1);
        assert_eq!(se.recipient.len(), 2);
        assert_eq!(se.recipient[1].amounts[0].text, "2");
    }

    #[test]
    fn bad_amount_is_broken() {
        let msg = MsgSend {
            from_address: b"terra1from".to_vec(),
            to_address: b"terra1to".to_vec(),
            amount: vec![Coin::new("uluna", "1x0")],
        };
        assert!(matches!(
            map_proto(MsgKind::BankSend, &msg),
            Err(MapError::Amount { field: "amount", .. })
        ));
    }
}
