use terraindex_core::{DecimalAmount, SubsetEvent};

use super::{account, coin, decode, event, required, transfer, with_transfers, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::transfers::KIND_SEND;
use crate::wire::msgs::{MsgSwap, MsgSwapSend};
use crate::wire::Coin;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::MarketSwap, swap);
    registry.register(MsgKind::MarketSwapSend, swapsend);
}

/// Offered coin and the (amount-less) asked denomination.
fn offer_and_ask(offer: &Option<Coin>, ask_denom: &str) -> Result<(DecimalAmount, DecimalAmount), MapError> {
    let offer = coin(required(offer, "offer_coin")?, "offer_coin")?;
    let ask = DecimalAmount {
        currency: ask_denom.to_string(),
        ..DecimalAmount::default()
    };
    Ok((offer, ask))
}

fn swap(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSwap = decode(bytes, "MsgSwap")?;
    let trader = account(&msg.trader, ctx, "trader")?;
    let (offer, ask) = offer_and_ask(&msg.offer_coin, &msg.ask_denom)?;

    let mut se = event(MsgKind::MarketSwap)
        .with_node("trader", trader.clone())
        .with_amount("offer", offer.clone())
        .with_amount("ask", ask.clone());
    se.sender.push(transfer(trader, vec![offer, ask]));
    with_transfers(se, KIND_SEND, "", ctx)
}

fn swapsend(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSwapSend = decode(bytes, "MsgSwapSend")?;
    let (offer, ask) = offer_and_ask(&msg.offer_coin, &msg.ask_denom)?;

    let mut se = event(MsgKind::MarketSwapSend)
        .with_amount("offer", offer.clone())
        .with_amount("ask", ask.clone());
    se.sender
        .push(transfer(account(&msg.from_address, ctx, "from_address")?, vec![offer]));
    se.recipient
        .push(transfer(account(&msg.to_address, ctx, "to_address")?, vec![ask]));
    with_transfers(se, KIND_SEND, "", ctx)
}
