use terraindex_core::SubsetEvent;

use super::{decode, event, validator, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::MsgUnjail;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::SlashingUnjail, unjail);
}

fn unjail(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgUnjail = decode(bytes, "MsgUnjail")?;
    Ok(event(MsgKind::SlashingUnjail).with_node("validator", validator(&msg.validator_addr, ctx, "validator_addr")?))
}
