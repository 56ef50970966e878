use terraindex_core::SubsetEvent;

use super::{account, decode, event, transfer, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::MsgVerifyInvariant;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::CrisisVerifyInvariant, verify_invariant);
}

fn verify_invariant(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgVerifyInvariant = decode(bytes, "MsgVerifyInvariant")?;

    let mut se = event(MsgKind::CrisisVerifyInvariant)
        .with_additional("invariant_route", vec![msg.invariant_route])
        .with_additional("invariant_module_name", vec![msg.invariant_module_name]);
    se.sender
        .push(transfer(account(&msg.sender, ctx, "sender")?, Vec::new()));
    Ok(se)
}
