use terraindex_core::SubsetEvent;

use super::{
    account, address, coins, decode, event, transfer, validator, with_transfers, MapContext,
    MsgKind, Registry,
};
use crate::error::MapError;
use crate::transfers::{KIND_REWARD, KIND_SEND};
use crate::wire::msgs::{
    MsgFundCommunityPool, MsgSetWithdrawAddress, MsgWithdrawDelegatorReward,
    MsgWithdrawValidatorCommission,
};
use terraindex_core::{Account, AddressRole};

pub(super) fn register(registry: &mut Registry) {
    registry.register(
        MsgKind::DistributionWithdrawValidatorCommission,
        withdraw_validator_commission,
    );
    registry.register(MsgKind::DistributionSetWithdrawAddress, set_withdraw_address);
    registry.register(
        MsgKind::DistributionWithdrawDelegatorReward,
        withdraw_delegator_reward,
    );
    registry.register(MsgKind::DistributionFundCommunityPool, fund_community_pool);
}

fn withdraw_validator_commission(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgWithdrawValidatorCommission = decode(bytes, "MsgWithdrawValidatorCommission")?;
    let operator = validator(&msg.validator_address, ctx, "validator_address")?;

    let mut se = event(MsgKind::DistributionWithdrawValidatorCommission)
        .with_node("validator", operator.clone());
    se.recipient.push(transfer(operator, Vec::new()));
    with_transfers(se, KIND_SEND, "", ctx)
}

fn set_withdraw_address(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSetWithdrawAddress = decode(bytes, "MsgSetWithdrawAddress")?;
    Ok(event(MsgKind::DistributionSetWithdrawAddress)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node("withdraw", account(&msg.withdraw_address, ctx, "withdraw_address")?))
}

fn withdraw_delegator_reward(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgWithdrawDelegatorReward = decode(bytes, "MsgWithdrawDelegatorReward")?;
    let operator = address(
        &msg.validator_address,
        AddressRole::ValidatorOperator,
        ctx,
        "validator_address",
    )?;

    let mut se = event(MsgKind::DistributionWithdrawDelegatorReward)
        .with_node("delegator", account(&msg.delegator_address, ctx, "delegator_address")?)
        .with_node("validator", Account::new(operator.clone()));
    se.recipient.push(transfer(Account::new(operator), Vec::new()));
    with_transfers(se, KIND_REWARD, "", ctx)
}

fn fund_community_pool(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgFundCommunityPool = decode(bytes, "MsgFundCommunityPool")?;
    let depositor = account(&msg.depositor, ctx, "depositor")?;

    let mut se = event(MsgKind::DistributionFundCommunityPool).with_node("depositor", depositor.clone());
    se.sender
        .push(transfer(depositor, coins(&msg.amount, "amount")?));
    Ok(se)
}
