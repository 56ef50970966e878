use terraindex_core::{DecimalAmount, SubsetEvent};

use super::{account, coins, decode, event, transfer, with_transfers, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::transfers::KIND_SEND;
use crate::wire::msgs::{MsgDeposit, MsgSubmitProposal, MsgVote, ProposalContent};
use crate::wire::unpack;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::GovDeposit, deposit);
    registry.register(MsgKind::GovVote, vote);
    registry.register(MsgKind::GovSubmitProposal, submit_proposal);
}

/// `name`, `name_1`, `name_2`, ...
fn insert_numbered(se: &mut SubsetEvent, name: &str, amounts: Vec<DecimalAmount>) {
    for (i, amount) in amounts.into_iter().enumerate() {
        let key = if i == 0 {
            name.to_string()
        } else {
            format!("{name}_{i}")
        };
        se.amount.insert(key, amount);
    }
}

fn deposit(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgDeposit = decode(bytes, "MsgDeposit")?;
    let depositor = account(&msg.depositor, ctx, "depositor")?;
    let amounts = coins(&msg.amount, "amount")?;

    let mut se = event(MsgKind::GovDeposit)
        .with_node("depositor", depositor.clone())
        .with_additional("proposalID", vec![msg.proposal_id.to_string()]);
    se.sender.push(transfer(depositor, amounts.clone()));
    insert_numbered(&mut se, "deposit", amounts);
    with_transfers(se, KIND_SEND, "", ctx)
}

fn vote_option(option: i32) -> String {
    match option {
        0 => "Empty".to_string(),
        1 => "Yes".to_string(),
        2 => "Abstain".to_string(),
        3 => "No".to_string(),
        4 => "NoWithVeto".to_string(),
        other => other.to_string(),
    }
}

fn vote(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgVote = decode(bytes, "MsgVote")?;
    Ok(event(MsgKind::GovVote)
        .with_node("voter", account(&msg.voter, ctx, "voter")?)
        .with_additional("proposalID", vec![msg.proposal_id.to_string()])
        .with_additional("option", vec![vote_option(msg.option)]))
}

/// `(route, type)` of a proposal content type, from its amino name or type
/// URL.
fn proposal_route(type_tag: &str) -> (String, String) {
    let name = type_tag
        .rsplit(|c: char| c == '/' || c == '.')
        .next()
        .unwrap_or(type_tag);
    let route = match name {
        "TextProposal" => "gov",
        "ParameterChangeProposal" => "params",
        "CommunityPoolSpendProposal" => "distribution",
        "SoftwareUpgradeProposal" | "CancelSoftwareUpgradeProposal" => "upgrade",
        "TaxRateUpdateProposal" | "RewardWeightUpdateProposal" => "treasury",
        "ClientUpdateProposal" => "client",
        _ => "",
    };
    let kind = name.strip_suffix("Proposal").unwrap_or(name);
    (route.to_string(), kind.to_string())
}

fn submit_proposal(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSubmitProposal = decode(bytes, "MsgSubmitProposal")?;
    let proposer = account(&msg.proposer, ctx, "proposer")?;
    let deposit = coins(&msg.initial_deposit, "initial_deposit")?;

    let mut se = event(MsgKind::GovSubmitProposal).with_node("proposer", proposer.clone());
    se.sender.push(transfer(proposer, deposit.clone()));
    insert_numbered(&mut se, "initial_deposit", deposit);

    if !msg.content.is_empty() {
        let content = unpack(&msg.content, ctx.encoding)?;
        let fields: ProposalContent = decode(&content.payload, "ProposalContent")?;
        let (route, kind) = proposal_route(&content.type_tag);
        se = se
            .with_additional("proposal_route", vec![route])
            .with_additional("proposal_type", vec![kind]);
        if !fields.title.is_empty() {
            se = se.with_additional("title", vec![fields.title]);
        }
        if !fields.description.is_empty() {
            se = se.with_additional("description", vec![fields.description]);
        }
        se = se.with_additional("content", vec![content.type_tag]);
    }
    with_transfers(se, KIND_SEND, "", ctx)
}
