//! Inter-blockchain communication messages. Protobuf only; addresses are
//! already bech32 text.
//!
//! Proofs are emitted as base64, packet data and acknowledgements as text,
//! and embedded `Any` values as their type URL.

use base64::Engine;
use terraindex_core::{Account, SubsetEvent};

use super::{coin, decode, event, required, transfer, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::{
    Channel, ConnectionCounterparty, ConnectionVersion, IbcHeight, MsgAcknowledgement,
    MsgChannelCloseConfirm, MsgChannelCloseInit, MsgChannelOpenAck, MsgChannelOpenConfirm,
    MsgChannelOpenInit, MsgChannelOpenTry, MsgConnectionOpenAck, MsgConnectionOpenConfirm,
    MsgConnectionOpenInit, MsgConnectionOpenTry, MsgCreateClient, MsgRecvPacket,
    MsgSubmitMisbehaviour, MsgTimeout, MsgTransfer, MsgUpdateClient, MsgUpgradeClient, Packet,
};
use crate::wire::proto::Any;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::IbcTransfer, transfer_msg);
    registry.register(MsgKind::IbcCreateClient, create_client);
    registry.register(MsgKind::IbcUpdateClient, update_client);
    registry.register(MsgKind::IbcUpgradeClient, upgrade_client);
    registry.register(MsgKind::IbcSubmitMisbehaviour, submit_misbehaviour);
    registry.register(MsgKind::IbcConnectionOpenInit, connection_open_init);
    registry.register(MsgKind::IbcConnectionOpenTry, connection_open_try);
    registry.register(MsgKind::IbcConnectionOpenAck, connection_open_ack);
    registry.register(MsgKind::IbcConnectionOpenConfirm, connection_open_confirm);
    registry.register(MsgKind::IbcChannelOpenInit, channel_open_init);
    registry.register(MsgKind::IbcChannelOpenTry, channel_open_try);
    registry.register(MsgKind::IbcChannelOpenAck, channel_open_ack);
    registry.register(MsgKind::IbcChannelOpenConfirm, channel_open_confirm);
    registry.register(MsgKind::IbcChannelCloseInit, channel_close_init);
    registry.register(MsgKind::IbcChannelCloseConfirm, channel_close_confirm);
    registry.register(MsgKind::IbcRecvPacket, recv_packet);
    registry.register(MsgKind::IbcTimeout, timeout);
    registry.register(MsgKind::IbcAcknowledgement, acknowledgement);
}

// ─── Field writers ────────────────────────────────────────────────────────────

/// Event with the relayer as `signer` node.
fn signed(kind: MsgKind, signer: String) -> SubsetEvent {
    event(kind).with_node("signer", Account::new(signer))
}

fn text(se: &mut SubsetEvent, key: &str, value: impl ToString) {
    se.additional.insert(key.to_string(), vec![value.to_string()]);
}

fn proof(se: &mut SubsetEvent, key: &str, raw: &[u8]) {
    text(se, key, base64::engine::general_purpose::STANDARD.encode(raw));
}

fn any(se: &mut SubsetEvent, key: &str, value: &Option<Any>) {
    text(se, key, value.as_ref().map(|a| a.type_url.as_str()).unwrap_or_default());
}

/// `{prefix}_revision_number` and `{prefix}_revision_height`.
fn height(se: &mut SubsetEvent, prefix: &str, value: &Option<IbcHeight>) {
    let h = value.clone().unwrap_or_default();
    text(se, &format!("{prefix}_revision_number"), h.revision_number);
    text(se, &format!("{prefix}_revision_height"), h.revision_height);
}

fn connection_version(se: &mut SubsetEvent, value: &Option<ConnectionVersion>) {
    let v = value.clone().unwrap_or_default();
    text(se, "version_identifier", v.identifier);
    se.additional.insert("version_features".to_string(), v.features);
}

fn connection_counterparty(se: &mut SubsetEvent, value: &Option<ConnectionCounterparty>) {
    let c = value.clone().unwrap_or_default();
    let prefix = c.prefix.map(|p| p.key_prefix).unwrap_or_default();
    text(se, "counterparty_client_id", c.client_id);
    text(se, "counterparty_connection_id", c.connection_id);
    text(se, "counterparty_prefix", String::from_utf8_lossy(&prefix));
}

fn channel(se: &mut SubsetEvent, value: &Option<Channel>) {
    let ch = value.clone().unwrap_or_default();
    let counterparty = ch.counterparty.unwrap_or_default();
    text(se, "channel_state", ch.state);
    text(se, "channel_ordering", ch.ordering);
    text(se, "channel_counterparty_port_id", counterparty.port_id);
    text(se, "channel_counterparty_channel_id", counterparty.channel_id);
    se.additional
        .insert("channel_connection_hops".to_string(), ch.connection_hops);
    text(se, "channel_version", ch.version);
}

fn packet(se: &mut SubsetEvent, value: &Option<Packet>) {
    let p = value.clone().unwrap_or_default();
    text(se, "packet_sequence", p.sequence);
    text(se, "packet_source_port", p.source_port);
    text(se, "packet_source_channel", p.source_channel);
    text(se, "packet_destination_port", p.destination_port);
    text(se, "packet_destination_channel", p.destination_channel);
    text(se, "packet_data", String::from_utf8_lossy(&p.data));
    height(se, "packet_timeout_height", &p.timeout_height);
    text(se, "packet_timeout_stamp", p.timeout_timestamp);
}

// ─── Transfer ─────────────────────────────────────────────────────────────────

fn transfer_msg(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgTransfer = decode(bytes, "MsgTransfer")?;
    let token = coin(required(&msg.token, "token")?, "token")?;
    let sender = Account::new(msg.sender);
    let receiver = Account::new(msg.receiver);

    let mut se = event(MsgKind::IbcTransfer)
        .with_node("sender", sender.clone())
        .with_node("receiver", receiver.clone());
    se.sender.push(transfer(sender, vec![token.clone()]));
    se.recipient.push(transfer(receiver, vec![token]));
    text(&mut se, "source_port", msg.source_port);
    text(&mut se, "source_channel", msg.source_channel);
    height(&mut se, "timeout_height", &msg.timeout_height);
    text(&mut se, "timeout_stamp", msg.timeout_timestamp);
    Ok(se)
}

// ─── Client ───────────────────────────────────────────────────────────────────

fn create_client(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgCreateClient = decode(bytes, "MsgCreateClient")?;
    let mut se = signed(MsgKind::IbcCreateClient, msg.signer);
    any(&mut se, "client_state", &msg.client_state);
    any(&mut se, "consensus_state", &msg.consensus_state);
    Ok(se)
}

fn update_client(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgUpdateClient = decode(bytes, "MsgUpdateClient")?;
    let mut se = signed(MsgKind::IbcUpdateClient, msg.signer);
    text(&mut se, "client_id", msg.client_id);
    any(&mut se, "header", &msg.header);
    Ok(se)
}

fn upgrade_client(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgUpgradeClient = decode(bytes, "MsgUpgradeClient")?;
    let mut se = signed(MsgKind::IbcUpgradeClient, msg.signer);
    text(&mut se, "client_id", msg.client_id);
    any(&mut se, "client_state", &msg.client_state);
    any(&mut se, "consensus_state", &msg.consensus_state);
    proof(&mut se, "proof_upgrade_client", &msg.proof_upgrade_client);
    proof(
        &mut se,
        "proof_upgrade_consensus_state",
        &msg.proof_upgrade_consensus_state,
    );
    Ok(se)
}

fn submit_misbehaviour(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgSubmitMisbehaviour = decode(bytes, "MsgSubmitMisbehaviour")?;
    let mut se = signed(MsgKind::IbcSubmitMisbehaviour, msg.signer);
    text(&mut se, "client_id", msg.client_id);
    any(&mut se, "misbehaviour", &msg.misbehaviour);
    Ok(se)
}

// ─── Connection ───────────────────────────────────────────────────────────────

fn connection_open_init(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgConnectionOpenInit = decode(bytes, "MsgConnectionOpenInit")?;
    let mut se = signed(MsgKind::IbcConnectionOpenInit, msg.signer);
    text(&mut se, "client_id", msg.client_id);
    connection_version(&mut se, &msg.version);
    text(&mut se, "delay_period", msg.delay_period);
    connection_counterparty(&mut se, &msg.counterparty);
    Ok(se)
}

fn connection_open_try(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgConnectionOpenTry = decode(bytes, "MsgConnectionOpenTry")?;
    let mut se = signed(MsgKind::IbcConnectionOpenTry, msg.signer);
    text(&mut se, "client_id", msg.client_id);
    text(&mut se, "previous_connection_id", msg.previous_connection_id);
    any(&mut se, "client_state", &msg.client_state);
    connection_counterparty(&mut se, &msg.counterparty);
    text(&mut se, "delay_period", msg.delay_period);
    se.additional.insert(
        "counterparty_versions".to_string(),
        msg.counterparty_versions
            .into_iter()
            .map(|v| v.identifier)
            .collect(),
    );
    height(&mut se, "proof_height", &msg.proof_height);
    proof(&mut se, "proof_init", &msg.proof_init);
    proof(&mut se, "proof_client", &msg.proof_client);
    proof(&mut se, "proof_consensus", &msg.proof_consensus);
    height(&mut se, "consensus_height", &msg.consensus_height);
    Ok(se)
}

fn connection_open_ack(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgConnectionOpenAck = decode(bytes, "MsgConnectionOpenAck")?;
    let mut se = signed(MsgKind::IbcConnectionOpenAck, msg.signer);
    text(&mut se, "connection_id", msg.connection_id);
    text(&mut se, "counterparty_connection_id", msg.counterparty_connection_id);
    connection_version(&mut se, &msg.version);
    any(&mut se, "client_state", &msg.client_state);
    height(&mut se, "proof_height", &msg.proof_height);
    proof(&mut se, "proof_try", &msg.proof_try);
    proof(&mut se, "proof_client", &msg.proof_client);
    proof(&mut se, "proof_consensus", &msg.proof_consensus);
    height(&mut se, "consensus_height", &msg.consensus_height);
    Ok(se)
}

fn connection_open_confirm(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgConnectionOpenConfirm = decode(bytes, "MsgConnectionOpenConfirm")?;
    let mut se = signed(MsgKind::IbcConnectionOpenConfirm, msg.signer);
    text(&mut se, "connection_id", msg.connection_id);
    proof(&mut se, "proof_ack", &msg.proof_ack);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

// ─── Channel ──────────────────────────────────────────────────────────────────

fn channel_open_init(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelOpenInit = decode(bytes, "MsgChannelOpenInit")?;
    let mut se = signed(MsgKind::IbcChannelOpenInit, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    channel(&mut se, &msg.channel);
    Ok(se)
}

fn channel_open_try(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelOpenTry = decode(bytes, "MsgChannelOpenTry")?;
    let mut se = signed(MsgKind::IbcChannelOpenTry, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    text(&mut se, "previous_channel_id", msg.previous_channel_id);
    channel(&mut se, &msg.channel);
    text(&mut se, "counterparty_version", msg.counterparty_version);
    proof(&mut se, "proof_init", &msg.proof_init);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

fn channel_open_ack(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelOpenAck = decode(bytes, "MsgChannelOpenAck")?;
    let mut se = signed(MsgKind::IbcChannelOpenAck, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    text(&mut se, "channel_id", msg.channel_id);
    text(&mut se, "counterparty_channel_id", msg.counterparty_channel_id);
    text(&mut se, "counterparty_version", msg.counterparty_version);
    proof(&mut se, "proof_try", &msg.proof_try);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

fn channel_open_confirm(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelOpenConfirm = decode(bytes, "MsgChannelOpenConfirm")?;
    let mut se = signed(MsgKind::IbcChannelOpenConfirm, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    text(&mut se, "channel_id", msg.channel_id);
    proof(&mut se, "proof_ack", &msg.proof_ack);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

fn channel_close_init(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelCloseInit = decode(bytes, "MsgChannelCloseInit")?;
    let mut se = signed(MsgKind::IbcChannelCloseInit, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    text(&mut se, "channel_id", msg.channel_id);
    Ok(se)
}

fn channel_close_confirm(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgChannelCloseConfirm = decode(bytes, "MsgChannelCloseConfirm")?;
    let mut se = signed(MsgKind::IbcChannelCloseConfirm, msg.signer);
    text(&mut se, "port_id", msg.port_id);
    text(&mut se, "channel_id", msg.channel_id);
    proof(&mut se, "proof_init", &msg.proof_init);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

// ─── Packets ──────────────────────────────────────────────────────────────────

fn recv_packet(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgRecvPacket = decode(bytes, "MsgRecvPacket")?;
    let mut se = signed(MsgKind::IbcRecvPacket, msg.signer);
    packet(&mut se, &msg.packet);
    proof(&mut se, "proof_commitment", &msg.proof_commitment);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}

fn timeout(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgTimeout = decode(bytes, "MsgTimeout")?;
    let mut se = signed(MsgKind::IbcTimeout, msg.signer);
    packet(&mut se, &msg.packet);
    proof(&mut se, "proof_unreceived", &msg.proof_unreceived);
    height(&mut se, "proof_height", &msg.proof_height);
    text(&mut se, "next_sequence_recv", msg.next_sequence_recv);
    Ok(se)
}

fn acknowledgement(bytes: &[u8], _ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgAcknowledgement = decode(bytes, "MsgAcknowledgement")?;
    let mut se = signed(MsgKind::IbcAcknowledgement, msg.signer);
    packet(&mut se, &msg.packet);
    text(
        &mut se,
        "acknowledgement",
        String::from_utf8_lossy(&msg.acknowledgement),
    );
    proof(&mut se, "proof_acked", &msg.proof_acked);
    height(&mut se, "proof_height", &msg.proof_height);
    Ok(se)
}
