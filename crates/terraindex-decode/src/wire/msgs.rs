//! Message structs shared by both encodings.
//!
//! Address fields are declared as `bytes`: amino carries raw account bytes
//! there, protobuf carries bech32 text, and both are length-delimited on the
//! wire. [`terraindex_core::address::normalize`] turns either into text.
//! Interface-typed fields (proposal content, evidence, wrapped messages) are
//! kept as bytes as well and resolved with [`super::unpack`].
//!
//! Structs that only exist in one encoding are prefixed `Amino`/`Proto`.

use prost::Message;

use super::Coin;

#[derive(Clone, PartialEq, Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

// ─── bank ─────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgSend {
    #[prost(bytes = "vec", tag = "1")]
    pub from_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(message, repeated, tag = "3")]
    pub amount: Vec<Coin>,
}

/// Input and output of a multi-send share one layout.
#[derive(Clone, PartialEq, Message)]
pub struct BankIo {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub coins: Vec<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgMultiSend {
    #[prost(message, repeated, tag = "1")]
    pub inputs: Vec<BankIo>,
    #[prost(message, repeated, tag = "2")]
    pub outputs: Vec<BankIo>,
}

// ─── crisis ───────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgVerifyInvariant {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(string, tag = "2")]
    pub invariant_module_name: String,
    #[prost(string, tag = "3")]
    pub invariant_route: String,
}

// ─── distribution ─────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgWithdrawValidatorCommission {
    #[prost(bytes = "vec", tag = "1")]
    pub validator_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgSetWithdrawAddress {
    #[prost(bytes = "vec", tag = "1")]
    pub delegator_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub withdraw_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgWithdrawDelegatorReward {
    #[prost(bytes = "vec", tag = "1")]
    pub delegator_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub validator_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgFundCommunityPool {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(bytes = "vec", tag = "2")]
    pub depositor: Vec<u8>,
}

// ─── evidence ─────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgSubmitEvidence {
    #[prost(bytes = "vec", tag = "1")]
    pub submitter: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub evidence: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Equivocation {
    #[prost(int64, tag = "1")]
    pub height: i64,
    #[prost(message, optional, tag = "2")]
    pub time: Option<Timestamp>,
    #[prost(int64, tag = "3")]
    pub power: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub consensus_address: Vec<u8>,
}

// ─── gov ──────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgDeposit {
    #[prost(uint64, tag = "1")]
    pub proposal_id: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub depositor: Vec<u8>,
    #[prost(message, repeated, tag = "3")]
    pub amount: Vec<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgVote {
    #[prost(uint64, tag = "1")]
    pub proposal_id: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub voter: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub option: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgSubmitProposal {
    #[prost(bytes = "vec", tag = "1")]
    pub content: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub initial_deposit: Vec<Coin>,
    #[prost(bytes = "vec", tag = "3")]
    pub proposer: Vec<u8>,
}

/// Leading fields every proposal content type shares.
#[derive(Clone, PartialEq, Message)]
pub struct ProposalContent {
    #[prost(string, tag = "1")]
    pub title: String,
    #[prost(string, tag = "2")]
    pub description: String,
}

// ─── market ───────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgSwap {
    #[prost(bytes = "vec", tag = "1")]
    pub trader: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub offer_coin: Option<Coin>,
    #[prost(string, tag = "3")]
    pub ask_denom: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgSwapSend {
    #[prost(bytes = "vec", tag = "1")]
    pub from_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub offer_coin: Option<Coin>,
    #[prost(string, tag = "4")]
    pub ask_denom: String,
}

// ─── msgauth / authz ──────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct AminoMsgGrantAuthorization {
    #[prost(bytes = "vec", tag = "1")]
    pub granter: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub grantee: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub authorization: Vec<u8>,
    /// Nanoseconds.
    #[prost(int64, tag = "4")]
    pub period: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoGrant {
    #[prost(bytes = "vec", tag = "1")]
    pub authorization: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub expiration: Option<Timestamp>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoMsgGrant {
    #[prost(bytes = "vec", tag = "1")]
    pub granter: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub grantee: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub grant: Option<ProtoGrant>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgRevokeAuthorization {
    #[prost(bytes = "vec", tag = "1")]
    pub granter: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub grantee: Vec<u8>,
    #[prost(string, tag = "3")]
    pub msg_type: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgExecAuthorized {
    #[prost(bytes = "vec", tag = "1")]
    pub grantee: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub msgs: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GenericAuthorization {
    #[prost(string, tag = "1")]
    pub msg: String,
}

// ─── oracle ───────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgExchangeRateVote {
    /// `Dec` scaled by 10^18.
    #[prost(string, tag = "1")]
    pub exchange_rate: String,
    #[prost(string, tag = "2")]
    pub salt: String,
    #[prost(string, tag = "3")]
    pub denom: String,
    #[prost(bytes = "vec", tag = "4")]
    pub feeder: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub validator: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgExchangeRatePrevote {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(string, tag = "2")]
    pub denom: String,
    #[prost(bytes = "vec", tag = "3")]
    pub feeder: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub validator: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgDelegateFeedConsent {
    #[prost(bytes = "vec", tag = "1")]
    pub operator: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub delegate: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgAggregateExchangeRatePrevote {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub feeder: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub validator: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgAggregateExchangeRateVote {
    #[prost(string, tag = "1")]
    pub salt: String,
    #[prost(string, tag = "2")]
    pub exchange_rates: String,
    #[prost(bytes = "vec", tag = "3")]
    pub feeder: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub validator: Vec<u8>,
}

// ─── slashing ─────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgUnjail {
    #[prost(bytes = "vec", tag = "1")]
    pub validator_addr: Vec<u8>,
}

// ─── staking ──────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct Description {
    #[prost(string, tag = "1")]
    pub moniker: String,
    #[prost(string, tag = "2")]
    pub identity: String,
    #[prost(string, tag = "3")]
    pub website: String,
    #[prost(string, tag = "4")]
    pub security_contact: String,
    #[prost(string, tag = "5")]
    pub details: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CommissionRates {
    #[prost(string, tag = "1")]
    pub rate: String,
    #[prost(string, tag = "2")]
    pub max_rate: String,
    #[prost(string, tag = "3")]
    pub max_change_rate: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgCreateValidator {
    #[prost(message, optional, tag = "1")]
    pub description: Option<Description>,
    #[prost(message, optional, tag = "2")]
    pub commission: Option<CommissionRates>,
    #[prost(string, tag = "3")]
    pub min_self_delegation: String,
    #[prost(bytes = "vec", tag = "4")]
    pub delegator_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub validator_address: Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub value: Option<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgEditValidator {
    #[prost(message, optional, tag = "1")]
    pub description: Option<Description>,
    #[prost(bytes = "vec", tag = "2")]
    pub validator_address: Vec<u8>,
    #[prost(string, tag = "3")]
    pub commission_rate: String,
    #[prost(string, tag = "4")]
    pub min_self_delegation: String,
}

/// Delegate and undelegate share one layout.
#[derive(Clone, PartialEq, Message)]
pub struct MsgDelegate {
    #[prost(bytes = "vec", tag = "1")]
    pub delegator_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub validator_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub amount: Option<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgBeginRedelegate {
    #[prost(bytes = "vec", tag = "1")]
    pub delegator_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub validator_src_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub validator_dst_address: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub amount: Option<Coin>,
}

// ─── wasm ─────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct MsgStoreCode {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub wasm_byte_code: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgExecuteContract {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub execute_msg: Vec<u8>,
    #[prost(message, repeated, tag = "4")]
    pub coins: Vec<Coin>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AminoMsgInstantiateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub code_id: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub init_msg: Vec<u8>,
    #[prost(message, repeated, tag = "4")]
    pub init_coins: Vec<Coin>,
    #[prost(bool, tag = "5")]
    pub migratable: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoMsgInstantiateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub admin: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub code_id: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub init_msg: Vec<u8>,
    #[prost(message, repeated, tag = "5")]
    pub init_coins: Vec<Coin>,
}

/// `owner` is called `admin` in the protobuf schema.
#[derive(Clone, PartialEq, Message)]
pub struct MsgMigrateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub new_code_id: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub migrate_msg: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgUpdateContractOwner {
    #[prost(bytes = "vec", tag = "1")]
    pub owner: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub new_owner: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub contract: Vec<u8>,
}

// ─── ibc (protobuf only) ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct IbcHeight {
    #[prost(uint64, tag = "1")]
    pub revision_number: u64,
    #[prost(uint64, tag = "2")]
    pub revision_height: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgTransfer {
    #[prost(string, tag = "1")]
    pub source_port: String,
    #[prost(string, tag = "2")]
    pub source_channel: String,
    #[prost(message, optional, tag = "3")]
    pub token: Option<Coin>,
    #[prost(string, tag = "4")]
    pub sender: String,
    #[prost(string, tag = "5")]
    pub receiver: String,
    #[prost(message, optional, tag = "6")]
    pub timeout_height: Option<IbcHeight>,
    #[prost(uint64, tag = "7")]
    pub timeout_timestamp: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgCreateClient {
    #[prost(message, optional, tag = "1")]
    pub client_state: Option<super::proto::Any>,
    #[prost(message, optional, tag = "2")]
    pub consensus_state: Option<super::proto::Any>,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgUpdateClient {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, optional, tag = "2")]
    pub header: Option<super::proto::Any>,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgUpgradeClient {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, optional, tag = "2")]
    pub client_state: Option<super::proto::Any>,
    #[prost(message, optional, tag = "3")]
    pub consensus_state: Option<super::proto::Any>,
    #[prost(bytes = "vec", tag = "4")]
    pub proof_upgrade_client: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub proof_upgrade_consensus_state: Vec<u8>,
    #[prost(string, tag = "6")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgSubmitMisbehaviour {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, optional, tag = "2")]
    pub misbehaviour: Option<super::proto::Any>,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MerklePrefix {
    #[prost(bytes = "vec", tag = "1")]
    pub key_prefix: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ConnectionCounterparty {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(string, tag = "2")]
    pub connection_id: String,
    #[prost(message, optional, tag = "3")]
    pub prefix: Option<MerklePrefix>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ConnectionVersion {
    #[prost(string, tag = "1")]
    pub identifier: String,
    #[prost(string, repeated, tag = "2")]
    pub features: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgConnectionOpenInit {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, optional, tag = "2")]
    pub counterparty: Option<ConnectionCounterparty>,
    #[prost(message, optional, tag = "3")]
    pub version: Option<ConnectionVersion>,
    #[prost(uint64, tag = "4")]
    pub delay_period: u64,
    #[prost(string, tag = "5")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgConnectionOpenTry {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(string, tag = "2")]
    pub previous_connection_id: String,
    #[prost(message, optional, tag = "3")]
    pub client_state: Option<super::proto::Any>,
    #[prost(message, optional, tag = "4")]
    pub counterparty: Option<ConnectionCounterparty>,
    #[prost(uint64, tag = "5")]
    pub delay_period: u64,
    #[prost(message, repeated, tag = "6")]
    pub counterparty_versions: Vec<ConnectionVersion>,
    #[prost(message, optional, tag = "7")]
    pub proof_height: Option<IbcHeight>,
    #[prost(bytes = "vec", tag = "8")]
    pub proof_init: Vec<u8>,
    #[prost(bytes = "vec", tag = "9")]
    pub proof_client: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub proof_consensus: Vec<u8>,
    #[prost(message, optional, tag = "11")]
    pub consensus_height: Option<IbcHeight>,
    #[prost(string, tag = "12")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgConnectionOpenAck {
    #[prost(string, tag = "1")]
    pub connection_id: String,
    #[prost(string, tag = "2")]
    pub counterparty_connection_id: String,
    #[prost(message, optional, tag = "3")]
    pub version: Option<ConnectionVersion>,
    #[prost(message, optional, tag = "4")]
    pub client_state: Option<super::proto::Any>,
    #[prost(message, optional, tag = "5")]
    pub proof_height: Option<IbcHeight>,
    #[prost(bytes = "vec", tag = "6")]
    pub proof_try: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub proof_client: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub proof_consensus: Vec<u8>,
    #[prost(message, optional, tag = "9")]
    pub consensus_height: Option<IbcHeight>,
    #[prost(string, tag = "10")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgConnectionOpenConfirm {
    #[prost(string, tag = "1")]
    pub connection_id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub proof_ack: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "4")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChannelCounterparty {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Channel {
    #[prost(int32, tag = "1")]
    pub state: i32,
    #[prost(int32, tag = "2")]
    pub ordering: i32,
    #[prost(message, optional, tag = "3")]
    pub counterparty: Option<ChannelCounterparty>,
    #[prost(string, repeated, tag = "4")]
    pub connection_hops: Vec<String>,
    #[prost(string, tag = "5")]
    pub version: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelOpenInit {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(message, optional, tag = "2")]
    pub channel: Option<Channel>,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelOpenTry {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub previous_channel_id: String,
    #[prost(message, optional, tag = "3")]
    pub channel: Option<Channel>,
    #[prost(string, tag = "4")]
    pub counterparty_version: String,
    #[prost(bytes = "vec", tag = "5")]
    pub proof_init: Vec<u8>,
    #[prost(message, optional, tag = "6")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "7")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelOpenAck {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub counterparty_channel_id: String,
    #[prost(string, tag = "4")]
    pub counterparty_version: String,
    #[prost(bytes = "vec", tag = "5")]
    pub proof_try: Vec<u8>,
    #[prost(message, optional, tag = "6")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "7")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelOpenConfirm {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(bytes = "vec", tag = "3")]
    pub proof_ack: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "5")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelCloseInit {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgChannelCloseConfirm {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(bytes = "vec", tag = "3")]
    pub proof_init: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "5")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Packet {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(string, tag = "2")]
    pub source_port: String,
    #[prost(string, tag = "3")]
    pub source_channel: String,
    #[prost(string, tag = "4")]
    pub destination_port: String,
    #[prost(string, tag = "5")]
    pub destination_channel: String,
    #[prost(bytes = "vec", tag = "6")]
    pub data: Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub timeout_height: Option<IbcHeight>,
    #[prost(uint64, tag = "8")]
    pub timeout_timestamp: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgRecvPacket {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(bytes = "vec", tag = "2")]
    pub proof_commitment: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "4")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgTimeout {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(bytes = "vec", tag = "2")]
    pub proof_unreceived: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub proof_height: Option<IbcHeight>,
    #[prost(uint64, tag = "4")]
    pub next_sequence_recv: u64,
    #[prost(string, tag = "5")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MsgAcknowledgement {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(bytes = "vec", tag = "2")]
    pub acknowledgement: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub proof_acked: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub proof_height: Option<IbcHeight>,
    #[prost(string, tag = "5")]
    pub signer: String,
}
