//! Message mapper registry.
//!
//! Every supported message is one [`MsgKind`]. A kind knows its module
//! route, its message type and the wire tags (amino names, protobuf type
//! URLs) it is sent under. The [`Registry`] maps each kind to a plain
//! function turning the message bytes into a [`SubsetEvent`].
//!
//! ```text
//! RawMessage ──► MessageRef::resolve ──► Known { kind } ──► Registry::map ──► SubsetEvent
//!                                      └► Unknown { type_tag, payload }  ──► MapError::Unknown
//! ```

mod bank;
mod crisis;
mod distribution;
mod evidence;
mod gov;
mod ibc;
mod market;
mod msgauth;
mod oracle;
mod slashing;
mod staking;
mod wasm;

use std::collections::HashMap;
use std::sync::OnceLock;

use prost::Message;
use terraindex_core::address::normalize;
use terraindex_core::{Account, AddressRole, DecimalAmount, Encoding, EventTransfer, SubsetEvent};

use crate::error::MapError;
use crate::log::LogEntry;
use crate::wire::msgs::Timestamp;
use crate::wire::{Coin, RawMessage};

/// Wrapper messages may contain wrappers; deeper chains are rejected.
pub const MAX_NESTING_DEPTH: usize = 4;

// ─── MsgKind ──────────────────────────────────────────────────────────────────

/// Every message type the worker maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKind {
    BankSend,
    BankMultiSend,
    CrisisVerifyInvariant,
    DistributionWithdrawValidatorCommission,
    DistributionSetWithdrawAddress,
    DistributionWithdrawDelegatorReward,
    DistributionFundCommunityPool,
    EvidenceSubmitEvidence,
    GovDeposit,
    GovVote,
    GovSubmitProposal,
    MarketSwap,
    MarketSwapSend,
    MsgauthGrantAuthorization,
    MsgauthRevokeAuthorization,
    MsgauthExecDelegated,
    OracleExchangeRateVote,
    OracleExchangeRatePrevote,
    OracleDelegateFeeder,
    OracleAggregateExchangeRatePrevote,
    OracleAggregateExchangeRateVote,
    SlashingUnjail,
    StakingBeginUnbonding,
    StakingEditValidator,
    StakingCreateValidator,
    StakingDelegate,
    StakingBeginRedelegate,
    WasmExecuteContract,
    WasmStoreCode,
    WasmUpdateContractOwner,
    WasmInstantiateContract,
    WasmMigrateContract,
    IbcTransfer,
    IbcCreateClient,
    IbcUpdateClient,
    IbcUpgradeClient,
    IbcSubmitMisbehaviour,
    IbcConnectionOpenInit,
    IbcConnectionOpenTry,
    IbcConnectionOpenAck,
    IbcConnectionOpenConfirm,
    IbcChannelOpenInit,
    IbcChannelOpenTry,
    IbcChannelOpenAck,
    IbcChannelOpenConfirm,
    IbcChannelCloseInit,
    IbcChannelCloseConfirm,
    IbcRecvPacket,
    IbcTimeout,
    IbcAcknowledgement,
}

/// Static description of a kind.
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub kind: MsgKind,
    pub route: &'static str,
    pub msg_type: &'static str,
    /// Amino names and protobuf type URLs.
    pub tags: &'static [&'static str],
}

const fn info(
    kind: MsgKind,
    route: &'static str,
    msg_type: &'static str,
    tags: &'static [&'static str],
) -> KindInfo {
    KindInfo {
        kind,
        route,
        msg_type,
        tags,
    }
}

use MsgKind::*;

pub const KINDS: &[KindInfo] = &[
    info(BankSend, "bank", "send", &["bank/MsgSend", "/cosmos.bank.v1beta1.MsgSend"]),
    info(BankMultiSend, "bank", "multisend", &["bank/MsgMultiSend", "/cosmos.bank.v1beta1.MsgMultiSend"]),
    info(CrisisVerifyInvariant, "crisis", "verify_invariant", &["crisis/MsgVerifyInvariant", "/cosmos.crisis.v1beta1.MsgVerifyInvariant"]),
    info(DistributionWithdrawValidatorCommission, "distribution", "withdraw_validator_commission", &["distribution/MsgWithdrawValidatorCommission", "/cosmos.distribution.v1beta1.MsgWithdrawValidatorCommission"]),
    info(DistributionSetWithdrawAddress, "distribution", "set_withdraw_address", &["distribution/MsgModifyWithdrawAddress", "/cosmos.distribution.v1beta1.MsgSetWithdrawAddress"]),
    info(DistributionWithdrawDelegatorReward, "distribution", "withdraw_delegator_reward", &["distribution/MsgWithdrawDelegationReward", "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward"]),
    info(DistributionFundCommunityPool, "distribution", "fund_community_pool", &["distribution/MsgFundCommunityPool", "/cosmos.distribution.v1beta1.MsgFundCommunityPool"]),
    info(EvidenceSubmitEvidence, "evidence", "submit_evidence", &["cosmos-sdk/MsgSubmitEvidence", "evidence/MsgSubmitEvidence", "/cosmos.evidence.v1beta1.MsgSubmitEvidence"]),
    info(GovDeposit, "gov", "deposit", &["gov/MsgDeposit", "/cosmos.gov.v1beta1.MsgDeposit"]),
    info(GovVote, "gov", "vote", &["gov/MsgVote", "/cosmos.gov.v1beta1.MsgVote"]),
    info(GovSubmitProposal, "gov", "submit_proposal", &["gov/MsgSubmitProposal", "/cosmos.gov.v1beta1.MsgSubmitProposal"]),
    info(MarketSwap, "market", "swap", &["market/MsgSwap", "/terra.market.v1beta1.MsgSwap"]),
    info(MarketSwapSend, "market", "swapsend", &["market/MsgSwapSend", "/terra.market.v1beta1.MsgSwapSend"]),
    info(MsgauthGrantAuthorization, "msgauth", "grant_authorization", &["msgauth/MsgGrantAuthorization", "/cosmos.authz.v1beta1.MsgGrant"]),
    info(MsgauthRevokeAuthorization, "msgauth", "revoke_authorization", &["msgauth/MsgRevokeAuthorization", "/cosmos.authz.v1beta1.MsgRevoke"]),
    info(MsgauthExecDelegated, "msgauth", "exec_delegated", &["msgauth/MsgExecAuthorized", "/cosmos.authz.v1beta1.MsgExec"]),
    info(OracleExchangeRateVote, "oracle", "exchangeratevote", &["oracle/MsgExchangeRateVote"]),
    info(OracleExchangeRatePrevote, "oracle", "exchangerateprevote", &["oracle/MsgExchangeRatePrevote"]),
    info(OracleDelegateFeeder, "oracle", "delegatefeeder", &["oracle/MsgDelegateFeedConsent", "/terra.oracle.v1beta1.MsgDelegateFeedConsent"]),
    info(OracleAggregateExchangeRatePrevote, "oracle", "aggregateexchangerateprevote", &["oracle/MsgAggregateExchangeRatePrevote", "/terra.oracle.v1beta1.MsgAggregateExchangeRatePrevote"]),
    info(OracleAggregateExchangeRateVote, "oracle", "aggregateexchangeratevote", &["oracle/MsgAggregateExchangeRateVote", "/terra.oracle.v1beta1.MsgAggregateExchangeRateVote"]),
    info(SlashingUnjail, "slashing", "unjail", &["slashing/MsgUnjail", "/cosmos.slashing.v1beta1.MsgUnjail"]),
    info(StakingBeginUnbonding, "staking", "begin_unbonding", &["staking/MsgUndelegate", "/cosmos.staking.v1beta1.MsgUndelegate"]),
    info(StakingEditValidator, "staking", "edit_validator", &["staking/MsgEditValidator", "/cosmos.staking.v1beta1.MsgEditValidator"]),
    info(StakingCreateValidator, "staking", "create_validator", &["staking/MsgCreateValidator", "/cosmos.staking.v1beta1.MsgCreateValidator"]),
    info(StakingDelegate, "staking", "delegate", &["staking/MsgDelegate", "/cosmos.staking.v1beta1.MsgDelegate"]),
    info(StakingBeginRedelegate, "staking", "begin_redelegate", &["staking/MsgBeginRedelegate", "/cosmos.staking.v1beta1.MsgBeginRedelegate"]),
    info(WasmExecuteContract, "wasm", "execute_contract", &["wasm/MsgExecuteContract", "/terra.wasm.v1beta1.MsgExecuteContract"]),
    info(WasmStoreCode, "wasm", "store_code", &["wasm/MsgStoreCode", "/terra.wasm.v1beta1.MsgStoreCode"]),
    info(WasmUpdateContractOwner, "wasm", "update_contract_owner", &["wasm/MsgUpdateContractOwner", "/terra.wasm.v1beta1.MsgUpdateContractAdmin"]),
    info(WasmInstantiateContract, "wasm", "instantiate_contract", &["wasm/MsgInstantiateContract", "/terra.wasm.v1beta1.MsgInstantiateContract"]),
    info(WasmMigrateContract, "wasm", "migrate_contract", &["wasm/MsgMigrateContract", "/terra.wasm.v1beta1.MsgMigrateContract"]),
    info(IbcTransfer, "ibc", "transfer", &["/ibc.applications.transfer.v1.MsgTransfer"]),
    info(IbcCreateClient, "ibc", "create_client", &["/ibc.core.client.v1.MsgCreateClient"]),
    info(IbcUpdateClient, "ibc", "update_client", &["/ibc.core.client.v1.MsgUpdateClient"]),
    info(IbcUpgradeClient, "ibc", "upgrade_client", &["/ibc.core.client.v1.MsgUpgradeClient"]),
    info(IbcSubmitMisbehaviour, "ibc", "submit_misbehaviour", &["/ibc.core.client.v1.MsgSubmitMisbehaviour"]),
    info(IbcConnectionOpenInit, "ibc", "connection_open_init", &["/ibc.core.connection.v1.MsgConnectionOpenInit"]),
    info(IbcConnectionOpenTry, "ibc", "connection_open_try", &["/ibc.core.connection.v1.MsgConnectionOpenTry"]),
    info(IbcConnectionOpenAck, "ibc", "connection_open_ack", &["/ibc.core.connection.v1.MsgConnectionOpenAck"]),
    info(IbcConnectionOpenConfirm, "ibc", "connection_open_confirm", &["/ibc.core.connection.v1.MsgConnectionOpenConfirm"]),
    info(IbcChannelOpenInit, "ibc", "channel_open_init", &["/ibc.core.channel.v1.MsgChannelOpenInit"]),
    info(IbcChannelOpenTry, "ibc", "channel_open_try", &["/ibc.core.channel.v1.MsgChannelOpenTry"]),
    info(IbcChannelOpenAck, "ibc", "channel_open_ack", &["/ibc.core.channel.v1.MsgChannelOpenAck"]),
    info(IbcChannelOpenConfirm, "ibc", "channel_open_confirm", &["/ibc.core.channel.v1.MsgChannelOpenConfirm"]),
    info(IbcChannelCloseInit, "ibc", "channel_close_init", &["/ibc.core.channel.v1.MsgChannelCloseInit"]),
    info(IbcChannelCloseConfirm, "ibc", "channel_close_confirm", &["/ibc.core.channel.v1.MsgChannelCloseConfirm"]),
    info(IbcRecvPacket, "ibc", "recv_packet", &["/ibc.core.channel.v1.MsgRecvPacket"]),
    info(IbcTimeout, "ibc", "timeout", &["/ibc.core.channel.v1.MsgTimeout"]),
    info(IbcAcknowledgement, "ibc", "acknowledgement", &["/ibc.core.channel.v1.MsgAcknowledgement"]),
];

fn tag_index() -> &'static HashMap<&'static str, MsgKind> {
    static INDEX: OnceLock<HashMap<&'static str, MsgKind>> = OnceLock::new();
    INDEX.get_or_init(|| {
        KINDS
            .iter()
            .flat_map(|info| info.tags.iter().map(move |tag| (*tag, info.kind)))
            .collect()
    })
}

impl MsgKind {
    pub fn info(self) -> &'static KindInfo {
        // every variant has exactly one row
        KINDS
            .iter()
            .find(|i| i.kind == self)
            .unwrap_or(&KINDS[0])
    }

    pub fn route(self) -> &'static str {
        self.info().route
    }

    pub fn msg_type(self) -> &'static str {
        self.info().msg_type
    }

    /// Kind sent under an amino name or protobuf type URL.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag_index().get(tag).copied()
    }
}

// ─── MessageRef ───────────────────────────────────────────────────────────────

/// A contained message after type resolution. Unknown messages keep their
/// raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRef {
    Known { kind: MsgKind, payload: Vec<u8> },
    Unknown { type_tag: String, payload: Vec<u8> },
}

impl MessageRef {
    pub fn resolve(raw: RawMessage) -> Self {
        match MsgKind::from_tag(&raw.type_tag) {
            Some(kind) => Self::Known {
                kind,
                payload: raw.payload,
            },
            None => Self::Unknown {
                type_tag: raw.type_tag,
                payload: raw.payload,
            },
        }
    }

    /// `(type, route)` labels for metrics and logs.
    pub fn labels(&self) -> (&str, &str) {
        match self {
            Self::Known { kind, .. } => (kind.msg_type(), kind.route()),
            Self::Unknown { type_tag, .. } => (type_tag.as_str(), "unknown"),
        }
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// Signature every mapper implements.
pub type MapperFn = fn(&[u8], &MapContext<'_>) -> Result<SubsetEvent, MapError>;

/// What a mapper may consult besides the message bytes.
#[derive(Clone, Copy)]
pub struct MapContext<'a> {
    pub encoding: Encoding,
    /// Execution log of the message being mapped.
    pub log: &'a LogEntry,
    /// Number of wrappers around the message.
    pub depth: usize,
    pub registry: &'a Registry,
}

impl<'a> MapContext<'a> {
    pub fn new(encoding: Encoding, log: &'a LogEntry, registry: &'a Registry) -> Self {
        Self {
            encoding,
            log,
            depth: 0,
            registry,
        }
    }

    /// Context for messages one wrapper deeper.
    pub fn nested(&self) -> Result<Self, MapError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(MapError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

/// Lookup table from kind to mapper.
pub struct Registry {
    mappers: HashMap<MsgKind, MapperFn>,
}

impl Registry {
    /// An empty registry; every message maps to [`MapError::Unknown`].
    pub fn empty() -> Self {
        Self {
            mappers: HashMap::new(),
        }
    }

    /// Registry with every built-in mapper.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        bank::register(&mut registry);
        crisis::register(&mut registry);
        distribution::register(&mut registry);
        evidence::register(&mut registry);
        gov::register(&mut registry);
        market::register(&mut registry);
        msgauth::register(&mut registry);
        oracle::register(&mut registry);
        slashing::register(&mut registry);
        staking::register(&mut registry);
        wasm::register(&mut registry);
        ibc::register(&mut registry);
        registry
    }

    pub fn register(&mut self, kind: MsgKind, mapper: MapperFn) {
        self.mappers.insert(kind, mapper);
    }

    pub fn contains(&self, kind: MsgKind) -> bool {
        self.mappers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Map a resolved message.
    pub fn map(&self, msg: &MessageRef, ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
        match msg {
            MessageRef::Known { kind, payload } => match self.mappers.get(kind) {
                Some(mapper) => mapper(payload, ctx),
                None => Err(MapError::Unknown {
                    type_tag: kind.msg_type().to_string(),
                }),
            },
            MessageRef::Unknown { type_tag, .. } => Err(MapError::Unknown {
                type_tag: type_tag.clone(),
            }),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

// ─── Helpers shared by the mappers ────────────────────────────────────────────

pub(crate) fn decode<M: Message + Default>(bytes: &[u8], message: &'static str) -> Result<M, MapError> {
    M::decode(bytes).map_err(|source| MapError::Malformed { message, source })
}

/// Start an event typed after the kind.
pub(crate) fn event(kind: MsgKind) -> SubsetEvent {
    SubsetEvent::new(kind.msg_type(), kind.route())
}

pub(crate) fn address(
    raw: &[u8],
    role: AddressRole,
    ctx: &MapContext<'_>,
    field: &'static str,
) -> Result<String, MapError> {
    normalize(raw, role, ctx.encoding).map_err(|source| MapError::Address { field, source })
}

pub(crate) fn account(raw: &[u8], ctx: &MapContext<'_>, field: &'static str) -> Result<Account, MapError> {
    Ok(Account::new(address(raw, AddressRole::Account, ctx, field)?))
}

pub(crate) fn validator(raw: &[u8], ctx: &MapContext<'_>, field: &'static str) -> Result<Account, MapError> {
    Ok(Account::new(address(
        raw,
        AddressRole::ValidatorOperator,
        ctx,
        field,
    )?))
}

pub(crate) fn coin(coin: &Coin, field: &'static str) -> Result<DecimalAmount, MapError> {
    DecimalAmount::parse(&coin.amount, coin.denom.clone())
        .map_err(|source| MapError::Amount { field, source })
}

pub(crate) fn coins(list: &[Coin], field: &'static str) -> Result<Vec<DecimalAmount>, MapError> {
    list.iter().map(|c| coin(c, field)).collect()
}

pub(crate) fn required<'c>(value: &'c Option<Coin>, field: &'static str) -> Result<&'c Coin, MapError> {
    value.as_ref().ok_or(MapError::Missing { field })
}

/// A `Dec` carried as its 10^18-scaled integer text.
pub(crate) fn dec(text: &str, currency: &str, field: &'static str) -> Result<DecimalAmount, MapError> {
    DecimalAmount::from_scaled(text, terraindex_core::decimal::DEC_PRECISION, currency)
        .map_err(|source| MapError::Amount { field, source })
}

pub(crate) fn transfer(account: Account, amounts: Vec<DecimalAmount>) -> EventTransfer {
    EventTransfer { account, amounts }
}

/// Add the log's `transfer` movements under `kind`.
pub(crate) fn with_transfers(
    mut se: SubsetEvent,
    kind: &str,
    skip: &str,
    ctx: &MapContext<'_>,
) -> Result<SubsetEvent, MapError> {
    crate::transfers::produce_transfers(&mut se, kind, skip, ctx.log)
        .map_err(|source| MapError::Amount {
            field: "transfer",
            source,
        })?;
    Ok(se)
}

/// RFC 3339 text of a protobuf timestamp.
pub(crate) fn timestamp_text(ts: &Timestamp) -> Option<String> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    chrono::DateTime::from_timestamp(ts.seconds, nanos)
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
}

/// Hash-like byte fields: raw bytes under amino, hex text under protobuf.
pub(crate) fn hex_text(raw: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Amino => hex::encode(raw),
        Encoding::Proto => String::from_utf8_lossy(raw).into_owned(),
    }
}
