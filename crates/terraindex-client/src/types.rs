//! Node response shapes (Tendermint JSON-RPC and LCD REST).
//!
//! Only the fields the worker reads are modelled. Numbers arrive as strings.

use serde::Deserialize;
use terraindex_core::TxResponse;

/// Error body embedded in a JSON-RPC envelope. Empty message means success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

impl RpcError {
    pub fn is_set(&self) -> bool {
        !self.message.is_empty()
    }
}

/// JSON-RPC envelope around every Tendermint response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockId {
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockHeader {
    pub height: String,
    #[serde(default)]
    pub chain_id: String,
    pub time: String,
    /// Reported here only by the oldest chain software.
    #[serde(default)]
    pub num_txs: Option<String>,
}

// ─── /block ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockData {
    #[serde(default)]
    pub txs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockBody {
    pub header: BlockHeader,
    #[serde(default)]
    pub data: BlockData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockMetaId {
    #[serde(default)]
    pub block_id: BlockId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockResult {
    #[serde(default)]
    pub block_id: Option<BlockId>,
    /// Older nodes nest the id under `block_meta`.
    #[serde(default)]
    pub block_meta: Option<BlockMetaId>,
    pub block: BlockBody,
}

impl BlockResult {
    pub fn hash(&self) -> &str {
        self.block_id
            .as_ref()
            .map(|id| id.hash.as_str())
            .or_else(|| self.block_meta.as_ref().map(|m| m.block_id.hash.as_str()))
            .unwrap_or("")
    }

    pub fn tx_count(&self) -> u64 {
        self.block.data.txs.as_ref().map_or(0, |t| t.len() as u64)
    }
}

// ─── /blockchain ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockMeta {
    #[serde(default)]
    pub block_id: BlockId,
    pub header: BlockHeader,
    #[serde(default)]
    pub num_txs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockchainResult {
    #[serde(default)]
    pub last_height: String,
    #[serde(default)]
    pub block_metas: Vec<BlockMeta>,
}

// ─── /tx_search ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxSearchResult {
    #[serde(default)]
    pub txs: Vec<TxResponse>,
    #[serde(default)]
    pub total_count: String,
}

// ─── LCD ──────────────────────────────────────────────────────────────────────

/// LCD error body, returned with statuses above 399.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LcdError {
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardResult {
    #[serde(default)]
    pub total: Option<Vec<Coin>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardResponse {
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub result: RewardResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub result: Option<Vec<Coin>>,
}

/// One delegation. `B` is the balance shape: a bare amount string on
/// columbus-3 (always in the staking denom), a [`Coin`] afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct DelegationEntry<B> {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: String,
    pub balance: B,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "B: Deserialize<'de>"))]
pub struct DelegationResponse<B> {
    #[serde(default)]
    pub height: String,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub result: Vec<DelegationEntry<B>>,
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}
