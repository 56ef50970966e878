//! Canonical, chain-agnostic data model streamed to the indexing manager.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::decimal::DecimalAmount;

/// Block number.
pub type Height = u64;

// ─── Block ────────────────────────────────────────────────────────────────────

/// Block metadata. Immutable once fetched; cached by height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub height: Height,
    pub time: DateTime<Utc>,
    pub chain_id: String,
    pub number_of_transactions: u64,
}

// ─── HeightRange ──────────────────────────────────────────────────────────────

/// Inclusive range of heights. `end_height == 0` asks for the latest page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    pub start_height: Height,
    pub end_height: Height,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub network: String,
}

impl HeightRange {
    pub fn new(start_height: Height, end_height: Height) -> Self {
        Self {
            start_height,
            end_height,
            ..Default::default()
        }
    }

    /// Split into consecutive sub-ranges of at most `page` heights.
    pub fn split(&self, page: u64) -> Vec<HeightRange> {
        let page = page.max(1);
        if self.end_height < self.start_height {
            return vec![];
        }
        let mut ranges = Vec::new();
        let mut start = self.start_height;
        loop {
            let end = start.saturating_add(page - 1).min(self.end_height);
            ranges.push(HeightRange {
                start_height: start,
                end_height: end,
                chain_id: self.chain_id.clone(),
                network: self.network.clone(),
            });
            if end == self.end_height {
                break;
            }
            start = end + 1;
        }
        ranges
    }
}

// ─── Accounts & amounts ───────────────────────────────────────────────────────

/// Validator description, only present on validator creation/edit events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<AccountDetails>,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            details: None,
        }
    }
}

/// One side of a value movement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTransfer {
    pub account: Account,
    #[serde(default)]
    pub amounts: Vec<DecimalAmount>,
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetEventError {
    pub message: String,
}

/// Canonical decoding of one blockchain instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetEvent {
    /// Ordered tags; the first one is the primary type.
    #[serde(default)]
    pub r#type: Vec<String>,
    #[serde(default)]
    pub module: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub node: IndexMap<String, Vec<Account>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sender: Vec<EventTransfer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient: Vec<EventTransfer>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub amount: IndexMap<String, DecimalAmount>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub additional: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transfers: IndexMap<String, Vec<EventTransfer>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub: Vec<SubsetEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SubsetEventError>,
}

impl SubsetEvent {
    pub fn new(kind: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            r#type: vec![kind.into()],
            module: module.into(),
            ..Default::default()
        }
    }

    /// Primary type tag, empty when the event carries none.
    pub fn primary_type(&self) -> &str {
        self.r#type.first().map(String::as_str).unwrap_or("")
    }

    /// Append an account under a role name (`delegator`, `validator`, ...).
    pub fn with_node(mut self, role: &str, account: Account) -> Self {
        self.node.entry(role.to_string()).or_default().push(account);
        self
    }

    pub fn with_amount(mut self, name: &str, amount: DecimalAmount) -> Self {
        self.amount.insert(name.to_string(), amount);
        self
    }

    pub fn with_additional(mut self, key: &str, values: Vec<String>) -> Self {
        self.additional.insert(key.to_string(), values);
        self
    }
}

/// One contained message (or a synthetic log-only / error entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Message index, stringified. Empty for synthetic error events.
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub sub: Vec<SubsetEvent>,
}

// ─── Transaction ──────────────────────────────────────────────────────────────

/// One decoded on-chain transaction. Never mutated after decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub height: Height,
    pub time: Option<DateTime<Utc>>,
    pub chain_id: String,
    pub block_hash: String,
    pub memo: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    #[serde(default)]
    pub fee: Vec<DecimalAmount>,
    /// Base64 text of the transaction bytes as delivered by the node.
    pub raw: String,
    pub raw_log: String,
    #[serde(default)]
    pub events: Vec<TransactionEvent>,
}

// ─── Raw transaction payload ──────────────────────────────────────────────────

/// Execution result attached to a searched transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverTx {
    #[serde(default)]
    pub log: String,
    #[serde(default, rename = "gasWanted", alias = "gas_wanted")]
    pub gas_wanted: String,
    #[serde(default, rename = "gasUsed", alias = "gas_used")]
    pub gas_used: String,
}

/// A transaction exactly as returned by `/tx_search`, before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub hash: String,
    pub height: String,
    #[serde(default)]
    pub tx_result: DeliverTx,
    /// Base64 transaction bytes.
    #[serde(default)]
    pub tx: String,
}

/// Unit of transaction-search work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToGet {
    pub height: Height,
    pub page: u32,
    pub per_page: u32,
}

// ─── Task payloads ────────────────────────────────────────────────────────────

/// Request for the blocks produced since the last processed height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestDataRequest {
    #[serde(default)]
    pub last_height: Height,
    #[serde(default)]
    pub last_hash: String,
    #[serde(default)]
    pub last_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub retry_count: u64,
    #[serde(default)]
    pub self_check: bool,
}

/// Head of the chain as reported by the latest block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestMark {
    pub last_hash: String,
    pub last_height: Height,
    pub last_time: DateTime<Utc>,
}

/// Account query at a given height (0 = latest).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightAccount {
    #[serde(default)]
    pub height: Height,
    pub account: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub height: Height,
    pub account: String,
    pub rewards: Vec<DecimalAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub height: Height,
    pub account: String,
    pub balances: Vec<DecimalAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: String,
    pub validator: String,
    pub shares: DecimalAmount,
    pub balance: DecimalAmount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelegations {
    pub height: Height,
    pub account: String,
    pub delegations: Vec<Delegation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_exact_pages() {
        let ranges = HeightRange::new(1, 40).split(20);
        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start_height, ranges[0].end_height), (1, 20));
        assert_eq!((ranges[1].start_height, ranges[1].end_height), (21, 40));
    }

    #[test]
    fn split_partial_last_page() {
        let ranges = HeightRange::new(100, 102).split(20);
        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start_height, ranges[0].end_height), (100, 102));

        let ranges = HeightRange::new(10, 55).split(20);
        let bounds: Vec<_> = ranges.iter().map(|r| (r.start_height, r.end_height)).collect();
        assert_eq!(bounds, vec![(10, 29), (30, 49), (50, 55)]);
    }

    #[test]
    fn split_inverted_is_empty() {
        assert!(HeightRange::new(10, 5).split(20).is_empty());
    }

    #[test]
    fn subset_event_serialises_type_key() {
        let ev = SubsetEvent::new("delegate", "staking")
            .with_node("delegator", Account::new("terra1abc"));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"][0], "delegate");
        assert_eq!(json["node"]["delegator"][0]["id"], "terra1abc");
        assert!(json.get("sender").is_none());
    }
}
