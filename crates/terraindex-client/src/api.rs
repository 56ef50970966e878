//! Traits the orchestrator and task handlers depend on, plus the shared
//! block-metadata aggregate filled by concurrent range fetches.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use terraindex_core::{
    AccountBalance, AccountDelegations, Block, Height, HeightAccount, HeightRange, Reward, ToGet,
    TxResponse,
};

use crate::error::ClientError;

/// Optional absolute deadline passed to every call.
pub type Deadline = Option<Instant>;

/// Block and transaction access over the node's RPC endpoint.
#[async_trait]
pub trait ChainApi: Send + Sync + 'static {
    /// Block at `height`; `0` means the latest block.
    async fn get_block(&self, height: Height, deadline: Deadline) -> Result<Block, ClientError>;

    /// Fetch one metadata page for `range` and merge it into `blocks`.
    async fn get_blocks_meta(
        &self,
        range: &HeightRange,
        limit: u64,
        blocks: &BlocksMap,
        deadline: Deadline,
    ) -> Result<(), ClientError>;

    /// One `tx_search` page for a single height.
    async fn search_tx_page(&self, item: ToGet, deadline: Deadline) -> Result<Vec<TxResponse>, ClientError>;
}

/// Account queries over the node's LCD endpoint.
#[async_trait]
pub trait AccountApi: Send + Sync + 'static {
    async fn get_reward(&self, params: &HeightAccount, deadline: Deadline) -> Result<Reward, ClientError>;

    async fn get_account_balance(
        &self,
        params: &HeightAccount,
        deadline: Deadline,
    ) -> Result<AccountBalance, ClientError>;

    async fn get_account_delegations(
        &self,
        params: &HeightAccount,
        deadline: Deadline,
    ) -> Result<AccountDelegations, ClientError>;
}

// ─── BlocksMap ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BlocksInner {
    blocks: HashMap<Height, Block>,
    num_txs: u64,
    start_height: Height,
    end_height: Height,
}

/// Blocks gathered by the concurrent metadata fetches of one range, with a
/// running transaction count and the observed height bounds.
#[derive(Debug, Default)]
pub struct BlocksMap {
    inner: Mutex<BlocksInner>,
}

impl BlocksMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of blocks under one lock acquisition.
    pub fn extend(&self, blocks: impl IntoIterator<Item = Block>) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        for block in blocks {
            let height = block.height;
            if let Some(previous) = inner.blocks.insert(height, block.clone()) {
                inner.num_txs -= previous.number_of_transactions;
            }
            inner.num_txs += block.number_of_transactions;
            if inner.start_height == 0 || inner.start_height > height {
                inner.start_height = height;
            }
            if inner.end_height == 0 || inner.end_height < height {
                inner.end_height = height;
            }
        }
    }

    pub fn insert(&self, block: Block) {
        self.extend(std::iter::once(block));
    }

    pub fn num_txs(&self) -> u64 {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).num_txs
    }

    /// `(lowest, highest)` height seen, `(0, 0)` when empty.
    pub fn bounds(&self) -> (Height, Height) {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        (inner.start_height, inner.end_height)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, height: Height) -> Option<Block> {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .blocks
            .get(&height)
            .cloned()
    }

    /// All blocks ordered by height.
    pub fn sorted(&self) -> Vec<Block> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let mut blocks: Vec<Block> = inner.blocks.values().cloned().collect();
        blocks.sort_by_key(|b| b.height);
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn block(height: Height, txs: u64) -> Block {
        Block {
            hash: format!("H{height}"),
            height,
            time: Utc::now(),
            chain_id: "columbus-4".into(),
            number_of_transactions: txs,
        }
    }

    #[test]
    fn tracks_bounds_and_counts() {
        let map = BlocksMap::new();
        map.extend([block(12, 1), block(10, 0), block(11, 4)]);
        assert_eq!(map.bounds(), (10, 12));
        assert_eq!(map.num_txs(), 5);
        let heights: Vec<_> = map.sorted().iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![10, 11, 12]);
    }

    #[test]
    fn duplicate_height_not_double_counted() {
        let map = BlocksMap::new();
        map.insert(block(7, 3));
        map.insert(block(7, 3));
        assert_eq!(map.len(), 1);
        assert_eq!(map.num_txs(), 3);
    }

    #[tokio::test]
    async fn concurrent_merges() {
        let map = Arc::new(BlocksMap::new());
        let mut set = tokio::task::JoinSet::new();
        for chunk in 0..5u64 {
            let map = Arc::clone(&map);
            set.spawn(async move {
                map.extend((0..20).map(|i| block(chunk * 20 + i + 1, 1)));
            });
        }
        while set.join_next().await.is_some() {}
        assert_eq!(map.len(), 100);
        assert_eq!(map.num_txs(), 100);
        assert_eq!(map.bounds(), (1, 100));
    }
}
