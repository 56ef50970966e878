//! Persistence collaborator.
//!
//! A [`StoreSession`] durably commits blocks and transactions. A height is
//! only marked processed through [`StoreSession::confirm_heights`], which
//! callers invoke after both commits succeeded.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use terraindex_core::{Block, Height, Transaction};

use crate::error::WorkerError;

#[async_trait]
pub trait StoreSession: Send + Sync {
    async fn store_blocks(&self, blocks: &[Block]) -> Result<(), WorkerError>;

    async fn store_transactions(&self, txs: &[Transaction]) -> Result<(), WorkerError>;

    /// Mark the heights of `blocks` as fully processed.
    async fn confirm_heights(&self, blocks: &[Block]) -> Result<(), WorkerError>;
}

// ─── In-memory store (for testing) ────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryData {
    blocks: HashMap<Height, Block>,
    transactions: HashMap<String, Transaction>,
    confirmed: BTreeSet<Height>,
}

/// In-memory store for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self, height: Height) -> Option<Block> {
        self.data.lock().unwrap_or_else(|p| p.into_inner()).blocks.get(&height).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.data.lock().unwrap_or_else(|p| p.into_inner()).transactions.len()
    }

    pub fn is_confirmed(&self, height: Height) -> bool {
        self.data
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .confirmed
            .contains(&height)
    }

    pub fn confirmed(&self) -> Vec<Height> {
        self.data
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .confirmed
            .iter()
            .copied()
            .collect()
    }
}

#[async_trait]
impl StoreSession for MemoryStore {
    async fn store_blocks(&self, blocks: &[Block]) -> Result<(), WorkerError> {
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        for block in blocks {
            data.blocks.insert(block.height, block.clone());
        }
        Ok(())
    }

    async fn store_transactions(&self, txs: &[Transaction]) -> Result<(), WorkerError> {
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        for tx in txs {
            data.transactions.insert(tx.hash.clone(), tx.clone());
        }
        Ok(())
    }

    async fn confirm_heights(&self, blocks: &[Block]) -> Result<(), WorkerError> {
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        for block in blocks {
            if !data.blocks.contains_key(&block.height) {
                return Err(WorkerError::Store(format!(
                    "height {} confirmed before its block was stored",
                    block.height
                )));
            }
            data.confirmed.insert(block.height);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn block(height: Height) -> Block {
        Block {
            hash: format!("H{height}"),
            height,
            time: Utc::now(),
            chain_id: "columbus-4".into(),
            number_of_transactions: 1,
        }
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.store_blocks(&[block(5)]).await.unwrap();
        store
            .store_transactions(&[Transaction {
                hash: "T".into(),
                height: 5,
                ..Transaction::default()
            }])
            .await
            .unwrap();
        assert!(!store.is_confirmed(5));

        store.confirm_heights(&[block(5)]).await.unwrap();
        assert!(store.is_confirmed(5));
        assert_eq!(store.block(5).unwrap().hash, "H5");
        assert_eq!(store.transaction_count(), 1);
    }

    #[tokio::test]
    async fn confirming_unstored_height_fails() {
        let store = MemoryStore::new();
        let err = store.confirm_heights(&[block(9)]).await.unwrap_err();
        assert!(matches!(err, WorkerError::Store(_)));
        assert!(store.confirmed().is_empty());
    }
}
