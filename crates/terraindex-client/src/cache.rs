//! Recency cache of fetched blocks, keyed by height.
//!
//! Fixed capacity, insertion-order eviction: when full, exactly the oldest
//! inserted block is dropped. Re-inserting a cached height is a no-op, so a
//! block is never overwritten. Reads share the lock; writes take it
//! exclusively.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use terraindex_core::{Block, Height};

/// Default number of cached blocks.
pub const DEFAULT_CAPACITY: usize = 400;

struct Inner {
    blocks: HashMap<Height, Block>,
    /// Insertion order (oldest first).
    order: VecDeque<Height>,
}

pub struct BlockCache {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl BlockCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: RwLock::new(Inner {
                blocks: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    /// Insert a block. Returns `false` when the height was already cached.
    pub fn add(&self, block: Block) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|p| p.into_inner());
        if inner.blocks.contains_key(&block.height) {
            return false;
        }
        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.blocks.remove(&oldest);
            }
        }
        inner.order.push_back(block.height);
        inner.blocks.insert(block.height, block);
        true
    }

    pub fn get(&self, height: Height) -> Option<Block> {
        let inner = self.inner.read().unwrap_or_else(|p| p.into_inner());
        inner.blocks.get(&height).cloned()
    }

    pub fn contains(&self, height: Height) -> bool {
        let inner = self.inner.read().unwrap_or_else(|p| p.into_inner());
        inner.blocks.contains_key(&height)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|p| p.into_inner());
        inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn block(height: Height, hash: &str) -> Block {
        Block {
            hash: hash.to_string(),
            height,
            time: Utc::now(),
            chain_id: "columbus-4".into(),
            number_of_transactions: 0,
        }
    }

    #[test]
    fn evicts_first_inserted() {
        let cache = BlockCache::new(3);
        for h in [10, 11, 12] {
            assert!(cache.add(block(h, "h")));
        }
        assert!(cache.add(block(13, "h")));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(10), "oldest must be evicted");
        for h in [11, 12, 13] {
            assert!(cache.contains(h));
        }
    }

    #[test]
    fn re_add_is_noop() {
        let cache = BlockCache::new(2);
        cache.add(block(1, "first"));
        cache.add(block(2, "second"));
        assert!(!cache.add(block(1, "replacement")));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(2), "nothing evicted");
        assert_eq!(cache.get(1).unwrap().hash, "first", "never overwritten");
    }

    #[test]
    fn eviction_is_insertion_order_not_access_order() {
        let cache = BlockCache::new(2);
        cache.add(block(1, "a"));
        cache.add(block(2, "b"));
        let _ = cache.get(1);
        cache.add(block(3, "c"));
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let cache = Arc::new(BlockCache::default());
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for h in 0..100u64 {
                        cache.add(block(t * 100 + h, "x"));
                        let _ = cache.get(h);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);
    }
}
