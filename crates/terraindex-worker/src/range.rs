//! Range-fetch orchestrator.
//!
//! ```text
//! HeightRange ──split(20)──► get_blocks_meta × N ──► BlocksMap   (barrier)
//!                                                        │
//!                          Block payloads ◄──────────────┤
//!                                                        ▼
//!                 ToGet{height, page, 100} ──► WorkerPool (5 × search_tx_page)
//!                                                        │ TxResponse
//!                                                        ▼
//!                                  decode stage (TxDecoder) ──► Transaction payloads
//! ```
//!
//! Nothing is emitted for a range until every metadata sub-fetch succeeded.
//! Completion waits for the fetch pool first, then for the decode stage.

use std::sync::{Arc, Mutex};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;

use terraindex_client::{BlocksMap, ChainApi, Deadline};
use terraindex_core::{Block, Height, HeightRange, LatestDataRequest, ToGet, TxResponse};
use terraindex_decode::TxDecoder;

use crate::error::{join_errors, WorkerError};
use crate::pool::WorkerPool;
use crate::task::Payload;

/// Heights per `/blockchain` call; the node caps the page at 20.
pub const BLOCKCHAIN_PAGE: u64 = 20;
/// Transactions per `tx_search` page.
pub const TX_PAGE: u32 = 100;

const TO_GET_QUEUE: usize = 10;
const RAW_TX_QUEUE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    /// Heights processed per sequential slice of a range request.
    pub big_page: u64,
    /// Most heights a "latest" request catches up on.
    pub maximum_heights_to_get: u64,
    pub fetch_workers: usize,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            big_page: 1000,
            maximum_heights_to_get: 10_000,
            fetch_workers: 5,
        }
    }
}

pub struct RangeFetcher {
    chain: Arc<dyn ChainApi>,
    decoder: Arc<TxDecoder>,
    config: RangeConfig,
}

impl RangeFetcher {
    pub fn new(chain: Arc<dyn ChainApi>, decoder: Arc<TxDecoder>, config: RangeConfig) -> Self {
        Self {
            chain,
            decoder,
            config,
        }
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    /// Blocks and transactions of `range`, one big page at a time.
    ///
    /// A failing big page stops the request; pages before it have already
    /// been emitted.
    pub async fn get_transactions(
        &self,
        range: &HeightRange,
        out: &mpsc::Sender<Payload>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        for page in range.split(self.config.big_page) {
            tracing::info!(
                start = page.start_height,
                end = page.end_height,
                "fetching range"
            );
            self.fetch_range(&page, out, deadline).await?;
        }
        Ok(())
    }

    /// Blocks and transactions from the caller's last height up to the head.
    pub async fn get_latest(
        &self,
        request: &LatestDataRequest,
        out: &mpsc::Sender<Payload>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let blocks = Arc::new(BlocksMap::new());
        self.chain
            .get_blocks_meta(&HeightRange::default(), BLOCKCHAIN_PAGE, &blocks, deadline)
            .await?;
        if blocks.is_empty() {
            tracing::warn!("latest block page is empty");
            return Ok(());
        }

        let (low, head) = blocks.bounds();
        let start =
            starting_height(request.last_height, self.config.maximum_heights_to_get, head).max(1);
        if start < low {
            self.fetch_meta(&HeightRange::new(start, low - 1), &blocks, deadline)
                .await?;
        }

        let selected: Vec<Block> = blocks
            .sorted()
            .into_iter()
            .filter(|b| b.height >= start)
            .collect();
        tracing::info!(
            last_height = request.last_height,
            start,
            head,
            blocks = selected.len(),
            "fetching latest"
        );
        self.stream_blocks(selected, blocks, out, deadline).await
    }

    /// One range: metadata barrier, then the two-stage transaction pipeline.
    pub async fn fetch_range(
        &self,
        range: &HeightRange,
        out: &mpsc::Sender<Payload>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let blocks = Arc::new(BlocksMap::new());
        self.fetch_meta(range, &blocks, deadline).await?;
        tracing::debug!(
            start = range.start_height,
            end = range.end_height,
            blocks = blocks.len(),
            txs = blocks.num_txs(),
            "block metadata fetched"
        );
        self.stream_blocks(blocks.sorted(), blocks, out, deadline).await
    }

    /// Fetch all sub-ranges of `range` concurrently into `blocks` and wait
    /// for every one of them.
    async fn fetch_meta(
        &self,
        range: &HeightRange,
        blocks: &BlocksMap,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let chain = &self.chain;
        let mut fetches: FuturesUnordered<_> = range
            .split(BLOCKCHAIN_PAGE)
            .into_iter()
            .map(|sub| async move {
                tracing::debug!(start = sub.start_height, end = sub.end_height, "getting blocks");
                chain.get_blocks_meta(&sub, 0, blocks, deadline).await
            })
            .collect();

        let mut errors = Vec::new();
        while let Some(result) = fetches.next().await {
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WorkerError::Range(join_errors("Errors Getting Blocks", &errors)))
        }
    }

    /// Emit `selected` blocks and their decoded transactions. `index` is
    /// used to stamp transactions with their block.
    async fn stream_blocks(
        &self,
        selected: Vec<Block>,
        index: Arc<BlocksMap>,
        out: &mpsc::Sender<Payload>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let (raw_tx, raw_rx) = mpsc::channel::<TxResponse>(RAW_TX_QUEUE);
        let decode_stage = tokio::spawn(decode_stage(
            Arc::clone(&self.decoder),
            index,
            raw_rx,
            out.clone(),
        ));

        let failures = Arc::new(Mutex::new(Vec::<String>::new()));
        let pool = {
            let chain = Arc::clone(&self.chain);
            let failures = Arc::clone(&failures);
            WorkerPool::spawn(self.config.fetch_workers, TO_GET_QUEUE, move |item: ToGet| {
                let chain = Arc::clone(&chain);
                let failures = Arc::clone(&failures);
                let raw_tx = raw_tx.clone();
                async move {
                    match chain.search_tx_page(item, deadline).await {
                        Ok(txs) => {
                            for tx in txs {
                                if raw_tx.send(tx).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                height = item.height,
                                page = item.page,
                                error = %e,
                                "transaction search failed"
                            );
                            failures
                                .lock()
                                .unwrap_or_else(|p| p.into_inner())
                                .push(format!("height {} page {}: {e}", item.height, item.page));
                        }
                    }
                }
            })
        };

        if let Err(e) = enqueue(selected, &pool, out).await {
            drop(pool);
            decode_stage.abort();
            return Err(e);
        }

        pool.finish().await;
        let decoded = decode_stage
            .await
            .map_err(|e| WorkerError::Task(format!("decode stage: {e}")))??;
        tracing::debug!(decoded, "range delivered");

        let failures = std::mem::take(&mut *failures.lock().unwrap_or_else(|p| p.into_inner()));
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WorkerError::Range(join_errors("Errors Getting Transactions", &failures)))
        }
    }
}

/// Emit each block and queue the search pages for its transactions.
async fn enqueue(
    selected: Vec<Block>,
    pool: &WorkerPool<ToGet>,
    out: &mpsc::Sender<Payload>,
) -> Result<(), WorkerError> {
    for block in selected {
        let items: Vec<ToGet> = search_pages(&block).collect();
        out.send(Payload::Block(block))
            .await
            .map_err(|_| WorkerError::Sink("output closed".into()))?;
        for item in items {
            pool.submit(item).await?;
        }
    }
    Ok(())
}

/// `ceil(n / TX_PAGE)` search items for a block with `n` transactions.
fn search_pages(block: &Block) -> impl Iterator<Item = ToGet> {
    let height = block.height;
    let pages = block.number_of_transactions.div_ceil(TX_PAGE as u64);
    (1..=pages).map(move |page| ToGet {
        height,
        page: page as u32,
        per_page: TX_PAGE,
    })
}

/// Single consumer: decode every raw transaction and forward it. Returns
/// the number of transactions emitted.
async fn decode_stage(
    decoder: Arc<TxDecoder>,
    blocks: Arc<BlocksMap>,
    mut raw: mpsc::Receiver<TxResponse>,
    out: mpsc::Sender<Payload>,
) -> Result<u64, WorkerError> {
    let mut emitted = 0u64;
    while let Some(resp) = raw.recv().await {
        let block = resp.height.trim().parse::<Height>().ok().and_then(|h| blocks.get(h));
        let decoded = match &block {
            Some(block) => decoder.decode_in_block(&resp, block),
            None => {
                tracing::warn!(hash = %resp.hash, height = %resp.height, "transaction outside fetched blocks");
                decoder.decode(&resp)
            }
        };
        match decoded {
            Ok(tx) => {
                out.send(Payload::Transaction(tx))
                    .await
                    .map_err(|_| WorkerError::Sink("output closed".into()))?;
                emitted += 1;
            }
            Err(e) => {
                tracing::error!(hash = %resp.hash, height = %resp.height, error = %e, "transaction dropped");
            }
        }
    }
    Ok(emitted)
}

/// First height a "latest" request should fetch.
///
/// Without history only the last `maximum_heights_to_get` heights are taken;
/// a gap larger than that is cut to the same window.
pub fn starting_height(last_height: Height, maximum_heights_to_get: Height, head: Height) -> Height {
    if last_height == 0 || maximum_heights_to_get < head.saturating_sub(last_height) {
        return head.saturating_sub(maximum_heights_to_get);
    }
    last_height
}
