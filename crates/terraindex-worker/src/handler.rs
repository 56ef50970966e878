//! Task dispatch.
//!
//! [`IndexerClient::handle`] routes one [`TaskRequest`] to its handler and
//! guarantees the task gets exactly one terminal response: a final error,
//! a final single payload, or `END` after the streamed payloads.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::time::Instant;

use terraindex_client::{AccountApi, ChainApi, Deadline};
use terraindex_core::{
    Block, Height, HeightAccount, HeightRange, LatestDataRequest, LatestMark, ToGet, Transaction,
};
use terraindex_decode::TxDecoder;
use terraindex_observability::WorkerMetrics;

use crate::error::WorkerError;
use crate::range::{RangeConfig, RangeFetcher, TX_PAGE};
use crate::store::StoreSession;
use crate::task::{
    validate_account, validate_range, Payload, ResponseSink, ResponseStream, TaskRequest,
    GET_ACCOUNT_BALANCE, GET_ACCOUNT_DELEGATIONS, GET_LATEST, GET_LATEST_MARK, GET_REWARD,
    GET_TRANSACTIONS,
};

/// Upper bound for one task.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Upper bound for the latest-mark probe.
pub const LATEST_MARK_TIMEOUT: Duration = Duration::from_secs(1);

/// Payloads buffered between the range pipeline and the sink.
const OUT_QUEUE: usize = 2 * TX_PAGE as usize + 1;

pub struct IndexerClient {
    chain: Arc<dyn ChainApi>,
    accounts: Arc<dyn AccountApi>,
    decoder: Arc<TxDecoder>,
    fetcher: RangeFetcher,
    store: Option<Arc<dyn StoreSession>>,
    metrics: WorkerMetrics,
    task_timeout: Duration,
}

impl IndexerClient {
    pub fn new(
        chain: Arc<dyn ChainApi>,
        accounts: Arc<dyn AccountApi>,
        decoder: Arc<TxDecoder>,
        config: RangeConfig,
        metrics: WorkerMetrics,
    ) -> Self {
        let fetcher = RangeFetcher::new(Arc::clone(&chain), Arc::clone(&decoder), config);
        Self {
            chain,
            accounts,
            decoder,
            fetcher,
            store: None,
            metrics,
            task_timeout: TASK_TIMEOUT,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn StoreSession>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Run one task to completion. Task failures are reported through the
    /// sink; an `Err` means the sink itself failed.
    pub async fn handle(&self, request: TaskRequest, sink: &dyn ResponseSink) -> Result<(), WorkerError> {
        self.metrics.record_request_received(&request.type_);
        let deadline = Some(Instant::now() + self.task_timeout);
        let stream = ResponseStream::new(request.id, sink, &self.metrics);
        tracing::debug!(task_id = %request.id, task_type = %request.type_, "task received");

        match request.type_.as_str() {
            GET_TRANSACTIONS => self.get_transactions(&request, stream, deadline).await,
            GET_LATEST => self.get_latest(&request, stream, deadline).await,
            GET_LATEST_MARK => self.get_latest_mark(&request, stream).await,
            GET_REWARD => {
                self.account_query(&request, stream, |p, d| async move {
                    self.accounts.get_reward(&p, d).await.map(Payload::Reward)
                })
                .await
            }
            GET_ACCOUNT_BALANCE => {
                self.account_query(&request, stream, |p, d| async move {
                    self.accounts.get_account_balance(&p, d).await.map(Payload::AccountBalance)
                })
                .await
            }
            GET_ACCOUNT_DELEGATIONS => {
                self.account_query(&request, stream, |p, d| async move {
                    self.accounts
                        .get_account_delegations(&p, d)
                        .await
                        .map(Payload::AccountDelegations)
                })
                .await
            }
            other => stream.fail(format!("There is no such handler {other}")).await,
        }
    }

    async fn get_transactions(
        &self,
        request: &TaskRequest,
        stream: ResponseStream<'_>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let range: HeightRange = match parse(request, validate_range) {
            Ok(range) => range,
            Err(e) => return stream.fail(e.to_string()).await,
        };
        let fetcher = &self.fetcher;
        pump(stream, |out| async move {
            fetcher.get_transactions(&range, &out, deadline).await
        })
        .await
    }

    async fn get_latest(
        &self,
        request: &TaskRequest,
        stream: ResponseStream<'_>,
        deadline: Deadline,
    ) -> Result<(), WorkerError> {
        let latest: LatestDataRequest = match parse(request, |_| Ok(())) {
            Ok(latest) => latest,
            Err(e) => return stream.fail(e.to_string()).await,
        };
        let fetcher = &self.fetcher;
        pump(stream, |out| async move {
            fetcher.get_latest(&latest, &out, deadline).await
        })
        .await
    }

    async fn get_latest_mark(&self, request: &TaskRequest, stream: ResponseStream<'_>) -> Result<(), WorkerError> {
        if let Err(e) = parse::<LatestDataRequest>(request, |_| Ok(())) {
            return stream.fail(e.to_string()).await;
        }
        let deadline = Some(Instant::now() + LATEST_MARK_TIMEOUT);
        match self.chain.get_block(0, deadline).await {
            Ok(block) => {
                stream
                    .send_final(Payload::LatestMark(LatestMark {
                        last_hash: block.hash,
                        last_height: block.height,
                        last_time: block.time,
                    }))
                    .await
            }
            Err(e) => stream.fail(format!("Error getting block data {e}")).await,
        }
    }

    /// Height+account queries: one payload, then `END`.
    async fn account_query<F, Fut>(
        &self,
        request: &TaskRequest,
        mut stream: ResponseStream<'_>,
        query: F,
    ) -> Result<(), WorkerError>
    where
        F: FnOnce(HeightAccount, Deadline) -> Fut,
        Fut: Future<Output = Result<Payload, terraindex_client::ClientError>>,
    {
        let params: HeightAccount = match parse(request, validate_account) {
            Ok(params) => params,
            Err(e) => return stream.fail(e.to_string()).await,
        };
        let account = params.account.clone();
        match query(params, Some(Instant::now() + self.task_timeout)).await {
            Ok(payload) => {
                stream.send(payload).await?;
                stream.end().await
            }
            Err(e) => {
                tracing::error!(task_id = %request.id, account = %account, error = %e, "account query failed");
                stream.fail(e.to_string()).await
            }
        }
    }

    /// Fetch, store and confirm one height.
    ///
    /// The height is confirmed only after the block and its transactions
    /// were committed.
    pub async fn block_and_tx(&self, height: Height) -> Result<(Block, Vec<Transaction>), WorkerError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| WorkerError::Store("no store session configured".into()))?;
        let deadline = Some(Instant::now() + self.task_timeout);

        tracing::debug!(height, "getting height");
        let block = self.chain.get_block(height, deadline).await.map_err(|e| {
            tracing::error!(height, error = %e, "getting block failed");
            e
        })?;
        store.store_blocks(std::slice::from_ref(&block)).await?;

        let mut txs = Vec::new();
        let pages = block.number_of_transactions.div_ceil(TX_PAGE as u64);
        for page in 1..=pages {
            let item = ToGet {
                height,
                page: page as u32,
                per_page: TX_PAGE,
            };
            for raw in self.chain.search_tx_page(item, deadline).await? {
                match self.decoder.decode_in_block(&raw, &block) {
                    Ok(tx) => txs.push(tx),
                    Err(e) => tracing::error!(height, hash = %raw.hash, error = %e, "transaction dropped"),
                }
            }
        }
        if !txs.is_empty() {
            store.store_transactions(&txs).await?;
        }

        store.confirm_heights(std::slice::from_ref(&block)).await?;
        tracing::debug!(height, txs = txs.len(), "got block");
        Ok((block, txs))
    }
}

fn parse<T: DeserializeOwned>(
    request: &TaskRequest,
    validate: impl FnOnce(&T) -> Result<(), WorkerError>,
) -> Result<T, WorkerError> {
    let value: T = request.payload()?;
    validate(&value)?;
    Ok(value)
}

/// Run `produce` while forwarding its payloads to `stream`, then terminate
/// the stream with `END` or the producer's error.
async fn pump<F, Fut>(mut stream: ResponseStream<'_>, produce: F) -> Result<(), WorkerError>
where
    F: FnOnce(mpsc::Sender<Payload>) -> Fut,
    Fut: Future<Output = Result<(), WorkerError>>,
{
    let (tx, mut rx) = mpsc::channel(OUT_QUEUE);
    let forward = async {
        let mut sink_error = None;
        while let Some(payload) = rx.recv().await {
            if sink_error.is_none() {
                if let Err(e) = stream.send(payload).await {
                    tracing::error!(task_id = %stream.id(), error = %e, "error sending data");
                    sink_error = Some(e);
                }
            }
        }
        sink_error
    };
    let (result, sink_error) = tokio::join!(produce(tx), forward);

    match (result, sink_error) {
        (Err(e), _) => {
            tracing::error!(task_id = %stream.id(), sent = stream.sent(), error = %e, "task failed");
            stream.fail(e.to_string()).await
        }
        (Ok(()), Some(e)) => Err(e),
        (Ok(()), None) => {
            tracing::debug!(task_id = %stream.id(), sent = stream.sent(), "finished sending all");
            stream.end().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use terraindex_client::{BlocksMap, ClientError};
    use terraindex_core::{AccountBalance, AccountDelegations, DecimalAmount, DeliverTx, Reward, TxResponse};
    use terraindex_decode::DecoderConfig;

    use crate::store::MemoryStore;
    use crate::task::{ChannelSink, TaskResponse, END};

    #[derive(Default)]
    struct Fake {
        blocks: Vec<Block>,
        txs: HashMap<Height, Vec<TxResponse>>,
        fail_meta: bool,
        fail_lcd: bool,
    }

    fn block(height: Height, txs: u64) -> Block {
        Block {
            hash: format!("H{height}"),
            height,
            time: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            chain_id: "columbus-4".into(),
            number_of_transactions: txs,
        }
    }

    fn raw(height: Height, i: u64) -> TxResponse {
        TxResponse {
            hash: format!("T{height}-{i}"),
            height: height.to_string(),
            tx_result: DeliverTx {
                log: "[]".into(),
                gas_wanted: "1".into(),
                gas_used: "1".into(),
            },
            tx: String::new(),
        }
    }

    impl Fake {
        fn chain(counts: &[(Height, u64)]) -> Self {
            let mut fake = Self::default();
            for &(h, n) in counts {
                fake.blocks.push(block(h, n));
                fake.txs.insert(h, (0..n).map(|i| raw(h, i)).collect());
            }
            fake
        }
    }

    #[async_trait]
    impl ChainApi for Fake {
        async fn get_block(&self, height: Height, _: Deadline) -> Result<Block, ClientError> {
            let found = if height == 0 {
                self.blocks.iter().max_by_key(|b| b.height)
            } else {
                self.blocks.iter().find(|b| b.height == height)
            };
            found
                .cloned()
                .ok_or_else(|| ClientError::InvalidResponse(format!("no block {height}")))
        }

        async fn get_blocks_meta(
            &self,
            range: &HeightRange,
            _: u64,
            blocks: &BlocksMap,
            _: Deadline,
        ) -> Result<(), ClientError> {
            if self.fail_meta {
                return Err(ClientError::Status {
                    status: 500,
                    body: "internal".into(),
                });
            }
            if range.start_height == 0 && range.end_height == 0 {
                blocks.extend(self.blocks.iter().cloned());
                return Ok(());
            }
            blocks.extend(
                self.blocks
                    .iter()
                    .filter(|b| (range.start_height..=range.end_height).contains(&b.height))
                    .cloned(),
            );
            Ok(())
        }

        async fn search_tx_page(&self, item: ToGet, _: Deadline) -> Result<Vec<TxResponse>, ClientError> {
            Ok(self.txs.get(&item.height).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl AccountApi for Fake {
        async fn get_reward(&self, params: &HeightAccount, _: Deadline) -> Result<Reward, ClientError> {
            if self.fail_lcd {
                return Err(ClientError::InvalidResponse("oh noes".into()));
            }
            Ok(Reward {
                height: params.height,
                account: params.account.clone(),
                rewards: vec![
                    DecimalAmount::parse_dec("100", "uluna").unwrap(),
                    DecimalAmount::parse_dec("200", "uluna").unwrap(),
                ],
            })
        }

        async fn get_account_balance(
            &self,
            params: &HeightAccount,
            _: Deadline,
        ) -> Result<AccountBalance, ClientError> {
            Ok(AccountBalance {
                height: params.height,
                account: params.account.clone(),
                balances: vec![],
            })
        }

        async fn get_account_delegations(
            &self,
            params: &HeightAccount,
            _: Deadline,
        ) -> Result<AccountDelegations, ClientError> {
            Ok(AccountDelegations {
                height: params.height,
                account: params.account.clone(),
                delegations: vec![],
            })
        }
    }

    fn client(fake: Fake) -> IndexerClient {
        let fake = Arc::new(fake);
        let decoder = Arc::new(TxDecoder::new(DecoderConfig::default(), WorkerMetrics::default()));
        IndexerClient::new(
            fake.clone() as Arc<dyn ChainApi>,
            fake as Arc<dyn AccountApi>,
            decoder,
            RangeConfig::default(),
            WorkerMetrics::default(),
        )
    }

    async fn run(client: &IndexerClient, request: TaskRequest) -> Vec<TaskResponse> {
        let (sink, mut rx) = ChannelSink::new(1024);
        client.handle(request, &sink).await.unwrap();
        drop(sink);
        let mut responses = Vec::new();
        while let Some(r) = rx.recv().await {
            responses.push(r);
        }
        responses
    }

    fn count(responses: &[TaskResponse], type_: &str) -> usize {
        responses.iter().filter(|r| r.type_ == type_).count()
    }

    #[tokio::test]
    async fn range_request_streams_and_ends_once() {
        let client = client(Fake::chain(&[(100, 0), (101, 1), (102, 2)]));
        let request = TaskRequest::new(GET_TRANSACTIONS, json!({"start_height": 100, "end_height": 102}));
        let responses = run(&client, request).await;

        assert_eq!(count(&responses, "Block"), 3);
        assert_eq!(count(&responses, "Transaction"), 3);
        assert_eq!(count(&responses, END), 1);
        assert_eq!(responses.iter().filter(|r| r.final_).count(), 1);
        let last = responses.last().unwrap();
        assert_eq!(last.type_, END);
        assert_eq!(last.order, 6);
        let mut orders: Vec<_> = responses.iter().map(|r| r.order).collect();
        orders.sort();
        assert_eq!(orders, (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn failed_range_sends_single_error() {
        let mut fake = Fake::chain(&[(1, 1)]);
        fake.fail_meta = true;
        let client = client(fake);
        let request = TaskRequest::new(GET_TRANSACTIONS, json!({"start_height": 1, "end_height": 45}));
        let responses = run(&client, request).await;

        assert_eq!(responses.len(), 1);
        assert!(responses[0].final_);
        let msg = &responses[0].error.as_ref().unwrap().msg;
        assert!(msg.starts_with("Errors Getting Blocks: - Bad Response 500"));
    }

    #[tokio::test]
    async fn zero_end_height_is_rejected() {
        let client = client(Fake::chain(&[(1, 0)]));
        let request = TaskRequest::new(GET_TRANSACTIONS, json!({"start_height": 1, "end_height": 0}));
        let responses = run(&client, request).await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0].final_);
        assert!(responses[0].error.as_ref().unwrap().msg.contains("end height is zero"));
    }

    #[tokio::test]
    async fn unknown_type_has_no_handler() {
        let client = client(Fake::default());
        let responses = run(&client, TaskRequest::new("GetEverything", json!({}))).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[0].error.as_ref().unwrap().msg,
            "There is no such handler GetEverything"
        );
    }

    #[tokio::test]
    async fn latest_mark_is_single_final_payload() {
        let client = client(Fake::chain(&[(7, 0), (9, 0), (8, 0)]));
        let responses = run(&client, TaskRequest::new(GET_LATEST_MARK, json!({}))).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].type_, "LatestMark");
        assert!(responses[0].final_);
        assert_eq!(responses[0].payload["last_height"], 9);
        assert_eq!(responses[0].payload["last_hash"], "H9");
    }

    #[tokio::test]
    async fn latest_mark_reports_block_error() {
        let client = client(Fake::default());
        let responses = run(&client, TaskRequest::new(GET_LATEST_MARK, json!({}))).await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0]
            .error
            .as_ref()
            .unwrap()
            .msg
            .starts_with("Error getting block data"));
    }

    #[tokio::test]
    async fn reward_then_end() {
        let client = client(Fake::default());
        let request = TaskRequest::new(GET_REWARD, json!({"height": 99, "account": "terra123"}));
        let responses = run(&client, request).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].type_, "Reward");
        assert!(!responses[0].final_);
        assert_eq!(responses[0].payload["height"], 99);
        assert_eq!(responses[0].payload["rewards"].as_array().unwrap().len(), 2);
        assert_eq!(responses[1].type_, END);
        assert!(responses[1].final_);
    }

    #[tokio::test]
    async fn reward_error_is_final() {
        let client = client(Fake {
            fail_lcd: true,
            ..Fake::default()
        });
        let request = TaskRequest::new(GET_REWARD, json!({"height": 99, "account": "terra123"}));
        let responses = run(&client, request).await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0].final_);
        assert!(responses[0].error.as_ref().unwrap().msg.contains("oh noes"));
    }

    #[tokio::test]
    async fn empty_account_is_rejected() {
        let client = client(Fake::default());
        for type_ in [GET_REWARD, GET_ACCOUNT_BALANCE, GET_ACCOUNT_DELEGATIONS] {
            let request = TaskRequest::new(type_, json!({"height": 1, "account": ""}));
            let responses = run(&client, request).await;
            assert_eq!(responses.len(), 1, "{type_}");
            assert!(responses[0].error.is_some());
        }
    }

    #[tokio::test]
    async fn balance_and_delegations_payload_types() {
        let client = client(Fake::default());
        let balance = run(
            &client,
            TaskRequest::new(GET_ACCOUNT_BALANCE, json!({"height": 5, "account": "terra1x"})),
        )
        .await;
        assert_eq!(balance[0].type_, "AccountBalance");
        let delegations = run(
            &client,
            TaskRequest::new(GET_ACCOUNT_DELEGATIONS, json!({"height": 5, "account": "terra1x"})),
        )
        .await;
        assert_eq!(delegations[0].type_, "AccountDelegations");
        assert_eq!(delegations[1].type_, END);
    }

    #[tokio::test]
    async fn latest_request_streams_blocks() {
        let client = client(Fake::chain(&(1..=10).map(|h| (h, 1)).collect::<Vec<_>>()));
        let request = TaskRequest::new(GET_LATEST, json!({"last_height": 8}));
        let responses = run(&client, request).await;
        assert_eq!(count(&responses, "Block"), 3);
        assert_eq!(count(&responses, "Transaction"), 3);
        assert_eq!(responses.last().unwrap().type_, END);
    }

    /// Records the order of store calls.
    #[derive(Default)]
    struct Journal {
        calls: Mutex<Vec<String>>,
        fail_transactions: bool,
    }

    #[async_trait]
    impl StoreSession for Journal {
        async fn store_blocks(&self, blocks: &[Block]) -> Result<(), WorkerError> {
            self.calls.lock().unwrap().push(format!("blocks:{}", blocks.len()));
            Ok(())
        }

        async fn store_transactions(&self, txs: &[Transaction]) -> Result<(), WorkerError> {
            if self.fail_transactions {
                return Err(WorkerError::Store("disk full".into()));
            }
            self.calls.lock().unwrap().push(format!("txs:{}", txs.len()));
            Ok(())
        }

        async fn confirm_heights(&self, blocks: &[Block]) -> Result<(), WorkerError> {
            self.calls.lock().unwrap().push(format!("confirm:{}", blocks[0].height));
            Ok(())
        }
    }

    #[tokio::test]
    async fn confirms_height_after_commit() {
        let journal = Arc::new(Journal::default());
        let client = client(Fake::chain(&[(42, 2)])).with_store(journal.clone());
        let (block, txs) = client.block_and_tx(42).await.unwrap();
        assert_eq!(block.hash, "H42");
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].block_hash, "H42");
        assert_eq!(
            *journal.calls.lock().unwrap(),
            vec!["blocks:1", "txs:2", "confirm:42"]
        );
    }

    #[tokio::test]
    async fn failed_commit_leaves_height_unconfirmed() {
        let journal = Arc::new(Journal {
            fail_transactions: true,
            ..Journal::default()
        });
        let client = client(Fake::chain(&[(42, 1)])).with_store(journal.clone());
        assert!(client.block_and_tx(42).await.is_err());
        assert!(!journal.calls.lock().unwrap().iter().any(|c| c.starts_with("confirm")));
    }

    #[tokio::test]
    async fn empty_block_is_stored_and_confirmed() {
        let store = Arc::new(MemoryStore::new());
        let client = client(Fake::chain(&[(3, 0)])).with_store(store.clone());
        client.block_and_tx(3).await.unwrap();
        assert!(store.is_confirmed(3));
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn block_and_tx_needs_store() {
        let client = client(Fake::chain(&[(3, 0)]));
        assert!(matches!(client.block_and_tx(3).await, Err(WorkerError::Store(_))));
    }
}
