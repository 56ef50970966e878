//! `ChainClient`: rate-limited, retrying, timeout-bounded node access.
//!
//! Every outbound request goes through the same path:
//!
//! 1. wait for a token from the endpoint's rate limiter (or fail with
//!    [`ClientError::Cancelled`] if the deadline would pass first);
//! 2. send through the [`HttpTransport`], bounded by the per-call timeout and
//!    the caller's deadline;
//! 3. on a timeout, network error or 5xx: back off `attempt × 500ms` and try
//!    again, at most 3 attempts in total;
//! 4. on a 4xx or an explicit JSON-RPC error body: fail immediately.
//!
//! RPC (`/block`, `/blockchain`, `/tx_search`) and LCD (account queries) use
//! independent token buckets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use terraindex_core::{
    AccountBalance, AccountDelegations, Block, ChainVersion, Delegation, DecimalAmount, Height,
    HeightAccount, HeightRange, Reward, ToGet, TxResponse,
};
use terraindex_observability::WorkerMetrics;

use crate::api::{AccountApi, BlocksMap, ChainApi, Deadline};
use crate::cache::{BlockCache, DEFAULT_CAPACITY};
use crate::error::ClientError;
use crate::policy::{RateLimiter, RateLimiterConfig, RetryConfig, RetryPolicy};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport, Request};
use crate::types::{
    BalanceResponse, BlockHeader, BlockResult, BlockchainResult, Coin, DelegationResponse, LcdError,
    RewardResponse, RpcEnvelope, TxSearchResult,
};

/// Denomination of columbus-3 delegation balances, which carry no denom.
pub const STAKING_DENOM: &str = "uluna";

/// Configuration for [`ChainClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub chain_version: ChainVersion,
    pub requests_per_second: u32,
    pub block_timeout: Duration,
    pub tx_timeout: Duration,
    pub lcd_timeout: Duration,
    pub retry: RetryConfig,
    pub cache_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chain_version: ChainVersion::default(),
            requests_per_second: 33,
            block_timeout: Duration::from_secs(30),
            tx_timeout: Duration::from_secs(30),
            lcd_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// One endpoint: transport plus its own token bucket.
struct Endpoint {
    transport: Arc<dyn HttpTransport>,
    limiter: RateLimiter,
}

/// Node client over an RPC and an LCD endpoint.
pub struct ChainClient {
    rpc: Endpoint,
    lcd: Endpoint,
    retry: RetryPolicy,
    cache: BlockCache,
    metrics: WorkerMetrics,
    config: ClientConfig,
}

impl ChainClient {
    pub fn new(
        rpc: Arc<dyn HttpTransport>,
        lcd: Arc<dyn HttpTransport>,
        config: ClientConfig,
        metrics: WorkerMetrics,
    ) -> Self {
        let rps = config.requests_per_second;
        let limiter = || RateLimiter::new(RateLimiterConfig::per_second(rps));
        Self {
            rpc: Endpoint {
                transport: rpc,
                limiter: limiter(),
            },
            lcd: Endpoint {
                transport: lcd,
                limiter: limiter(),
            },
            retry: RetryPolicy::new(config.retry.clone()),
            cache: BlockCache::new(config.cache_capacity),
            metrics,
            config,
        }
    }

    /// Build a client with `reqwest` transports for both endpoints.
    pub fn connect(
        rpc_url: &str,
        lcd_url: &str,
        api_key: Option<String>,
        config: ClientConfig,
        metrics: WorkerMetrics,
    ) -> Result<Self, ClientError> {
        let rpc = ReqwestTransport::new(rpc_url, api_key.clone())?;
        let lcd = ReqwestTransport::new(lcd_url, api_key)?;
        Ok(Self::new(Arc::new(rpc), Arc::new(lcd), config, metrics))
    }

    pub fn chain_version(&self) -> ChainVersion {
        self.config.chain_version
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    // ─── Request path ─────────────────────────────────────────────────────────

    async fn send(
        &self,
        endpoint: &Endpoint,
        label: &str,
        mut req: Request,
        deadline: Deadline,
    ) -> Result<HttpResponse, ClientError> {
        let base_timeout = req.timeout;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            endpoint.limiter.acquire(deadline).await?;

            req.timeout = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(ClientError::Cancelled);
                    }
                    base_timeout.min(left)
                }
                None => base_timeout,
            };

            let started = Instant::now();
            let result = endpoint.transport.execute(&req).await.and_then(check_status);
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let status = match &result {
                Ok(resp) => resp.status,
                Err(ClientError::Status { status, .. }) => *status,
                Err(_) => 0,
            };
            self.metrics.record_request(elapsed_ms, label, status);

            let err = match result {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() => e,
                Err(e) => {
                    tracing::debug!(endpoint = label, error = %e, "request failed, not retrying");
                    return Err(e);
                }
            };

            match self.retry.next_delay(attempt) {
                Some(delay) => {
                    if let Some(deadline) = deadline {
                        if Instant::now() + delay > deadline {
                            tracing::debug!(endpoint = label, attempt, "deadline reached, retries stopped");
                            return Err(ClientError::Cancelled);
                        }
                    }
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        endpoint = label,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(attempt, error = %err, endpoint = label, "max retries exceeded");
                    return Err(err);
                }
            }
        }
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        label: &str,
        req: Request,
        deadline: Deadline,
    ) -> Result<T, ClientError> {
        let resp = self.send(&self.rpc, label, req, deadline).await?;
        decode_rpc(&resp.body)
    }

    async fn lcd_call<T: DeserializeOwned>(
        &self,
        label: &str,
        path: String,
        height: Height,
        deadline: Deadline,
    ) -> Result<T, ClientError> {
        let mut req = Request::get(path, self.config.lcd_timeout);
        if height > 0 {
            req = req.with_query("height", height);
        }
        let resp = self.send(&self.lcd, label, req, deadline).await?;
        Ok(serde_json::from_str(&resp.body)?)
    }

    // ─── Transactions ─────────────────────────────────────────────────────────

    async fn search_page(&self, item: ToGet, deadline: Deadline) -> Result<(Vec<TxResponse>, u64), ClientError> {
        let req = Request::get("/tx_search", self.config.tx_timeout)
            .with_query("query", format!("\"tx.height={}\"", item.height))
            .with_query("page", item.page)
            .with_query("per_page", item.per_page);
        let result: TxSearchResult = self.rpc_call("/tx_search", req, deadline).await?;

        let total = if result.total_count.is_empty() {
            result.txs.len() as u64
        } else {
            result.total_count.parse::<u64>().map_err(|_| {
                ClientError::InvalidResponse(format!("total_count {:?}", result.total_count))
            })?
        };
        self.metrics.record_items(total, "transaction");
        Ok((result.txs, total))
    }

    /// All transactions at `height`, paging until the reported total is met.
    pub async fn search_tx(
        &self,
        height: Height,
        per_page: u32,
        deadline: Deadline,
    ) -> Result<Vec<TxResponse>, ClientError> {
        let per_page = per_page.max(1);
        let mut txs = Vec::new();
        let mut page = 1u32;
        loop {
            let (batch, total) = self
                .search_page(ToGet { height, page, per_page }, deadline)
                .await?;
            let received = batch.len();
            txs.extend(batch);
            if received == 0 || txs.len() as u64 >= total {
                break;
            }
            page += 1;
        }
        tracing::debug!(height, count = txs.len(), "searched transactions");
        Ok(txs)
    }
}

#[async_trait]
impl ChainApi for ChainClient {
    async fn get_block(&self, height: Height, deadline: Deadline) -> Result<Block, ClientError> {
        if height > 0 {
            if let Some(block) = self.cache.get(height) {
                self.metrics.record_cache(true);
                return Ok(block);
            }
            self.metrics.record_cache(false);
        }

        let mut req = Request::get("/block", self.config.block_timeout);
        if height > 0 {
            req = req.with_query("height", height);
        }
        let result: BlockResult = self.rpc_call("/block", req, deadline).await?;
        let block = to_block(result.hash(), &result.block.header, result.tx_count())?;
        self.cache.add(block.clone());
        Ok(block)
    }

    async fn get_blocks_meta(
        &self,
        range: &HeightRange,
        limit: u64,
        blocks: &BlocksMap,
        deadline: Deadline,
    ) -> Result<(), ClientError> {
        let mut req = Request::get("/blockchain", self.config.block_timeout);
        if range.start_height > 0 {
            req = req.with_query("minHeight", range.start_height);
        }
        if range.end_height > 0 {
            req = req.with_query("maxHeight", range.end_height);
        }
        if limit > 0 {
            req = req.with_query("limit", limit);
        }

        let result: BlockchainResult = self.rpc_call("/blockchain", req, deadline).await?;
        let header_counts = self.config.chain_version.num_txs_in_header();
        let mut fetched = Vec::with_capacity(result.block_metas.len());
        for meta in &result.block_metas {
            let raw = if header_counts {
                meta.header.num_txs.as_deref()
            } else {
                meta.num_txs.as_deref()
            };
            let num_txs = parse_u64(raw.unwrap_or("0"), "num_txs")?;
            fetched.push(to_block(&meta.block_id.hash, &meta.header, num_txs)?);
        }
        for block in &fetched {
            self.cache.add(block.clone());
        }
        blocks.extend(fetched);
        Ok(())
    }

    async fn search_tx_page(&self, item: ToGet, deadline: Deadline) -> Result<Vec<TxResponse>, ClientError> {
        self.search_page(item, deadline).await.map(|(txs, _)| txs)
    }
}

#[async_trait]
impl AccountApi for ChainClient {
    async fn get_reward(&self, params: &HeightAccount, deadline: Deadline) -> Result<Reward, ClientError> {
        let path = format!("/distribution/delegators/{}/rewards", params.account);
        let result: RewardResponse = self
            .lcd_call("/distribution/delegators/_/rewards", path, params.height, deadline)
            .await?;
        let rewards = result
            .result
            .total
            .unwrap_or_default()
            .iter()
            .map(|c| DecimalAmount::parse_dec(&c.amount, c.denom.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(Reward {
            height: params.height,
            account: params.account.clone(),
            rewards,
        })
    }

    async fn get_account_balance(
        &self,
        params: &HeightAccount,
        deadline: Deadline,
    ) -> Result<AccountBalance, ClientError> {
        let path = format!("/bank/balances/{}", params.account);
        let result: BalanceResponse = self
            .lcd_call("/bank/balances/_", path, params.height, deadline)
            .await?;
        let balances = result
            .result
            .unwrap_or_default()
            .iter()
            .map(coin_amount)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AccountBalance {
            height: params.height,
            account: params.account.clone(),
            balances,
        })
    }

    async fn get_account_delegations(
        &self,
        params: &HeightAccount,
        deadline: Deadline,
    ) -> Result<AccountDelegations, ClientError> {
        let path = format!("/staking/delegators/{}/delegations", params.account);
        let label = "/staking/delegators/_/delegations";

        let delegations = if self.config.chain_version == ChainVersion::Columbus3 {
            let result: DelegationResponse<String> =
                self.lcd_call(label, path, params.height, deadline).await?;
            result
                .result
                .into_iter()
                .map(|d| {
                    Ok(Delegation {
                        balance: amount(&d.balance, STAKING_DENOM)?,
                        shares: amount(&d.shares, "")?,
                        delegator: d.delegator_address,
                        validator: d.validator_address,
                    })
                })
                .collect::<Result<Vec<_>, ClientError>>()?
        } else {
            let result: DelegationResponse<Coin> =
                self.lcd_call(label, path, params.height, deadline).await?;
            result
                .result
                .into_iter()
                .map(|d| {
                    Ok(Delegation {
                        balance: coin_amount(&d.balance)?,
                        shares: amount(&d.shares, "")?,
                        delegator: d.delegator_address,
                        validator: d.validator_address,
                    })
                })
                .collect::<Result<Vec<_>, ClientError>>()?
        };

        Ok(AccountDelegations {
            height: params.height,
            account: params.account.clone(),
            delegations,
        })
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Turn 4xx/5xx responses into [`ClientError::Status`], carrying the
/// structured error message when the body has one.
fn check_status(resp: HttpResponse) -> Result<HttpResponse, ClientError> {
    if resp.status < 400 {
        return Ok(resp);
    }
    Err(ClientError::Status {
        status: resp.status,
        body: error_message(&resp.body),
    })
}

fn error_message(body: &str) -> String {
    if let Ok(env) = serde_json::from_str::<RpcEnvelope<serde_json::Value>>(body) {
        if let Some(err) = env.error.filter(|e| e.is_set()) {
            return err.message;
        }
    }
    if let Ok(lcd) = serde_json::from_str::<LcdError>(body) {
        if !lcd.error.is_empty() {
            return lcd.error;
        }
    }
    body.trim().to_string()
}

fn decode_rpc<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let env: RpcEnvelope<T> = serde_json::from_str(body)?;
    if let Some(err) = env.error.filter(|e| e.is_set()) {
        let message = if err.data.is_empty() {
            err.message
        } else {
            format!("{}: {}", err.message, err.data)
        };
        return Err(ClientError::Protocol {
            code: err.code,
            message,
        });
    }
    env.result
        .ok_or_else(|| ClientError::InvalidResponse("response carries no result".into()))
}

fn parse_u64(text: &str, field: &str) -> Result<u64, ClientError> {
    text.parse::<u64>()
        .map_err(|_| ClientError::InvalidResponse(format!("{field} {text:?}")))
}

fn to_block(hash: &str, header: &BlockHeader, num_txs: u64) -> Result<Block, ClientError> {
    let time = DateTime::parse_from_rfc3339(&header.time)
        .map_err(|e| ClientError::InvalidResponse(format!("block time {:?}: {e}", header.time)))?
        .with_timezone(&Utc);
    Ok(Block {
        hash: hash.to_string(),
        height: parse_u64(&header.height, "height")?,
        time,
        chain_id: header.chain_id.clone(),
        number_of_transactions: num_txs,
    })
}

fn amount(text: &str, currency: &str) -> Result<DecimalAmount, ClientError> {
    DecimalAmount::parse(text, currency).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

fn coin_amount(coin: &Coin) -> Result<DecimalAmount, ClientError> {
    amount(&coin.amount, &coin.denom)
}
