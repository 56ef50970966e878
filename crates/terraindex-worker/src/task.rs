//! Task contract: inbound requests, outbound typed payloads and the stream
//! that numbers them and terminates each task exactly once.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use terraindex_core::{
    AccountBalance, AccountDelegations, Block, HeightAccount, HeightRange, LatestMark, Reward,
    Transaction,
};
use terraindex_observability::WorkerMetrics;

use crate::error::WorkerError;

// ─── Request ──────────────────────────────────────────────────────────────────

pub const GET_TRANSACTIONS: &str = "GetTransactions";
pub const GET_LATEST: &str = "GetLatest";
pub const GET_LATEST_MARK: &str = "GetLatestMark";
pub const GET_REWARD: &str = "GetReward";
pub const GET_ACCOUNT_BALANCE: &str = "GetAccountBalance";
pub const GET_ACCOUNT_DELEGATIONS: &str = "GetAccountDelegations";

/// Type of the terminal marker that follows a successful task.
pub const END: &str = "END";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub payload: Value,
}

impl TaskRequest {
    pub fn new(type_: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_: type_.into(),
            payload,
        }
    }

    /// Decode the payload into `T`.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, WorkerError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| WorkerError::InvalidRequest(format!("cannot unmarshal payload: {e}")))
    }
}

pub fn validate_range(range: &HeightRange) -> Result<(), WorkerError> {
    if range.end_height == 0 {
        return Err(WorkerError::InvalidRequest("end height is zero".into()));
    }
    if range.start_height > range.end_height {
        return Err(WorkerError::InvalidRequest(format!(
            "start height {} is above end height {}",
            range.start_height, range.end_height
        )));
    }
    Ok(())
}

pub fn validate_account(params: &HeightAccount) -> Result<(), WorkerError> {
    if params.account.trim().is_empty() {
        return Err(WorkerError::InvalidRequest("empty account".into()));
    }
    Ok(())
}

// ─── Response ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub type_: String,
    pub order: u64,
    #[serde(rename = "final")]
    pub final_: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

/// One typed result of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Block(Block),
    Transaction(Transaction),
    Reward(Reward),
    AccountBalance(AccountBalance),
    AccountDelegations(AccountDelegations),
    LatestMark(LatestMark),
}

impl Payload {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Block(_) => "Block",
            Self::Transaction(_) => "Transaction",
            Self::Reward(_) => "Reward",
            Self::AccountBalance(_) => "AccountBalance",
            Self::AccountDelegations(_) => "AccountDelegations",
            Self::LatestMark(_) => "LatestMark",
        }
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Block(v) => serde_json::to_value(v),
            Self::Transaction(v) => serde_json::to_value(v),
            Self::Reward(v) => serde_json::to_value(v),
            Self::AccountBalance(v) => serde_json::to_value(v),
            Self::AccountDelegations(v) => serde_json::to_value(v),
            Self::LatestMark(v) => serde_json::to_value(v),
        }
    }
}

/// Where responses go: the manager connection in production, a channel in
/// tests and the CLI.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send(&self, response: TaskResponse) -> Result<(), WorkerError>;
}

/// [`ResponseSink`] over a tokio channel.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TaskResponse>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TaskResponse>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn send(&self, response: TaskResponse) -> Result<(), WorkerError> {
        self.tx
            .send(response)
            .await
            .map_err(|_| WorkerError::Sink("response receiver closed".into()))
    }
}

// ─── ResponseStream ───────────────────────────────────────────────────────────

/// Responses of one task.
///
/// Payloads get consecutive `order` values starting at 0. [`end`] and
/// [`fail`] consume the stream, so a task has exactly one terminal response.
///
/// [`end`]: ResponseStream::end
/// [`fail`]: ResponseStream::fail
pub struct ResponseStream<'a> {
    id: Uuid,
    sink: &'a dyn ResponseSink,
    metrics: &'a WorkerMetrics,
    order: u64,
}

impl<'a> ResponseStream<'a> {
    pub fn new(id: Uuid, sink: &'a dyn ResponseSink, metrics: &'a WorkerMetrics) -> Self {
        Self {
            id,
            sink,
            metrics,
            order: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of payloads sent so far.
    pub fn sent(&self) -> u64 {
        self.order
    }

    pub async fn send(&mut self, payload: Payload) -> Result<(), WorkerError> {
        let type_name = payload.type_name();
        let value = payload
            .to_value()
            .map_err(|e| WorkerError::Sink(format!("encoding {type_name}: {e}")))?;
        self.sink
            .send(TaskResponse {
                id: self.id,
                type_: type_name.to_string(),
                order: self.order,
                final_: false,
                error: None,
                payload: value,
            })
            .await?;
        self.order += 1;
        self.metrics.record_response_sent(type_name, false);
        Ok(())
    }

    /// Send a single payload that is also the task's terminal response.
    pub async fn send_final(self, payload: Payload) -> Result<(), WorkerError> {
        let type_name = payload.type_name();
        let value = payload
            .to_value()
            .map_err(|e| WorkerError::Sink(format!("encoding {type_name}: {e}")))?;
        self.sink
            .send(TaskResponse {
                id: self.id,
                type_: type_name.to_string(),
                order: self.order,
                final_: true,
                error: None,
                payload: value,
            })
            .await?;
        self.metrics.record_response_sent(type_name, true);
        Ok(())
    }

    /// Terminate with the `END` marker.
    pub async fn end(self) -> Result<(), WorkerError> {
        self.sink
            .send(TaskResponse {
                id: self.id,
                type_: END.to_string(),
                order: self.order,
                final_: true,
                error: None,
                payload: Value::Null,
            })
            .await?;
        self.metrics.record_response_sent(END, true);
        Ok(())
    }

    /// Terminate with an error.
    pub async fn fail(self, message: impl Into<String>) -> Result<(), WorkerError> {
        self.sink
            .send(TaskResponse {
                id: self.id,
                type_: String::new(),
                order: self.order,
                final_: true,
                error: Some(TaskError { msg: message.into() }),
                payload: Value::Null,
            })
            .await?;
        self.metrics.record_response_sent("error", true);
        Ok(())
    }
}
