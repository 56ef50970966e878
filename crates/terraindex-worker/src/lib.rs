//! # terraindex-worker
//!
//! The task-facing side of the indexing worker.
//!
//! ```text
//! TaskRequest ──► IndexerClient::handle ──► RangeFetcher ──► ResponseStream ──► ResponseSink
//!                        │                       │
//!                  AccountApi              ChainApi + TxDecoder
//! ```
//!
//! A task always ends with exactly one final response: an error, a single
//! final payload, or the `END` marker after its streamed payloads.

pub mod config;
pub mod error;
pub mod handler;
pub mod pool;
pub mod range;
pub mod store;
pub mod task;

pub use config::WorkerConfig;
pub use error::WorkerError;
pub use handler::IndexerClient;
pub use pool::WorkerPool;
pub use range::{starting_height, RangeConfig, RangeFetcher, BLOCKCHAIN_PAGE, TX_PAGE};
pub use store::{MemoryStore, StoreSession};
pub use task::{
    ChannelSink, Payload, ResponseSink, ResponseStream, TaskError, TaskRequest, TaskResponse, END,
};
