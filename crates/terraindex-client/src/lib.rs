//! terraindex-client: access to one Terra node.
//!
//! [`ChainClient`] wraps an RPC and an LCD [`HttpTransport`] with
//! independent token-bucket rate limiters, a linear-backoff retry policy and
//! a fixed-capacity [`BlockCache`]. The orchestrator only sees the
//! [`ChainApi`] / [`AccountApi`] traits, so tests can substitute fakes.

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod policy;
pub mod transport;
pub mod types;

pub use api::{AccountApi, BlocksMap, ChainApi, Deadline};
pub use cache::BlockCache;
pub use client::{ChainClient, ClientConfig, STAKING_DENOM};
pub use error::ClientError;
pub use policy::{RateLimiter, RateLimiterConfig, RetryConfig, RetryPolicy};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, Request};
