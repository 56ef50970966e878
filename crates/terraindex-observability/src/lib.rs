//! # terraindex-observability
//!
//! OpenTelemetry-based observability for the Terra indexing worker.
//!
//! ## Built-in metrics
//! - `terraindex.transactions_decoded`  counter, tagged with chain version
//! - `terraindex.unknown_messages`      counter, tagged with type + route
//! - `terraindex.broken_messages`       counter, tagged with type + route
//! - `terraindex.conversion_ms`         histogram, tagged with item type
//! - `terraindex.request_ms`            histogram, tagged with endpoint + status
//! - `terraindex.block_cache`           counter, tagged hit / miss
//! - `terraindex.received_requests`     counter, tagged with task type
//! - `terraindex.responses_sent`        counter, tagged with payload type + final
//! - `terraindex.items_per_request`     histogram, tagged with item type
//!
//! The handle is built once from a `Meter` and passed into every component
//! that records something; there is no global state beyond the meter
//! provider itself.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::WorkerMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
