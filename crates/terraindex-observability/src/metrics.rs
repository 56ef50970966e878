//! Worker metrics definitions.
//!
//! All metrics use OpenTelemetry conventions and can be exported through
//! whatever meter provider the binary installs.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle, cheap to clone.
#[derive(Clone)]
pub struct WorkerMetrics {
    pub transactions_decoded: Counter<u64>,
    pub unknown_messages: Counter<u64>,
    pub broken_messages: Counter<u64>,
    pub conversion_ms: Histogram<f64>,
    pub request_ms: Histogram<f64>,
    pub block_cache: Counter<u64>,
    pub received_requests: Counter<u64>,
    pub responses_sent: Counter<u64>,
    pub items_per_request: Histogram<u64>,
}

impl WorkerMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            transactions_decoded: meter
                .u64_counter("terraindex.transactions_decoded")
                .with_description("Transactions converted into the canonical model")
                .build(),
            unknown_messages: meter
                .u64_counter("terraindex.unknown_messages")
                .with_description("Messages with no registered mapper")
                .build(),
            broken_messages: meter
                .u64_counter("terraindex.broken_messages")
                .with_description("Recognized messages that failed to decode")
                .build(),
            conversion_ms: meter
                .f64_histogram("terraindex.conversion_ms")
                .with_description("Time to convert a raw item into the canonical model")
                .build(),
            request_ms: meter
                .f64_histogram("terraindex.request_ms")
                .with_description("Upstream request duration in milliseconds")
                .build(),
            block_cache: meter
                .u64_counter("terraindex.block_cache")
                .with_description("Block cache lookups by outcome")
                .build(),
            received_requests: meter
                .u64_counter("terraindex.received_requests")
                .with_description("Task requests received by the worker")
                .build(),
            responses_sent: meter
                .u64_counter("terraindex.responses_sent")
                .with_description("Task responses streamed back")
                .build(),
            items_per_request: meter
                .u64_histogram("terraindex.items_per_request")
                .with_description("Number of items returned by one upstream request")
                .build(),
        }
    }

    /// Handle backed by the globally installed meter provider
    /// (a no-op provider unless the binary installs one).
    pub fn from_global() -> Self {
        Self::new(&global::meter("terraindex"))
    }

    pub fn record_decoded(&self, chain_version: &str) {
        self.transactions_decoded
            .add(1, &[KeyValue::new("chain_version", chain_version.to_string())]);
    }

    pub fn record_unknown(&self, msg_type: &str, route: &str) {
        self.unknown_messages.add(1, &type_route(msg_type, route));
    }

    pub fn record_broken(&self, msg_type: &str, route: &str) {
        self.broken_messages.add(1, &type_route(msg_type, route));
    }

    pub fn record_conversion(&self, ms: f64, item: &str) {
        self.conversion_ms
            .record(ms, &[KeyValue::new("type", item.to_string())]);
    }

    pub fn record_request(&self, ms: f64, endpoint: &str, status: u16) {
        self.request_ms.record(
            ms,
            &[
                KeyValue::new("endpoint", endpoint.to_string()),
                KeyValue::new("status", i64::from(status)),
            ],
        );
    }

    pub fn record_cache(&self, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.block_cache.add(1, &[KeyValue::new("cache", outcome)]);
    }

    pub fn record_request_received(&self, task_type: &str) {
        self.received_requests
            .add(1, &[KeyValue::new("type", task_type.to_string())]);
    }

    pub fn record_response_sent(&self, payload_type: &str, is_final: bool) {
        self.responses_sent.add(
            1,
            &[
                KeyValue::new("type", payload_type.to_string()),
                KeyValue::new("final", is_final),
            ],
        );
    }

    pub fn record_items(&self, count: u64, item: &str) {
        self.items_per_request
            .record(count, &[KeyValue::new("type", item.to_string())]);
    }
}

impl Default for WorkerMetrics {
    fn default() -> Self {
        Self::from_global()
    }
}

impl std::fmt::Debug for WorkerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerMetrics").finish_non_exhaustive()
    }
}

fn type_route(msg_type: &str, route: &str) -> [KeyValue; 2] {
    [
        KeyValue::new("type", msg_type.to_string()),
        KeyValue::new("route", route.to_string()),
    ]
}
