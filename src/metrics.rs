// Metrics and observability module
// This file handles collection and reporting of route ranking, swap outcome
// and quote source statistics
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

pub static ROUTE_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_route_requests_total",
        "ranked route requests by outcome",
        &["outcome"]
    )
    .unwrap()
});

pub static SWAP_OUTCOMES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_swaps_total",
        "swap orchestrations by terminal state",
        &["outcome", "privacy"]
    )
    .unwrap()
});

pub static ADAPTER_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "router_adapter_latency_seconds",
        "latency for quote source calls",
        &["service", "method"]
    )
    .unwrap()
});

pub static ADAPTER_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_adapter_errors_total",
        "errors by quote source",
        &["service", "method"]
    )
    .unwrap()
});

/// Render every registered collector in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buf) {
        tracing::warn!(error = %err, "metrics encoding failed");
    }
    String::from_utf8(buf).unwrap_or_default()
}
