//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vitals_ingested_total` (counter): endpoint submissions by status
//! - `vitals_finalized_total` (counter): page views finalized by trigger
//! - `vitals_delivery_total` (counter): deliveries by outcome
//! - `vitals_delivery_attempts` (histogram): attempts per delivery
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter serves its own listener

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metric name constants.
pub mod names {
    pub const INGESTED_TOTAL: &str = "vitals_ingested_total";
    pub const FINALIZED_TOTAL: &str = "vitals_finalized_total";
    pub const DELIVERY_TOTAL: &str = "vitals_delivery_total";
    pub const DELIVERY_ATTEMPTS: &str = "vitals_delivery_attempts";
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One submission handled by the collection endpoint.
pub fn record_ingest(status: u16) {
    counter!(names::INGESTED_TOTAL, "status" => status.to_string()).increment(1);
}

/// One page view finalized.
pub fn record_finalized(trigger: &'static str) {
    counter!(names::FINALIZED_TOTAL, "trigger" => trigger).increment(1);
}

/// One delivery finished.
pub fn record_delivery(outcome: &'static str, attempts: u32) {
    counter!(names::DELIVERY_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::DELIVERY_ATTEMPTS).record(f64::from(attempts));
}
