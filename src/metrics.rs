//! Simple metrics module for the insights API
//!
//! This module provides a straightforward API for recording metrics using
//! the standard Prometheus naming conventions.

use std::fmt;
use std::net::SocketAddr;

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // API metrics
    ApiRequestsSuccess,
    ApiRequestsError,

    // Store metrics
    StoreRecordsFetched,

    // Selector metrics
    SelectRecordsSelected,
    SelectMalformedSkipped,

    // Normalizer metrics
    NormalizeRecordsProcessed,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ApiRequestsSuccess => "insights_api_requests_success_total",
            MetricName::ApiRequestsError => "insights_api_requests_error_total",
            MetricName::StoreRecordsFetched => "insights_store_records_fetched_total",
            MetricName::SelectRecordsSelected => "insights_select_records_selected_total",
            MetricName::SelectMalformedSkipped => "insights_select_malformed_skipped_total",
            MetricName::NormalizeRecordsProcessed => "insights_normalize_records_processed_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus exporter on its side port.
pub fn init_metrics() {
    let port: u16 = std::env::var("INSIGHTS_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            println!("[metrics] Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            println!("[metrics] Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

pub mod api {
    use super::MetricName;

    /// Record a request that produced a response body
    pub fn request_success() {
        ::metrics::counter!(MetricName::ApiRequestsSuccess.as_str()).increment(1);
    }

    /// Record a request that was answered with an error
    pub fn request_error() {
        ::metrics::counter!(MetricName::ApiRequestsError.as_str()).increment(1);
    }
}

pub mod store {
    use super::MetricName;

    /// Record how many records a fetch returned
    pub fn records_fetched(count: usize) {
        ::metrics::counter!(MetricName::StoreRecordsFetched.as_str()).increment(count as u64);
    }
}

pub mod select {
    use super::MetricName;

    /// Record how many records survived selection
    pub fn records_selected(count: usize) {
        ::metrics::counter!(MetricName::SelectRecordsSelected.as_str()).increment(count as u64);
    }

    /// Record a record dropped for a malformed timestamp
    pub fn malformed_skipped() {
        ::metrics::counter!(MetricName::SelectMalformedSkipped.as_str()).increment(1);
    }
}

pub mod normalize {
    use super::MetricName;

    /// Record how many records were normalized
    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(count as u64);
    }
}
