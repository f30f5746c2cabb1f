//! Prometheus metrics for monitoring the league server.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! when `METRICS_BIND` is set. Without an installed exporter the recording
//! functions are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use league_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/admin/matches/1/resolve", 200);
//! metrics::matches_resolved_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// League Metrics
// ============================================================================

/// Increment brackets built counter and record the bracket size.
pub fn brackets_built_total(matches: usize) {
    metrics::counter!("brackets_built_total").increment(1);
    metrics::histogram!("bracket_matches").record(matches as f64);
}

/// Increment resolved matches counter.
pub fn matches_resolved_total(advanced: bool) {
    metrics::counter!("matches_resolved_total",
        "advanced" => advanced.to_string()
    )
    .increment(1);
}

/// Increment completed tournaments counter.
pub fn tournaments_completed_total() {
    metrics::counter!("tournaments_completed_total").increment(1);
}

/// Increment recorded match events counter.
pub fn match_events_recorded_total(kind: &str) {
    metrics::counter!("match_events_recorded_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Increment standings recomputations counter.
pub fn standings_recomputed_total() {
    metrics::counter!("standings_recomputed_total").increment(1);
}

/// Increment bracket consistency faults counter.
pub fn bracket_faults_total() {
    metrics::counter!("bracket_faults_total").increment(1);
}
