//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define resolver metrics (trust decisions, scheme overrides)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `resolver_requests_trusted_total` (counter): requests resolved through
//!   a trust entry
//! - `resolver_requests_untrusted_total` (counter): requests dispatched to
//!   the not-trusted branch
//! - `resolver_scheme_overrides_total` (counter): scheme overrides by scheme

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

pub fn record_trusted() {
    metrics::counter!("resolver_requests_trusted_total").increment(1);
}

pub fn record_untrusted() {
    metrics::counter!("resolver_requests_untrusted_total").increment(1);
}

pub fn record_scheme_override(scheme: &str) {
    metrics::counter!("resolver_scheme_overrides_total", "scheme" => scheme.to_string())
        .increment(1);
}
