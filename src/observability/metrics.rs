//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirects_total` (counter): redirects by status and whether a rule matched
//! - `forwards_total` (counter): forwarded emails by outcome
//!
//! Recording without an installed exporter is a no-op, so the library and its
//! tests never depend on `init_metrics` having run.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!("redirects_total", "Redirect responses issued");
            metrics::describe_counter!("forwards_total", "Email forwarding attempts by outcome");
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_redirect(status: u16, matched: bool) {
    metrics::counter!(
        "redirects_total",
        "status" => status.to_string(),
        "matched" => if matched { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_forward(outcome: &'static str) {
    metrics::counter!("forwards_total", "outcome" => outcome).increment(1);
}
