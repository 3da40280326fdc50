//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define pipeline metrics (outcomes, injections, mapping failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `claims_requests_total` (counter): requests by outcome
//!   (`processed`, `pass_through`, `rejected`) and credential error kind
//! - `claims_headers_injected_total` (counter): headers written
//! - `claims_mapping_failures_total` (counter): skipped mappings by kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until
//!   an exporter is installed
//! - Labels never carry claim values

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::pipeline::Outcome;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the outcome of one pipeline run.
pub fn record_outcome(outcome: &Outcome<'_>) {
    match outcome {
        Outcome::Processed(report) => {
            metrics::counter!("claims_requests_total", "outcome" => "processed").increment(1);
            metrics::counter!("claims_headers_injected_total").increment(report.injected() as u64);
            for failure in report.failures() {
                if let Err(err) = &failure.result {
                    metrics::counter!("claims_mapping_failures_total", "kind" => err.kind())
                        .increment(1);
                }
            }
        }
        Outcome::PassThrough(err) => {
            metrics::counter!(
                "claims_requests_total",
                "outcome" => "pass_through",
                "reason" => err.kind()
            )
            .increment(1);
        }
        Outcome::Reject(err) => {
            metrics::counter!(
                "claims_requests_total",
                "outcome" => "rejected",
                "reason" => err.kind()
            )
            .increment(1);
        }
    }
}
