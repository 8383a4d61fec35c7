//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_policy_reloads_total{outcome}` (counter): policy snapshot swaps
//! - `gateway_policy_version` (gauge): version of the active snapshot
//! - `gateway_policy_lookups_total{matched}` (counter): dispatcher resolutions
//! - `gateway_tree_convergences_total` (counter): discovery batches that converged
//! - `gateway_access_logs_total` (counter): access log records aggregated
//! - `gateway_discovered_endpoints` (gauge): endpoints in the aggregation
//! - `gateway_discovery_batch_duration_seconds` (histogram): batch processing time
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op, so library code and
//!   tests record unconditionally

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(
        "gateway_policy_reloads_total",
        "Policy reload attempts by outcome"
    );
    describe_gauge!("gateway_policy_version", "Version of the active policy snapshot");
    describe_counter!(
        "gateway_policy_lookups_total",
        "Policy resolutions by whether an endpoint matched"
    );
    describe_counter!(
        "gateway_tree_convergences_total",
        "Discovery batches that converged a path position"
    );
    describe_counter!(
        "gateway_access_logs_total",
        "Access log records aggregated by discovery"
    );
    describe_gauge!(
        "gateway_discovered_endpoints",
        "Endpoints currently held by the discovery aggregation"
    );
    describe_histogram!(
        "gateway_discovery_batch_duration_seconds",
        "Time spent aggregating one access log batch"
    );

    tracing::info!(address = %addr, "Prometheus metrics listener started");
    Ok(())
}

pub fn record_policy_reload(outcome: &'static str, version: u64) {
    counter!("gateway_policy_reloads_total", "outcome" => outcome).increment(1);
    gauge!("gateway_policy_version").set(version as f64);
}

pub fn record_policy_lookup(matched: bool) {
    let matched = if matched { "true" } else { "false" };
    counter!("gateway_policy_lookups_total", "matched" => matched).increment(1);
}

pub fn record_convergence() {
    counter!("gateway_tree_convergences_total").increment(1);
}

pub fn record_access_logs(count: usize) {
    counter!("gateway_access_logs_total").increment(count as u64);
}

pub fn record_discovery_batch(endpoints: usize, elapsed: Duration) {
    gauge!("gateway_discovered_endpoints").set(endpoints as f64);
    histogram!("gateway_discovery_batch_duration_seconds").record(elapsed.as_secs_f64());
}
