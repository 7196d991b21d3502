//! Prometheus metrics setup and metric definitions

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .context("failed to set histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Register metric descriptions and emit zero values so HELP/TYPE lines are
/// present from startup, not just after first use.
pub fn describe_metrics() {
    describe_counter!("lectura_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "lectura_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    describe_counter!(
        "lectura_policy_denials_total",
        "Requests denied by the role policy guard, by action"
    );
    describe_counter!(
        "lectura_sessions_closed_total",
        "Evaluation sessions transitioned from open to closed"
    );
    describe_counter!(
        "lectura_access_codes_regenerated_total",
        "Attempt access codes issued by regeneration"
    );
    describe_counter!(
        "lectura_access_codes_redeemed_total",
        "Access codes successfully resolved to a pending attempt"
    );

    counter!("lectura_sessions_closed_total").absolute(0);
    counter!("lectura_access_codes_regenerated_total").absolute(0);
    counter!("lectura_access_codes_redeemed_total").absolute(0);
}
