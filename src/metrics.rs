// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe the
    /// dashboard's series so they show up before the first increment.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe_counter!("pipeline_runs_total", "Pipeline runs started.");
        describe_counter!(
            "pipeline_run_failures_total",
            "Pipeline runs that ended in an error."
        );
        describe_counter!("view_builds_total", "Dashboard view rebuilds.");
        describe_counter!(
            "artifact_absent_total",
            "Artifact reads that found nothing usable, by artifact and reason."
        );
        gauge!("dashboard_started_ts").set(chrono::Utc::now().timestamp() as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
