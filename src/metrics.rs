//! Prometheus exposition for pipeline counters, gauges and histograms.

use anyhow::Context;
use axum::{http::header, response::IntoResponse, routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::config::Settings;

/// Classifier latency buckets, in milliseconds.
const CLASSIFY_MS_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0];

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder and publish the configured capacities.
    /// Fails if a recorder is already installed.
    pub fn init(settings: &Settings) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full("worker_classify_ms".to_string()),
                CLASSIFY_MS_BUCKETS,
            )
            .context("prometheus: classify buckets")?
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_gauge!("ingest_queue_capacity", "Bound of the ingestion queue.");
        describe_gauge!("store_capacity", "Bound of the record store.");
        gauge!("ingest_queue_capacity").set(settings.queue_capacity as f64);
        gauge!("store_capacity").set(settings.store_capacity as f64);

        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let body = handle.render();
                async move { ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response() }
            }),
        )
    }
}
