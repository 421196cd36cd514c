//! Sentiment Stream — Binary Entrypoint
//! Starts the ingestion pipeline (simulated feed → queue → worker → store)
//! and serves the read API on the Shuttle runtime.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use sentiment_stream::{
    api::{self, AppState},
    config::Settings,
    ingest::{config::load_seed_or_empty, simulate::SimulatedSource, types::EventSource},
    metrics::Metrics,
    sentiment::LexiconClassifier,
    telemetry, Pipeline,
};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let settings = Settings::load().context("loading settings")?;
    tracing::info!(?settings, "settings loaded");

    let metrics = match Metrics::init(&settings) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "metrics disabled");
            None
        }
    };

    let source = SimulatedSource::new(&settings.hashtag)
        .with_seed(load_seed_or_empty(settings.seed_path.as_deref()))
        .with_pause_ms(settings.simulate_pause_min_ms, settings.simulate_pause_max_ms);
    let source_name = source.name();

    let pipeline = Pipeline::start(
        &settings,
        Arc::new(LexiconClassifier::new()),
        Some(Arc::new(source)),
    );

    let state = AppState {
        service: pipeline.service.clone(),
        hashtag: settings.hashtag.clone(),
        window_min: settings.rolling_window_min,
        source: source_name,
    };

    let mut router = api::router(state);
    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }
    let router = api::with_frontend(router, &settings.frontend_dir);

    // Dropping the handle detaches the source and worker tasks; they run
    // until the process exits.
    drop(pipeline);

    Ok(router.into())
}
