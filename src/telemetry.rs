//! Tracing setup for the binary (tests run without a subscriber).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "warn,sentiment_stream=info,ingest=info,worker=info,api=info";

/// Install a global subscriber. `RUST_LOG` overrides the default filter;
/// `LOG_FORMAT=json` switches from compact text to JSON lines.
///
/// Safe to call more than once: later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    if res.is_ok() {
        tracing::info!(json, "tracing initialized");
    }
}
