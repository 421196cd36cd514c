// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod counts;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod rolling;
pub mod sentiment;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod worker;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::counts::LabelCounts;
pub use crate::ingest::types::{EventSource, RawEvent};
pub use crate::pipeline::Pipeline;
pub use crate::rolling::RollingPoint;
pub use crate::sentiment::{Classification, ClassifyError, Classifier, Label};
pub use crate::service::SentimentService;
pub use crate::store::{Record, RecordStore};

/// Current UNIX time in seconds, with sub-second precision.
pub fn now_unix() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
