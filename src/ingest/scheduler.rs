// src/ingest/scheduler.rs
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::{types::EventSource, IngestSender};

/// Spawn the producer task for `source`.
///
/// The task lives as long as the source keeps producing. A source that
/// returns (finite feed) or fails (queue closed, upstream gone) is logged;
/// the task does not restart it.
pub fn spawn_source(source: Arc<dyn EventSource>, tx: IngestSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = source.name();
        tracing::info!(target: "ingest", source = name, capacity = tx.capacity(), "source started");
        match source.run(tx).await {
            Ok(()) => tracing::info!(target: "ingest", source = name, "source finished"),
            Err(e) => {
                counter!("ingest_source_errors_total").increment(1);
                tracing::warn!(target: "ingest", source = name, error = %format!("{e:#}"), "source stopped");
            }
        }
    })
}
