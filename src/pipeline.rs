//! Assembly: builds the queue, store and service once, and wires the source
//! and worker tasks to them. Nothing here is global; callers own the handle.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::ingest::{self, scheduler::spawn_source, types::EventSource, IngestSender};
use crate::sentiment::Classifier;
use crate::service::SentimentService;
use crate::store::RecordStore;
use crate::worker::EnrichmentWorker;

pub struct Pipeline {
    pub service: SentimentService,
    /// Producer handle for additional (external) event sources.
    pub sender: IngestSender,
    source_task: Option<JoinHandle<()>>,
    worker_task: JoinHandle<()>,
}

impl Pipeline {
    /// Start the worker, and the source if one is given.
    /// Must be called from within a tokio runtime.
    pub fn start(
        settings: &Settings,
        classifier: Arc<dyn Classifier>,
        source: Option<Arc<dyn EventSource>>,
    ) -> Self {
        let store = Arc::new(RecordStore::with_capacity(settings.store_capacity));
        let (tx, rx) = ingest::queue(settings.queue_capacity);

        let worker_task = EnrichmentWorker::new(classifier, store.clone()).spawn(rx);
        let source_task = source.map(|s| spawn_source(s, tx.clone()));

        tracing::info!(
            queue_capacity = tx.capacity(),
            store_capacity = store.capacity(),
            "pipeline started"
        );

        Self {
            service: SentimentService::new(store),
            sender: tx,
            source_task,
            worker_task,
        }
    }

    /// Stop the source, let the worker drain what is already queued, and
    /// wait for it to exit. Other clones of `sender` keep the worker alive.
    pub async fn close(self) {
        if let Some(task) = self.source_task {
            task.abort();
            let _ = task.await;
        }
        drop(self.sender);
        if let Err(e) = self.worker_task.await {
            tracing::warn!(error = %e, "worker task ended abnormally");
        }
    }
}
