//! Enrichment worker: the single consumer of the ingestion queue and the
//! single writer of the record store.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ingest::types::RawEvent;
use crate::ingest::{hashtags_in_text, normalize_hashtags, IngestReceiver};
use crate::sentiment::{Classification, ClassifyError, Classifier};
use crate::store::{Record, RecordStore};

const WARM_UP_TEXT: &str = "Model warm up.";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("worker_records_total", "Records appended to the store.");
        describe_counter!(
            "worker_classify_failures_total",
            "Events dropped because classification failed."
        );
        describe_histogram!("worker_classify_ms", "Classifier latency in milliseconds.");
    });
}

pub struct EnrichmentWorker {
    classifier: Arc<dyn Classifier>,
    store: Arc<RecordStore>,
    ready: bool,
}

impl EnrichmentWorker {
    pub fn new(classifier: Arc<dyn Classifier>, store: Arc<RecordStore>) -> Self {
        ensure_metrics_described();
        Self {
            classifier,
            store,
            ready: false,
        }
    }

    /// Whether a classification has succeeded yet.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Run the worker on tokio's blocking pool. Classifiers are synchronous
    /// and may block on I/O, so they stay off the async worker threads.
    pub fn spawn(self, rx: IngestReceiver) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || self.run(rx))
    }

    /// Warm up, then drain the queue until every sender is gone.
    /// Blocks the calling thread; must not be called from async code.
    pub fn run(mut self, mut rx: IngestReceiver) {
        info!(target: "worker", classifier = self.classifier.name(), "sentiment model warming up");
        self.warm_up();

        while let Some(ev) = rx.dequeue_blocking() {
            self.process(ev);
        }
        info!(target: "worker", "ingestion queue closed; worker exiting");
    }

    /// One classification of a fixed text. Readiness is logged on success;
    /// on failure the first successful event logs it instead.
    pub fn warm_up(&mut self) -> bool {
        match self.classify_guarded(WARM_UP_TEXT) {
            Ok(_) => self.mark_ready(),
            Err(e) => warn!(target: "worker", error = %e, "warm-up classification failed"),
        }
        self.ready
    }

    /// Classify one event and append it. Returns `false` when the event was
    /// dropped.
    pub fn process(&mut self, ev: RawEvent) -> bool {
        let id = ev.id.clone();
        match self.enrich(ev, crate::now_unix()) {
            Ok(record) => {
                self.store.add(record);
                counter!("worker_records_total").increment(1);
                if !self.ready {
                    self.mark_ready();
                }
                true
            }
            Err(e) => {
                counter!("worker_classify_failures_total").increment(1);
                warn!(target: "worker", event_id = %id, error = %e, "dropping event");
                false
            }
        }
    }

    /// Merge a raw event with its classification into a record.
    /// A missing timestamp is stamped with `now`.
    pub fn enrich(&self, ev: RawEvent, now: f64) -> Result<Record, ClassifyError> {
        let c = self.classify_guarded(&ev.text)?;

        let hashtags = if ev.hashtags.is_empty() {
            hashtags_in_text(&ev.text)
        } else {
            normalize_hashtags(&ev.hashtags)
        };

        Ok(Record {
            id: ev.id,
            timestamp: ev.timestamp.filter(|t| t.is_finite()).unwrap_or(now),
            source: ev.source,
            author: ev.author,
            hashtags,
            label: c.label,
            confidence: c.confidence,
            signed: Some(c.signed),
            text: ev.text,
        })
    }

    /// Classify and validate; a panicking classifier counts as a backend failure.
    fn classify_guarded(&self, text: &str) -> Result<Classification, ClassifyError> {
        let started = Instant::now();
        let out = catch_unwind(AssertUnwindSafe(|| self.classifier.classify(text)))
            .unwrap_or_else(|_| Err(ClassifyError::Backend("classifier panicked".into())));
        histogram!("worker_classify_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let c = out?;
        c.validate()?;
        debug!(target: "worker", label = %c.label, confidence = c.confidence, "classified");
        Ok(c)
    }

    fn mark_ready(&mut self) {
        self.ready = true;
        info!(target: "worker", store_capacity = self.store.capacity(), "sentiment worker ready");
    }
}
