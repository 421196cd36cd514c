// src/ingest/mod.rs
//! Ingestion queue: a bounded FIFO between the event source and the
//! enrichment worker. A full queue suspends the producer until the worker
//! drains an item; there is no drop policy and no timeout.

pub mod config;
pub mod scheduler;
pub mod simulate;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::ingest::types::RawEvent;

/// Default queue bound.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Events accepted into the ingestion queue.");
        describe_gauge!("ingest_queue_depth", "Events waiting in the ingestion queue.");
    });
}

/// Returned only when the consumer side is gone (shutdown). Carries the
/// event back to the caller.
#[derive(Debug, Error)]
#[error("ingestion queue closed; event {} not enqueued", .0.id)]
pub struct EnqueueError(pub Box<RawEvent>);

/// Build a bounded queue. Capacity is clamped to at least 1.
pub fn queue(capacity: usize) -> (IngestSender, IngestReceiver) {
    ensure_metrics_described();
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (IngestSender { tx }, IngestReceiver { rx })
}

/// Producer handle. Cheap to clone; every clone shares the same bound.
#[derive(Debug, Clone)]
pub struct IngestSender {
    tx: mpsc::Sender<RawEvent>,
}

impl IngestSender {
    /// Enqueue, waiting for free capacity as long as needed.
    pub async fn enqueue(&self, event: RawEvent) -> Result<(), EnqueueError> {
        self.tx
            .send(event)
            .await
            .map_err(|e| EnqueueError(Box::new(e.0)))?;
        counter!("ingest_events_total").increment(1);
        gauge!("ingest_queue_depth").set(self.depth() as f64);
        Ok(())
    }

    /// Blocking variant for producers on plain OS threads.
    /// Must not be called from inside an async context.
    pub fn enqueue_blocking(&self, event: RawEvent) -> Result<(), EnqueueError> {
        self.tx
            .blocking_send(event)
            .map_err(|e| EnqueueError(Box::new(e.0)))?;
        counter!("ingest_events_total").increment(1);
        gauge!("ingest_queue_depth").set(self.depth() as f64);
        Ok(())
    }

    /// Fixed bound of the queue.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Events currently waiting (approximate under concurrency).
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Consumer handle. There is exactly one, owned by the enrichment worker.
#[derive(Debug)]
pub struct IngestReceiver {
    rx: mpsc::Receiver<RawEvent>,
}

impl IngestReceiver {
    /// Wait for the next event. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn dequeue(&mut self) -> Option<RawEvent> {
        let ev = self.rx.recv().await;
        gauge!("ingest_queue_depth").set(self.rx.len() as f64);
        ev
    }

    /// Blocking variant for a consumer on a plain OS thread.
    /// Must not be called from inside an async context.
    pub fn dequeue_blocking(&mut self) -> Option<RawEvent> {
        let ev = self.rx.blocking_recv();
        gauge!("ingest_queue_depth").set(self.rx.len() as f64);
        ev
    }

    pub fn depth(&self) -> usize {
        self.rx.len()
    }
}

/// Lowercase, strip leading `#`, drop empties and duplicates (first wins).
pub fn normalize_hashtags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.as_ref().trim().trim_start_matches('#').to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Extract `#tags` from free text, normalized like [`normalize_hashtags`].
pub fn hashtags_in_text(text: &str) -> Vec<String> {
    static RE_TAG: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_TAG.get_or_init(|| regex::Regex::new(r"(?u)#(\w+)").expect("hashtag regex"));
    normalize_hashtags(re.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str()))
}
