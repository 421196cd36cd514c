//! Read-side facade over the record store, shared by the HTTP layer and any
//! other presentation collaborator. Every query takes one consistent store
//! copy and computes over it without holding the lock.

use std::sync::Arc;

use crate::counts::{label_counts, LabelCounts};
use crate::rolling::{rolling_mean, RollingPoint};
use crate::store::{Record, RecordStore};

#[derive(Debug, Clone)]
pub struct SentimentService {
    store: Arc<RecordStore>,
}

impl SentimentService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Up to `limit` records from the last `window_minutes`, newest first.
    pub fn list_recent(&self, limit: usize, window_minutes: f64) -> Vec<Arc<Record>> {
        self.list_recent_at(limit, window_minutes, crate::now_unix())
    }

    pub fn list_recent_at(&self, limit: usize, window_minutes: f64, now: f64) -> Vec<Arc<Record>> {
        let mut rows = self.store.recent_window_at(window_minutes, now);
        // Reverse first so the stable sort puts later arrivals first on ties.
        rows.reverse();
        rows.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
        rows.truncate(limit);
        rows
    }

    pub fn label_counts(&self, window_minutes: f64) -> LabelCounts {
        self.label_counts_at(window_minutes, crate::now_unix())
    }

    pub fn label_counts_at(&self, window_minutes: f64, now: f64) -> LabelCounts {
        label_counts(&self.store.recent_window_at(window_minutes, now))
    }

    /// Rolling mean of the signed score over the whole store.
    pub fn rolling_mean(&self, window_minutes: f64) -> Vec<RollingPoint> {
        rolling_mean(&self.store.snapshot(), window_minutes)
    }

    /// Current store occupancy.
    pub fn buffer_size(&self) -> usize {
        self.store.len()
    }
}
