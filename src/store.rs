//! # Record Store
//! Bounded, in-memory, arrival-ordered collection of enriched records.
//!
//! A single writer (the enrichment worker) appends; any number of readers
//! take point-in-time copies. When full, appending evicts exactly one record,
//! the oldest by insertion order. Records are shared as `Arc<Record>` so a
//! reader's copy under the lock is a pointer copy, never a deep clone.

use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    sync::{Arc, RwLock},
};

use metrics::{counter, gauge};

use crate::sentiment::Label;

/// Default store bound.
pub const DEFAULT_STORE_CAPACITY: usize = 5_000;

/// A finalized, classified post. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    /// Unix seconds.
    pub timestamp: f64,
    pub source: String,
    pub author: Option<String>,
    pub hashtags: Vec<String>,
    pub label: Label,
    pub confidence: f64,
    /// `None` for records without a continuous score; skipped by the rolling mean.
    pub signed: Option<f64>,
}

/// Thread-safe bounded ring of records.
#[derive(Debug)]
pub struct RecordStore {
    inner: RwLock<VecDeque<Arc<Record>>>,
    cap: usize,
}

impl RecordStore {
    /// Create a store holding at most `cap` records (clamped to at least 1).
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            inner: RwLock::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    /// Append a record, evicting the oldest one first when full.
    pub fn add(&self, record: Record) {
        let record = Arc::new(record);
        let (len, evicted) = {
            let mut buf = self.inner.write().expect("record store lock poisoned");
            let evicted = if buf.len() >= self.cap {
                buf.pop_front().is_some()
            } else {
                false
            };
            buf.push_back(record);
            debug_assert!(buf.len() <= self.cap);
            (buf.len(), evicted)
        };

        if evicted {
            counter!("store_evictions_total").increment(1);
        }
        gauge!("store_size").set(len as f64);
    }

    /// Records with `timestamp >= now - window_minutes * 60`, in arrival order.
    pub fn recent_window(&self, window_minutes: f64) -> Vec<Arc<Record>> {
        self.recent_window_at(window_minutes, crate::now_unix())
    }

    /// Like [`recent_window`](Self::recent_window) with an explicit `now`.
    pub fn recent_window_at(&self, window_minutes: f64, now: f64) -> Vec<Arc<Record>> {
        let cutoff = now - window_minutes * 60.0;
        let buf = self.inner.read().expect("record store lock poisoned");
        // Arrival order is not timestamp order, so scan everything.
        buf.iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Full contents, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        let buf = self.inner.read().expect("record store lock poisoned");
        buf.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("record store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }
}

#[cfg(test)]
pub(crate) fn record(id: &str, timestamp: f64, label: Label, signed: Option<f64>) -> Record {
    Record {
        id: id.to_string(),
        text: format!("text {id}"),
        timestamp,
        source: "test".to_string(),
        author: None,
        hashtags: Vec::new(),
        label,
        confidence: 0.9,
        signed,
    }
}
