// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ingest::IngestSender;

fn default_source() -> String {
    "simulate".to_string()
}

/// One unclassified event as produced by an event source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    pub id: String,
    pub text: String,
    /// Unix seconds. `None` means "stamp at enrichment time".
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default = "default_source")]
    pub source: String, // e.g., "simulate", "twitter"
}

impl RawEvent {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: None,
            author: None,
            hashtags: Vec::new(),
            source: default_source(),
        }
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A producer of raw events. `run` pushes into the ingestion queue for as
/// long as the source lives; returning ends the producer task.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn run(&self, tx: IngestSender) -> Result<()>;
    fn name(&self) -> &'static str;
}
