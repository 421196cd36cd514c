// src/config/mod.rs
//! Runtime settings: defaults, then an optional TOML file, then environment
//! overrides.
//!
//! File lookup:
//! 1) $SENTIMENT_CONFIG_PATH (must exist)
//! 2) config/sentiment.toml (if present)

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::DEFAULT_QUEUE_CAPACITY;
use crate::store::DEFAULT_STORE_CAPACITY;

pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";

const MAX_WINDOW_MIN: u32 = 120;

fn default_hashtag() -> String {
    "#AI".to_string()
}
fn default_window_min() -> u32 {
    5
}
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}
fn default_store_capacity() -> usize {
    DEFAULT_STORE_CAPACITY
}
fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend/out")
}
fn default_pause_min_ms() -> u64 {
    300
}
fn default_pause_max_ms() -> u64 {
    800
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Hashtag the simulated feed posts under.
    #[serde(default = "default_hashtag")]
    pub hashtag: String,
    /// Window for `/api/posts`, in minutes.
    #[serde(default = "default_window_min")]
    pub rolling_window_min: u32,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
    /// JSONL seed for simulated authors/hashtags.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    /// Built frontend to serve at `/` when the directory exists.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
    #[serde(default = "default_pause_min_ms")]
    pub simulate_pause_min_ms: u64,
    #[serde(default = "default_pause_max_ms")]
    pub simulate_pause_max_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hashtag: default_hashtag(),
            rolling_window_min: default_window_min(),
            queue_capacity: default_queue_capacity(),
            store_capacity: default_store_capacity(),
            seed_path: None,
            frontend_dir: default_frontend_dir(),
            simulate_pause_min_ms: default_pause_min_ms(),
            simulate_pause_max_ms: default_pause_max_ms(),
        }
    }
}

impl Settings {
    /// Full layered load: file (if any) + env overrides + sanitization.
    pub fn load() -> Result<Self> {
        let mut s = match config_path()? {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        s.apply_env(|k| std::env::var(k).ok());
        s.sanitize();
        Ok(s)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// Override fields from `SENTIMENT_*` variables. Unparseable numbers are
    /// ignored with a warning.
    pub fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("SENTIMENT_HASHTAG").filter(|v| !v.trim().is_empty()) {
            self.hashtag = v.trim().to_string();
        }
        if let Some(v) = parse_env(&get, "SENTIMENT_WINDOW_MIN") {
            self.rolling_window_min = v;
        }
        if let Some(v) = parse_env(&get, "SENTIMENT_QUEUE_CAPACITY") {
            self.queue_capacity = v;
        }
        if let Some(v) = parse_env(&get, "SENTIMENT_STORE_CAPACITY") {
            self.store_capacity = v;
        }
        if let Some(v) = get("SENTIMENT_SEED_PATH").filter(|v| !v.trim().is_empty()) {
            self.seed_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("SENTIMENT_FRONTEND_DIR").filter(|v| !v.trim().is_empty()) {
            self.frontend_dir = PathBuf::from(v);
        }
    }

    /// Clamp values into their valid ranges.
    pub fn sanitize(&mut self) {
        self.rolling_window_min = self.rolling_window_min.clamp(1, MAX_WINDOW_MIN);
        self.queue_capacity = self.queue_capacity.max(1);
        self.store_capacity = self.store_capacity.max(1);
        if self.simulate_pause_min_ms > self.simulate_pause_max_ms {
            std::mem::swap(&mut self.simulate_pause_min_ms, &mut self.simulate_pause_max_ms);
        }
        if self.hashtag.trim().trim_start_matches('#').is_empty() {
            self.hashtag = default_hashtag();
        }
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}

fn parse_env<T: std::str::FromStr, F: Fn(&str) -> Option<String>>(get: &F, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
