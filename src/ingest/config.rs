// src/ingest/config.rs
//! Seed posts for the simulated source: JSON Lines, one object per line,
//! of which only `author` and `hashtags` are used.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default seed location, relative to the working directory.
pub const DEFAULT_SEED_PATH: &str = "scripts/sample_posts.jsonl";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SeedPost {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Load seed posts from an explicit path. Lines that are blank or fail to
/// parse are skipped.
pub fn load_seed_from(path: &Path) -> Result<Vec<SeedPost>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading seed posts from {}", path.display()))?;
    Ok(parse_seed(&content))
}

/// Load seed posts from `path` when given, else from [`DEFAULT_SEED_PATH`].
/// A missing or unreadable file yields an empty seed.
pub fn load_seed_or_empty(path: Option<&Path>) -> Vec<SeedPost> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SEED_PATH));
    if !path.exists() {
        return Vec::new();
    }
    match load_seed_from(path) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(target: "ingest", error = %format!("{e:#}"), "seed posts unavailable");
            Vec::new()
        }
    }
}

fn parse_seed(s: &str) -> Vec<SeedPost> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| serde_json::from_str::<SeedPost>(l).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_broken_lines() {
        let jsonl = r##"
{"author":"alice","hashtags":["#AI","ml"],"text":"ignored"}
not json at all

{"hashtags":[]}
"##;
        let out = parse_seed(jsonl);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].author.as_deref(), Some("alice"));
        assert_eq!(out[0].hashtags, vec!["#AI".to_string(), "ml".to_string()]);
        assert_eq!(out[1], SeedPost::default());
    }

    #[test]
    fn missing_file_is_empty_seed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nope.jsonl");
        assert!(load_seed_or_empty(Some(&p)).is_empty());
    }

    #[test]
    fn loads_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("seed.jsonl");
        fs::write(&p, "{\"author\":\"bob\"}\n").unwrap();
        let v = load_seed_from(&p).unwrap();
        assert_eq!(v[0].author.as_deref(), Some("bob"));
    }
}
