// src/ingest/simulate.rs
//! Simulated social feed: bursts of short templated posts for a hashtag.
//!
//! Each tick emits 1..=3 events, then sleeps for a random pause. The
//! category mix is 40% positive, 30% neutral, 30% negative.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::ingest::config::SeedPost;
use crate::ingest::types::{EventSource, RawEvent};
use crate::ingest::{normalize_hashtags, IngestSender};

pub const POSITIVE_TEXTS: &[&str] = &[
    "I love this!",
    "Absolutely fantastic result",
    "This is stunning",
    "What a great day",
    "This rocks!",
    "Exceeded expectations",
];
pub const NEUTRAL_TEXTS: &[&str] = &[
    "Not sure about this",
    "Meh, it's okay",
    "Could be better",
    "Just average",
    "Neutral vibes here",
    "Fine, nothing special",
];
pub const NEGATIVE_TEXTS: &[&str] = &[
    "I hate this",
    "This is terrible",
    "So disappointing",
    "Worst experience",
    "Not happy at all",
    "Really bad outcome",
];

#[derive(Debug, Clone)]
pub struct SimulatedSource {
    hashtag: String,
    seed: Vec<SeedPost>,
    pause_ms: (u64, u64),
    limit: Option<usize>,
    rng_seed: Option<u64>,
}

impl SimulatedSource {
    pub fn new(hashtag: &str) -> Self {
        Self {
            hashtag: hashtag.trim().trim_start_matches('#').to_string(),
            seed: Vec::new(),
            pause_ms: (300, 800),
            limit: None,
            rng_seed: None,
        }
    }

    /// Cycle author/hashtags from these seed posts instead of random users.
    pub fn with_seed(mut self, seed: Vec<SeedPost>) -> Self {
        self.seed = seed;
        self
    }

    /// Pause between bursts, inclusive bounds in milliseconds.
    pub fn with_pause_ms(mut self, min: u64, max: u64) -> Self {
        self.pause_ms = (min.min(max), max.max(min));
        self
    }

    /// Stop after emitting `n` events (the default is to run forever).
    pub fn with_limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Deterministic RNG seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn hashtag(&self) -> &str {
        &self.hashtag
    }

    /// Build one event. `n` is the running event counter (1-based).
    pub fn make_event<R: Rng>(&self, rng: &mut R, n: usize, now: f64) -> RawEvent {
        let roll: f64 = rng.random();
        let pool = if roll < 0.4 {
            POSITIVE_TEXTS
        } else if roll < 0.7 {
            NEUTRAL_TEXTS
        } else {
            NEGATIVE_TEXTS
        };
        let text = pool.choose(rng).copied().unwrap_or("Just average");

        let (author, hashtags) = match self.seed.get(n.saturating_sub(1) % self.seed.len().max(1)) {
            Some(base) => (
                base.author
                    .clone()
                    .unwrap_or_else(|| format!("user{}", rng.random_range(1..=9999))),
                normalize_hashtags(&base.hashtags),
            ),
            None => (
                format!("user{}", rng.random_range(100..=999)),
                normalize_hashtags([self.hashtag.as_str()]),
            ),
        };

        RawEvent {
            id: format!("sim-{}-{}", (now * 1000.0) as i64, n),
            text: format!("{text} #{}", self.hashtag),
            timestamp: Some(now),
            author: Some(author),
            hashtags,
            source: "simulate".to_string(),
        }
    }
}

#[async_trait]
impl EventSource for SimulatedSource {
    async fn run(&self, tx: IngestSender) -> Result<()> {
        let mut rng = match self.rng_seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let mut n = 0usize;

        tracing::info!(target: "ingest", hashtag = %self.hashtag, "using simulated stream");
        loop {
            let burst = rng.random_range(1..=3);
            for _ in 0..burst {
                if self.limit.is_some_and(|l| n >= l) {
                    return Ok(());
                }
                n += 1;
                let ev = self.make_event(&mut rng, n, crate::now_unix());
                tx.enqueue(ev).await?;
            }
            let pause = rng.random_range(self.pause_ms.0..=self.pause_ms.1);
            tokio::time::sleep(Duration::from_millis(pause)).await;
        }
    }

    fn name(&self) -> &'static str {
        "simulate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::queue;

    #[test]
    fn events_carry_hashtag_and_template_text() {
        let src = SimulatedSource::new("#AI");
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=50 {
            let ev = src.make_event(&mut rng, n, 1_700_000_000.5);
            assert!(ev.text.ends_with(" #AI"), "{}", ev.text);
            let body = ev.text.trim_end_matches(" #AI");
            assert!(
                POSITIVE_TEXTS.contains(&body)
                    || NEUTRAL_TEXTS.contains(&body)
                    || NEGATIVE_TEXTS.contains(&body)
            );
            assert_eq!(ev.hashtags, vec!["ai".to_string()]);
            assert_eq!(ev.id, format!("sim-1700000000500-{n}"));
            assert_eq!(ev.source, "simulate");
        }
    }

    #[test]
    fn seed_posts_are_cycled() {
        let seed = vec![
            SeedPost {
                author: Some("alice".into()),
                hashtags: vec!["#Rust".into()],
            },
            SeedPost {
                author: Some("bob".into()),
                hashtags: vec![],
            },
        ];
        let src = SimulatedSource::new("ai").with_seed(seed);
        let mut rng = StdRng::seed_from_u64(1);
        let authors: Vec<_> = (1..=4)
            .map(|n| src.make_event(&mut rng, n, 0.0).author.unwrap())
            .collect();
        assert_eq!(authors, vec!["alice", "bob", "alice", "bob"]);
        assert_eq!(src.make_event(&mut rng, 1, 0.0).hashtags, vec!["rust".to_string()]);
    }

    #[tokio::test]
    async fn limited_run_emits_exactly_n_events() {
        let (tx, mut rx) = queue(16);
        let src = SimulatedSource::new("ai")
            .with_pause_ms(0, 1)
            .with_limit(5)
            .with_rng_seed(42);
        src.run(tx).await.unwrap();

        let mut got = 0;
        while let Some(ev) = rx.dequeue().await {
            got += 1;
            assert!(ev.timestamp.is_some());
        }
        assert_eq!(got, 5);
    }
}
