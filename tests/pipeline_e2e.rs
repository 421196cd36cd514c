// tests/pipeline_e2e.rs
//
// End-to-end: raw events go through the queue and the worker into the store,
// then come back out through the read-side service.

use std::sync::Arc;

use sentiment_stream::config::Settings;
use sentiment_stream::ingest::simulate::SimulatedSource;
use sentiment_stream::sentiment::LexiconClassifier;
use sentiment_stream::{now_unix, Label, LabelCounts, Pipeline, RawEvent};

fn small_settings() -> Settings {
    Settings {
        queue_capacity: 8,
        store_capacity: 16,
        ..Settings::default()
    }
}

#[tokio::test]
async fn three_posts_are_classified_listed_and_counted() {
    let pipeline = Pipeline::start(&small_settings(), Arc::new(LexiconClassifier::new()), None);
    let service = pipeline.service.clone();

    let base = now_unix() - 3.0;
    let events = [
        ("p1", "I love this!", base),
        ("p2", "Meh, it's okay", base + 1.0),
        ("p3", "This is terrible", base + 2.0),
    ];
    for (id, text, ts) in events {
        pipeline
            .sender
            .enqueue(RawEvent::new(id, text).at(ts))
            .await
            .expect("enqueue");
    }

    // Drains the queue and waits for the worker to finish.
    pipeline.close().await;

    let recent = service.list_recent(10, 1.0);
    let got: Vec<(&str, Label)> = recent.iter().map(|r| (r.id.as_str(), r.label)).collect();
    assert_eq!(
        got,
        vec![
            ("p3", Label::Negative),
            ("p2", Label::Neutral),
            ("p1", Label::Positive),
        ]
    );

    assert_eq!(
        service.label_counts(1.0),
        LabelCounts {
            positive: 1,
            neutral: 1,
            negative: 1
        }
    );
    assert_eq!(service.buffer_size(), 3);

    let points = service.rolling_mean(5.0);
    assert_eq!(points.len(), 3);
    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    // First point only sees the first (positive) record.
    assert_eq!(points[0].value, recent[2].signed.unwrap());
}

#[tokio::test]
async fn missing_timestamp_is_stamped_at_enrichment() {
    let pipeline = Pipeline::start(&small_settings(), Arc::new(LexiconClassifier::new()), None);
    let service = pipeline.service.clone();

    let before = now_unix();
    pipeline
        .sender
        .enqueue(RawEvent::new("no-ts", "What a great day"))
        .await
        .unwrap();
    pipeline.close().await;
    let after = now_unix();

    let rows = service.store().snapshot();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].timestamp >= before && rows[0].timestamp <= after);
}

#[tokio::test]
async fn store_stays_bounded_under_a_simulated_feed() {
    let settings = Settings {
        queue_capacity: 4,
        store_capacity: 10,
        ..Settings::default()
    };
    let source = SimulatedSource::new("#AI")
        .with_pause_ms(0, 1)
        .with_limit(40)
        .with_rng_seed(3);
    let pipeline = Pipeline::start(
        &settings,
        Arc::new(LexiconClassifier::new()),
        Some(Arc::new(source)),
    );
    let service = pipeline.service.clone();

    // Wait for the finite feed to be fully processed.
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        let snap = service.store().snapshot();
        assert!(snap.len() <= 10);
        if snap.last().is_some_and(|r| r.id.ends_with("-40")) {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "feed not drained in time");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let snap = service.store().snapshot();
    assert_eq!(snap.len(), 10);
    let suffixes: Vec<String> = snap
        .iter()
        .map(|r| r.id.rsplit('-').next().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (31..=40).map(|n| n.to_string()).collect();
    assert_eq!(suffixes, expected, "only the newest ten survive, oldest first");

    let counts = service.label_counts(60.0);
    assert_eq!(counts.total(), 10);
    pipeline.close().await;
}
