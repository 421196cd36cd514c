// tests/concurrent_reads.rs
//
// One writer appends while several readers query. Every snapshot a reader
// sees must be a consistent, bounded, arrival-ordered slice of the feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use sentiment_stream::{counts::label_counts, now_unix, Label, Record, RecordStore, SentimentService};

const CAP: usize = 50;
const TOTAL: usize = 5_000;

fn rec(n: usize, ts: f64) -> Record {
    let label = Label::ALL[n % 3];
    let signed = match label {
        Label::Positive => 0.5,
        Label::Neutral => 0.0,
        Label::Negative => -0.5,
    };
    Record {
        id: n.to_string(),
        text: String::new(),
        timestamp: ts,
        source: "test".to_string(),
        author: None,
        hashtags: Vec::new(),
        label,
        confidence: 0.9,
        signed: Some(signed),
    }
}

#[test]
fn readers_never_see_torn_or_oversized_state() {
    let store = Arc::new(RecordStore::with_capacity(CAP));
    let service = SentimentService::new(store.clone());
    let done = Arc::new(AtomicBool::new(false));
    let base = now_unix() - 60.0;

    let writer = {
        let store = store.clone();
        let done = done.clone();
        thread::spawn(move || {
            for n in 0..TOTAL {
                store.add(rec(n, base + n as f64 * 0.001));
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let service = service.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut checks = 0usize;
                while !done.load(Ordering::SeqCst) || checks == 0 {
                    let snap = store.snapshot();
                    assert!(snap.len() <= CAP);
                    let ids: Vec<usize> = snap.iter().map(|r| r.id.parse().unwrap()).collect();
                    assert!(
                        ids.windows(2).all(|w| w[1] == w[0] + 1),
                        "snapshot is not a contiguous run: {ids:?}"
                    );
                    assert_eq!(label_counts(&snap).total(), snap.len());

                    let points = service.rolling_mean(5.0);
                    assert!(points.len() <= CAP);
                    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
                    assert!(points.iter().all(|p| (-1.0..=1.0).contains(&p.value)));

                    assert!(service.list_recent(10, 5.0).len() <= 10);
                    checks += 1;
                }
                checks
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for r in readers {
        assert!(r.join().expect("reader panicked") > 0);
    }

    let snap = store.snapshot();
    assert_eq!(snap.len(), CAP);
    assert_eq!(snap.first().unwrap().id, (TOTAL - CAP).to_string());
    assert_eq!(snap.last().unwrap().id, (TOTAL - 1).to_string());
}
