//! # Rolling Mean
//! Trailing time-window mean of the signed sentiment score.
//!
//! For each distinct timestamp `t` (ascending) the output holds the mean of
//! `signed` over every scored record with timestamp in `[t - window, t]`.
//! The window slides per observation, not per fixed bucket. Records sharing
//! a timestamp collapse into one point so output timestamps strictly increase.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    /// Unix seconds.
    pub timestamp: f64,
    pub value: f64,
}

/// Compute the rolling mean over `records` (any order) with a window of
/// `window_minutes`. Records without a finite signed score are ignored.
pub fn rolling_mean(records: &[Arc<Record>], window_minutes: f64) -> Vec<RollingPoint> {
    let window = (window_minutes * 60.0).max(0.0);

    let mut pts: Vec<(f64, f64)> = records
        .iter()
        .filter(|r| r.timestamp.is_finite())
        .filter_map(|r| r.signed.filter(|s| s.is_finite()).map(|s| (r.timestamp, s)))
        .collect();
    // Stable sort: equal timestamps keep insertion order.
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out = Vec::with_capacity(pts.len());
    let mut left = 0usize;
    let mut sum = 0.0f64;
    let mut i = 0usize;

    while i < pts.len() {
        let t = pts[i].0;
        let cutoff = t - window;

        while pts[left].0 < cutoff {
            sum -= pts[left].1;
            left += 1;
        }
        if left == i {
            // Window restarts here; drop accumulated rounding error.
            sum = 0.0;
        }

        let mut j = i;
        while j < pts.len() && pts[j].0 == t {
            sum += pts[j].1;
            j += 1;
        }

        let count = j - left;
        if count > 0 {
            out.push(RollingPoint {
                timestamp: t,
                value: sum / count as f64,
            });
        }
        i = j;
    }

    out
}
