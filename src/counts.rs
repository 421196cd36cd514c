//! Label counts over a window of records.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::sentiment::Label;
use crate::store::Record;

/// Per-label counts. All three keys are always present when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl LabelCounts {
    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Positive => self.positive,
            Label::Neutral => self.neutral,
            Label::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

pub fn label_counts(records: &[Arc<Record>]) -> LabelCounts {
    records
        .iter()
        .fold(LabelCounts::default(), |mut acc, r| {
            match r.label {
                Label::Positive => acc.positive += 1,
                Label::Neutral => acc.neutral += 1,
                Label::Negative => acc.negative += 1,
            }
            acc
        })
}
