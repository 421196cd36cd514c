//! # Sentiment
//! Classifier seam: the label/score shape every classifier must produce,
//! the per-item error taxonomy, and the consistency rules the enrichment
//! worker enforces before a result may become a stored record.

pub mod lexicon;
pub mod reply;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use lexicon::LexiconClassifier;
pub use reply::{first_json_object, JsonReplyClassifier};

/// Discrete sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Neutral,
    Negative,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Positive, Label::Neutral, Label::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Neutral => "neutral",
            Label::Negative => "negative",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ClassifyError;

    /// Case-insensitive; accepts the common `pos`/`neu`/`neg` abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Ok(Label::Positive),
            "neutral" | "neu" => Ok(Label::Neutral),
            "negative" | "neg" => Ok(Label::Negative),
            other => Err(ClassifyError::Malformed(format!("unknown label '{other}'"))),
        }
    }
}

/// Output of a classifier for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    /// Confidence in `label`, in `[0, 1]`.
    pub confidence: f64,
    /// Continuous score: negative in `[-1, 0]`, positive in `[0, 1]`.
    pub signed: f64,
}

impl Classification {
    /// Reject out-of-range values and label/score mismatches.
    ///
    /// `positive` needs `signed >= 0`, `negative` needs `signed <= 0`,
    /// `neutral` accepts any in-range value.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(ClassifyError::OutOfRange {
                field: "confidence",
                value: self.confidence,
            });
        }
        if !self.signed.is_finite() || !(-1.0..=1.0).contains(&self.signed) {
            return Err(ClassifyError::OutOfRange {
                field: "signed",
                value: self.signed,
            });
        }
        let consistent = match self.label {
            Label::Positive => self.signed >= 0.0,
            Label::Negative => self.signed <= 0.0,
            Label::Neutral => true,
        };
        if !consistent {
            return Err(ClassifyError::Inconsistent {
                label: self.label,
                signed: self.signed,
            });
        }
        Ok(())
    }
}

/// Per-item classification failure. Never fatal: the worker logs and drops
/// the offending event.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("classifier backend failed: {0}")]
    Backend(String),
    #[error("malformed classifier output: {0}")]
    Malformed(String),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("label {label} inconsistent with signed score {signed}")]
    Inconsistent { label: Label, signed: f64 },
}

/// Synchronous text classifier. Must not block indefinitely.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;

    /// Name for diagnostics/logs.
    fn name(&self) -> &'static str {
        "classifier"
    }
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Result<Classification, ClassifyError> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        self(text)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(label: Label, confidence: f64, signed: f64) -> Classification {
        Classification {
            label,
            confidence,
            signed,
        }
    }

    #[test]
    fn consistent_results_pass() {
        assert!(c(Label::Positive, 0.9, 0.9).validate().is_ok());
        assert!(c(Label::Negative, 0.7, -0.7).validate().is_ok());
        assert!(c(Label::Neutral, 0.5, -0.1).validate().is_ok());
        assert!(c(Label::Positive, 0.5, 0.0).validate().is_ok());
    }

    #[test]
    fn label_score_mismatch_is_rejected() {
        let err = c(Label::Positive, 0.8, -0.4).validate().unwrap_err();
        assert!(matches!(err, ClassifyError::Inconsistent { .. }));
        let err = c(Label::Negative, 0.8, 0.2).validate().unwrap_err();
        assert!(matches!(err, ClassifyError::Inconsistent { .. }));
    }

    #[test]
    fn out_of_range_and_nan_are_rejected() {
        assert!(matches!(
            c(Label::Neutral, 1.2, 0.0).validate(),
            Err(ClassifyError::OutOfRange { field: "confidence", .. })
        ));
        assert!(matches!(
            c(Label::Neutral, 0.5, f64::NAN).validate(),
            Err(ClassifyError::OutOfRange { field: "signed", .. })
        ));
    }

    #[test]
    fn label_parses_case_insensitively() {
        assert_eq!("POSITIVE".parse::<Label>().unwrap(), Label::Positive);
        assert_eq!(" neg ".parse::<Label>().unwrap(), Label::Negative);
        assert!("mixed".parse::<Label>().is_err());
    }
}
