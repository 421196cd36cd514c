use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{Classification, ClassifyError, Classifier, Label};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Normalization constant for mapping a raw lexicon sum into `(-1, 1)`.
const ALPHA: f64 = 15.0;

/// `|compound|` at or below this is neutral.
const NEUTRAL_BAND: f64 = 0.3;

/// Lexicon classifier with a short negation window.
///
/// Stands in for a learned model: the pipeline only relies on the
/// [`Classifier`] contract, never on how the label was produced.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns `(score, token count)`.
    /// A negator within the previous 1..=3 tokens flips the sign of a word.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let (score, _tokens) = self.score_text(text);
        let s = f64::from(score);
        let compound = s / (s * s + ALPHA).sqrt();

        let (label, confidence) = if compound > NEUTRAL_BAND {
            (Label::Positive, 0.5 + compound / 2.0)
        } else if compound < -NEUTRAL_BAND {
            (Label::Negative, 0.5 - compound / 2.0)
        } else {
            (Label::Neutral, 1.0 - compound.abs())
        };

        Ok(Classification {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            signed: compound.clamp(-1.0, 1.0),
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lower-case alphanumeric tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}
