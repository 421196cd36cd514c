//! Salvage structured classifications from free-form model replies.
//!
//! Generative models asked for "only JSON" still wrap it in prose or code
//! fences now and then. [`first_json_object`] pulls the first balanced
//! `{ ... }` block out of such a reply with a brace-depth scan that is aware of
//! JSON string literals, and [`JsonReplyClassifier`] turns any reply into a
//! [`Classification`] or a [`ClassifyError::Malformed`].

use serde::Deserialize;

use super::{Classification, ClassifyError, Classifier, Label};

/// Return the first balanced JSON object in `text`, if any.
///
/// Braces inside string literals (including escaped quotes) are ignored.
/// Unbalanced input yields `None`.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct ReplyShape {
    label: String,
    #[serde(default, alias = "score")]
    confidence: Option<f64>,
    #[serde(default)]
    signed: Option<f64>,
}

/// Parse a model reply into a classification.
///
/// A missing `signed` is derived from the label and confidence
/// (`+confidence`, `0`, `-confidence`); a missing confidence defaults to 1.
pub fn parse_reply(raw: &str) -> Result<Classification, ClassifyError> {
    let trimmed = raw.trim();
    let shape: ReplyShape = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(first_err) => {
            let candidate = first_json_object(trimmed).ok_or_else(|| {
                ClassifyError::Malformed(format!("no JSON object in reply ({first_err})"))
            })?;
            serde_json::from_str(candidate)
                .map_err(|e| ClassifyError::Malformed(format!("unparseable JSON object: {e}")))?
        }
    };

    let label: Label = shape.label.parse()?;
    let confidence = shape.confidence.unwrap_or(1.0);
    let signed = shape.signed.unwrap_or(match label {
        Label::Positive => confidence,
        Label::Neutral => 0.0,
        Label::Negative => -confidence,
    });

    Ok(Classification {
        label,
        confidence,
        signed,
    })
}

/// Adapter for text-in/text-out model backends.
///
/// `backend` returns the raw model reply; transport errors become
/// [`ClassifyError::Backend`], unusable replies [`ClassifyError::Malformed`].
pub struct JsonReplyClassifier<F> {
    backend: F,
}

impl<F> JsonReplyClassifier<F>
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    pub fn new(backend: F) -> Self {
        Self { backend }
    }
}

impl<F> Classifier for JsonReplyClassifier<F>
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let raw = (self.backend)(text).map_err(|e| ClassifyError::Backend(format!("{e:#}")))?;
        parse_reply(&raw)
    }

    fn name(&self) -> &'static str {
        "json-reply"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_object_wrapped_in_prose() {
        let text = "Sure! Here you go:\n```json\n{\"label\":\"positive\",\"confidence\":0.9}\n```";
        assert_eq!(
            first_json_object(text),
            Some("{\"label\":\"positive\",\"confidence\":0.9}")
        );
    }

    #[test]
    fn nested_objects_and_string_braces_are_balanced() {
        let text = r#"x {"a":{"b":"}{"},"c":"\"}"} trailing {"d":1}"#;
        assert_eq!(
            first_json_object(text),
            Some(r#"{"a":{"b":"}{"},"c":"\"}"}"#)
        );
    }

    #[test]
    fn unbalanced_or_missing_object_is_none() {
        assert_eq!(first_json_object("no braces here"), None);
        assert_eq!(first_json_object("{\"label\": \"positive\""), None);
    }

    #[test]
    fn parse_reply_salvages_and_derives_signed() {
        let c = parse_reply("The answer is {\"label\": \"NEGATIVE\", \"confidence\": 0.8}.").unwrap();
        assert_eq!(c.label, Label::Negative);
        assert!((c.signed + 0.8).abs() < 1e-9);
    }

    #[test]
    fn garbage_reply_is_malformed() {
        assert!(matches!(
            parse_reply("I cannot classify this."),
            Err(ClassifyError::Malformed(_))
        ));
        assert!(matches!(
            parse_reply("{\"label\": \"ecstatic\"}"),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn backend_failure_maps_to_backend_error() {
        let clf = JsonReplyClassifier::new(|_: &str| -> anyhow::Result<String> {
            anyhow::bail!("connection reset")
        });
        assert!(matches!(
            clf.classify("hello"),
            Err(ClassifyError::Backend(msg)) if msg.contains("connection reset")
        ));
    }

    #[test]
    fn backend_reply_is_parsed() {
        let clf = JsonReplyClassifier::new(|_: &str| {
            Ok::<_, anyhow::Error>(r#"{"label":"neutral","confidence":0.6,"signed":0.05}"#.to_string())
        });
        let c = clf.classify("hello").unwrap();
        assert_eq!(c.label, Label::Neutral);
        assert!((c.confidence - 0.6).abs() < 1e-9);
    }
}
