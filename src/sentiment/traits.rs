// Sentiment classifier trait.
//
// Aggregation only needs "text in, (label, confidence) out". The default
// implementation runs a local ONNX export of a Korean binary sentiment
// model; a hosted inference API is available as an alternative.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The two classes a binary sentiment model can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Map a model's label string onto a class.
    ///
    /// Hugging Face exports usually name classes `LABEL_0` / `LABEL_1`, with
    /// index 1 the positive class. Named labels are accepted too.
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "label_1" | "1" | "positive" | "pos" | "긍정" => Some(SentimentLabel::Positive),
            "label_0" | "0" | "negative" | "neg" | "부정" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
        }
    }
}

/// The result of classifying one piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Confidence in `label`, from 0.0 to 1.0
    pub score: f64,
}

impl Classification {
    /// Probability that the text is positive, whichever label won.
    pub fn positive_probability(&self) -> f64 {
        let score = self.score.clamp(0.0, 1.0);
        match self.label {
            SentimentLabel::Positive => score,
            SentimentLabel::Negative => 1.0 - score,
        }
    }
}

/// Trait for classifying text sentiment. Async because the hosted backend
/// is an HTTP call and the local one offloads inference to a blocking thread.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single text.
    async fn classify(&self, text: &str) -> Result<Classification>;
}
