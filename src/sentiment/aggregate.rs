// Sentiment aggregation: one store's reviews in, a 0-100 report out.
//
// Every sentence of every review is classified, and so is every non-empty
// keyword-column text. Scores are probabilities of "positive", averaged and
// scaled to 0-100. A column nobody wrote anything in is reported as absent,
// never as 0.
//
// This is the one slow analysis: one classifier call per text, awaited in
// sequence. Progress is reported after every call.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::SentimentClassifier;
use crate::analysis::error::{require_reviews, AnalysisError};
use crate::dataset::models::{KeywordColumn, Review};
use crate::output::truncate_chars;

/// Minimum reviews a store needs before sentiment analysis runs.
pub const MIN_REVIEWS: usize = 50;

/// The texts a sentiment pass will classify.
#[derive(Debug, Clone, Default)]
pub struct SentimentInputs {
    pub sentences: Vec<String>,
    /// Non-empty texts per keyword column (columns with none are absent)
    pub keywords: BTreeMap<KeywordColumn, Vec<String>>,
    pub review_count: usize,
}

impl SentimentInputs {
    pub fn from_reviews(reviews: &[&Review]) -> Self {
        let mut inputs = SentimentInputs {
            review_count: reviews.len(),
            ..Default::default()
        };

        for review in reviews {
            inputs.sentences.extend(
                review
                    .sentence_list()
                    .into_iter()
                    .filter(|s| !s.trim().is_empty()),
            );

            for column in KeywordColumn::ALL {
                if let Some(text) = review.keywords.get(column) {
                    if !text.trim().is_empty() {
                        inputs
                            .keywords
                            .entry(column)
                            .or_default()
                            .push(text.to_string());
                    }
                }
            }
        }

        inputs
    }

    /// Number of classifier calls a full pass makes.
    pub fn total_calls(&self) -> usize {
        self.sentences.len() + self.keywords.values().map(Vec::len).sum::<usize>()
    }
}

/// Completed classifier calls out of the pass total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Sentiment scores for one store, 0 (negative) to 100 (positive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub store: String,
    /// Mean over all review sentences
    pub total: f64,
    /// Every keyword column, `None` when the store had no text for it
    pub keywords: BTreeMap<KeywordColumn, Option<f64>>,
    pub sentences_analyzed: usize,
    pub reviews_analyzed: usize,
}

impl SentimentResult {
    pub fn keyword(&self, column: KeywordColumn) -> Option<f64> {
        self.keywords.get(&column).copied().flatten()
    }
}

/// Run a full sentiment pass over one store's reviews.
///
/// Fails with `InsufficientData` below `MIN_REVIEWS` and with `EmptyResult`
/// when no review has a sentence; both before the classifier is touched.
/// Any classifier error aborts the pass.
pub async fn analyze_sentiment<F>(
    store: &str,
    reviews: &[&Review],
    classifier: &dyn SentimentClassifier,
    mut on_progress: F,
) -> Result<SentimentResult>
where
    F: FnMut(Progress),
{
    require_reviews("Sentiment analysis", MIN_REVIEWS, reviews.len())?;

    let inputs = SentimentInputs::from_reviews(reviews);
    if inputs.sentences.is_empty() {
        return Err(AnalysisError::empty(format!("sentiment of {store}")).into());
    }

    let mut progress = Progress {
        completed: 0,
        total: inputs.total_calls(),
    };
    info!(
        store,
        reviews = inputs.review_count,
        classifier_calls = progress.total,
        "Starting sentiment analysis"
    );
    on_progress(progress);

    let mut sentence_scores = Vec::with_capacity(inputs.sentences.len());
    for sentence in &inputs.sentences {
        sentence_scores.push(score(classifier, sentence).await?);
        progress.completed += 1;
        on_progress(progress);
    }

    let mut keywords = BTreeMap::new();
    for column in KeywordColumn::ALL {
        let Some(texts) = inputs.keywords.get(&column) else {
            keywords.insert(column, None);
            continue;
        };

        let mut scores = Vec::with_capacity(texts.len());
        for text in texts {
            scores.push(
                score(classifier, text)
                    .await
                    .with_context(|| format!("Failed to classify {column} text"))?,
            );
            progress.completed += 1;
            on_progress(progress);
        }
        keywords.insert(column, mean(&scores).map(|m| m * 100.0));
    }

    let total = mean(&sentence_scores).unwrap_or(0.0) * 100.0;
    info!(store, total, "Sentiment analysis complete");

    Ok(SentimentResult {
        store: store.to_string(),
        total,
        keywords,
        sentences_analyzed: sentence_scores.len(),
        reviews_analyzed: inputs.review_count,
    })
}

async fn score(classifier: &dyn SentimentClassifier, text: &str) -> Result<f64> {
    let classification = classifier.classify(text).await?;
    debug!(
        label = %classification.label,
        score = classification.score,
        text_preview = %truncate_chars(text, 50),
        "Classified text"
    );
    Ok(classification.positive_probability())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
