// One function per analysis view, over a single store's reviews.

use anyhow::Result;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::analysis::corpus::{build_corpus, Corpus, CorpusOptions};
use crate::analysis::error::require_reviews;
use crate::analysis::frequency::{all_column_frequencies, column_tokens, FrequencyTable};
use crate::analysis::layout::{spring_layout, LayoutOptions, NodePosition};
use crate::analysis::network::{self, build_network, CooccurrenceGraph, ThresholdRange};
use crate::analysis::{AnalysisError, AnalysisSettings};
use crate::dataset::models::{Review, TextColumn};
use crate::db::queries;
use crate::sentiment::{RegionBaseline, SentimentComparison, SentimentResult};
use crate::text::TokenFilter;
use crate::topics::model::TopicModel;
use crate::topics::traits::TopicTrainer;

/// The network view: graph, its threshold range, and node positions.
#[derive(Debug, Clone)]
pub struct NetworkView {
    pub range: ThresholdRange,
    pub graph: CooccurrenceGraph,
    pub positions: Vec<NodePosition>,
}

/// The topic view: the sampled corpus and the model trained on it.
#[derive(Debug, Clone)]
pub struct TopicsView {
    pub corpus: Corpus,
    pub model: TopicModel,
}

/// Word frequencies of the content column and every keyword column.
pub fn store_words(
    reviews: &[&Review],
    filter: &TokenFilter,
) -> Vec<(TextColumn, Result<FrequencyTable, AnalysisError>)> {
    all_column_frequencies(reviews, filter)
}

/// The minimum frequency a network run will use: the request clamped into
/// range, or the range default when nothing was requested.
pub fn resolve_threshold(range: &ThresholdRange, requested: Option<usize>) -> usize {
    let Some(t) = requested else {
        return range.default;
    };
    let clamped = range.clamp(t);
    if clamped != t {
        warn!(
            requested = t,
            used = clamped,
            min = range.min,
            max = range.max,
            "Minimum frequency outside the allowed range"
        );
    }
    clamped
}

/// Build and lay out the co-occurrence network.
///
/// `threshold` is clamped into the store's allowed range; `None` picks the
/// range's default.
pub fn store_network(
    reviews: &[&Review],
    threshold: Option<usize>,
    filter: &TokenFilter,
    settings: &AnalysisSettings,
) -> Result<NetworkView, AnalysisError> {
    require_reviews("Network analysis", network::MIN_REVIEWS, reviews.len())?;

    let range = ThresholdRange::for_reviews(reviews.len());
    let threshold = resolve_threshold(&range, threshold);

    let documents = column_tokens(reviews, TextColumn::Content, filter);
    let graph = build_network(&documents, threshold, filter)?;
    let positions = spring_layout(
        &graph,
        &LayoutOptions {
            seed: settings.seed,
            ..Default::default()
        },
    );

    Ok(NetworkView {
        range,
        graph,
        positions,
    })
}

/// Sample a corpus from the content column and train topics on it.
pub fn store_topics(
    reviews: &[&Review],
    filter: &TokenFilter,
    settings: &AnalysisSettings,
    trainer: &dyn TopicTrainer,
) -> Result<TopicsView> {
    let documents = column_tokens(reviews, TextColumn::Content, &filter.salient());
    let corpus = build_corpus(
        &documents,
        &CorpusOptions {
            seed: settings.seed,
            ..Default::default()
        },
    )?;

    let model = trainer.train(&corpus, settings.topic_count)?;
    info!(
        documents = corpus.documents.len(),
        topics = model.num_topics(),
        "Topic model trained"
    );

    Ok(TopicsView { corpus, model })
}

/// Persist a store's sentiment and compare it with its region.
///
/// The baseline includes every stored store of the region, this one too.
pub fn record_and_compare(
    conn: &Connection,
    region: &str,
    result: &SentimentResult,
    classifier: &str,
) -> Result<Option<SentimentComparison>> {
    queries::upsert_sentiment(conn, region, result, classifier)?;
    region_comparison(conn, region, result)
}

/// Compare a result with the region's stored baseline, if there is one.
pub fn region_comparison(
    conn: &Connection,
    region: &str,
    result: &SentimentResult,
) -> Result<Option<SentimentComparison>> {
    let baseline = region_baseline(conn, region)?;
    Ok(baseline.map(|b| SentimentComparison::new(result.clone(), b)))
}

pub fn region_baseline(conn: &Connection, region: &str) -> Result<Option<RegionBaseline>> {
    let stored = queries::list_region_sentiment(conn, region)?;
    let results: Vec<SentimentResult> = stored.into_iter().map(|s| s.result).collect();
    Ok(RegionBaseline::from_results(region, &results))
}
