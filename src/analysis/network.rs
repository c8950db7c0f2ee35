// Co-occurrence network.
//
// Nodes are frequent tokens; an edge joins two tokens that appear in the
// same review, weighted by how many reviews contain both. Co-occurrence is
// document-level: there is no distance window between the two tokens.
//
// Steps, per store:
//   1. pick a minimum frequency (caller-adjustable, default from review count)
//   2. keep tokens at or above it (stopwords and 1-char tokens already gone)
//   3. count each distinct pair once per review
//   4. drop isolated nodes
//   5. bucket nodes into low / medium / high by frequency percentile

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::error::{require_reviews, AnalysisError};
use super::frequency::FrequencyTable;
use crate::text::TokenFilter;

/// Minimum reviews a store needs before a network is drawn.
pub const MIN_REVIEWS: usize = 20;

/// Lower percentile bound for the "low" band.
const LOW_PERCENTILE: f64 = 30.0;
/// Upper percentile bound for the "high" band.
const HIGH_PERCENTILE: f64 = 70.0;

/// Allowed range of the minimum-frequency threshold for a review count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl ThresholdRange {
    /// `[max(1, R/20), max(2, R/10)]`, defaulting to the midpoint.
    pub fn for_reviews(review_count: usize) -> Self {
        let min = (review_count / 20).max(1);
        let max = (review_count / 10).max(2).max(min);
        Self {
            min,
            max,
            default: (min + max) / 2,
        }
    }

    /// Clamp a user-chosen threshold into range.
    pub fn clamp(&self, threshold: usize) -> usize {
        threshold.clamp(self.min, self.max)
    }
}

/// Frequency bucket used to color nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrequencyBand {
    Low,
    Medium,
    High,
}

impl FrequencyBand {
    /// Low is checked first, so a flat distribution lands entirely in Low
    /// and the two outer bands never overlap.
    pub fn classify(frequency: f64, p_low: f64, p_high: f64) -> Self {
        if frequency <= p_low {
            FrequencyBand::Low
        } else if frequency >= p_high {
            FrequencyBand::High
        } else {
            FrequencyBand::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyBand::Low => "low",
            FrequencyBand::Medium => "medium",
            FrequencyBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub token: String,
    /// Raw token frequency across the store's reviews
    pub frequency: usize,
    pub degree: usize,
    pub band: FrequencyBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Number of reviews containing both tokens
    pub weight: u32,
}

/// Undirected weighted co-occurrence graph without isolates or self-loops.
#[derive(Debug, Clone, Serialize)]
pub struct CooccurrenceGraph {
    pub threshold: usize,
    /// Frequency at the 30th and 70th percentile of node frequencies
    pub band_cutoffs: (f64, f64),
    /// Most frequent first
    pub nodes: Vec<GraphNode>,
    /// Heaviest first
    pub edges: Vec<GraphEdge>,
}

impl CooccurrenceGraph {
    pub fn node(&self, token: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.token == token)
    }

    /// Weight of the edge between two tokens, in either direction.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        self.edges
            .iter()
            .find(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .map(|e| e.weight)
    }

    pub fn band_count(&self, band: FrequencyBand) -> usize {
        self.nodes.iter().filter(|n| n.band == band).count()
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Build the co-occurrence network for one store.
///
/// `documents` holds one token sequence per review; its length is the review
/// count checked against `MIN_REVIEWS`. Tokens are run through the salient
/// form of `filter` (stopwords and 1-char tokens removed) before counting.
pub fn build_network(
    documents: &[Vec<String>],
    threshold: usize,
    filter: &TokenFilter,
) -> Result<CooccurrenceGraph, AnalysisError> {
    require_reviews("Network analysis", MIN_REVIEWS, documents.len())?;

    let salient = filter.salient();
    let documents: Vec<Vec<&str>> = documents
        .iter()
        .map(|doc| {
            doc.iter()
                .map(String::as_str)
                .filter(|t| salient.keeps(t))
                .collect()
        })
        .collect();

    let frequencies = FrequencyTable::from_tokens(documents.iter().flatten());

    // Vocabulary ids follow first-seen order, which keeps the output stable
    let vocabulary: Vec<(&str, usize)> = frequencies
        .iter()
        .filter(|(_, count)| *count >= threshold)
        .collect();
    let ids: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(id, (token, _))| (*token, id))
        .collect();

    let mut weights: HashMap<(usize, usize), u32> = HashMap::new();
    for doc in &documents {
        let mut present: Vec<usize> = doc.iter().filter_map(|t| ids.get(t).copied()).collect();
        present.sort_unstable();
        present.dedup();

        for (i, &a) in present.iter().enumerate() {
            for &b in &present[i + 1..] {
                *weights.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let mut degree = vec![0usize; vocabulary.len()];
    for &(a, b) in weights.keys() {
        degree[a] += 1;
        degree[b] += 1;
    }

    let connected: Vec<usize> = (0..vocabulary.len()).filter(|&id| degree[id] > 0).collect();
    if connected.is_empty() {
        return Err(AnalysisError::empty(format!(
            "a network at minimum frequency {threshold}"
        )));
    }

    let node_frequencies: Vec<f64> = connected
        .iter()
        .map(|&id| vocabulary[id].1 as f64)
        .collect();
    let p_low = percentile(&node_frequencies, LOW_PERCENTILE);
    let p_high = percentile(&node_frequencies, HIGH_PERCENTILE);

    let mut nodes: Vec<(usize, GraphNode)> = connected
        .iter()
        .map(|&id| {
            let (token, frequency) = vocabulary[id];
            (
                id,
                GraphNode {
                    token: token.to_string(),
                    frequency,
                    degree: degree[id],
                    band: FrequencyBand::classify(frequency as f64, p_low, p_high),
                },
            )
        })
        .collect();
    nodes.sort_by(|(ia, a), (ib, b)| b.frequency.cmp(&a.frequency).then(ia.cmp(ib)));

    let mut edges: Vec<((usize, usize), u32)> = weights.into_iter().collect();
    edges.sort_by(|(ka, wa), (kb, wb)| wb.cmp(wa).then(ka.cmp(kb)));

    debug!(
        threshold,
        vocabulary = vocabulary.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        "Built co-occurrence network"
    );

    Ok(CooccurrenceGraph {
        threshold,
        band_cutoffs: (p_low, p_high),
        nodes: nodes.into_iter().map(|(_, node)| node).collect(),
        edges: edges
            .into_iter()
            .map(|((a, b), weight)| GraphEdge {
                source: vocabulary[a].0.to_string(),
                target: vocabulary[b].0.to_string(),
                weight,
            })
            .collect(),
    })
}
