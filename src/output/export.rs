// JSON export of analysis results.
//
// Each export is a plain structure a front-end can render directly: word
// lists sized for a word cloud and a treemap, a graph with node positions,
// and the distributions a topic explorer needs (topic-term, doc-topic,
// document lengths, vocabulary and corpus term frequencies).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::corpus::Corpus;
use crate::analysis::frequency::{FrequencyTable, WordCount};
use crate::analysis::layout::NodePosition;
use crate::analysis::network::{CooccurrenceGraph, ThresholdRange};
use crate::analysis::{AnalysisError, AnalysisSettings};
use crate::dataset::models::TextColumn;
use crate::topics::model::{TopicModel, TopicSummary};

#[derive(Debug, Serialize)]
pub struct ColumnWords {
    pub column: String,
    pub total: usize,
    pub word_cloud: Vec<WordCount>,
    pub treemap: Vec<WordCount>,
    /// Why the column is empty, when it is
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WordsExport {
    pub store: String,
    pub columns: Vec<ColumnWords>,
}

#[derive(Debug, Serialize)]
pub struct NetworkExport<'a> {
    pub store: &'a str,
    pub threshold_range: ThresholdRange,
    pub graph: &'a CooccurrenceGraph,
    pub positions: &'a [NodePosition],
}

#[derive(Debug, Serialize)]
pub struct TopicsExport<'a> {
    pub store: &'a str,
    pub documents: usize,
    pub lambda: f64,
    pub topics: Vec<TopicSummary>,
    pub vocabulary: &'a [String],
    /// Corpus count of each vocabulary term
    pub term_frequency: Vec<u64>,
    pub topic_term: &'a [Vec<f64>],
    pub doc_topic: &'a [Vec<f64>],
    pub doc_lengths: &'a [u64],
}

pub fn words_export(
    store: &str,
    columns: &[(TextColumn, Result<FrequencyTable, AnalysisError>)],
    settings: &AnalysisSettings,
) -> WordsExport {
    let columns = columns
        .iter()
        .map(|(column, table)| match table {
            Ok(table) => ColumnWords {
                column: column.to_string(),
                total: table.total(),
                word_cloud: table.top_n(settings.word_cloud_words),
                treemap: table.top_n(settings.treemap_tiles),
                notice: None,
            },
            Err(notice) => ColumnWords {
                column: column.to_string(),
                total: 0,
                word_cloud: Vec::new(),
                treemap: Vec::new(),
                notice: Some(notice.to_string()),
            },
        })
        .collect();

    WordsExport {
        store: store.to_string(),
        columns,
    }
}

pub fn topics_export<'a>(
    store: &'a str,
    corpus: &Corpus,
    model: &'a TopicModel,
    lambda: f64,
    terms_per_topic: usize,
) -> TopicsExport<'a> {
    let mut term_frequency = vec![0u64; model.vocabulary.len()];
    for doc in &corpus.documents {
        for &(id, count) in doc {
            if let Some(slot) = term_frequency.get_mut(id as usize) {
                *slot += count as u64;
            }
        }
    }

    TopicsExport {
        store,
        documents: corpus.documents.len(),
        lambda,
        topics: model.summaries(lambda, terms_per_topic),
        vocabulary: &model.vocabulary,
        term_frequency,
        topic_term: &model.topic_word,
        doc_topic: &model.document_topics,
        doc_lengths: &model.document_lengths,
    }
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_json<T: ?Sized + Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_vec_pretty(value).context("Failed to serialize export")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
