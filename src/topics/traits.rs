// Topic trainer trait.
//
// The pipeline stops at a corpus; what trains on it is pluggable. The
// default implementation is a collapsed Gibbs sampler, but anything that
// turns (corpus, topic count) into topic-word and document-topic
// distributions fits here.

use anyhow::Result;

use super::model::TopicModel;
use crate::analysis::corpus::Corpus;

/// Trait for training a topic model on a bag-of-words corpus.
pub trait TopicTrainer {
    /// Train `num_topics` topics over the corpus.
    fn train(&self, corpus: &Corpus, num_topics: usize) -> Result<TopicModel>;
}
