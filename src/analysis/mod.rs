// Text analytics — frequencies, co-occurrence network, topic corpus.
//
// Every function here is a pure transform over one store's reviews. Each
// analysis checks its own preconditions and fails on its own, so a store
// too small for topic modeling still gets its word counts.

pub mod corpus;
pub mod error;
pub mod frequency;
pub mod layout;
pub mod network;

pub use error::AnalysisError;

/// Tunables shared by the analyses, filled from `Config`.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Seed for corpus sampling, network layout and topic training
    pub seed: u64,
    pub word_cloud_words: usize,
    pub treemap_tiles: usize,
    pub topic_count: usize,
    pub topic_passes: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            word_cloud_words: 100,
            treemap_tiles: 30,
            topic_count: 10,
            topic_passes: 5,
        }
    }
}
