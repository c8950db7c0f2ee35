// Bag-of-words corpus for topic modeling.
//
// Large stores are down-sampled to a fixed number of reviews with a seeded
// RNG, so the same store always trains on the same reviews. The output is
// the usual (vocabulary, documents-of-(id, count)) pair any LDA trainer
// accepts.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use super::error::{require_reviews, AnalysisError};

/// Minimum reviews a store needs before topics are modeled.
pub const MIN_REVIEWS: usize = 50;
/// Reviews used at most; larger stores are sampled down to this.
pub const MAX_DOCUMENTS: usize = 300;

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    pub max_documents: usize,
    pub seed: u64,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            max_documents: MAX_DOCUMENTS,
            seed: 42,
        }
    }
}

/// Token ↔ id bijection. Ids are dense, starting at 0, in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Vocabulary {
    tokens: Vec<String>,
    #[serde(skip)]
    ids: HashMap<String, u32>,
}

impl Vocabulary {
    /// Id of a token, assigning the next free id if it's new.
    fn intern(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        id
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// One document: (token id, count) pairs sorted by id.
pub type BagOfWords = Vec<(u32, u32)>;

#[derive(Debug, Clone, Serialize)]
pub struct Corpus {
    pub vocabulary: Vocabulary,
    pub documents: Vec<BagOfWords>,
    /// Index into the store's review list for each document
    pub review_indices: Vec<usize>,
}

impl Corpus {
    /// Total token occurrences across all documents.
    pub fn token_count(&self) -> u64 {
        self.documents
            .iter()
            .flat_map(|doc| doc.iter().map(|&(_, c)| c as u64))
            .sum()
    }
}

/// Choose which reviews go into the corpus.
///
/// All of them when there are at most `max_documents`; otherwise exactly
/// `max_documents` indices drawn with the seeded RNG, returned ascending.
pub fn sample_indices(review_count: usize, options: &CorpusOptions) -> Vec<usize> {
    if review_count <= options.max_documents {
        return (0..review_count).collect();
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut indices = rand::seq::index::sample(&mut rng, review_count, options.max_documents).into_vec();
    indices.sort_unstable();
    indices
}

/// Build a corpus from one filtered token sequence per review.
pub fn build_corpus(documents: &[Vec<String>], options: &CorpusOptions) -> Result<Corpus, AnalysisError> {
    require_reviews("Topic modeling", MIN_REVIEWS, documents.len())?;

    let review_indices = sample_indices(documents.len(), options);

    let mut vocabulary = Vocabulary::default();
    let bags: Vec<BagOfWords> = review_indices
        .iter()
        .map(|&i| {
            let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
            for token in &documents[i] {
                *counts.entry(vocabulary.intern(token)).or_insert(0) += 1;
            }
            counts.into_iter().collect()
        })
        .collect();

    if vocabulary.is_empty() {
        return Err(AnalysisError::empty("topic modeling"));
    }

    debug!(
        documents = bags.len(),
        vocabulary = vocabulary.len(),
        "Built topic corpus"
    );

    Ok(Corpus {
        vocabulary,
        documents: bags,
        review_indices,
    })
}
