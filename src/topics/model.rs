// Trained topic model and the summaries drawn from it.
//
// Besides raw distributions, the model offers the two numbers a topic
// explorer plots: how prevalent each topic is across the corpus, and which
// terms are most *relevant* to a topic. Relevance blends a term's
// probability within the topic with its lift over the corpus-wide rate:
//
//   relevance(w, t) = λ·log p(w|t) + (1 − λ)·log(p(w|t) / p(w))
//
// λ = 1 ranks purely by probability; smaller λ favours distinctive terms.

use serde::Serialize;

/// Topic-word and document-topic distributions.
#[derive(Debug, Clone, Serialize)]
pub struct TopicModel {
    pub vocabulary: Vec<String>,
    /// `topic_word[t][w]` = p(w | t); each row sums to 1
    pub topic_word: Vec<Vec<f64>>,
    /// `document_topics[d][t]` = p(t | d); each row sums to 1
    pub document_topics: Vec<Vec<f64>>,
    /// Token count of each training document
    pub document_lengths: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

/// One topic as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub id: usize,
    /// Share of corpus tokens attributed to this topic
    pub prevalence: f64,
    pub terms: Vec<TermWeight>,
}

impl TopicModel {
    pub fn num_topics(&self) -> usize {
        self.topic_word.len()
    }

    /// Most probable terms of a topic.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<TermWeight> {
        let Some(row) = self.topic_word.get(topic) else {
            return Vec::new();
        };
        self.rank_terms(row.iter().copied(), n)
    }

    /// Share of corpus tokens per topic, weighting documents by length.
    pub fn topic_prevalence(&self) -> Vec<f64> {
        let k = self.num_topics();
        let mut totals = vec![0.0; k];
        for (mixture, &len) in self.document_topics.iter().zip(&self.document_lengths) {
            for (t, p) in mixture.iter().enumerate() {
                totals[t] += p * len as f64;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Corpus-wide term probability p(w) implied by the model.
    pub fn term_marginals(&self) -> Vec<f64> {
        let prevalence = self.topic_prevalence();
        let mut marginal = vec![0.0; self.vocabulary.len()];
        for (row, weight) in self.topic_word.iter().zip(&prevalence) {
            for (w, p) in row.iter().enumerate() {
                marginal[w] += p * weight;
            }
        }
        marginal
    }

    /// Terms of a topic ranked by relevance with weight `lambda` in [0, 1].
    pub fn relevant_terms(&self, topic: usize, lambda: f64, n: usize) -> Vec<TermWeight> {
        let Some(row) = self.topic_word.get(topic) else {
            return Vec::new();
        };
        let lambda = lambda.clamp(0.0, 1.0);
        let marginal = self.term_marginals();

        let relevance = row.iter().zip(&marginal).map(|(&p, &pw)| {
            if p <= 0.0 || pw <= 0.0 {
                f64::NEG_INFINITY
            } else {
                lambda * p.ln() + (1.0 - lambda) * (p / pw).ln()
            }
        });
        self.rank_terms(relevance, n)
    }

    /// The topic with the largest share in a document.
    pub fn dominant_topic(&self, document: usize) -> Option<usize> {
        let mixture = self.document_topics.get(document)?;
        mixture
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(t, _)| t)
    }

    /// Every topic with its prevalence and top `n` relevant terms.
    pub fn summaries(&self, lambda: f64, n: usize) -> Vec<TopicSummary> {
        self.topic_prevalence()
            .into_iter()
            .enumerate()
            .map(|(id, prevalence)| TopicSummary {
                id,
                prevalence,
                terms: self.relevant_terms(id, lambda, n),
            })
            .collect()
    }

    fn rank_terms(&self, scores: impl Iterator<Item = f64>, n: usize) -> Vec<TermWeight> {
        let mut scored: Vec<(usize, f64)> = scores.enumerate().collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored
            .into_iter()
            .take(n)
            .map(|(w, weight)| TermWeight {
                term: self.vocabulary[w].clone(),
                weight,
            })
            .collect()
    }
}
