// Latent Dirichlet Allocation via collapsed Gibbs sampling.
//
// Every token carries a topic assignment. A sweep resamples each
// assignment from
//
//   p(t) ∝ (n_wt + β) / (n_t + Vβ) · (n_dt + α)
//
// with the token's own assignment removed from the counts. After a burn-in
// the distributions are read off the counts once per pass and averaged.
// The RNG is seeded, so a given corpus always yields the same model.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::model::TopicModel;
use super::traits::TopicTrainer;
use crate::analysis::corpus::Corpus;

/// Collapsed Gibbs sampler, the default topic trainer.
#[derive(Debug, Clone)]
pub struct GibbsLdaTrainer {
    /// Sampling sweeps averaged into the final distributions
    pub passes: usize,
    /// Sweeps discarded before averaging starts
    pub burn_in: usize,
    /// Document-topic concentration
    pub alpha: f64,
    /// Topic-word concentration
    pub beta: f64,
    pub seed: u64,
}

impl Default for GibbsLdaTrainer {
    fn default() -> Self {
        Self {
            passes: 5,
            burn_in: 100,
            alpha: 0.1,
            beta: 0.01,
            seed: 42,
        }
    }
}

impl GibbsLdaTrainer {
    pub fn new(passes: usize, seed: u64) -> Self {
        Self {
            passes,
            seed,
            ..Default::default()
        }
    }
}

impl TopicTrainer for GibbsLdaTrainer {
    fn train(&self, corpus: &Corpus, num_topics: usize) -> Result<TopicModel> {
        if num_topics == 0 {
            anyhow::bail!("Topic count must be at least 1");
        }
        if corpus.vocabulary.is_empty() {
            anyhow::bail!("Cannot train topics on an empty vocabulary");
        }

        let k = num_topics;
        let v = corpus.vocabulary.len();
        let passes = self.passes.max(1);

        // Expand bags of words back into token id sequences
        let docs: Vec<Vec<usize>> = corpus
            .documents
            .iter()
            .map(|bag| {
                bag.iter()
                    .flat_map(|&(id, count)| std::iter::repeat_n(id as usize, count as usize))
                    .collect()
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut word_topic = vec![vec![0u32; k]; v];
        let mut doc_topic = vec![vec![0u32; k]; docs.len()];
        let mut topic_total = vec![0u32; k];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());

        for (d, doc) in docs.iter().enumerate() {
            let mut z = Vec::with_capacity(doc.len());
            for &w in doc {
                let t = rng.random_range(0..k);
                word_topic[w][t] += 1;
                doc_topic[d][t] += 1;
                topic_total[t] += 1;
                z.push(t);
            }
            assignments.push(z);
        }

        info!(
            documents = docs.len(),
            vocabulary = v,
            topics = k,
            sweeps = self.burn_in + passes,
            "Training LDA topic model"
        );

        let mut phi_sum = vec![vec![0.0f64; v]; k];
        let mut theta_sum = vec![vec![0.0f64; k]; docs.len()];
        let mut weights = vec![0.0f64; k];
        let v_beta = v as f64 * self.beta;

        for sweep in 0..self.burn_in + passes {
            for (d, doc) in docs.iter().enumerate() {
                for (i, &w) in doc.iter().enumerate() {
                    let old = assignments[d][i];
                    word_topic[w][old] -= 1;
                    doc_topic[d][old] -= 1;
                    topic_total[old] -= 1;

                    let mut total = 0.0;
                    for t in 0..k {
                        let p = (word_topic[w][t] as f64 + self.beta)
                            / (topic_total[t] as f64 + v_beta)
                            * (doc_topic[d][t] as f64 + self.alpha);
                        total += p;
                        weights[t] = total;
                    }

                    let u = rng.random::<f64>() * total;
                    let new = weights.iter().position(|&c| u < c).unwrap_or(k - 1);

                    assignments[d][i] = new;
                    word_topic[w][new] += 1;
                    doc_topic[d][new] += 1;
                    topic_total[new] += 1;
                }
            }

            if sweep >= self.burn_in {
                accumulate(
                    &word_topic,
                    &doc_topic,
                    &topic_total,
                    self.alpha,
                    self.beta,
                    &mut phi_sum,
                    &mut theta_sum,
                );
                debug!(sweep, "Accumulated LDA sample");
            }
        }

        let samples = passes as f64;
        let topic_word = phi_sum
            .into_iter()
            .map(|row| row.into_iter().map(|x| x / samples).collect())
            .collect();
        let document_topics = theta_sum
            .into_iter()
            .map(|row| row.into_iter().map(|x| x / samples).collect())
            .collect();

        Ok(TopicModel {
            vocabulary: corpus.vocabulary.tokens().to_vec(),
            topic_word,
            document_topics,
            document_lengths: docs.iter().map(|d| d.len() as u64).collect(),
        })
    }
}

/// Add the current point estimates of φ and θ to the running sums.
fn accumulate(
    word_topic: &[Vec<u32>],
    doc_topic: &[Vec<u32>],
    topic_total: &[u32],
    alpha: f64,
    beta: f64,
    phi_sum: &mut [Vec<f64>],
    theta_sum: &mut [Vec<f64>],
) {
    let v = word_topic.len();
    let k = topic_total.len();

    for (t, row) in phi_sum.iter_mut().enumerate() {
        let denom = topic_total[t] as f64 + v as f64 * beta;
        for (w, cell) in row.iter_mut().enumerate() {
            *cell += (word_topic[w][t] as f64 + beta) / denom;
        }
    }

    for (counts, row) in doc_topic.iter().zip(theta_sum.iter_mut()) {
        let len: u32 = counts.iter().sum();
        let denom = len as f64 + k as f64 * alpha;
        for (t, cell) in row.iter_mut().enumerate() {
            *cell += (counts[t] as f64 + alpha) / denom;
        }
    }
}
