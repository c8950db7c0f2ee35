// Review datasets — regional tables of customer reviews.
//
// A region's CSV is loaded once into a `ReviewTable`. Every analysis then
// works on one store's slice of it, selected by exact name match.

pub mod browse;
pub mod download;
pub mod loader;
pub mod models;
pub mod regions;

use std::collections::HashMap;

use models::Review;

/// All reviews for one region.
#[derive(Debug, Clone)]
pub struct ReviewTable {
    region: String,
    reviews: Vec<Review>,
}

impl ReviewTable {
    pub fn new(region: &str, reviews: Vec<Review>) -> Self {
        Self {
            region: region.to_string(),
            reviews,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// The reviews of one store, in dataset order.
    pub fn for_store(&self, store: &str) -> Vec<&Review> {
        self.reviews.iter().filter(|r| r.store == store).collect()
    }

    /// Stores ranked by number of reviews, most reviewed first (ties by name).
    pub fn stores_by_review_count(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for review in &self.reviews {
            *counts.entry(review.store.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(store, count)| (store.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}
