// How a store compares with the rest of its region.
//
// The baseline is the plain mean over every analyzed store in the region.
// Each keyword column is averaged only over the stores that have a score
// for it, so a column most stores never mention does not drag toward 0.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregate::SentimentResult;
use crate::dataset::models::KeywordColumn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBaseline {
    pub region: String,
    /// Number of store results averaged
    pub stores: usize,
    pub total: f64,
    pub keywords: BTreeMap<KeywordColumn, Option<f64>>,
}

impl RegionBaseline {
    /// Average a region's store results; `None` when there are none.
    pub fn from_results(region: &str, results: &[SentimentResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let total = results.iter().map(|r| r.total).sum::<f64>() / results.len() as f64;

        let keywords = KeywordColumn::ALL
            .into_iter()
            .map(|column| {
                let present: Vec<f64> = results.iter().filter_map(|r| r.keyword(column)).collect();
                let mean = if present.is_empty() {
                    None
                } else {
                    Some(present.iter().sum::<f64>() / present.len() as f64)
                };
                (column, mean)
            })
            .collect();

        Some(Self {
            region: region.to_string(),
            stores: results.len(),
            total,
            keywords,
        })
    }

    pub fn keyword(&self, column: KeywordColumn) -> Option<f64> {
        self.keywords.get(&column).copied().flatten()
    }
}

/// A store result side by side with its regional baseline.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentComparison {
    pub store: SentimentResult,
    pub baseline: RegionBaseline,
    /// store − baseline
    pub total_delta: f64,
    /// store − baseline per column, `None` when either side is absent
    pub keyword_deltas: BTreeMap<KeywordColumn, Option<f64>>,
}

impl SentimentComparison {
    pub fn new(store: SentimentResult, baseline: RegionBaseline) -> Self {
        let keyword_deltas = KeywordColumn::ALL
            .into_iter()
            .map(|column| {
                let delta = match (store.keyword(column), baseline.keyword(column)) {
                    (Some(s), Some(b)) => Some(s - b),
                    _ => None,
                };
                (column, delta)
            })
            .collect();

        Self {
            total_delta: store.total - baseline.total,
            store,
            baseline,
            keyword_deltas,
        }
    }

    pub fn keyword_delta(&self, column: KeywordColumn) -> Option<f64> {
        self.keyword_deltas.get(&column).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(store: &str, total: f64, taste: Option<f64>, price: Option<f64>) -> SentimentResult {
        let mut keywords: BTreeMap<KeywordColumn, Option<f64>> =
            KeywordColumn::ALL.into_iter().map(|c| (c, None)).collect();
        keywords.insert(KeywordColumn::Taste, taste);
        keywords.insert(KeywordColumn::Price, price);
        SentimentResult {
            store: store.to_string(),
            total,
            keywords,
            sentences_analyzed: 100,
            reviews_analyzed: 50,
        }
    }

    #[test]
    fn test_baseline_means_over_present_columns() {
        let results = vec![
            result("a", 80.0, Some(90.0), None),
            result("b", 60.0, Some(70.0), Some(40.0)),
        ];
        let baseline = RegionBaseline::from_results("Jeju Island", &results).unwrap();

        assert_eq!(baseline.stores, 2);
        assert!((baseline.total - 70.0).abs() < 1e-9);
        assert_eq!(baseline.keyword(KeywordColumn::Taste), Some(80.0));
        // only store b mentioned price
        assert_eq!(baseline.keyword(KeywordColumn::Price), Some(40.0));
        assert_eq!(baseline.keyword(KeywordColumn::Hygiene), None);
    }

    #[test]
    fn test_empty_region_has_no_baseline() {
        assert!(RegionBaseline::from_results("Jeju Island", &[]).is_none());
    }

    #[test]
    fn test_comparison_deltas() {
        let results = vec![
            result("a", 80.0, Some(90.0), None),
            result("b", 60.0, Some(70.0), Some(40.0)),
        ];
        let baseline = RegionBaseline::from_results("Jeju Island", &results).unwrap();
        let comparison = SentimentComparison::new(results[0].clone(), baseline);

        assert!((comparison.total_delta - 10.0).abs() < 1e-9);
        assert_eq!(comparison.keyword_delta(KeywordColumn::Taste), Some(10.0));
        // store a has no price score
        assert_eq!(comparison.keyword_delta(KeywordColumn::Price), None);
    }
}
