// Word frequency tables: input for the word cloud and treemap views.
//
// Counts keep the order in which tokens were first seen, so ranking by
// count is stable: two tokens with the same count appear in the order they
// first showed up in the reviews.

use std::collections::HashMap;

use serde::Serialize;

use super::error::AnalysisError;
use crate::dataset::models::{Review, TextColumn};
use crate::text::TokenFilter;

/// A ranked word with its count and share of all counted tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
    /// Fraction of the table's total (treemap tile area)
    pub share: f64,
}

/// Token → count, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for token in tokens {
            table.add(token.as_ref());
        }
        table
    }

    pub fn add(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), 1));
            }
        }
        self.total += 1;
    }

    pub fn count(&self, token: &str) -> usize {
        self.index.get(token).map_or(0, |&i| self.entries[i].1)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct tokens.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (token, count) in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// All tokens ranked by count, ties in first-seen order.
    pub fn ranked(&self) -> Vec<WordCount> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].1.cmp(&self.entries[a].1));

        order
            .into_iter()
            .map(|i| {
                let (word, count) = &self.entries[i];
                WordCount {
                    word: word.clone(),
                    count: *count,
                    share: if self.total > 0 {
                        *count as f64 / self.total as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }

    /// The `n` most frequent tokens.
    pub fn top_n(&self, n: usize) -> Vec<WordCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Filtered tokens of one column for every review, one sequence per review.
pub fn column_tokens(reviews: &[&Review], column: TextColumn, filter: &TokenFilter) -> Vec<Vec<String>> {
    reviews
        .iter()
        .map(|r| filter.tokens(r.text(column).as_deref()))
        .collect()
}

/// Word frequencies of one column across a store's reviews.
///
/// Returns `EmptyResult` when no tokens survive filtering, so callers never
/// try to draw an empty word cloud.
pub fn column_frequencies(
    reviews: &[&Review],
    column: TextColumn,
    filter: &TokenFilter,
) -> Result<FrequencyTable, AnalysisError> {
    let table = FrequencyTable::from_tokens(column_tokens(reviews, column, filter).into_iter().flatten());

    if table.is_empty() {
        return Err(AnalysisError::empty(column.to_string()));
    }
    Ok(table)
}

/// Frequencies for every display column. Columns without data carry the notice.
pub fn all_column_frequencies(
    reviews: &[&Review],
    filter: &TokenFilter,
) -> Vec<(TextColumn, Result<FrequencyTable, AnalysisError>)> {
    TextColumn::all()
        .into_iter()
        .map(|column| (column, column_frequencies(reviews, column, filter)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_total() {
        let table = FrequencyTable::from_tokens(["국밥", "맛집", "국밥", "친절"]);
        assert_eq!(table.count("국밥"), 2);
        assert_eq!(table.count("없음"), 0);
        assert_eq!(table.total(), 4);
        assert_eq!(table.distinct(), 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = FrequencyTable::from_tokens(["b", "a", "c", "a", "b", "d"]);
        let words: Vec<String> = table.top_n(3).into_iter().map(|w| w.word).collect();
        assert_eq!(words, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let table = FrequencyTable::from_tokens(["x", "y", "x", "z"]);
        let sum: f64 = table.ranked().iter().map(|w| w.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((table.ranked()[0].share - 0.5).abs() < 1e-9);
    }
}
