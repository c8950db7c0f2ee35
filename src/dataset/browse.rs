// The plain review listing behind the "Photos & Reviews" view.

use chrono::NaiveDate;
use serde::Serialize;

use super::models::Review;
use super::ReviewTable;

/// One review prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewEntry {
    pub date: Option<NaiveDate>,
    /// Raw date text, kept for rows whose date didn't parse
    pub date_text: Option<String>,
    pub content: String,
    pub image_urls: Vec<String>,
}

impl ReviewEntry {
    fn from_review(review: &Review) -> Self {
        Self {
            date: review.parsed_date(),
            date_text: review.date.clone(),
            content: review.content.clone().unwrap_or_default(),
            image_urls: review.image_urls(),
        }
    }
}

/// A store's reviews, newest first. Reviews without a readable date go last,
/// in dataset order.
pub fn store_reviews(table: &ReviewTable, store: &str) -> Vec<ReviewEntry> {
    let mut entries: Vec<ReviewEntry> = table
        .for_store(store)
        .into_iter()
        .map(ReviewEntry::from_review)
        .collect();

    // sort_by is stable, so undated rows keep their relative order
    entries.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    entries
}

/// Every image URL posted for a store, in review order, without duplicates.
pub fn store_images(table: &ReviewTable, store: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    table
        .for_store(store)
        .into_iter()
        .flat_map(|r| r.image_urls())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(content: &str, date: Option<&str>, images: Option<&str>) -> Review {
        Review {
            store: "A".to_string(),
            content: Some(content.to_string()),
            date: date.map(str::to_string),
            image_links: images.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_newest_first_undated_last() {
        let table = ReviewTable::new(
            "Test",
            vec![
                review("old", Some("2023-01-01"), None),
                review("undated", None, None),
                review("new", Some("2024-06-01"), None),
            ],
        );
        let entries = store_reviews(&table, "A");
        let order: Vec<&str> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_store_images_deduplicated() {
        let table = ReviewTable::new(
            "Test",
            vec![
                review("a", None, Some("['https://img/1.jpg', 'https://img/2.jpg']")),
                review("b", None, Some("['https://img/1.jpg']")),
            ],
        );
        assert_eq!(
            store_images(&table, "A"),
            vec!["https://img/1.jpg", "https://img/2.jpg"]
        );
    }
}
