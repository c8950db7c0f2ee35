// CSV loading with schema validation.
//
// The regional exports are wide CSVs with more columns than we use. We
// locate the required headers up front and fail with the list of available
// headers if one is missing, so a malformed export is rejected at load time
// instead of surfacing later as empty analyses.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use tracing::{debug, info};

use super::models::{KeywordColumn, KeywordTexts, Review};
use super::ReviewTable;

/// Column positions of every field the analyses need.
struct ColumnIndex {
    name: usize,
    content: usize,
    tokens: usize,
    image_links: usize,
    keywords: [(KeywordColumn, usize); 6],
    sentences: usize,
    date: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| wanted.iter().any(|w| h.trim() == *w))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Missing required column '{}'. Available columns: {:?}",
                        wanted[0],
                        headers.iter().collect::<Vec<_>>()
                    )
                })
        };

        let mut keywords = [(KeywordColumn::Taste, 0); 6];
        for (slot, column) in keywords.iter_mut().zip(KeywordColumn::ALL) {
            *slot = (column, find(&[column.as_str(), column.korean_header()])?);
        }

        Ok(Self {
            name: find(&["Name"])?,
            content: find(&["Content"])?,
            tokens: find(&["Tokens"])?,
            image_links: find(&["Image_Links"])?,
            keywords,
            sentences: find(&["review_sentences"])?,
            date: find(&["Date"])?,
        })
    }

    fn review(&self, record: &StringRecord) -> Review {
        let mut keywords = KeywordTexts::default();
        for (column, idx) in self.keywords {
            keywords.set(column, field(record, idx));
        }

        Review {
            store: field(record, self.name).unwrap_or_default(),
            content: field(record, self.content),
            tokens: field(record, self.tokens),
            image_links: field(record, self.image_links),
            keywords,
            sentences: field(record, self.sentences),
            date: field(record, self.date),
        }
    }
}

/// Read a cell, mapping blank and dataframe null markers to `None`.
fn field(record: &StringRecord, idx: usize) -> Option<String> {
    let value = record.get(idx)?.trim();
    match value {
        "" | "nan" | "NaN" | "None" | "null" => None,
        _ => Some(value.to_string()),
    }
}

/// Load a region's reviews from a CSV file.
pub fn load_csv(path: &Path, region: &str) -> Result<ReviewTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let table = read_reviews(file, region)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    info!(
        region,
        reviews = table.len(),
        path = %path.display(),
        "Loaded review dataset"
    );
    Ok(table)
}

/// Parse reviews from any CSV reader (header row required).
pub fn read_reviews<R: Read>(reader: R, region: &str) -> Result<ReviewTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers().context("Failed to read CSV headers")?.clone();
    let index = ColumnIndex::from_headers(&headers)?;

    let mut reviews = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record at row {}", line + 2))?;
        let review = index.review(&record);
        // A row without a store name can't be selected, so it can't be analyzed
        if review.store.is_empty() {
            skipped += 1;
            continue;
        }
        reviews.push(review);
    }

    if skipped > 0 {
        debug!(skipped, "Skipped rows without a store name");
    }

    Ok(ReviewTable::new(region, reviews))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_EN: &str =
        "Name,Content,Tokens,Image_Links,Taste,Service,Price,Location,Atmosphere,Hygiene,review_sentences,Date\n";
    const HEADER_KO: &str =
        "Name,Content,Tokens,Image_Links,맛,서비스,가격,위치,분위기,위생,review_sentences,Date\n";

    #[test]
    fn test_read_english_headers() {
        let csv = format!(
            "{HEADER_EN}국밥집,맛있어요,\"['국밥', '맛있']\",,맛있다,친절,,,,,\"['맛있어요']\",2024-03-15\n"
        );
        let table = read_reviews(csv.as_bytes(), "Test").unwrap();
        assert_eq!(table.len(), 1);
        let review = &table.reviews()[0];
        assert_eq!(review.store, "국밥집");
        assert_eq!(review.keywords.get(KeywordColumn::Taste), Some("맛있다"));
        assert_eq!(review.keywords.get(KeywordColumn::Price), None);
        assert_eq!(review.image_links, None);
    }

    #[test]
    fn test_read_korean_headers() {
        let csv = format!("{HEADER_KO}국밥집,좋아요,,,,,비싸요,,,,,\n");
        let table = read_reviews(csv.as_bytes(), "Test").unwrap();
        assert_eq!(
            table.reviews()[0].keywords.get(KeywordColumn::Price),
            Some("비싸요")
        );
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let csv = "Name,Content\n국밥집,좋아요\n";
        let err = read_reviews(csv.as_bytes(), "Test").unwrap_err();
        assert!(err.to_string().contains("Missing required column"));
    }

    #[test]
    fn test_rows_without_store_are_skipped() {
        let csv = format!("{HEADER_EN},좋아요,,,,,,,,,,\nA,좋아요,,,,,,,,,,\n");
        let table = read_reviews(csv.as_bytes(), "Test").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nan_cells_are_missing() {
        let csv = format!("{HEADER_EN}A,nan,,,NaN,,,,,,,\n");
        let table = read_reviews(csv.as_bytes(), "Test").unwrap();
        let review = &table.reviews()[0];
        assert_eq!(review.content, None);
        assert_eq!(review.keywords.get(KeywordColumn::Taste), None);
    }
}
