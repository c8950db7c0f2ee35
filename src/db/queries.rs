// Every SQL statement the application runs.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::dataset::models::KeywordColumn;
use crate::sentiment::SentimentResult;

/// A sentiment result as stored, with its bookkeeping columns.
#[derive(Debug, Clone)]
pub struct StoredSentiment {
    pub region: String,
    pub result: SentimentResult,
    pub classifier: Option<String>,
    pub analyzed_at: String,
}

/// Save a store's result, replacing any earlier one for the same store.
pub fn upsert_sentiment(
    conn: &Connection,
    region: &str,
    result: &SentimentResult,
    classifier: &str,
) -> Result<()> {
    let keywords_json = serde_json::to_string(&result.keywords)?;
    conn.execute(
        "INSERT INTO sentiment_results
            (region, store, total, keywords_json, sentences_analyzed, reviews_analyzed, classifier, analyzed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
         ON CONFLICT(region, store) DO UPDATE SET
            total = ?3,
            keywords_json = ?4,
            sentences_analyzed = ?5,
            reviews_analyzed = ?6,
            classifier = ?7,
            analyzed_at = datetime('now')",
        params![
            region,
            result.store,
            result.total,
            keywords_json,
            result.sentences_analyzed as i64,
            result.reviews_analyzed as i64,
            classifier,
        ],
    )
    .with_context(|| format!("Failed to save sentiment result for {}", result.store))?;
    Ok(())
}

/// The stored result for one store, if it has been analyzed.
pub fn get_sentiment(conn: &Connection, region: &str, store: &str) -> Result<Option<StoredSentiment>> {
    let mut stmt = conn.prepare(
        "SELECT region, store, total, keywords_json, sentences_analyzed, reviews_analyzed,
                classifier, analyzed_at
         FROM sentiment_results
         WHERE region = ?1 AND store = ?2",
    )?;
    let row = stmt
        .query_row(params![region, store], read_row)
        .optional()?;
    row.map(decode).transpose()
}

/// Every stored result of a region, ordered by store name.
pub fn list_region_sentiment(conn: &Connection, region: &str) -> Result<Vec<StoredSentiment>> {
    let mut stmt = conn.prepare(
        "SELECT region, store, total, keywords_json, sentences_analyzed, reviews_analyzed,
                classifier, analyzed_at
         FROM sentiment_results
         WHERE region = ?1
         ORDER BY store",
    )?;
    let rows = stmt
        .query_map(params![region], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(decode).collect()
}

/// Drop every stored result of a region. Returns the number removed.
pub fn clear_region_sentiment(conn: &Connection, region: &str) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM sentiment_results WHERE region = ?1",
        params![region],
    )?;
    Ok(removed)
}

/// Raw column values, before the JSON column is decoded.
struct RawRow {
    region: String,
    store: String,
    total: f64,
    keywords_json: String,
    sentences_analyzed: i64,
    reviews_analyzed: i64,
    classifier: Option<String>,
    analyzed_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        region: row.get(0)?,
        store: row.get(1)?,
        total: row.get(2)?,
        keywords_json: row.get(3)?,
        sentences_analyzed: row.get(4)?,
        reviews_analyzed: row.get(5)?,
        classifier: row.get(6)?,
        analyzed_at: row.get(7)?,
    })
}

fn decode(raw: RawRow) -> Result<StoredSentiment> {
    let mut keywords: BTreeMap<KeywordColumn, Option<f64>> =
        serde_json::from_str(&raw.keywords_json)
            .with_context(|| format!("Corrupt keyword scores for {}", raw.store))?;
    // Rows written before a column existed read back as absent
    for column in KeywordColumn::ALL {
        keywords.entry(column).or_insert(None);
    }

    Ok(StoredSentiment {
        region: raw.region,
        result: SentimentResult {
            store: raw.store,
            total: raw.total,
            keywords,
            sentences_analyzed: raw.sentences_analyzed.max(0) as usize,
            reviews_analyzed: raw.reviews_analyzed.max(0) as usize,
        },
        classifier: raw.classifier,
        analyzed_at: raw.analyzed_at,
    })
}
