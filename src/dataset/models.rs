// The typed review schema.
//
// One row of a regional CSV becomes one `Review`. Every text field is
// optional: the source data has gaps everywhere, and a missing field is
// treated as empty text downstream rather than as an error.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::text::fields;

/// The six fixed review-aspect columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeywordColumn {
    Taste,
    Service,
    Price,
    Location,
    Atmosphere,
    Hygiene,
}

impl KeywordColumn {
    pub const ALL: [KeywordColumn; 6] = [
        KeywordColumn::Taste,
        KeywordColumn::Service,
        KeywordColumn::Price,
        KeywordColumn::Location,
        KeywordColumn::Atmosphere,
        KeywordColumn::Hygiene,
    ];

    /// English column header.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordColumn::Taste => "Taste",
            KeywordColumn::Service => "Service",
            KeywordColumn::Price => "Price",
            KeywordColumn::Location => "Location",
            KeywordColumn::Atmosphere => "Atmosphere",
            KeywordColumn::Hygiene => "Hygiene",
        }
    }

    /// Column header used by the Korean-language exports.
    pub fn korean_header(&self) -> &'static str {
        match self {
            KeywordColumn::Taste => "맛",
            KeywordColumn::Service => "서비스",
            KeywordColumn::Price => "가격",
            KeywordColumn::Location => "위치",
            KeywordColumn::Atmosphere => "분위기",
            KeywordColumn::Hygiene => "위생",
        }
    }

    /// Parse either header form, case-insensitively for the English one.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            c.as_str().eq_ignore_ascii_case(name.trim()) || c.korean_header() == name.trim()
        })
    }
}

impl fmt::Display for KeywordColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A text column that can be analyzed for word frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextColumn {
    /// The free-text review body (via its pre-tokenized form when present)
    Content,
    Keyword(KeywordColumn),
}

impl TextColumn {
    /// Content first, then the six keyword columns in display order.
    pub fn all() -> Vec<TextColumn> {
        std::iter::once(TextColumn::Content)
            .chain(KeywordColumn::ALL.into_iter().map(TextColumn::Keyword))
            .collect()
    }

    pub fn parse(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case("content") {
            return Some(TextColumn::Content);
        }
        KeywordColumn::parse(name).map(TextColumn::Keyword)
    }
}

impl fmt::Display for TextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextColumn::Content => write!(f, "Content"),
            TextColumn::Keyword(k) => write!(f, "{k}"),
        }
    }
}

/// Per-review text for each keyword column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTexts {
    pub taste: Option<String>,
    pub service: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub atmosphere: Option<String>,
    pub hygiene: Option<String>,
}

impl KeywordTexts {
    pub fn get(&self, column: KeywordColumn) -> Option<&str> {
        let value = match column {
            KeywordColumn::Taste => &self.taste,
            KeywordColumn::Service => &self.service,
            KeywordColumn::Price => &self.price,
            KeywordColumn::Location => &self.location,
            KeywordColumn::Atmosphere => &self.atmosphere,
            KeywordColumn::Hygiene => &self.hygiene,
        };
        value.as_deref()
    }

    pub fn set(&mut self, column: KeywordColumn, text: Option<String>) {
        let slot = match column {
            KeywordColumn::Taste => &mut self.taste,
            KeywordColumn::Service => &mut self.service,
            KeywordColumn::Price => &mut self.price,
            KeywordColumn::Location => &mut self.location,
            KeywordColumn::Atmosphere => &mut self.atmosphere,
            KeywordColumn::Hygiene => &mut self.hygiene,
        };
        *slot = text;
    }
}

/// One customer review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub store: String,
    pub content: Option<String>,
    /// Pre-tokenized content, a list literal or whitespace-separated text
    pub tokens: Option<String>,
    pub image_links: Option<String>,
    pub keywords: KeywordTexts,
    /// Sentences for sentiment scoring, usually a list literal
    pub sentences: Option<String>,
    pub date: Option<String>,
}

impl Review {
    /// Raw text of a column, before tokenizing.
    ///
    /// For `Content` the pre-tokenized field wins when it is present, since
    /// the dataset's tokens were produced with morphological analysis that
    /// splits particles off the words.
    pub fn text(&self, column: TextColumn) -> Option<String> {
        match column {
            TextColumn::Content => fields::flatten_tokens_field(self.tokens.as_deref())
                .or_else(|| self.content.clone()),
            TextColumn::Keyword(k) => self.keywords.get(k).map(str::to_string),
        }
    }

    /// Sentences to score for overall sentiment.
    pub fn sentence_list(&self) -> Vec<String> {
        fields::parse_list_field(self.sentences.as_deref())
    }

    pub fn image_urls(&self) -> Vec<String> {
        fields::parse_image_links(self.image_links.as_deref())
    }

    /// Best-effort parse of the review date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_review_date(self.date.as_deref()?)
    }
}

/// Date formats seen in review exports ("2024-03-15", "2024.3.15.", "24.3.15.").
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches('.');
    // Datetime strings: keep only the date part
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);

    // chrono happily reads "24" as the year 0024 under %Y
    let short_year = date_part
        .split(['-', '.', '/'])
        .next()
        .is_some_and(|year| year.len() == 2);
    let formats: &[&str] = if short_year {
        &["%y.%m.%d", "%y-%m-%d", "%y/%m/%d"]
    } else {
        &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"]
    };

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parse_both_headers() {
        assert_eq!(KeywordColumn::parse("price"), Some(KeywordColumn::Price));
        assert_eq!(KeywordColumn::parse("위생"), Some(KeywordColumn::Hygiene));
        assert_eq!(KeywordColumn::parse("Parking"), None);
    }

    #[test]
    fn test_text_column_order() {
        let all = TextColumn::all();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0], TextColumn::Content);
        assert_eq!(all[1], TextColumn::Keyword(KeywordColumn::Taste));
    }

    #[test]
    fn test_content_prefers_tokens() {
        let review = Review {
            content: Some("국밥이 맛있어요".to_string()),
            tokens: Some("['국밥', '맛있']".to_string()),
            ..Default::default()
        };
        assert_eq!(review.text(TextColumn::Content).as_deref(), Some("국밥 맛있"));

        let without_tokens = Review {
            content: Some("국밥이 맛있어요".to_string()),
            ..Default::default()
        };
        assert_eq!(
            without_tokens.text(TextColumn::Content).as_deref(),
            Some("국밥이 맛있어요")
        );
    }

    #[test]
    fn test_parse_review_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_review_date("2024-03-15"), expected);
        assert_eq!(parse_review_date("2024.3.15."), expected);
        assert_eq!(parse_review_date("24.3.15."), expected);
        assert_eq!(parse_review_date("2024-03-15 12:30:00"), expected);
        assert_eq!(parse_review_date("last week"), None);
    }
}
