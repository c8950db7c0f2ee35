// Parsing for list-valued dataset fields.
//
// Several CSV columns (Tokens, review_sentences, Image_Links) were written
// by a dataframe as Python-style list literals: ['a', "b's", 'c']. Some rows
// hold plain text instead. Both shapes are accepted here and nothing fails:
// a field that can't be read as a list is treated as a single item.

use std::sync::OnceLock;

use regex_lite::Regex;

fn quoted_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("valid list item regex")
    })
}

/// Whether a raw field looks like a bracketed list literal.
pub fn is_list_literal(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Parse a list-valued field into its items.
///
/// List literals yield their quoted items (empty items dropped). Any other
/// non-blank text yields exactly one item. Missing or blank fields yield none.
pub fn parse_list_field(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if !is_list_literal(trimmed) {
        return vec![trimmed.to_string()];
    }

    quoted_item_regex()
        .captures_iter(trimmed)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| unescape(m.as_str()))
        .filter(|item| !item.trim().is_empty())
        .collect()
}

/// Parse the pre-tokenized `Tokens` field into one whitespace-joined string.
///
/// The result is meant to be passed through `tokenize`, so tokens that still
/// carry punctuation get cleaned the same way free text does. An empty list
/// yields `None`, letting callers fall back to the raw content.
pub fn flatten_tokens_field(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if !is_list_literal(raw) {
        return Some(raw.to_string());
    }

    let items = parse_list_field(Some(raw));
    if items.is_empty() {
        None
    } else {
        Some(items.join(" "))
    }
}

/// Parse the `Image_Links` field into http(s) URLs.
pub fn parse_image_links(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let items = if is_list_literal(raw) {
        parse_list_field(Some(raw))
    } else {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect()
    };

    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .collect()
}

fn unescape(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    let mut chars = item.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_literal() {
        let items = parse_list_field(Some(r#"['맛있어요', "사장님's 추천", '']"#));
        assert_eq!(items, vec!["맛있어요", "사장님's 추천"]);
    }

    #[test]
    fn test_parse_escaped_quote() {
        let items = parse_list_field(Some(r"['it\'s good', 'fine']"));
        assert_eq!(items, vec!["it's good", "fine"]);
    }

    #[test]
    fn test_plain_text_is_one_item() {
        assert_eq!(parse_list_field(Some("  just text ")), vec!["just text"]);
        assert!(parse_list_field(Some("   ")).is_empty());
        assert!(parse_list_field(None).is_empty());
        assert!(parse_list_field(Some("[]")).is_empty());
    }

    #[test]
    fn test_flatten_tokens() {
        assert_eq!(
            flatten_tokens_field(Some("['국밥', '맛집', '친절']")).as_deref(),
            Some("국밥 맛집 친절")
        );
        assert_eq!(flatten_tokens_field(Some("국밥 맛집")).as_deref(), Some("국밥 맛집"));
        assert_eq!(flatten_tokens_field(None), None);
        assert_eq!(flatten_tokens_field(Some("[]")), None);
        assert_eq!(flatten_tokens_field(Some("['', ' ']")), None);
    }

    #[test]
    fn test_image_links_both_shapes() {
        let listed = parse_image_links(Some("['https://a.example/1.jpg', 'not-a-url']"));
        assert_eq!(listed, vec!["https://a.example/1.jpg"]);

        let plain = parse_image_links(Some("https://a.example/1.jpg, http://b.example/2.png"));
        assert_eq!(plain.len(), 2);
    }
}
