// Tokenizer and token filter.
//
// Tokenizing is deliberately crude: drop everything that isn't a word
// character or whitespace, then split on whitespace. Word characters follow
// Unicode `\w`: letters, combining marks, decimal digits and connector
// punctuation, so Hangul, Thai tone marks and decomposed accents all
// survive. There is no case folding and no stemming; reviews are mostly
// Korean, where neither applies, and the frequency views show tokens
// exactly as written.

use std::sync::OnceLock;

use regex::Regex;

use super::stopwords::StopwordSet;

// regex-lite has no Unicode classes, so this one pattern uses `regex`
fn non_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]+").expect("valid punctuation regex"))
}

/// Split raw text into tokens.
///
/// Missing text is treated as empty and yields no tokens. Never fails.
pub fn tokenize(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    let cleaned = strip_punctuation(text);
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Remove every character that is neither a word character nor whitespace.
pub fn strip_punctuation(text: &str) -> String {
    non_word_regex().replace_all(text, "").into_owned()
}

/// Second filtering stage: removes stopwords and, optionally, short tokens.
#[derive(Debug, Clone)]
pub struct TokenFilter {
    stopwords: StopwordSet,
    /// Tokens with fewer characters than this are dropped (0 or 1 keeps all)
    min_chars: usize,
}

impl TokenFilter {
    /// A filter that only removes stopwords.
    pub fn new(stopwords: StopwordSet) -> Self {
        Self {
            stopwords,
            min_chars: 0,
        }
    }

    /// Drop tokens shorter than `min_chars` characters as well.
    ///
    /// The network view uses `2` so single-character tokens never become nodes.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// The same stopwords, but also dropping tokens of one character or less.
    pub fn salient(&self) -> Self {
        self.clone().with_min_chars(2)
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Whether a single token survives this filter.
    pub fn keeps(&self, token: &str) -> bool {
        !token.is_empty()
            && token.chars().count() >= self.min_chars
            && !self.stopwords.contains(token)
    }

    /// Filter a token sequence, preserving order.
    pub fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().filter(|t| self.keeps(t)).collect()
    }

    /// Tokenize and filter in one step.
    pub fn tokens(&self, text: Option<&str>) -> Vec<String> {
        self.apply(tokenize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = tokenize(Some("Great taste!! Service was okay."));
        assert_eq!(tokens, vec!["Great", "taste", "Service", "was", "okay"]);
    }

    #[test]
    fn test_tokenize_keeps_hangul() {
        let tokens = tokenize(Some("맛있어요! 분위기도 좋고, 직원분들이 친절해요~"));
        assert_eq!(tokens, vec!["맛있어요", "분위기도", "좋고", "직원분들이", "친절해요"]);
    }

    #[test]
    fn test_strip_punctuation_keeps_marks_and_connectors() {
        assert_eq!(strip_punctuation("cafe\u{301}!"), "cafe\u{301}");
        assert_eq!(strip_punctuation("a\u{203F}b, c_d."), "a\u{203F}b c_d");
    }

    #[test]
    fn test_tokenize_missing_is_empty() {
        assert!(tokenize(None).is_empty());
        assert!(tokenize(Some("")).is_empty());
        assert!(tokenize(Some("?!... ,,, ~~")).is_empty());
    }

    #[test]
    fn test_filter_drops_stopwords_and_short_tokens() {
        let filter = TokenFilter::new(StopwordSet::from_words(["was"])).with_min_chars(2);
        let tokens = filter.tokens(Some("a Service was okay"));
        assert_eq!(tokens, vec!["Service", "okay"]);
    }

    #[test]
    fn test_min_chars_counts_characters_not_bytes() {
        // "맛" is one character but three bytes
        let filter = TokenFilter::new(StopwordSet::empty()).salient();
        assert!(!filter.keeps("맛"));
        assert!(filter.keeps("맛집"));
    }
}
