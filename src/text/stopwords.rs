// Stopword sets.
//
// The reviews are Korean, so the default set is a hand-curated list of
// particles, fillers and interjections that show up in nearly every review
// and carry nothing. ISO language lists from the `stop-words` crate can be
// swapped in for datasets in other languages.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Colloquial tokens that dominate Korean restaurant reviews.
const KOREAN_REVIEW_STOPWORDS: &[&str] = &[
    // particles and copulas that survive whitespace splitting on their own
    "이", "가", "은", "는", "을", "를", "에", "의", "도", "로", "으로", "와", "과", "에서", "하고",
    "이다", "입니다", "있어요", "있습니다", "있는", "있고", "했어요", "했는데", "합니다", "해요",
    "하는", "같아요", "같은", "거", "것", "게", "수", "좀", "더", "또", "다", "잘", "안", "못",
    // intensifiers and fillers
    "진짜", "정말", "너무", "완전", "엄청", "아주", "많이", "조금", "그냥", "그리고", "근데",
    "그래서", "하지만", "역시", "다시", "항상", "계속", "제일", "가장", "다음", "이번", "오늘",
    // pronouns and deictics
    "저", "제", "저희", "우리", "여기", "거기", "이거", "그거", "이런", "그런",
    // interjections and emoticon runs
    "ㅎㅎ", "ㅎㅎㅎ", "ㅋㅋ", "ㅋㅋㅋ", "ㅋㅋㅋㅋ", "ㅠㅠ", "ㅜㅜ", "ㅠ", "ㅜ", "ㅎ", "ㅋ", "굿",
    "요", "네", "음", "아",
];

/// A set of tokens excluded from every frequency-based analysis.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// No stopwords at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default set for Korean review text.
    pub fn korean_reviews() -> Self {
        Self::from_words(KOREAN_REVIEW_STOPWORDS.iter().copied())
    }

    /// An ISO stopword list for the given language.
    pub fn for_language(language: LANGUAGE) -> Self {
        Self::from_words(get(language))
    }

    /// Build a set from any list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Merge extra words into this set.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_set_removes_fillers_only() {
        let set = StopwordSet::korean_reviews();
        assert!(set.contains("진짜"));
        assert!(set.contains("ㅋㅋ"));
        assert!(!set.contains("맛있어요"));
        // English review words are untouched by the Korean set
        assert!(!set.contains("was"));
    }

    #[test]
    fn test_english_set_is_swappable() {
        let set = StopwordSet::for_language(LANGUAGE::English);
        assert!(set.contains("the"));
        assert!(!set.contains("진짜"));
    }

    #[test]
    fn test_with_extra_merges() {
        let set = StopwordSet::empty().with_extra(["사장님"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("사장님"));
    }
}
