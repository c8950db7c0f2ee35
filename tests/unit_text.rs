// Tokenizing, stopword filtering and word counting.

use dcx::analysis::frequency::{column_frequencies, FrequencyTable};
use dcx::analysis::AnalysisError;
use dcx::dataset::models::{KeywordColumn, KeywordTexts, Review, TextColumn};
use dcx::text::fields::{parse_image_links, parse_list_field};
use dcx::text::{tokenize, StopwordSet, TokenFilter};
use stop_words::LANGUAGE;

// ============================================================
// Tokenizer
// ============================================================

#[test]
fn punctuation_is_stripped_and_case_kept() {
    assert_eq!(
        tokenize(Some("Great taste!! Service was okay.")),
        vec!["Great", "taste", "Service", "was", "okay"]
    );
}

#[test]
fn missing_text_is_empty_not_an_error() {
    assert!(tokenize(None).is_empty());
    assert!(tokenize(Some("")).is_empty());
    assert!(tokenize(Some("!!! ... ???")).is_empty());
}

#[test]
fn hangul_survives_tokenizing() {
    assert_eq!(
        tokenize(Some("국밥이 정말 맛있어요!! 또 올게요~")),
        vec!["국밥이", "정말", "맛있어요", "또", "올게요"]
    );
}

#[test]
fn thai_tone_marks_survive() {
    // ่ (U+0E48) is a non-spacing mark, not a letter
    assert_eq!(tokenize(Some("ที่นี่ อร่อย!")), vec!["ที่นี่", "อร่อย"]);
}

#[test]
fn decomposed_accents_survive() {
    let decomposed = "cafe\u{301}";
    assert_eq!(tokenize(Some("Le cafe\u{301}, super.")), vec!["Le", decomposed, "super"]);
}

#[test]
fn connector_punctuation_joins_words() {
    assert_eq!(tokenize(Some("a\u{203F}b snake_case!")), vec!["a\u{203F}b", "snake_case"]);
}

#[test]
fn no_token_is_punctuation_only() {
    let tokens = tokenize(Some("- ... (웃음) ^^ 좋아요 :) 10/10"));
    assert!(tokens
        .iter()
        .all(|t| t.chars().any(|c| c.is_alphanumeric())));
}

// ============================================================
// Stopword sets are swappable
// ============================================================

#[test]
fn korean_set_leaves_english_words_alone() {
    let filter = TokenFilter::new(StopwordSet::korean_reviews());
    assert_eq!(
        filter.tokens(Some("Great taste!! Service was okay.")),
        vec!["Great", "taste", "Service", "was", "okay"]
    );
}

#[test]
fn english_set_removes_function_words() {
    let filter = TokenFilter::new(StopwordSet::for_language(LANGUAGE::English));
    let tokens = filter.tokens(Some("the taste was great and the service was okay"));
    assert!(!tokens.contains(&"the".to_string()));
    assert!(!tokens.contains(&"was".to_string()));
    assert!(tokens.contains(&"taste".to_string()));
}

#[test]
fn custom_set_with_extras() {
    let filter = TokenFilter::new(StopwordSet::empty().with_extra(["국밥"]));
    assert_eq!(filter.tokens(Some("국밥 국물 국밥")), vec!["국물"]);
}

#[test]
fn salient_filter_drops_single_characters() {
    let filter = TokenFilter::new(StopwordSet::empty()).salient();
    assert_eq!(filter.tokens(Some("맛 국밥 a ok")), vec!["국밥", "ok"]);
}

// ============================================================
// Dataset fields
// ============================================================

#[test]
fn sentence_list_literal_and_plain_text() {
    assert_eq!(
        parse_list_field(Some("['맛있어요', \"친절해요\"]")),
        vec!["맛있어요", "친절해요"]
    );
    assert_eq!(parse_list_field(Some("그냥 한 문장")), vec!["그냥 한 문장"]);
    assert!(parse_list_field(None).is_empty());
}

#[test]
fn image_links_keep_only_urls() {
    let links = parse_image_links(Some(
        "['https://img.example.com/a.jpg', 'not a url', 'http://img.example.com/b.png']",
    ));
    assert_eq!(
        links,
        vec!["https://img.example.com/a.jpg", "http://img.example.com/b.png"]
    );
}

#[test]
fn empty_token_list_falls_back_to_content() {
    let review = Review {
        store: "국밥집".into(),
        content: Some("국물이 진해요".into()),
        tokens: Some("[]".into()),
        ..Default::default()
    };
    assert_eq!(review.text(TextColumn::Content).as_deref(), Some("국물이 진해요"));

    let tokenized = Review {
        tokens: Some("['국물', '진해요']".into()),
        ..review
    };
    assert_eq!(tokenized.text(TextColumn::Content).as_deref(), Some("국물 진해요"));
}

// ============================================================
// Frequency tables
// ============================================================

#[test]
fn counts_sum_to_filtered_token_count() {
    let filter = TokenFilter::new(StopwordSet::korean_reviews());
    let texts = ["국밥 정말 맛있어요", "국밥 국물이 진해요", "정말 정말 최고"];

    let tokens: Vec<String> = texts.iter().flat_map(|t| filter.tokens(Some(t))).collect();
    let table = FrequencyTable::from_tokens(&tokens);

    assert_eq!(table.total(), tokens.len());
    assert_eq!(table.iter().map(|(_, c)| c).sum::<usize>(), tokens.len());
}

#[test]
fn ranking_ties_follow_first_appearance() {
    let table = FrequencyTable::from_tokens(["주차", "국밥", "국밥", "주차", "친절"]);
    let ranked: Vec<String> = table.ranked().into_iter().map(|w| w.word).collect();
    assert_eq!(ranked, vec!["주차", "국밥", "친절"]);
}

#[test]
fn empty_column_is_a_notice() {
    let reviews = vec![Review {
        store: "국밥집".into(),
        keywords: KeywordTexts {
            taste: Some("국물이 진해요".into()),
            ..Default::default()
        },
        ..Default::default()
    }];
    let refs: Vec<&Review> = reviews.iter().collect();
    let filter = TokenFilter::new(StopwordSet::korean_reviews());

    let taste = column_frequencies(&refs, TextColumn::Keyword(KeywordColumn::Taste), &filter);
    assert!(taste.is_ok());

    let price = column_frequencies(&refs, TextColumn::Keyword(KeywordColumn::Price), &filter);
    assert!(matches!(price, Err(AnalysisError::EmptyResult { .. })));
}
