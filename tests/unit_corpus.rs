// Topic corpus sampling and LDA training.

use dcx::analysis::corpus::{build_corpus, sample_indices, CorpusOptions, MAX_DOCUMENTS};
use dcx::analysis::{AnalysisError, AnalysisSettings};
use dcx::dataset::models::Review;
use dcx::pipeline::store::store_topics;
use dcx::text::{StopwordSet, TokenFilter};
use dcx::topics::lda::GibbsLdaTrainer;
use dcx::topics::traits::TopicTrainer;

fn documents(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| vec![format!("단어{}", i % 13), format!("리뷰{i}"), "국밥".to_string()])
        .collect()
}

fn themed_reviews(n: usize) -> Vec<Review> {
    (0..n)
        .map(|i| Review {
            store: "고기국수".into(),
            content: Some(if i % 2 == 0 {
                "고기국수 국물 진하고 고기 두툼".into()
            } else {
                "주차장 넓고 주차 편해요 대기".into()
            }),
            ..Default::default()
        })
        .collect()
}

// ============================================================
// Sampling
// ============================================================

#[test]
fn large_store_is_sampled_to_exactly_the_cap() {
    let corpus = build_corpus(&documents(450), &CorpusOptions::default()).unwrap();
    assert_eq!(corpus.documents.len(), MAX_DOCUMENTS);
    assert_eq!(corpus.review_indices.len(), 300);

    let mut unique = corpus.review_indices.clone();
    unique.dedup();
    assert_eq!(unique.len(), 300);
    assert!(corpus.review_indices.iter().all(|&i| i < 450));
}

#[test]
fn same_seed_same_sample() {
    let options = CorpusOptions { seed: 7, ..Default::default() };
    let a = build_corpus(&documents(450), &options).unwrap();
    let b = build_corpus(&documents(450), &options).unwrap();
    assert_eq!(a.review_indices, b.review_indices);
    assert_eq!(a.documents, b.documents);
    assert_eq!(a.vocabulary.tokens(), b.vocabulary.tokens());
}

#[test]
fn different_seed_different_sample() {
    let a = sample_indices(1000, &CorpusOptions { seed: 1, ..Default::default() });
    let b = sample_indices(1000, &CorpusOptions { seed: 2, ..Default::default() });
    assert_ne!(a, b);
}

#[test]
fn exactly_three_hundred_is_not_sampled() {
    let indices = sample_indices(300, &CorpusOptions::default());
    assert_eq!(indices, (0..300).collect::<Vec<_>>());
}

#[test]
fn forty_nine_reviews_is_insufficient() {
    let err = build_corpus(&documents(49), &CorpusOptions::default()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InsufficientData {
            analysis: "Topic modeling",
            required: 50,
            found: 49,
        }
    );
    assert!(build_corpus(&documents(50), &CorpusOptions::default()).is_ok());
}

// ============================================================
// Training
// ============================================================

#[test]
fn lda_is_reproducible() {
    let corpus = build_corpus(&documents(80), &CorpusOptions::default()).unwrap();
    let trainer = GibbsLdaTrainer::new(3, 11);

    let a = trainer.train(&corpus, 4).unwrap();
    let b = trainer.train(&corpus, 4).unwrap();
    assert_eq!(a.topic_word, b.topic_word);
    assert_eq!(a.document_topics, b.document_topics);
    assert_eq!(a.num_topics(), 4);
    assert_eq!(a.document_topics.len(), corpus.documents.len());
}

#[test]
fn store_topics_trains_on_salient_content() {
    let reviews = themed_reviews(60);
    let refs: Vec<&Review> = reviews.iter().collect();
    let filter = TokenFilter::new(StopwordSet::korean_reviews());
    let settings = AnalysisSettings {
        topic_count: 2,
        ..Default::default()
    };
    let trainer = GibbsLdaTrainer::new(settings.topic_passes, settings.seed);

    let view = store_topics(&refs, &filter, &settings, &trainer).unwrap();
    assert_eq!(view.corpus.documents.len(), 60);
    assert_eq!(view.model.num_topics(), 2);
    assert!(view.model.vocabulary.iter().all(|t| t.chars().count() >= 2));

    let prevalence: f64 = view.model.topic_prevalence().iter().sum();
    assert!((prevalence - 1.0).abs() < 1e-6);

    let summaries = view.model.summaries(0.6, 5);
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.terms.len() == 5));
}

#[test]
fn store_topics_small_store_is_a_notice() {
    let reviews = themed_reviews(30);
    let refs: Vec<&Review> = reviews.iter().collect();
    let filter = TokenFilter::new(StopwordSet::korean_reviews());
    let settings = AnalysisSettings::default();
    let trainer = GibbsLdaTrainer::default();

    let err = store_topics(&refs, &filter, &settings, &trainer).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InsufficientData { found: 30, .. })
    ));
}
