// End-to-end: a regional CSV through loading, store selection, the analysis
// views, the session cache and JSON export.

use dcx::analysis::network::FrequencyBand;
use dcx::analysis::{AnalysisError, AnalysisSettings};
use dcx::dataset::browse::{store_images, store_reviews};
use dcx::dataset::loader::read_reviews;
use dcx::dataset::models::{KeywordColumn, TextColumn};
use dcx::dataset::ReviewTable;
use dcx::output::export::{words_export, write_json, NetworkExport};
use dcx::pipeline::store::{resolve_threshold, store_network, store_words};
use dcx::session::{AnalysisKind, CacheKey, CachedResult, Session};
use dcx::text::{StopwordSet, TokenFilter};

const HEADERS: [&str; 12] = [
    "Name",
    "Content",
    "Tokens",
    "Image_Links",
    "Taste",
    "Service",
    "Price",
    "Location",
    "Atmosphere",
    "Hygiene",
    "review_sentences",
    "Date",
];

fn region_csv() -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS).unwrap();

    for i in 0..25 {
        let content = if i % 2 == 0 {
            "흑돼지 고기 두툼하고 맛있어요"
        } else {
            "흑돼지 고기 친절하고 주차 편해요"
        };
        let images = if i < 3 {
            format!("['https://img.example.com/{i}.jpg', 'https://img.example.com/shared.jpg']")
        } else {
            String::new()
        };
        let date = format!("2024.3.{}.", i + 1);
        writer
            .write_record([
                "흑돼지",
                content,
                "",
                images.as_str(),
                "고기가 맛있어요",
                "친절해요",
                "",
                "",
                "",
                "",
                "['고기가 맛있어요', '친절해요']",
                date.as_str(),
            ])
            .unwrap();
    }

    for i in 0..3 {
        let date = format!("24-0{}-01", i + 1);
        writer
            .write_record([
                "카페", "커피 맛집", "", "", "", "", "가격 착해요", "", "", "", "", date.as_str(),
            ])
            .unwrap();
    }

    // no store name: unselectable, dropped at load
    writer
        .write_record(["", "이름 없는 리뷰", "", "", "", "", "", "", "", "", "", ""])
        .unwrap();

    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn load() -> ReviewTable {
    read_reviews(region_csv().as_bytes(), "Jeju Island").unwrap()
}

fn filter() -> TokenFilter {
    TokenFilter::new(StopwordSet::korean_reviews())
}

// ============================================================
// Loading and store selection
// ============================================================

#[test]
fn stores_ranked_by_review_count() {
    let table = load();
    assert_eq!(table.region(), "Jeju Island");
    assert_eq!(table.len(), 28);
    assert_eq!(
        table.stores_by_review_count(),
        vec![("흑돼지".to_string(), 25), ("카페".to_string(), 3)]
    );
}

#[test]
fn missing_column_rejected_at_load() {
    let csv = "Name,Content\n흑돼지,맛있어요\n";
    let err = read_reviews(csv.as_bytes(), "Jeju Island").unwrap_err();
    assert!(err.to_string().contains("Missing required column"));
}

#[test]
fn browse_is_newest_first_with_unique_images() {
    let table = load();

    let entries = store_reviews(&table, "흑돼지");
    assert_eq!(entries.len(), 25);
    assert_eq!(entries[0].date_text.as_deref(), Some("2024.3.25."));
    assert!(entries.windows(2).all(|w| w[0].date >= w[1].date));

    let images = store_images(&table, "흑돼지");
    assert_eq!(images.len(), 4);
    assert!(images.contains(&"https://img.example.com/shared.jpg".to_string()));

    let cafe = store_reviews(&table, "카페");
    assert_eq!(cafe[0].date_text.as_deref(), Some("24-03-01"));
}

// ============================================================
// Analyses fail independently
// ============================================================

#[test]
fn words_report_empty_columns_as_notices() {
    let table = load();
    let reviews = table.for_store("흑돼지");
    let columns = store_words(&reviews, &filter());

    let content = columns
        .iter()
        .find(|(c, _)| *c == TextColumn::Content)
        .map(|(_, t)| t.as_ref().unwrap())
        .unwrap();
    assert_eq!(content.count("흑돼지"), 25);

    let price = columns
        .iter()
        .find(|(c, _)| *c == TextColumn::Keyword(KeywordColumn::Price))
        .unwrap();
    assert!(matches!(price.1, Err(AnalysisError::EmptyResult { .. })));

    let export = words_export("흑돼지", &columns, &AnalysisSettings::default());
    let price_export = export.columns.iter().find(|c| c.column == "Price").unwrap();
    assert!(price_export.notice.is_some());
    assert!(price_export.word_cloud.is_empty());
}

#[test]
fn small_store_gets_words_but_no_network() {
    let table = load();
    let reviews = table.for_store("카페");

    let columns = store_words(&reviews, &filter());
    let price = columns
        .iter()
        .find(|(c, _)| *c == TextColumn::Keyword(KeywordColumn::Price))
        .unwrap();
    assert!(price.1.is_ok());

    let err = store_network(&reviews, None, &filter(), &AnalysisSettings::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { found: 3, .. }));
}

#[test]
fn network_for_the_large_store() {
    let table = load();
    let reviews = table.for_store("흑돼지");

    let view = store_network(&reviews, None, &filter(), &AnalysisSettings::default()).unwrap();
    assert_eq!(view.range.min, 1);
    assert_eq!(view.range.max, 2);
    assert_eq!(view.graph.edge_weight("흑돼지", "고기"), Some(25));
    // 25 against a field of 12s and 13s
    assert_eq!(view.graph.node("흑돼지").unwrap().band, FrequencyBand::High);
    assert_eq!(view.graph.node("주차").unwrap().band, FrequencyBand::Low);
    assert_eq!(view.positions.len(), view.graph.nodes.len());
}

// ============================================================
// Session and cache
// ============================================================

#[test]
fn session_caches_until_tab_or_store_changes() {
    let table = load();
    let mut session = Session::new();

    assert!(session.lock().is_err());
    session.select_region(table.region()).unwrap();
    session.select_store("흑돼지").unwrap();
    assert!(session.select_tab(AnalysisKind::Words).is_err());
    session.lock().unwrap();
    assert!(session.select_store("카페").is_err());

    session.select_tab(AnalysisKind::Words).unwrap();
    let key = session.current_key().unwrap();
    assert_eq!(key, CacheKey::new("흑돼지", AnalysisKind::Words));

    let reviews = table.for_store("흑돼지");
    let columns = store_words(&reviews, &filter());
    session.cache_mut().insert(key.clone(), CachedResult::Words(columns));
    assert!(matches!(session.cache().get(&key), Some(CachedResult::Words(_))));

    // re-selecting the same tab keeps the result
    session.select_tab(AnalysisKind::Words).unwrap();
    assert_eq!(session.cache().len(), 1);

    session.select_tab(AnalysisKind::Network).unwrap();
    assert!(session.cache().is_empty());

    session.reset();
    assert!(!session.is_locked());
    assert!(session.store().is_none());
    session.select_region(table.region()).unwrap();
    session.select_store("카페").unwrap();
}

#[test]
fn cached_network_is_reused_only_at_its_threshold() {
    let table = load();
    let reviews = table.for_store("흑돼지");
    let mut session = Session::new();
    session.select_region(table.region()).unwrap();
    session.select_store("흑돼지").unwrap();
    session.lock().unwrap();
    session.select_tab(AnalysisKind::Network).unwrap();
    let key = session.current_key().unwrap();

    // an explicit run at the top of the range
    let range = dcx::analysis::network::ThresholdRange::for_reviews(reviews.len());
    let explicit = resolve_threshold(&range, Some(2));
    let view = store_network(&reviews, Some(explicit), &filter(), &AnalysisSettings::default())
        .unwrap();
    session
        .cache_mut()
        .insert(key.clone(), CachedResult::Network(Box::new(view.graph)));

    let cached = session.cache().get(&key).unwrap();
    assert!(cached.matches_threshold(resolve_threshold(&range, Some(2))));
    assert!(cached.matches_threshold(resolve_threshold(&range, Some(50))));
    // a bare run wants the default, so the explicit graph is stale
    assert!(!cached.matches_threshold(resolve_threshold(&range, None)));
}

// ============================================================
// Export
// ============================================================

#[test]
fn network_export_writes_json() {
    let table = load();
    let reviews = table.for_store("흑돼지");
    let view = store_network(&reviews, None, &filter(), &AnalysisSettings::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("network.json");
    write_json(
        &path,
        &NetworkExport {
            store: "흑돼지",
            threshold_range: view.range,
            graph: &view.graph,
            positions: &view.positions,
        },
    )
    .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["store"], "흑돼지");
    assert_eq!(value["threshold_range"]["default"], 1);
    assert_eq!(
        value["graph"]["nodes"].as_array().unwrap().len(),
        view.graph.nodes.len()
    );
}
