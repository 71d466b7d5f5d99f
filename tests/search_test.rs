//! Relevance search and lookups

mod common;

use chrono::Duration;
use common::{base_time, message, seed_conversation};
use ideas_miner::models::{DateRange, Source};
use ideas_miner::search::{extract_highlights, search_corpus, HighlightOptions};
use ideas_miner::text::TextProcessor;
use ideas_miner::{AnalysisService, InMemoryStore};

fn processor() -> TextProcessor {
    TextProcessor::new().expect("Failed to create text processor")
}

#[tokio::test]
async fn test_exact_phrase_single_hit() {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    seed_conversation(
        service.store(),
        "c1",
        Source::Chatgpt,
        &[
            "Let's talk about budget planning for next year",
            "The weather is nice today",
            "We walked the dog at dusk",
        ],
    )
    .await;

    let results = service
        .search_messages("budget planning", None)
        .await
        .expect("Search failed");
    assert_eq!(results.len(), 1);
    assert!((results[0].relevance_score - 1.0).abs() < f64::EPSILON);
    assert_eq!(
        results[0].highlights,
        vec!["Let's talk about budget planning for next year".to_string()]
    );
}

#[test]
fn test_exact_match_outranks_partial() {
    let corpus = vec![
        message(1, "Notes about garden soil"),
        message(2, "Garden soil preparation guide"),
        message(3, "Unrelated text"),
    ];
    let results = search_corpus(
        &processor(),
        "garden soil preparation",
        corpus,
        50,
        &HighlightOptions::default(),
    );

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].message.id, 2);
    assert!((results[0].relevance_score - 1.0).abs() < f64::EPSILON);
    assert_eq!(results[1].message.id, 1);
    assert!((results[1].relevance_score - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_ties_keep_corpus_order() {
    let corpus = vec![
        message(1, "python scripts"),
        message(2, "more python"),
        message(3, "python again"),
    ];
    let results = search_corpus(&processor(), "python", corpus, 50, &HighlightOptions::default());
    let ids: Vec<i64> = results.iter().map(|r| r.message.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_limit_truncates() {
    let corpus = (1..=10).map(|i| message(i, "rust everywhere")).collect();
    let results = search_corpus(&processor(), "rust", corpus, 4, &HighlightOptions::default());
    assert_eq!(results.len(), 4);
}

#[test]
fn test_keyword_path_highlights_use_matched_terms() {
    let corpus = vec![message(1, "Our garden is small but the tomatoes thrive")];
    let results = search_corpus(
        &processor(),
        "gardening tomatoes",
        corpus,
        50,
        &HighlightOptions::default(),
    );

    assert_eq!(results.len(), 1);
    // "garden" is contained in "gardening", "tomatoes" matches exactly
    assert!((results[0].relevance_score - 1.0).abs() < f64::EPSILON);
    // joined keywords never occur verbatim, so the fallback excerpt is used
    assert_eq!(
        results[0].highlights,
        vec!["Our garden is small but the tomatoes thrive...".to_string()]
    );
}

#[test]
fn test_zero_overlap_is_dropped() {
    let corpus = vec![message(1, "completely different words")];
    let results = search_corpus(&processor(), "astronomy", corpus, 50, &HighlightOptions::default());
    assert!(results.is_empty());
}

#[test]
fn test_highlight_windows() {
    let text = format!("{}needle{}", "a".repeat(150), "b".repeat(150));
    let highlights = extract_highlights(&text, "NEEDLE", 100);
    assert_eq!(highlights.len(), 1);
    let expected = format!("...{}needle{}...", "a".repeat(100), "b".repeat(100));
    assert_eq!(highlights[0], expected);
}

#[test]
fn test_highlights_capped_at_three() {
    let highlights = extract_highlights("x x x x x x", "x", 1);
    assert_eq!(highlights.len(), 3);
    assert_eq!(highlights[0], "x ...");
}

#[test]
fn test_fallback_always_appends_ellipsis() {
    assert_eq!(extract_highlights("short", "missing", 100), vec!["short...".to_string()]);

    let long = "z".repeat(250);
    let highlights = extract_highlights(&long, "missing", 100);
    assert_eq!(highlights[0].chars().count(), 203);
}

#[tokio::test]
async fn test_date_range_and_source_lookups() {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    seed_conversation(service.store(), "a", Source::Claude, &["one", "two", "three"]).await;
    seed_conversation(service.store(), "b", Source::Gemini, &["four"]).await;

    let claude = service
        .search_by_source(Source::Claude)
        .await
        .expect("Lookup failed");
    assert_eq!(claude.len(), 3);
    assert!(claude.iter().all(|m| m.source == Source::Claude));

    let range = DateRange {
        start: base_time() + Duration::minutes(1),
        end: base_time() + Duration::minutes(2),
    };
    let in_range = service
        .search_by_date_range(range)
        .await
        .expect("Lookup failed");
    let contents: Vec<&str> = in_range.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["two"]);
}

#[test]
fn test_huge_context_keeps_whole_text() {
    let text = "the budget review is on friday";
    let highlights = extract_highlights(text, "budget", usize::MAX);
    assert_eq!(highlights, vec![text.to_string()]);
}
