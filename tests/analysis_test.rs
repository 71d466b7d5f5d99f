//! End-to-end analysis behavior through the service

mod common;

use common::seed_conversation;
use ideas_miner::ideas::IdeaExtractor;
use ideas_miner::models::{SentimentLabel, Source};
use ideas_miner::sentiment::SentimentScorer;
use ideas_miner::summary::EMPTY_SUMMARY;
use ideas_miner::{AnalysisService, ConversationStore, InMemoryStore};

fn service() -> AnalysisService<InMemoryStore> {
    AnalysisService::with_defaults(InMemoryStore::new()).expect("Failed to build service")
}

#[test]
fn test_suggestion_is_extracted() {
    let extractor = IdeaExtractor::new().expect("Failed to compile patterns");
    let ideas = extractor.extract("I think you could try meditating daily.");
    assert_eq!(ideas, vec!["meditating daily.".to_string()]);
}

#[test]
fn test_positive_sentence() {
    let score = SentimentScorer::default().analyze("This is great and wonderful, truly the best.");
    assert_eq!(score.label, SentimentLabel::Positive);
    assert!(score.score > 0.1);
}

#[tokio::test]
async fn test_empty_conversation_summary() {
    let service = service();
    seed_conversation(service.store(), "empty", Source::Claude, &[]).await;

    let summary = service
        .generate_conversation_summary("empty")
        .await
        .expect("Summary failed");
    assert_eq!(summary, EMPTY_SUMMARY);
    assert_eq!(summary, "No messages found.");

    let topics = service
        .analyze_conversation_topics("empty")
        .await
        .expect("Topics failed");
    assert!(topics.is_empty());
}

#[tokio::test]
async fn test_topic_counts_messages_containing_keyword() {
    let service = service();
    seed_conversation(
        service.store(),
        "pets",
        Source::Chatgpt,
        &["cats are great", "cats are wonderful", "dogs are fine"],
    )
    .await;

    let topics = service
        .analyze_conversation_topics("pets")
        .await
        .expect("Topics failed");

    let cats = topics
        .iter()
        .find(|t| t.topic == "cats")
        .expect("cats should be a topic");
    assert_eq!(cats.count, 2);
    assert!((cats.percentage - 66.67).abs() < 0.01);
    assert_eq!(topics[0].topic, "cats");
}

#[tokio::test]
async fn test_summary_format() {
    let service = service();
    seed_conversation(
        service.store(),
        "trip",
        Source::Gemini,
        &[
            "Planning a trip to Lisbon with the family",
            "Lisbon has excellent food and amazing views",
        ],
    )
    .await;

    let summary = service
        .generate_conversation_summary("trip")
        .await
        .expect("Summary failed");
    assert!(summary.starts_with("This conversation contains 2 messages discussing "));
    assert!(summary.ends_with("Overall sentiment: positive."));
    assert!(summary.contains("Lisbon"));
}

#[tokio::test]
async fn test_idea_extraction_is_not_idempotent() {
    let service = service();
    seed_conversation(
        service.store(),
        "ideas",
        Source::Chatgpt,
        &[
            "What if we built a small greenhouse in the yard?",
            "You could try composting the kitchen scraps.",
            "Nothing to see here",
        ],
    )
    .await;

    let first = service
        .extract_conversation_ideas("ideas")
        .await
        .expect("Extraction failed");
    assert_eq!(first.len(), 2);

    let second = service
        .extract_conversation_ideas("ideas")
        .await
        .expect("Extraction failed");
    assert_eq!(second.len(), first.len());

    let stored = service
        .store()
        .get_ideas_by_conversation("ideas")
        .await
        .expect("Query failed");
    assert_eq!(stored.len(), first.len() * 2);
}

#[tokio::test]
async fn test_ideas_reference_their_message() {
    let service = service();
    let messages = seed_conversation(
        service.store(),
        "refs",
        Source::Claude,
        &["Hello there", "My plan is to repaint the fence next weekend."],
    )
    .await;

    let ideas = service
        .extract_conversation_ideas("refs")
        .await
        .expect("Extraction failed");
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].message_id, messages[1].id);
    assert_eq!(ideas[0].conversation_id, "refs");
    assert_eq!(ideas[0].content, "to repaint the fence next weekend.");
}

#[tokio::test]
async fn test_reanalysis_overwrites_fields() {
    let service = service();
    seed_conversation(
        service.store(),
        "mood",
        Source::Chatgpt,
        &["This was a terrible and frustrating day"],
    )
    .await;

    let first = service
        .analyze_conversation("mood")
        .await
        .expect("Analysis failed");
    assert_eq!(first.sentiment.label, SentimentLabel::Negative);

    service
        .store()
        .insert_messages(vec![ideas_miner::models::NewMessage {
            conversation_id: "mood".to_string(),
            source: Source::Chatgpt,
            timestamp: common::base_time(),
            role: ideas_miner::models::Role::Assistant,
            content: "Great news, the best outcome, I love it, amazing and wonderful".to_string(),
        }])
        .await
        .expect("Insert failed");

    let second = service
        .analyze_conversation("mood")
        .await
        .expect("Analysis failed");
    let stored = service
        .store()
        .get_conversation("mood")
        .await
        .expect("Query failed")
        .expect("Conversation missing");

    assert_eq!(stored.sentiment, Some(second.sentiment.score));
    assert_eq!(stored.summary.as_deref(), Some(second.summary.as_str()));
    assert_ne!(first.sentiment.score, second.sentiment.score);
}

#[tokio::test]
async fn test_stored_topics_are_capped() {
    let service = service();
    seed_conversation(
        service.store(),
        "many",
        Source::Other,
        &[
            "apples bananas cherries dates",
            "figs grapes kiwis lemons",
            "mangoes oranges papayas quinces",
        ],
    )
    .await;

    let analysis = service
        .analyze_conversation("many")
        .await
        .expect("Analysis failed");
    let stored = service
        .store()
        .get_conversation("many")
        .await
        .expect("Query failed")
        .expect("Conversation missing");

    assert!(analysis.topics.len() > 5);
    assert!(analysis.topics.len() <= 10);
    let names: Vec<String> = analysis.topics.iter().take(5).map(|t| t.topic.clone()).collect();
    assert_eq!(stored.topics, Some(names));
}
