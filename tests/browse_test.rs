//! Listing and filtering conversations and ideas

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{base_time, seed_conversation};
use ideas_miner::models::{ConversationUpdate, NewIdea, NewMessage, Role, Source};
use ideas_miner::{AnalysisService, ConversationStore, InMemoryStore, MinerError};

async fn browsing_service() -> AnalysisService<InMemoryStore> {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    seed_conversation(service.store(), "garden", Source::Chatgpt, &["roses"]).await;
    seed_conversation(service.store(), "budget", Source::Claude, &["rent", "food", "travel"]).await;
    seed_conversation(service.store(), "trip", Source::Gemini, &["flights", "hotel"]).await;
    service
        .store()
        .update_conversation(
            "garden",
            ConversationUpdate {
                topics: Some(vec!["Compost".to_string(), "roses".to_string()]),
                ..ConversationUpdate::default()
            },
        )
        .await
        .expect("Update failed");
    service
}

fn idea(conversation_id: &str, content: &str, minutes: i64, category: Option<&str>, tags: &[&str]) -> NewIdea {
    NewIdea {
        conversation_id: conversation_id.to_string(),
        message_id: 1,
        content: content.to_string(),
        extracted_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes),
        category: category.map(str::to_string),
        tags: if tags.is_empty() {
            None
        } else {
            Some(tags.iter().map(|t| (*t).to_string()).collect())
        },
    }
}

#[tokio::test]
async fn test_conversations_most_recent_first() {
    let service = browsing_service().await;
    let ids: Vec<String> = service
        .list_conversations(None)
        .await
        .expect("Listing failed")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["budget", "trip", "garden"]);
}

#[tokio::test]
async fn test_conversation_filter_matches_title_ignoring_case() {
    let service = browsing_service().await;
    let matches = service
        .list_conversations(Some("BUDGET"))
        .await
        .expect("Listing failed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "budget");
}

#[tokio::test]
async fn test_conversation_filter_matches_topic() {
    let service = browsing_service().await;
    let matches = service
        .list_conversations(Some("compost"))
        .await
        .expect("Listing failed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "garden");

    assert!(service
        .list_conversations(Some("nothing like this"))
        .await
        .expect("Listing failed")
        .is_empty());
}

#[tokio::test]
async fn test_conversation_messages_sorted_by_timestamp() {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    seed_conversation(service.store(), "c1", Source::Other, &[]).await;
    service
        .store()
        .insert_messages(
            [("later", 5), ("earlier", 1)]
                .into_iter()
                .map(|(content, minutes)| NewMessage {
                    conversation_id: "c1".to_string(),
                    source: Source::Other,
                    timestamp: base_time() + Duration::minutes(minutes),
                    role: Role::User,
                    content: content.to_string(),
                })
                .collect(),
        )
        .await
        .expect("Insert failed");

    let contents: Vec<String> = service
        .conversation_messages("c1")
        .await
        .expect("Lookup failed")
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["earlier", "later"]);

    let err = service.conversation_messages("missing").await.unwrap_err();
    assert!(matches!(err, MinerError::ConversationNotFound(_)));
}

#[tokio::test]
async fn test_ideas_newest_first() {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    service
        .store()
        .append_ideas(vec![
            idea("c1", "older idea", 0, None, &[]),
            idea("c2", "newest idea", 30, None, &[]),
            idea("c1", "middle idea", 10, None, &[]),
        ])
        .await
        .expect("Append failed");

    let contents: Vec<String> = service
        .list_ideas(None, None)
        .await
        .expect("Listing failed")
        .into_iter()
        .map(|i| i.content)
        .collect();
    assert_eq!(contents, vec!["newest idea", "middle idea", "older idea"]);

    let c1: Vec<String> = service
        .list_ideas(Some("c1"), None)
        .await
        .expect("Listing failed")
        .into_iter()
        .map(|i| i.content)
        .collect();
    assert_eq!(c1, vec!["middle idea", "older idea"]);
}

#[tokio::test]
async fn test_idea_filter_matches_tag_only() {
    let service = AnalysisService::with_defaults(InMemoryStore::new()).expect("service");
    service
        .store()
        .append_ideas(vec![
            idea("c1", "build a standing desk", 0, Some("diy"), &["Woodwork", "office"]),
            idea("c1", "learn the cello", 5, Some("music"), &[]),
        ])
        .await
        .expect("Append failed");

    let matches = service
        .list_ideas(None, Some("woodwork"))
        .await
        .expect("Listing failed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].content, "build a standing desk");

    let by_category = service
        .list_ideas(None, Some("MUSIC"))
        .await
        .expect("Listing failed");
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].content, "learn the cello");
}
