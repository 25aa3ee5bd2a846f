use std::sync::Arc;
use std::time::Duration;

use engram_domain::entities::{ContextMessage, MessageRole};
use engram_domain::ports::{HistoryStore, MessageFilter};
use engram_providers::cache::MokaCacheProvider;
use engram_providers::history::{InMemoryHistoryStore, KvHistoryStore};

fn message(role: MessageRole, content: &str) -> ContextMessage {
    ContextMessage::new(role, content)
}

async fn seed(store: &dyn HistoryStore) {
    store
        .append("s1", message(MessageRole::User, "這個料號庫存多少"))
        .await
        .expect("append");
    store
        .append("s1", message(MessageRole::Assistant, "庫存 5,000 KG"))
        .await
        .expect("append");
    store
        .append("s1", message(MessageRole::User, "那上月賣出多少"))
        .await
        .expect("append");
}

#[tokio::test]
async fn test_append_preserves_order() {
    let store = InMemoryHistoryStore::new(100);
    seed(&store).await;
    let messages = store
        .messages("s1", &MessageFilter::default(), None, 0)
        .await
        .expect("messages");
    assert_eq!(messages.len(), 3);
    assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(messages[0].content, "這個料號庫存多少");
}

#[tokio::test]
async fn test_role_filter_and_limit() {
    let store = InMemoryHistoryStore::new(100);
    seed(&store).await;

    let users = store
        .messages(
            "s1",
            &MessageFilter {
                role: Some(MessageRole::User),
                ..MessageFilter::default()
            },
            None,
            0,
        )
        .await
        .expect("messages");
    assert_eq!(users.len(), 2);

    // Limit keeps the newest messages.
    let last = store
        .messages("s1", &MessageFilter::default(), Some(1), 0)
        .await
        .expect("messages");
    assert_eq!(last[0].content, "那上月賣出多少");
}

#[tokio::test]
async fn test_delete_messages_returns_count() {
    let store = InMemoryHistoryStore::new(100);
    seed(&store).await;
    let deleted = store
        .delete_messages(
            "s1",
            &MessageFilter {
                role: Some(MessageRole::Assistant),
                ..MessageFilter::default()
            },
        )
        .await
        .expect("delete");
    assert_eq!(deleted, 1);
    assert_eq!(
        store
            .message_count("s1", &MessageFilter::default())
            .await
            .expect("count"),
        2
    );
}

#[tokio::test]
async fn test_window_cap_drops_oldest() {
    let store = InMemoryHistoryStore::new(2);
    seed(&store).await;
    let messages = store
        .messages("s1", &MessageFilter::default(), None, 0)
        .await
        .expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "庫存 5,000 KG");
}

#[tokio::test]
async fn test_archive_moves_log_out_of_live_key() {
    let store = InMemoryHistoryStore::new(100);
    seed(&store).await;
    assert!(
        store
            .archive("s1", Some("arch-1".to_owned()))
            .await
            .expect("archive")
    );
    assert_eq!(
        store
            .message_count("s1", &MessageFilter::default())
            .await
            .expect("count"),
        0
    );
    assert_eq!(store.archived("arch-1").await.len(), 3);
    // Archiving a missing session reports false.
    assert!(!store.archive("s1", None).await.expect("archive"));
}

#[tokio::test]
async fn test_kv_backend_round_trip_and_session_listing() {
    let store = KvHistoryStore::with_config(
        Arc::new(MokaCacheProvider::new(100)),
        "hist",
        Duration::from_secs(3600),
    );
    seed(&store).await;

    let messages = store
        .messages("s1", &MessageFilter::default(), None, 0)
        .await
        .expect("messages");
    assert_eq!(messages.len(), 3);

    let sessions = store.session_ids().await.expect("sessions");
    assert_eq!(sessions, vec!["s1"]);
    assert!(store.last_touched("s1").await.expect("touched").is_some());

    assert!(store.archive("s1", None).await.expect("archive"));
    assert!(store.session_ids().await.expect("sessions").is_empty());
}
