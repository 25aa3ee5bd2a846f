use std::sync::Arc;
use std::time::Duration;

use engram_application::ContextRecorder;
use engram_domain::entities::MessageRole;
use engram_domain::ports::{HistoryStore, MessageFilter};
use engram_providers::history::InMemoryHistoryStore;

fn recorder() -> ContextRecorder {
    ContextRecorder::new(Arc::new(InMemoryHistoryStore::new(100)))
}

#[tokio::test]
async fn test_record_and_replay() {
    let recorder = recorder();
    recorder
        .record("s1", MessageRole::User, "hello", None)
        .await
        .expect("record");
    recorder
        .record("s1", MessageRole::Assistant, "hi there", None)
        .await
        .expect("record");

    let history = recorder.get_history("s1", None, None).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert!(history[0].timestamp <= history[1].timestamp);
}

#[tokio::test]
async fn test_conversation_context_shape() {
    let recorder = recorder();
    recorder
        .record("s1", MessageRole::User, "question", None)
        .await
        .expect("record");
    recorder
        .record("s1", MessageRole::Assistant, "answer", None)
        .await
        .expect("record");

    let turns = recorder
        .get_conversation_context("s1", None)
        .await
        .expect("context");
    assert_eq!(turns[0].role, "user");
    assert_eq!(turns[1].role, "assistant");
    assert_eq!(turns[1].content, "answer");
}

#[tokio::test]
async fn test_role_filter_on_history() {
    let recorder = recorder();
    recorder
        .record("s1", MessageRole::User, "a", None)
        .await
        .expect("record");
    recorder
        .record("s1", MessageRole::System, "injected", None)
        .await
        .expect("record");

    let only_system = recorder
        .get_history("s1", None, Some(MessageRole::System))
        .await
        .expect("history");
    assert_eq!(only_system.len(), 1);
    assert_eq!(only_system[0].content, "injected");
}

#[tokio::test]
async fn test_delete_messages_by_filter() {
    let recorder = recorder();
    recorder
        .record("s1", MessageRole::User, "keep", None)
        .await
        .expect("record");
    recorder
        .record("s1", MessageRole::Assistant, "drop", None)
        .await
        .expect("record");

    let deleted = recorder
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

    let left = recorder.get_history("s1", None, None).await.expect("history");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].content, "keep");
}

#[tokio::test]
async fn test_archive_session_empties_live_log() {
    let recorder = recorder();
    recorder
        .record("s1", MessageRole::User, "x", None)
        .await
        .expect("record");
    assert!(
        recorder
            .archive_session("s1", Some("arch".to_owned()))
            .await
            .expect("archive")
    );
    let history = recorder.get_history("s1", None, None).await.expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_cleanup_removes_only_expired_sessions() {
    let store: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new(100));
    let recorder = ContextRecorder::with_ttl(Arc::clone(&store), Duration::from_millis(40));

    recorder
        .record("old", MessageRole::User, "stale", None)
        .await
        .expect("record");
    tokio::time::sleep(Duration::from_millis(80)).await;
    recorder
        .record("fresh", MessageRole::User, "alive", None)
        .await
        .expect("record");

    let removed = recorder.cleanup_expired_sessions().await.expect("cleanup");
    assert_eq!(removed, 1);
    assert!(
        recorder
            .get_history("fresh", None, None)
            .await
            .expect("history")
            .len()
            == 1
    );
    assert!(
        recorder
            .get_history("old", None, None)
            .await
            .expect("history")
            .is_empty()
    );
}
