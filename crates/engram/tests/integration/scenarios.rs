//! Seeded end-to-end scenarios over the composed application.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use engram_domain::entities::{
    MemoryRecord, MemoryStatus, MemoryTier, ResolutionMethod, UserTask, UserTaskStatus,
};
use engram_domain::ports::AllowAll;
use engram_infrastructure::{AppConfig, init_app_with_gates};

use crate::support::{SpyConsent, app};

fn scored(id: &str, relevance: f32) -> MemoryRecord {
    let mut record = MemoryRecord::with_id(id, format!("content {id}"), MemoryTier::LongTerm);
    record.relevance_score = relevance;
    record
}

#[tokio::test]
async fn test_hybrid_merge_seeded_scores() {
    // Vector [M1 0.8, M2 0.6], graph [M2 0.5, M3 0.4], weights 0.6/0.4:
    // M2 = 0.36 + 0.20 = 0.56, M1 = 0.48, M3 = 0.16.
    let ctx = app().await;
    let merged = ctx.hybrid_rag().merge_results(
        vec![scored("M1", 0.8), scored("M2", 0.6)],
        vec![scored("M2", 0.5), scored("M3", 0.4)],
        3,
    );
    let view: Vec<(&str, f32)> = merged
        .iter()
        .map(|m| (m.memory_id.as_str(), m.relevance_score))
        .collect();
    assert_eq!(view[0].0, "M2");
    assert!((view[0].1 - 0.56).abs() < 1e-6);
    assert_eq!(view[1].0, "M1");
    assert!((view[1].1 - 0.48).abs() < 1e-6);
    assert_eq!(view[2].0, "M3");
    assert!((view[2].1 - 0.16).abs() < 1e-6);
}

#[tokio::test]
async fn test_coreference_pronoun_path() {
    let ctx = app().await;
    let context: HashMap<String, String> =
        [("part_number".to_owned(), "RM05-008".to_owned())].into();

    let result = ctx
        .coreference()
        .resolve("這個料號庫存還有多少", &context, &[], "user-s2")
        .await;
    assert_eq!(result.resolved_query, "RM05-008庫存還有多少");
    assert_eq!(
        result.entities.get("part_number").map(String::as_str),
        Some("RM05-008")
    );
    assert!(matches!(
        result.method,
        ResolutionMethod::Aam | ResolutionMethod::Rule
    ));
    assert!(result.confidence >= 0.8);
}

#[tokio::test]
async fn test_coreference_ellipsis_path() {
    let ctx = app().await;
    let context: HashMap<String, String> =
        [("part_number".to_owned(), "ABC-123".to_owned())].into();

    let result = ctx
        .coreference()
        .resolve("庫存還有多少", &context, &[], "user-s3")
        .await;
    assert!(result.resolved_query.starts_with("ABC-123 "));
    assert_eq!(
        result.entities.get("part_number").map(String::as_str),
        Some("ABC-123")
    );
    assert!(result.confidence >= 0.8);
}

#[tokio::test]
async fn test_soft_delete_restore_and_permanent_delete() {
    let ctx = app().await;
    let tasks = ctx.user_tasks();
    tasks
        .create(UserTask::new("t1", "u1", "quarterly report"))
        .await
        .expect("create");

    // soft_delete then restore: activate, both timestamps cleared.
    let trashed = tasks.soft_delete("u1", "t1").await.expect("soft delete");
    assert_eq!(trashed.task_status, UserTaskStatus::Trash);
    assert_eq!(
        (trashed.permanent_delete_at.expect("purge")
            - trashed.deleted_at.expect("deleted"))
        .num_days(),
        7
    );
    let restored = tasks.restore("u1", "t1").await.expect("restore");
    assert_eq!(restored.task_status, UserTaskStatus::Activate);
    assert!(restored.deleted_at.is_none());
    assert!(restored.permanent_delete_at.is_none());

    // soft_delete then permanent_delete: the document is gone.
    tasks.soft_delete("u1", "t1").await.expect("soft delete");
    assert!(tasks.permanent_delete("u1", "t1").await.expect("permanent"));
    assert!(tasks.get("u1", "t1").await.expect("get").is_none());
}

#[tokio::test]
async fn test_review_job_archives_seeded_record() {
    let ctx = app().await;
    let adapter = ctx.vector_adapter().expect("vector adapter");

    // created/updated 100 days ago, accessed once, active: with defaults
    // (archive_after_days=90, max_access_threshold=3) it must be archived.
    let mut record = MemoryRecord::with_id("r-s6", "quarterly figures", MemoryTier::LongTerm)
        .with_user("u-s6")
        .with_entity("context", "figures", 0.5);
    record.created_at = engram_domain::utils::time::days_ago(100);
    record.updated_at = engram_domain::utils::time::days_ago(100);
    record.access_count = 1;
    assert!(
        engram_domain::ports::MemoryStoreAdapter::store(&*adapter, &record).await
    );

    let reports = ctx.review_job().expect("review job").run_weekly_review().await;
    let report = reports
        .iter()
        .find(|r| r.user_id == "u-s6")
        .expect("report for seeded user");
    assert!(report.archived_count >= 1);
    assert_eq!(
        engram_domain::ports::MemoryStoreAdapter::retrieve(&*adapter, "r-s6")
            .await
            .expect("record")
            .status,
        MemoryStatus::Archived
    );
}

#[tokio::test]
async fn test_consent_off_yields_empty_memory_and_no_write() {
    let consent = SpyConsent::new(false);
    let ctx = init_app_with_gates(
        AppConfig::default(),
        Arc::clone(&consent) as Arc<dyn engram_domain::ports::ConsentGate>,
        Arc::new(AllowAll),
    )
    .await
    .expect("init app");

    let result = ctx
        .chat_memory()
        .retrieve_for_prompt("u1", "s1", None, "what do you remember", &[])
        .await;
    assert_eq!(result.memory_hit_count, 0);
    assert!(result.memory_sources.is_empty());
    assert!(result.injection_messages.is_empty());

    ctx.chat_memory()
        .write_from_turn("u1", "s1", None, "question", "answer")
        .await;
    // Spy observed both the read and write gate checks...
    assert!(consent.checks.load(Ordering::SeqCst) >= 2);
    // ...and nothing was written to long-term memory.
    let stored = ctx
        .aam()
        .search_memories("answer", Some(MemoryTier::LongTerm), 10, 0.0)
        .await;
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_turn_flow_retrieves_what_it_wrote() {
    let ctx = app().await;
    let chat_memory = ctx.chat_memory();

    chat_memory
        .write_from_turn(
            "u1",
            "s1",
            Some("task-9"),
            "我最喜歡的顏色是 藍綠色",
            "好的，已記住你喜歡 藍綠色",
        )
        .await;

    let result = chat_memory
        .retrieve_for_prompt("u1", "s2", None, "我最喜歡的顏色 藍綠色 是什麼", &[])
        .await;
    assert!(result.memory_hit_count > 0);
    let injection = &result.injection_messages[0].content;
    assert!(injection.contains("藍綠色"));
    assert!(result.retrieval_latency_ms >= 0.0);
}
