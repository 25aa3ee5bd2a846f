use engram_domain::entities::{
    DeletionKind, DeletionTransaction, OperationStatus, TransactionStatus,
};

#[test]
fn test_transaction_totals_balance() {
    let mut tx = DeletionTransaction::new("task-1", "user-1");
    let a = tx.add_operation("file-1", DeletionKind::Vector);
    let b = tx.add_operation("file-1", DeletionKind::KgEntity);
    let c = tx.add_operation("file-1", DeletionKind::Metadata);

    tx.mark_success(a);
    tx.mark_failed(b, "backend down", 2);
    tx.mark_success(c);
    let status = tx.complete();

    assert_eq!(status, TransactionStatus::PartiallyFailed);
    assert_eq!(tx.success_count() + tx.failed_count(), tx.operations.len());
    assert!(
        tx.operations
            .iter()
            .all(|op| op.status != OperationStatus::Pending),
        "no pending operations may remain after completion"
    );
    assert!(tx.completed_at.is_some());
}

#[test]
fn test_all_success_completes() {
    let mut tx = DeletionTransaction::new("task-1", "user-1");
    let a = tx.add_operation("file-1", DeletionKind::Vector);
    tx.mark_success(a);
    assert_eq!(tx.complete(), TransactionStatus::Completed);
}

#[test]
fn test_all_failed_fails() {
    let mut tx = DeletionTransaction::new("task-1", "user-1");
    let a = tx.add_operation("file-1", DeletionKind::Vector);
    let b = tx.add_operation("file-2", DeletionKind::Vector);
    tx.mark_failed(a, "x", 3);
    tx.mark_failed(b, "y", 3);
    assert_eq!(tx.complete(), TransactionStatus::Failed);
    assert_eq!(tx.failed_operations().len(), 2);
}

#[test]
fn test_file_sequence_order() {
    assert_eq!(
        DeletionKind::file_sequence()
            .iter()
            .map(DeletionKind::as_str)
            .collect::<Vec<_>>(),
        vec!["vector", "kg_entity", "kg_relation", "metadata", "file"]
    );
}
