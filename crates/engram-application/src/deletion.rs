//! Deletion transaction manager.
//!
//! Permanent delete of one task's multi-store footprint. Per file the kinds
//! run in order vector → kg_entity → kg_relation → metadata → file; then
//! folders; then the task record itself. Each step retries with linear
//! backoff; failures in earlier kinds never abort later kinds
//! (clean-as-much-as-possible). There is no automatic rollback of
//! successful deletes; cleanup is a forward retry problem.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engram_domain::constants::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use engram_domain::entities::{
    DeletionKind, DeletionTransaction, TransactionStatus,
};
use engram_domain::error::Result;
use engram_domain::ports::{
    GraphMemoryAdapter, OperationLogStore, UserTaskStore, VectorStoreProvider,
};
use engram_domain::utils::time;
use engram_domain::value_objects::CollectionNaming;
use tokio::sync::Mutex;

/// External artefact surfaces a deletion touches beyond the memory stores.
#[async_trait]
pub trait FileArtifactStore: Send + Sync {
    /// Remove a file's metadata document.
    async fn delete_metadata(&self, file_id: &str) -> Result<()>;
    /// Remove the stored file object.
    async fn delete_file(&self, file_id: &str) -> Result<()>;
    /// Remove a folder document.
    async fn delete_folder(&self, folder_id: &str) -> Result<()>;
}

/// Collaborators of one deletion transaction. Absent collaborators make
/// their steps vacuous successes.
#[derive(Clone, Default)]
pub struct DeletionDeps {
    /// Point-level vector store
    pub vector_store: Option<Arc<dyn VectorStoreProvider>>,
    /// Graph entity/relation tables
    pub graph: Option<Arc<dyn GraphMemoryAdapter>>,
    /// File metadata / object / folder surfaces
    pub artifacts: Option<Arc<dyn FileArtifactStore>>,
    /// Task documents
    pub tasks: Option<Arc<dyn UserTaskStore>>,
    /// Operation log for the final report
    pub operation_log: Option<Arc<dyn OperationLogStore>>,
    /// Vector collection naming
    pub collection_naming: CollectionNaming,
    /// Collection for user-based naming
    pub user_collection: String,
}

/// Aggregated report for one finished transaction.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RollbackReport {
    /// Owning task
    pub task_id: String,
    /// Requesting user
    pub user_id: String,
    /// Aggregate status
    pub status: TransactionStatus,
    /// Total steps tracked
    pub total_operations: usize,
    /// Steps that succeeded
    pub success_count: usize,
    /// Steps that failed after all retries
    pub failed_count: usize,
    /// The failed steps
    pub failed_operations: Vec<FailedOperation>,
    /// Human-readable follow-up hints keyed by failed kind
    pub recommendations: Vec<String>,
}

/// One failed step in the report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FailedOperation {
    /// Target id of the step
    pub target_id: String,
    /// Store surface targeted
    pub kind: DeletionKind,
    /// Final error
    pub error: Option<String>,
    /// Attempts spent beyond the first
    pub retry_count: u32,
}

/// Per-request deletion transaction manager.
pub struct DeletionRollbackManager {
    task_id: String,
    user_id: String,
    deps: DeletionDeps,
    transaction: Mutex<DeletionTransaction>,
    max_retries: u32,
    retry_delay: Duration,
}

impl DeletionRollbackManager {
    /// Open a transaction for one task delete.
    #[must_use]
    pub fn new(task_id: impl Into<String>, user_id: impl Into<String>, deps: DeletionDeps) -> Self {
        let task_id = task_id.into();
        let user_id = user_id.into();
        Self {
            transaction: Mutex::new(DeletionTransaction::new(task_id.clone(), user_id.clone())),
            task_id,
            user_id,
            deps,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    fn collection_for(&self, file_id: &str) -> String {
        match self.deps.collection_naming {
            CollectionNaming::FileBased => format!("file_{file_id}"),
            CollectionNaming::UserBased => self.deps.user_collection.clone(),
        }
    }

    /// Bounded-retry execution of one delete step. Returns
    /// `(success, final_error, retries_spent)`.
    async fn with_retry<F, Fut>(&self, mut operation: F) -> (bool, Option<String>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut last_error = None;
        for attempt in 0..self.max_retries {
            match operation().await {
                Ok(()) => return (true, None, attempt),
                Err(e) => {
                    last_error = Some(e.to_string());
                    if attempt + 1 < self.max_retries {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            error = %last_error.as_deref().unwrap_or(""),
                            "Deletion step failed, will retry"
                        );
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    }
                }
            }
        }
        (false, last_error, self.max_retries.saturating_sub(1))
    }

    async fn run_step<F, Fut>(&self, target_id: &str, kind: DeletionKind, operation: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let index = self
            .transaction
            .lock()
            .await
            .add_operation(target_id, kind);
        let (success, error, retries) = self.with_retry(operation).await;
        let mut transaction = self.transaction.lock().await;
        if success {
            transaction.mark_success(index);
            tracing::info!(target_id, kind = kind.as_str(), task_id = %self.task_id, "Deletion step succeeded");
        } else {
            let error = error.unwrap_or_else(|| "Unknown error".to_owned());
            tracing::error!(target_id, kind = kind.as_str(), task_id = %self.task_id, error = %error, "Deletion step failed");
            transaction.mark_failed(index, error, retries);
        }
        success
    }

    /// Delete one file's footprint across every store, in kind order.
    pub async fn delete_file_footprint(&self, file_id: &str) {
        for kind in DeletionKind::file_sequence() {
            match kind {
                DeletionKind::Vector => {
                    let store = self.deps.vector_store.clone();
                    let collection = self.collection_for(file_id);
                    let user_id = self.user_id.clone();
                    self.run_step(file_id, kind, || {
                        let store = store.clone();
                        let collection = collection.clone();
                        let user_id = user_id.clone();
                        async move {
                            if let Some(store) = store {
                                store.delete_by_file(&collection, file_id, &user_id).await?;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                DeletionKind::KgEntity => {
                    let graph = self.deps.graph.clone();
                    self.run_step(file_id, kind, || {
                        let graph = graph.clone();
                        async move {
                            if let Some(graph) = graph {
                                graph.delete_entities_by_file(file_id).await;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                DeletionKind::KgRelation => {
                    let graph = self.deps.graph.clone();
                    self.run_step(file_id, kind, || {
                        let graph = graph.clone();
                        async move {
                            if let Some(graph) = graph {
                                graph.delete_relations_by_file(file_id).await;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                DeletionKind::Metadata => {
                    let artifacts = self.deps.artifacts.clone();
                    self.run_step(file_id, kind, || {
                        let artifacts = artifacts.clone();
                        async move {
                            if let Some(artifacts) = artifacts {
                                artifacts.delete_metadata(file_id).await?;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                DeletionKind::File => {
                    let artifacts = self.deps.artifacts.clone();
                    self.run_step(file_id, kind, || {
                        let artifacts = artifacts.clone();
                        async move {
                            if let Some(artifacts) = artifacts {
                                artifacts.delete_file(file_id).await?;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                DeletionKind::Folder | DeletionKind::Task => {}
            }
        }
    }

    /// Delete one folder document.
    pub async fn delete_folder(&self, folder_id: &str) {
        let artifacts = self.deps.artifacts.clone();
        self.run_step(folder_id, DeletionKind::Folder, || {
            let artifacts = artifacts.clone();
            async move {
                if let Some(artifacts) = artifacts {
                    artifacts.delete_folder(folder_id).await?;
                }
                Ok(())
            }
        })
        .await;
    }

    /// Delete the task record itself.
    pub async fn delete_task_record(&self) {
        let tasks = self.deps.tasks.clone();
        let user_id = self.user_id.clone();
        let task_id = self.task_id.clone();
        self.run_step(&self.task_id.clone(), DeletionKind::Task, || {
            let tasks = tasks.clone();
            let user_id = user_id.clone();
            let task_id = task_id.clone();
            async move {
                if let Some(tasks) = tasks {
                    tasks.remove(&user_id, &task_id).await?;
                }
                Ok(())
            }
        })
        .await;
    }

    /// Run the whole transaction: every file, then folders, then the task.
    pub async fn run(&self, file_ids: &[String], folder_ids: &[String]) -> TransactionStatus {
        for file_id in file_ids {
            self.delete_file_footprint(file_id).await;
        }
        for folder_id in folder_ids {
            self.delete_folder(folder_id).await;
        }
        self.delete_task_record().await;
        self.complete().await
    }

    /// Close the transaction, derive the aggregate status, and persist the
    /// report to the operation log.
    pub async fn complete(&self) -> TransactionStatus {
        let status = self.transaction.lock().await.complete();
        if let Some(log) = &self.deps.operation_log {
            let report = self.rollback_report().await;
            let key = format!(
                "{}_{}_delete_{}",
                self.user_id,
                self.task_id,
                time::epoch_millis()
            );
            match serde_json::to_value(&report) {
                Ok(document) => {
                    if let Err(e) = log.append(&key, document).await {
                        tracing::warn!(error = %e, "Failed to persist deletion report");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to serialize deletion report"),
            }
        }
        status
    }

    /// Snapshot of the transaction state.
    pub async fn summary(&self) -> DeletionTransaction {
        self.transaction.lock().await.clone()
    }

    /// Build the aggregated report with follow-up recommendations.
    pub async fn rollback_report(&self) -> RollbackReport {
        let transaction = self.transaction.lock().await;
        let failed: Vec<FailedOperation> = transaction
            .failed_operations()
            .into_iter()
            .map(|op| FailedOperation {
                target_id: op.target_id.clone(),
                kind: op.kind,
                error: op.error.clone(),
                retry_count: op.retry_count,
            })
            .collect();

        RollbackReport {
            task_id: self.task_id.clone(),
            user_id: self.user_id.clone(),
            status: transaction.status,
            total_operations: transaction.operations.len(),
            success_count: transaction.success_count(),
            failed_count: failed.len(),
            recommendations: Self::recommendations(&failed),
            failed_operations: failed,
        }
    }

    fn recommendations(failed: &[FailedOperation]) -> Vec<String> {
        let mut recommendations = Vec::new();

        let vector_failures = failed
            .iter()
            .filter(|op| op.kind == DeletionKind::Vector)
            .count();
        if vector_failures > 0 {
            recommendations.push(format!(
                "Warning: vector deletion failed for {vector_failures} file(s). \
                 Check for residual vectors in the affected collections."
            ));
        }

        let kg_failures = failed
            .iter()
            .filter(|op| matches!(op.kind, DeletionKind::KgEntity | DeletionKind::KgRelation))
            .count();
        if kg_failures > 0 {
            recommendations.push(format!(
                "Warning: {kg_failures} knowledge-graph operation(s) failed. \
                 Clean up the entities and relations collections manually."
            ));
        }

        let file_failures = failed
            .iter()
            .filter(|op| op.kind == DeletionKind::File)
            .count();
        if file_failures > 0 {
            recommendations.push(format!(
                "Warning: {file_failures} stored file(s) could not be deleted. \
                 Check object storage for residual files."
            ));
        }

        if recommendations.is_empty() {
            recommendations.push("All deletion steps completed successfully.".to_owned());
        }
        recommendations
    }
}
