//! User task soft-delete lifecycle.
//!
//! Two-step delete: `soft_delete` marks the task trash and schedules a
//! permanent purge seven days out; `restore` reverses both; the permanent
//! path is only reachable from trash. A background sweep purges tasks whose
//! schedule has passed.

use std::sync::Arc;

use engram_domain::constants::time::TRASH_RETENTION_DAYS;
use engram_domain::entities::{UserTask, UserTaskStatus};
use engram_domain::error::{Error, Result};
use engram_domain::ports::UserTaskStore;
use engram_domain::utils::time;

/// Task lifecycle service over a [`UserTaskStore`].
pub struct UserTaskService {
    store: Arc<dyn UserTaskStore>,
}

impl UserTaskService {
    /// Build the service.
    #[must_use]
    pub fn new(store: Arc<dyn UserTaskStore>) -> Self {
        Self { store }
    }

    /// Create a task.
    pub async fn create(&self, task: UserTask) -> Result<UserTask> {
        self.store.insert(&task).await?;
        Ok(task)
    }

    /// Fetch a task.
    pub async fn get(&self, user_id: &str, task_id: &str) -> Result<Option<UserTask>> {
        self.store.get(user_id, task_id).await
    }

    /// List a user's live tasks, optionally including archived ones.
    pub async fn list(&self, user_id: &str, include_archived: bool) -> Result<Vec<UserTask>> {
        self.store.list(user_id, include_archived).await
    }

    /// Persist field changes to a task.
    pub async fn update(&self, task: &UserTask) -> Result<bool> {
        let mut task = task.clone();
        task.updated_at = time::now();
        self.store.update(&task).await
    }

    /// Step one of deletion: move to trash and schedule the purge.
    pub async fn soft_delete(&self, user_id: &str, task_id: &str) -> Result<UserTask> {
        let mut task = self
            .store
            .get(user_id, task_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("task {task_id}")))?;

        let now = time::now();
        task.task_status = UserTaskStatus::Trash;
        task.deleted_at = Some(now);
        task.permanent_delete_at = Some(now + chrono::Duration::days(TRASH_RETENTION_DAYS));
        task.updated_at = now;
        self.store.update(&task).await?;
        tracing::info!(user_id, task_id, "Task moved to trash");
        Ok(task)
    }

    /// Undo a soft delete: back to activate, both timestamps cleared.
    pub async fn restore(&self, user_id: &str, task_id: &str) -> Result<UserTask> {
        let mut task = self
            .store
            .get(user_id, task_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("task {task_id}")))?;

        if task.task_status != UserTaskStatus::Trash {
            return Err(Error::invalid_argument(format!(
                "Task {task_id} is not in trash"
            )));
        }
        task.task_status = UserTaskStatus::Activate;
        task.deleted_at = None;
        task.permanent_delete_at = None;
        task.updated_at = time::now();
        self.store.update(&task).await?;
        tracing::info!(user_id, task_id, "Task restored from trash");
        Ok(task)
    }

    /// Step two of deletion; allowed only from trash.
    pub async fn permanent_delete(&self, user_id: &str, task_id: &str) -> Result<bool> {
        let task = self
            .store
            .get(user_id, task_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("task {task_id}")))?;

        if !task.is_trashed() {
            return Err(Error::invalid_argument(format!(
                "Task {task_id} must be in trash before permanent deletion"
            )));
        }
        let removed = self.store.remove(user_id, task_id).await?;
        if removed {
            tracing::info!(user_id, task_id, "Task permanently deleted");
        }
        Ok(removed)
    }

    /// Purge every task whose scheduled deletion time has passed. Returns
    /// the number of tasks removed.
    pub async fn cleanup_expired_trash(&self) -> Result<usize> {
        let due = self.store.list_expired_trash(time::now()).await?;
        let mut removed = 0;
        for task in due {
            if self.store.remove(&task.user_id, &task.task_id).await? {
                removed += 1;
                tracing::info!(
                    user_id = %task.user_id,
                    task_id = %task.task_id,
                    "Purged expired trash task"
                );
            }
        }
        Ok(removed)
    }
}
