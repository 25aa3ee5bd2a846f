//! In-memory user task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use engram_domain::entities::{UserTask, UserTaskStatus};
use engram_domain::error::Result;
use engram_domain::ports::UserTaskStore;

/// Task documents keyed `(user_id, task_id)`.
#[derive(Default)]
pub struct InMemoryUserTaskStore {
    tasks: DashMap<(String, String), UserTask>,
}

impl InMemoryUserTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserTaskStore for InMemoryUserTaskStore {
    async fn insert(&self, task: &UserTask) -> Result<()> {
        self.tasks.insert(
            (task.user_id.clone(), task.task_id.clone()),
            task.clone(),
        );
        Ok(())
    }

    async fn get(&self, user_id: &str, task_id: &str) -> Result<Option<UserTask>> {
        Ok(self
            .tasks
            .get(&(user_id.to_owned(), task_id.to_owned()))
            .map(|t| t.clone()))
    }

    async fn update(&self, task: &UserTask) -> Result<bool> {
        let key = (task.user_id.clone(), task.task_id.clone());
        if !self.tasks.contains_key(&key) {
            return Ok(false);
        }
        self.tasks.insert(key, task.clone());
        Ok(true)
    }

    async fn remove(&self, user_id: &str, task_id: &str) -> Result<bool> {
        Ok(self
            .tasks
            .remove(&(user_id.to_owned(), task_id.to_owned()))
            .is_some())
    }

    async fn list(&self, user_id: &str, include_archived: bool) -> Result<Vec<UserTask>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| match t.task_status {
                UserTaskStatus::Activate => true,
                UserTaskStatus::Archive => include_archived,
                UserTaskStatus::Trash => false,
            })
            .map(|t| t.clone())
            .collect())
    }

    async fn list_expired_trash(&self, now: DateTime<Utc>) -> Result<Vec<UserTask>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.task_status == UserTaskStatus::Trash)
            .filter(|t| t.permanent_delete_at.is_some_and(|at| at < now))
            .map(|t| t.clone())
            .collect())
    }
}
