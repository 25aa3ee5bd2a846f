//! Async task processor.
//!
//! Typed, prioritised, cancellable background tasks over a bounded worker
//! pool. Dispatch order is by descending priority, FIFO within the same
//! priority. Running tasks observe a cooperative cancel signal at their
//! next await point; cancelling a terminal task is a no-op.

use std::collections::{BinaryHeap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use engram_domain::entities::{AsyncTask, TaskStatus};
use engram_domain::utils::time;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

type JobFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, String>> + Send>>;
type JobFn = Box<dyn FnOnce(CancellationToken) -> JobFuture + Send>;

struct QueuedJob {
    priority: i32,
    sequence: u64,
    task_id: String,
    job: JobFn,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for QueuedJob {}
impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: higher priority first, then earlier sequence.
        self.priority
            .cmp(&other.priority)
            .then(other.sequence.cmp(&self.sequence))
    }
}

struct ProcessorState {
    queue: Mutex<BinaryHeap<QueuedJob>>,
    tasks: Mutex<HashMap<String, AsyncTask>>,
    tokens: Mutex<HashMap<String, CancellationToken>>,
    notify: Notify,
    sequence: std::sync::atomic::AtomicU64,
}

/// Bounded-pool background task processor.
pub struct AsyncTaskProcessor {
    state: Arc<ProcessorState>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl AsyncTaskProcessor {
    /// Start a processor with `max_workers` concurrent workers.
    #[must_use]
    pub fn new(max_workers: usize) -> Self {
        let state = Arc::new(ProcessorState {
            queue: Mutex::new(BinaryHeap::new()),
            tasks: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            notify: Notify::new(),
            sequence: std::sync::atomic::AtomicU64::new(0),
        });
        let shutdown = CancellationToken::new();

        let workers = (0..max_workers.max(1))
            .map(|worker| {
                let state = Arc::clone(&state);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    Self::worker_loop(worker, state, shutdown).await;
                })
            })
            .collect();

        Self {
            state,
            workers,
            shutdown,
        }
    }

    /// Submit a task. The job receives a cancellation token it is expected
    /// to observe at await points. Returns the task id.
    pub async fn submit<F, Fut>(
        &self,
        task_type: impl Into<String>,
        priority: i32,
        metadata: HashMap<String, serde_json::Value>,
        job: F,
    ) -> String
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<serde_json::Value, String>> + Send + 'static,
    {
        let mut task = AsyncTask::new(task_type, priority);
        task.metadata = metadata;
        let task_id = task.task_id.clone();

        let sequence = self
            .state
            .sequence
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        self.state
            .tasks
            .lock()
            .await
            .insert(task_id.clone(), task);
        self.state.queue.lock().await.push(QueuedJob {
            priority,
            sequence,
            task_id: task_id.clone(),
            job: Box::new(move |token| Box::pin(job(token))),
        });
        self.state.notify.notify_one();

        tracing::debug!(task_id = %task_id, "Submitted task");
        task_id
    }

    async fn worker_loop(worker: usize, state: Arc<ProcessorState>, shutdown: CancellationToken) {
        loop {
            let queued = {
                let mut queue = state.queue.lock().await;
                queue.pop()
            };
            let Some(queued) = queued else {
                tokio::select! {
                    () = state.notify.notified() => continue,
                    () = shutdown.cancelled() => return,
                }
            };

            // Skip jobs whose task was cancelled while still queued.
            {
                let tasks = state.tasks.lock().await;
                if tasks
                    .get(&queued.task_id)
                    .is_some_and(|t| t.status == TaskStatus::Cancelled)
                {
                    continue;
                }
            }

            let token = CancellationToken::new();
            {
                let mut tasks = state.tasks.lock().await;
                if let Some(task) = tasks.get_mut(&queued.task_id) {
                    task.status = TaskStatus::Running;
                    task.started_at = Some(time::now());
                }
                state
                    .tokens
                    .lock()
                    .await
                    .insert(queued.task_id.clone(), token.clone());
            }

            tracing::debug!(worker, task_id = %queued.task_id, "Task started");
            let outcome = tokio::select! {
                outcome = (queued.job)(token.clone()) => Some(outcome),
                () = token.cancelled() => None,
            };

            {
                let mut tasks = state.tasks.lock().await;
                if let Some(task) = tasks.get_mut(&queued.task_id) {
                    task.completed_at = Some(time::now());
                    match outcome {
                        Some(Ok(result)) => {
                            task.status = TaskStatus::Completed;
                            task.result = Some(result);
                        }
                        Some(Err(error)) => {
                            task.status = TaskStatus::Failed;
                            task.error = Some(error);
                        }
                        None => {
                            task.status = TaskStatus::Cancelled;
                        }
                    }
                }
                state.tokens.lock().await.remove(&queued.task_id);
            }
        }
    }

    /// Fetch a task snapshot.
    pub async fn get_task(&self, task_id: &str) -> Option<AsyncTask> {
        self.state.tasks.lock().await.get(task_id).cloned()
    }

    /// Result payload of a completed task; `None` for any other state.
    pub async fn get_task_result(&self, task_id: &str) -> Option<serde_json::Value> {
        let tasks = self.state.tasks.lock().await;
        tasks
            .get(task_id)
            .filter(|t| t.status == TaskStatus::Completed)
            .and_then(|t| t.result.clone())
    }

    /// Cancel a pending or running task. Terminal tasks are a no-op and
    /// return false.
    pub async fn cancel_task(&self, task_id: &str) -> bool {
        let mut tasks = self.state.tasks.lock().await;
        let Some(task) = tasks.get_mut(task_id) else {
            return false;
        };
        match task.status {
            TaskStatus::Pending => {
                task.status = TaskStatus::Cancelled;
                task.completed_at = Some(time::now());
                true
            }
            TaskStatus::Running => {
                if let Some(token) = self.state.tokens.lock().await.get(task_id) {
                    token.cancel();
                }
                true
            }
            _ => false,
        }
    }

    /// List task snapshots, optionally filtered by status and type.
    pub async fn list_tasks(
        &self,
        status: Option<TaskStatus>,
        task_type: Option<&str>,
    ) -> Vec<AsyncTask> {
        let tasks = self.state.tasks.lock().await;
        let mut out: Vec<AsyncTask> = tasks
            .values()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .filter(|t| task_type.is_none_or(|ty| t.task_type == ty))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out
    }

    /// Stop the workers. Queued jobs are dropped; running jobs receive no
    /// signal beyond their own tokens.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        for worker in &self.workers {
            worker.abort();
        }
    }
}

impl Drop for AsyncTaskProcessor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
