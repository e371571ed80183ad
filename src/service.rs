//! Task service - validation and query construction over a task store.
//!
//! The service holds no state of its own; every operation is an independent
//! unit of work that suspends only while awaiting the store. Consistency
//! under concurrent calls is delegated to the backend.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::TaskServiceError;
use crate::model::{CreateTaskInput, Task, TaskStatus};
use crate::store::{NewTask, TaskFilter, TaskStore};

/// Stateless façade over a [`TaskStore`].
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Create a task for an existing user.
    ///
    /// Validation and the user-existence check happen strictly before the
    /// store write. New tasks always start as [`TaskStatus::Pending`]; the
    /// priority defaults to `Medium` when unset.
    ///
    /// # Errors
    /// - [`TaskServiceError::Validation`] if the title is empty or
    ///   whitespace-only (the store is never called).
    /// - [`TaskServiceError::NotFound`] if the user does not exist (task
    ///   creation is never attempted).
    pub async fn create_task(&self, input: CreateTaskInput) -> Result<Task, TaskServiceError> {
        if input.title.trim().is_empty() {
            return Err(TaskServiceError::Validation(
                "Title cannot be empty".to_string(),
            ));
        }

        self.store
            .find_user_by_id(input.user_id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound("User not found".to_string()))?;

        let task = self
            .store
            .create_task(NewTask {
                title: input.title,
                description: input.description,
                status: TaskStatus::Pending,
                priority: input.priority.unwrap_or_default(),
                due_date: input.due_date,
                user_id: input.user_id,
            })
            .await?;

        tracing::info!("created task {} for user {}", task.id, task.user_id);
        Ok(task)
    }

    /// Transition a task to a new status, supplied as a raw string.
    ///
    /// The status is parsed before the task store is touched, so an
    /// unrecognized value never causes a lookup. The single enforced
    /// transition rule is terminal-state protection: a `COMPLETED` task
    /// cannot go back to `PENDING` (it may still be `CANCELLED`). All other
    /// transitions are permitted.
    ///
    /// # Errors
    /// - [`TaskServiceError::Validation`] for an unrecognized status value.
    /// - [`TaskServiceError::NotFound`] if the task does not exist.
    /// - [`TaskServiceError::BusinessRule`] for `COMPLETED -> PENDING`.
    pub async fn update_task_status(
        &self,
        task_id: Uuid,
        new_status: &str,
    ) -> Result<Task, TaskServiceError> {
        let new_status: TaskStatus = new_status.parse()?;

        let existing = self
            .store
            .find_task_by_id(task_id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound("Task not found".to_string()))?;

        if existing.status == TaskStatus::Completed && new_status == TaskStatus::Pending {
            tracing::warn!("rejected PENDING transition for completed task {}", task_id);
            return Err(TaskServiceError::BusinessRule(
                "Cannot change completed task back to pending".to_string(),
            ));
        }

        let updated = self
            .store
            .update_task_status(task_id, new_status)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound("Task not found".to_string()))?;

        tracing::info!(
            "task {} status {} -> {}",
            task_id,
            existing.status,
            updated.status
        );
        Ok(updated)
    }

    /// List overdue tasks: due strictly before now and not yet closed,
    /// earliest due date first. Tasks without a due date are never overdue.
    pub async fn overdue_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let filter = TaskFilter::overdue_at(Utc::now());
        Ok(self.store.list_tasks(&filter).await?)
    }
}
