//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Priority, Task, TaskStatus, User};

/// Fields for inserting a new task. The store assigns the identifier and
/// both timestamps.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Uuid,
}

/// Filter for [`TaskStore::list_tasks`].
///
/// `due_before` matches only tasks that *have* a due date earlier than the
/// given instant; tasks without a due date never match it.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub due_before: Option<DateTime<Utc>>,
    pub status_not_in: Vec<TaskStatus>,
}

impl TaskFilter {
    /// Filter for the overdue report: due before `now`, not yet closed.
    pub fn overdue_at(now: DateTime<Utc>) -> Self {
        Self {
            due_before: Some(now),
            status_not_in: vec![TaskStatus::Completed, TaskStatus::Cancelled],
        }
    }
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Look up a user by ID.
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a user. Users are owned by external layers; this exists so
    /// wiring code and tests can seed them.
    async fn create_user(&self, email: &str, name: &str) -> Result<User, StoreError>;

    /// Look up a task by ID.
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Insert a new task, assigning its identifier and timestamps.
    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError>;

    /// Set a task's status and refresh its `updated_at` timestamp.
    /// Returns `None` if no task with the given ID exists.
    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, StoreError>;

    /// List tasks matching the filter, ordered by due date ascending.
    /// Tasks without a due date sort last, then by creation time.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    Memory,
    #[default]
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(format!("unknown store kind: {}", other)),
        }
    }
}

/// Create a task store based on kind and data directory.
pub async fn create_task_store(
    kind: StoreKind,
    data_dir: PathBuf,
) -> Result<Arc<dyn TaskStore>, StoreError> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        StoreKind::Sqlite => {
            let store = SqliteTaskStore::new(data_dir).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_kind_parsing() {
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert_eq!("sqlite".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert_eq!("DB".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert!("postgres".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_factory_builds_memory_store() {
        let store = tokio_test::block_on(create_task_store(
            StoreKind::Memory,
            PathBuf::from("unused"),
        ))
        .expect("Failed to create store");
        assert!(!store.is_persistent());
    }

    #[test]
    fn test_overdue_filter_shape() {
        let now = Utc::now();
        let filter = TaskFilter::overdue_at(now);
        assert_eq!(filter.due_before, Some(now));
        assert_eq!(
            filter.status_not_in,
            vec![TaskStatus::Completed, TaskStatus::Cancelled]
        );
    }
}
