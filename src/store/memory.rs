//! In-memory task store (non-persistent).
//!
//! Doubles as the test backend: it counts lookups and writes so tests can
//! assert that validation failures never touch the store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewTask, TaskFilter, TaskStore};
use crate::error::StoreError;
use crate::model::{Task, TaskStatus, User};

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    user_lookups: Arc<AtomicUsize>,
    task_lookups: Arc<AtomicUsize>,
    task_writes: Arc<AtomicUsize>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_user_by_id` calls so far.
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::Relaxed)
    }

    /// Number of `find_task_by_id` and `list_tasks` calls so far.
    pub fn task_lookups(&self) -> usize {
        self.task_lookups.load(Ordering::Relaxed)
    }

    /// Number of `create_task` and `update_task_status` calls so far.
    pub fn task_writes(&self) -> usize {
        self.task_writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.user_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.task_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        self.task_writes.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            priority: new_task.priority,
            due_date: new_task.due_date,
            user_id: new_task.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        self.task_writes.fetch_add(1, Ordering::Relaxed);
        let mut tasks = self.tasks.write().await;
        let task = match tasks.get_mut(&id) {
            Some(task) => task,
            None => return Ok(None),
        };
        task.status = status;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.task_lookups.fetch_add(1, Ordering::Relaxed);
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| match filter.due_before {
                Some(before) => t.due_date.map(|due| due < before).unwrap_or(false),
                None => true,
            })
            .filter(|t| !filter.status_not_in.contains(&t.status))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date, t.created_at));
        Ok(tasks)
    }
}
