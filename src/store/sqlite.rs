//! SQLite-based task store.
//!
//! Timestamps are stored as fixed-width RFC3339 strings (millisecond
//! precision, UTC) so lexicographic column order matches chronological
//! order and `ORDER BY due_date` behaves correctly.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{NewTask, TaskFilter, TaskStore};
use crate::error::StoreError;
use crate::model::{Priority, Task, TaskStatus, User};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'PENDING',
    priority TEXT NOT NULL DEFAULT 'MEDIUM',
    due_date TEXT,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    task_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_task ON comments(task_id);
"#;

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, user_id, created_at, updated_at";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&data_dir).await?;
        let db_path = data_dir.join("taskdesk.db");

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, StoreError>(conn)
        })
        .await??;

        tracing::info!("opened sqlite task store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Current instant, truncated to the precision we store.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn to_db_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn text_to_datetime(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn text_to_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let status: String = row.get(3)?;
    let priority: String = row.get(4)?;
    let due_date: Option<String> = row.get(5)?;
    let user_id: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Task {
        id: text_to_uuid(0, &id)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::from_str(&status)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        priority: Priority::from_str(&priority)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        due_date: due_date.as_deref().map(|s| text_to_datetime(5, s)).transpose()?,
        user_id: text_to_uuid(6, &user_id)?,
        created_at: text_to_datetime(7, &created_at)?,
        updated_at: text_to_datetime(8, &updated_at)?,
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(User {
        id: text_to_uuid(0, &id)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: text_to_datetime(3, &created_at)?,
        updated_at: text_to_datetime(4, &updated_at)?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let user = conn
                .query_row(
                    "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?1",
                    params![&id_str],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await?
    }

    async fn create_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let conn = self.conn.clone();
        let now = now_millis();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        let row = user.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO users (id, email, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.to_string(),
                    row.email,
                    row.name,
                    to_db_string(&row.created_at),
                    to_db_string(&row.updated_at),
                ],
            )?;
            Ok::<_, StoreError>(())
        })
        .await??;

        Ok(user)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
            let task = conn
                .query_row(&sql, params![&id_str], task_from_row)
                .optional()?;
            Ok(task)
        })
        .await?
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let conn = self.conn.clone();
        let now = now_millis();
        let task = Task {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            priority: new_task.priority,
            due_date: new_task.due_date.map(|d| d.trunc_subsecs(3)),
            user_id: new_task.user_id,
            created_at: now,
            updated_at: now,
        };
        let row = task.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (id, title, description, status, priority, due_date, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    row.id.to_string(),
                    row.title,
                    row.description,
                    row.status.as_str(),
                    row.priority.as_str(),
                    row.due_date.as_ref().map(to_db_string),
                    row.user_id.to_string(),
                    to_db_string(&row.created_at),
                    to_db_string(&row.updated_at),
                ],
            )?;
            Ok::<_, StoreError>(())
        })
        .await??;

        Ok(task)
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();
        let now = to_db_string(&now_millis());

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let changed = conn.execute(
                "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now, &id_str],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
            let task = conn
                .query_row(&sql, params![&id_str], task_from_row)
                .optional()?;
            Ok(task)
        })
        .await?
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();

        // Build the WHERE clause from the filter. All parameters bind as TEXT.
        let mut sql = format!("SELECT {} FROM tasks", TASK_COLUMNS);
        let mut clauses: Vec<String> = Vec::new();
        let mut bind: Vec<String> = Vec::new();

        if let Some(before) = filter.due_before {
            bind.push(to_db_string(&before));
            clauses.push(format!(
                "due_date IS NOT NULL AND due_date < ?{}",
                bind.len()
            ));
        }
        if !filter.status_not_in.is_empty() {
            let placeholders: Vec<String> = filter
                .status_not_in
                .iter()
                .map(|s| {
                    bind.push(s.as_str().to_string());
                    format!("?{}", bind.len())
                })
                .collect();
            clauses.push(format!("status NOT IN ({})", placeholders.join(", ")));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        // NULL due dates sort last, matching the in-memory backend.
        sql.push_str(" ORDER BY (due_date IS NULL), due_date ASC, created_at ASC");

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(rusqlite::params_from_iter(bind.iter()), task_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteTaskStore {
        SqliteTaskStore::new(dir.path().to_path_buf())
            .await
            .expect("Failed to open store")
    }

    fn overdue_input(user_id: Uuid, title: &str, hours_ago: i64) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::High,
            due_date: Some(Utc::now() - Duration::hours(hours_ago)),
            user_id,
        }
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let user = store.create_user("test@example.com", "Test User").await.unwrap();
        let found = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.email, "test@example.com");
        assert_eq!(found.name, "Test User");
        assert_eq!(found.created_at, user.created_at);

        assert!(store.find_user_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_task_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let user = store.create_user("a@example.com", "A").await.unwrap();

        let created = store
            .create_task(NewTask {
                title: "Write report".to_string(),
                description: Some("quarterly".to_string()),
                status: TaskStatus::Pending,
                priority: Priority::Urgent,
                due_date: None,
                user_id: user.id,
            })
            .await
            .unwrap();

        let found = store.find_task_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Write report");
        assert_eq!(found.description.as_deref(), Some("quarterly"));
        assert_eq!(found.status, TaskStatus::Pending);
        assert_eq!(found.priority, Priority::Urgent);
        assert!(found.due_date.is_none());
        assert_eq!(found.user_id, user.id);
        assert_eq!(found.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_status_bumps_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let user = store.create_user("a@example.com", "A").await.unwrap();
        let task = store
            .create_task(overdue_input(user.id, "t", 1))
            .await
            .unwrap();

        let updated = store
            .update_task_status(task.id, TaskStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(updated.updated_at >= task.updated_at);

        let missing = store
            .update_task_status(Uuid::new_v4(), TaskStatus::Completed)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_overdue_query_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let user = store.create_user("a@example.com", "A").await.unwrap();

        store.create_task(overdue_input(user.id, "recent", 1)).await.unwrap();
        store.create_task(overdue_input(user.id, "oldest", 48)).await.unwrap();
        let done = store
            .create_task(overdue_input(user.id, "finished", 24))
            .await
            .unwrap();
        store
            .update_task_status(done.id, TaskStatus::Completed)
            .await
            .unwrap();
        // Future-dated and undated tasks must not match.
        store
            .create_task(NewTask {
                title: "future".to_string(),
                description: None,
                status: TaskStatus::Pending,
                priority: Priority::Medium,
                due_date: Some(Utc::now() + Duration::hours(6)),
                user_id: user.id,
            })
            .await
            .unwrap();
        store
            .create_task(NewTask {
                title: "undated".to_string(),
                description: None,
                status: TaskStatus::Pending,
                priority: Priority::Medium,
                due_date: None,
                user_id: user.id,
            })
            .await
            .unwrap();

        let listed = store
            .list_tasks(&TaskFilter::overdue_at(Utc::now()))
            .await
            .unwrap();
        let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["oldest", "recent"]);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let task_id;
        {
            let store = open_store(&dir).await;
            assert!(store.is_persistent());
            let user = store.create_user("a@example.com", "A").await.unwrap();
            task_id = store
                .create_task(overdue_input(user.id, "persisted", 1))
                .await
                .unwrap()
                .id;
        }

        let store = open_store(&dir).await;
        let found = store.find_task_by_id(task_id).await.unwrap().unwrap();
        assert_eq!(found.title, "persisted");
    }
}
