//! # taskdesk
//!
//! Task-tracking service layer with pluggable persistence.
//!
//! This library provides:
//! - A stateless [`TaskService`] for creating tasks, transitioning task
//!   status, and listing overdue tasks
//! - A [`TaskStore`](store::TaskStore) abstraction with in-memory and SQLite
//!   backends
//!
//! ## Operation Flow
//! 1. Validate input (title, status value)
//! 2. Check referenced records exist
//! 3. Perform the single store write (or read) and return the record
//!
//! Validation and existence checks happen strictly before any mutation, so
//! no operation leaves a partial write behind. HTTP routing, authentication,
//! and process wiring are the caller's concern.
//!
//! ## Modules
//! - `service`: the `TaskService` façade
//! - `store`: storage backends and query filters
//! - `model`: users, tasks, comments, and their enums
//! - `error`: service and store error types
//! - `config`: environment-driven configuration

pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{StoreError, TaskServiceError};
pub use model::{Comment, CreateTaskInput, Priority, Task, TaskStatus, User};
pub use service::TaskService;
pub use store::{
    create_task_store, InMemoryTaskStore, NewTask, SqliteTaskStore, StoreKind, TaskFilter,
    TaskStore,
};
