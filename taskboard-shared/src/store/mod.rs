/// Task persistence
///
/// Every store executes the same owner-scoped operations. Reads take a
/// [`TaskQuery`], which always carries the owner predicate; writes take a
/// [`TaskScope`] (`id` AND owner) and report how many rows matched. A scope
/// naming another owner's task matches zero rows and is not an error.
///
/// # Implementations
///
/// - [`postgrest::PostgrestTaskStore`]: hosted data API, bound per request to
///   the caller's access token
/// - [`postgres::PgTaskStore`]: direct PostgreSQL through `sqlx`
/// - [`memory::MemoryTaskStore`]: process-local, for tests and local runs

pub mod memory;
pub mod postgres;
pub mod postgrest;

use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::BackendError;
use crate::models::{NewTask, StatusChange, Task, TaskChanges, TaskScope};
use crate::query::TaskQuery;

pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;
pub use postgrest::{PostgrestStoreFactory, PostgrestTaskStore};

/// Store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused the operation without reaching a backend
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Owner-scoped task operations
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks matching `query`, in its order
    async fn list(&self, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Inserts a task owned by `task.user_id`
    async fn insert(&self, task: NewTask) -> StoreResult<()>;

    /// Replaces the editable fields of the task in `scope`; returns rows matched
    async fn update(&self, scope: TaskScope, changes: TaskChanges) -> StoreResult<u64>;

    /// Deletes the task in `scope`; returns rows matched
    async fn delete(&self, scope: TaskScope) -> StoreResult<u64>;

    /// Writes only `status` and `updated_at`; returns rows matched
    async fn set_status(&self, scope: TaskScope, change: StatusChange) -> StoreResult<u64>;
}

/// Builds the store a single request works with
///
/// Stores that forward the caller's credentials (the hosted data API) return
/// a fresh client per call; the others hand out a shared handle.
pub trait TaskStoreFactory: Send + Sync {
    fn bind(&self, access_token: Option<&str>) -> Arc<dyn TaskStore>;
}
