/// Task store backed directly by PostgreSQL
///
/// Used for self-hosted deployments without the hosted data API. There are
/// no row-level policies here: the owner predicate in every statement is the
/// only access check.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

use super::postgrest::escape_like;
use super::{StoreResult, TaskStore, TaskStoreFactory};
use crate::models::{NewTask, StatusChange, Task, TaskChanges, TaskScope};
use crate::query::TaskQuery;

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the `SELECT` for a list read
///
/// Column names in `ORDER BY` come from the closed [`crate::query::SortField`]
/// set; every value is a bind parameter.
fn select_query(query: &TaskQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, user_id, title, description, priority, status, due_date, created_at, updated_at \
         FROM tasks WHERE user_id = ",
    );
    builder.push_bind(query.owner());

    if let Some(status) = query.status() {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = query.priority() {
        builder.push(" AND priority = ").push_bind(priority);
    }
    if let Some(term) = query.search() {
        builder
            .push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(term)));
    }

    builder.push(" ORDER BY ");
    let mut order = builder.separated(", ");
    for term in query.ordering() {
        order.push(format!(
            "{} {}",
            term.field.column(),
            term.direction.as_str().to_uppercase()
        ));
    }

    builder
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let mut builder = select_query(query);
        let tasks = builder
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = tasks.len(), "Fetched tasks from database");
        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> StoreResult<()> {
        let NewTask { user_id, fields } = task;

        sqlx::query(
            "INSERT INTO tasks (user_id, title, description, priority, status, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.priority)
        .bind(fields.status)
        .bind(fields.due_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, scope: TaskScope, changes: TaskChanges) -> StoreResult<u64> {
        let TaskChanges { fields, updated_at } = changes;

        let result = sqlx::query(
            "UPDATE tasks \
             SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, updated_at = $6 \
             WHERE id = $7 AND user_id = $8",
        )
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.priority)
        .bind(fields.status)
        .bind(fields.due_date)
        .bind(updated_at)
        .bind(scope.id)
        .bind(scope.owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, scope: TaskScope) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(scope.id)
            .bind(scope.owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn set_status(&self, scope: TaskScope, change: StatusChange) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE tasks SET status = $1, updated_at = $2 WHERE id = $3 AND user_id = $4",
        )
        .bind(change.status)
        .bind(change.updated_at)
        .bind(scope.id)
        .bind(scope.owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl TaskStoreFactory for PgTaskStore {
    fn bind(&self, _access_token: Option<&str>) -> Arc<dyn TaskStore> {
        Arc::new(self.clone())
    }
}
