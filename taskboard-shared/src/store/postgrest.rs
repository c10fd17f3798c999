/// Task store over the hosted data API (PostgREST-compatible)
///
/// Each request gets its own [`PostgrestTaskStore`] carrying the caller's
/// access token, so row-level policies on the provider side apply on top of
/// the owner predicates sent here. Without a token the anon key is used as
/// the bearer.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::IgnoredAny;
use std::sync::Arc;
use tracing::debug;

use super::{StoreResult, TaskStore, TaskStoreFactory};
use crate::backend::{error_from_response, BackendConfig, BackendError, BackendResult};
use crate::models::{NewTask, StatusChange, Task, TaskChanges, TaskScope};
use crate::query::TaskQuery;

const TASKS: &str = "tasks";

/// Hands out request-bound clients sharing one HTTP connection pool
#[derive(Clone)]
pub struct PostgrestStoreFactory {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
}

impl PostgrestStoreFactory {
    pub fn new(http: reqwest::Client, config: Arc<BackendConfig>) -> Self {
        Self { http, config }
    }
}

impl TaskStoreFactory for PostgrestStoreFactory {
    fn bind(&self, access_token: Option<&str>) -> Arc<dyn TaskStore> {
        Arc::new(PostgrestTaskStore {
            http: self.http.clone(),
            config: self.config.clone(),
            bearer: access_token
                .map(str::to_string)
                .unwrap_or_else(|| self.config.anon_key.clone()),
        })
    }
}

/// Data API client acting on behalf of one caller
#[derive(Clone)]
pub struct PostgrestTaskStore {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    bearer: String,
}

impl PostgrestTaskStore {
    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, self.config.rest_url(TASKS))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.bearer)
    }

    /// Sends a scoped write and counts the rows the backend reports back
    async fn scoped_write(&self, request: RequestBuilder, scope: TaskScope) -> BackendResult<u64> {
        let response = request
            .query(&scope_filters(scope))
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let rows: Vec<IgnoredAny> = response.json().await?;
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl TaskStore for PostgrestTaskStore {
    async fn list(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let response = self
            .request(Method::GET)
            .query(&list_filters(query))
            .send()
            .await
            .map_err(BackendError::from)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let tasks: Vec<Task> = response.json().await.map_err(BackendError::from)?;
        debug!(count = tasks.len(), "Fetched tasks from data API");
        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> StoreResult<()> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(&task)
            .send()
            .await
            .map_err(BackendError::from)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }
        Ok(())
    }

    async fn update(&self, scope: TaskScope, changes: TaskChanges) -> StoreResult<u64> {
        let request = self.request(Method::PATCH).json(&changes);
        Ok(self.scoped_write(request, scope).await?)
    }

    async fn delete(&self, scope: TaskScope) -> StoreResult<u64> {
        let request = self.request(Method::DELETE);
        Ok(self.scoped_write(request, scope).await?)
    }

    async fn set_status(&self, scope: TaskScope, change: StatusChange) -> StoreResult<u64> {
        let request = self.request(Method::PATCH).json(&change);
        Ok(self.scoped_write(request, scope).await?)
    }
}

/// Query-string filters for a list read
fn list_filters(query: &TaskQuery) -> Vec<(&'static str, String)> {
    let mut filters = vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{}", query.owner())),
    ];

    if let Some(status) = query.status() {
        filters.push(("status", format!("eq.{}", status)));
    }
    if let Some(priority) = query.priority() {
        filters.push(("priority", format!("eq.{}", priority)));
    }
    if let Some(term) = query.search() {
        filters.push(("title", format!("ilike.*{}*", escape_like(term))));
    }

    let order = query
        .ordering()
        .iter()
        .map(|o| format!("{}.{}", o.field.column(), o.direction.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    filters.push(("order", order));

    filters
}

/// `id = ? AND user_id = ?`
fn scope_filters(scope: TaskScope) -> [(&'static str, String); 2] {
    [
        ("id", format!("eq.{}", scope.id)),
        ("user_id", format!("eq.{}", scope.owner)),
    ]
}

/// Escapes SQL LIKE metacharacters so the term matches literally
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
