/// In-memory task store
///
/// Keeps every task in a `Vec` behind a tokio `RwLock`. Clones share the same
/// data, so a single instance can serve as both store and factory.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreResult, TaskStore, TaskStoreFactory};
use crate::models::{NewTask, StatusChange, Task, TaskChanges, TaskScope};
use crate::query::TaskQuery;

#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts fully formed tasks as-is
    pub async fn seed(&self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.write().await.extend(tasks);
    }

    /// Snapshot of every stored task, regardless of owner
    pub async fn all(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        Ok(query.apply(self.tasks.read().await.iter()))
    }

    async fn insert(&self, task: NewTask) -> StoreResult<()> {
        let now = Utc::now();
        let NewTask { user_id, fields } = task;

        self.tasks.write().await.push(Task {
            id: Uuid::new_v4(),
            user_id,
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            status: fields.status,
            due_date: fields.due_date,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn update(&self, scope: TaskScope, changes: TaskChanges) -> StoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let mut matched = 0;

        for task in tasks.iter_mut().filter(|t| scope.matches(t)) {
            let fields = changes.fields.clone();
            task.title = fields.title;
            task.description = fields.description;
            task.priority = fields.priority;
            task.status = fields.status;
            task.due_date = fields.due_date;
            task.updated_at = changes.updated_at;
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&self, scope: TaskScope) -> StoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !scope.matches(t));
        Ok((before - tasks.len()) as u64)
    }

    async fn set_status(&self, scope: TaskScope, change: StatusChange) -> StoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let mut matched = 0;

        for task in tasks.iter_mut().filter(|t| scope.matches(t)) {
            task.status = change.status;
            task.updated_at = change.updated_at;
            matched += 1;
        }
        Ok(matched)
    }
}

impl TaskStoreFactory for MemoryTaskStore {
    fn bind(&self, _access_token: Option<&str>) -> Arc<dyn TaskStore> {
        Arc::new(self.clone())
    }
}
