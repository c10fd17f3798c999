/// Task list and task form actions
///
/// # Endpoints
///
/// - `GET /tasks?sort=&direction=&status=&priority=&search=` - the caller's
///   tasks, filtered and ordered
/// - `POST /tasks?action=<create|update|delete|toggleStatus>` - form action;
///   the action may also be sent as `?/create` or as an `action` form field
///
/// Every read and write is scoped to the caller: reads through
/// [`TaskQuery`], writes through [`TaskScope`] (`id` AND owner). A write
/// naming another owner's task matches nothing and still reports success, so
/// the other task's existence is never revealed.

use axum::{
    extract::{Query, RawQuery},
    Extension, Form, Json,
};
use chrono::Utc;
use serde::Serialize;
use std::{fmt, str::FromStr};
use taskboard_shared::{
    auth::RequestContext,
    models::{Identity, NewTask, StatusChange, Task, TaskChanges, TaskScope, TaskStatus},
    query::{ListParams, TaskQuery},
    store::StoreError,
    validation::{task::TaskForm, FieldErrors, FormData},
};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{ActionResponse, ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct TaskListPage {
    pub user: Identity,
    pub tasks: Vec<Task>,
}

/// `GET /tasks`
///
/// A query string that does not parse is treated as empty. A backend failure
/// is logged and the page renders with an empty list.
pub async fn load_tasks(
    Extension(ctx): Extension<RequestContext>,
    params: Option<Query<ListParams>>,
) -> ApiResult<Json<TaskListPage>> {
    let user = ctx.identity.clone().ok_or(ApiError::Redirect("/login"))?;

    let params = match params {
        Some(Query(params)) => params,
        None => {
            debug!("Ignoring malformed task list query");
            ListParams::default()
        }
    };
    let query = TaskQuery::from_params(user.id, &params);

    let tasks = match ctx.tasks.list(&query).await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "Error fetching tasks");
            Vec::new()
        }
    };

    Ok(Json(TaskListPage { user, tasks }))
}

/// Named form actions on `/tasks`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Create,
    Update,
    Delete,
    ToggleStatus,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::Create => "create",
            TaskAction::Update => "update",
            TaskAction::Delete => "delete",
            TaskAction::ToggleStatus => "toggleStatus",
        }
    }

    /// Reads the action from `?action=name`, `?/name` or the `action` field
    fn from_request(query: Option<&str>, data: &FormData) -> ApiResult<TaskAction> {
        let from_query = query.and_then(|query| {
            query.split('&').find_map(|pair| match pair.split_once('=') {
                Some(("action", name)) => Some(name),
                Some((key, _)) => key.strip_prefix('/'),
                None => pair.strip_prefix('/'),
            })
        });

        let name = from_query
            .or_else(|| data.get("action").map(String::as_str))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No form action given".to_string()))?;

        name.parse()
    }
}

impl FromStr for TaskAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(TaskAction::Create),
            "update" => Ok(TaskAction::Update),
            "delete" => Ok(TaskAction::Delete),
            "toggleStatus" => Ok(TaskAction::ToggleStatus),
            other => Err(ApiError::BadRequest(format!("Unknown form action: {}", other))),
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /tasks`
pub async fn task_action(
    Extension(ctx): Extension<RequestContext>,
    RawQuery(query): RawQuery,
    Form(mut data): Form<FormData>,
) -> ApiResult<Json<ActionResponse>> {
    let action = match TaskAction::from_request(query.as_deref(), &data) {
        Ok(action) => action,
        Err(_) if !ctx.is_authenticated() => {
            return Err(ApiError::unauthorized("You must be logged in to manage tasks"))
        }
        Err(e) => return Err(e),
    };
    data.remove("action");
    debug!(%action, "Task form action");

    match action {
        TaskAction::Create => create(&ctx, data).await,
        TaskAction::Update => update(&ctx, data).await,
        TaskAction::Delete => delete(&ctx, data).await,
        TaskAction::ToggleStatus => toggle_status(&ctx, data).await,
    }
}

async fn create(ctx: &RequestContext, data: FormData) -> ApiResult<Json<ActionResponse>> {
    let owner = require_identity(ctx, "You must be logged in to create a task")?;

    let fields = match TaskForm::from_form(&data).into_input() {
        Ok(fields) => fields,
        Err(errors) => return Err(ApiError::Validation { errors, data }),
    };

    if let Err(e) = ctx.tasks.insert(NewTask { user_id: owner, fields }).await {
        log_store_error(TaskAction::Create, owner, &e);
        return Err(ApiError::server(
            "Failed to create task. Please try again.",
            Some(data),
        ));
    }

    info!(user_id = %owner, "Task created");
    Ok(ActionResponse::ok("Task created successfully"))
}

async fn update(ctx: &RequestContext, data: FormData) -> ApiResult<Json<ActionResponse>> {
    let owner = require_identity(ctx, "You must be logged in to update a task")?;

    let id = task_id(&data);
    let fields = TaskForm::from_form(&data).into_input();
    let (id, fields) = match (id, fields) {
        (Ok(id), Ok(fields)) => (id, fields),
        (id, fields) => {
            let mut errors = FieldErrors::new();
            if let Err(e) = id {
                errors.merge(e);
            }
            if let Err(e) = fields {
                errors.merge(e);
            }
            return Err(ApiError::Validation { errors, data });
        }
    };

    let changes = TaskChanges {
        fields,
        updated_at: Utc::now(),
    };

    match ctx.tasks.update(TaskScope::new(id, owner), changes).await {
        Ok(rows) => log_rows(TaskAction::Update, id, owner, rows),
        Err(e) => {
            log_store_error(TaskAction::Update, owner, &e);
            return Err(ApiError::server("Failed to update task", Some(data)));
        }
    }

    Ok(ActionResponse::ok("Task updated successfully"))
}

async fn delete(ctx: &RequestContext, data: FormData) -> ApiResult<Json<ActionResponse>> {
    let owner = require_identity(ctx, "You must be logged in to delete a task")?;

    let id = match task_id(&data) {
        Ok(id) => id,
        Err(errors) => return Err(ApiError::Validation { errors, data }),
    };

    match ctx.tasks.delete(TaskScope::new(id, owner)).await {
        Ok(rows) => log_rows(TaskAction::Delete, id, owner, rows),
        Err(e) => {
            log_store_error(TaskAction::Delete, owner, &e);
            return Err(ApiError::server("Failed to delete task", None));
        }
    }

    Ok(ActionResponse::ok("Task deleted successfully"))
}

async fn toggle_status(ctx: &RequestContext, data: FormData) -> ApiResult<Json<ActionResponse>> {
    let owner = require_identity(ctx, "You must be logged in to update a task")?;

    let mut errors = FieldErrors::new();
    let id = task_id(&data).map_err(|e| errors.merge(e)).ok();
    let current = data.get("currentStatus").filter(|s| !s.is_empty()).cloned();
    if current.is_none() {
        errors.add("currentStatus", "Current status is required");
    }

    let (Some(id), Some(current)) = (id, current) else {
        return Err(ApiError::Validation { errors, data });
    };

    let change = StatusChange {
        status: TaskStatus::toggled_from(&current),
        updated_at: Utc::now(),
    };

    match ctx.tasks.set_status(TaskScope::new(id, owner), change).await {
        Ok(rows) => log_rows(TaskAction::ToggleStatus, id, owner, rows),
        Err(e) => {
            log_store_error(TaskAction::ToggleStatus, owner, &e);
            return Err(ApiError::server("Failed to update status", None));
        }
    }

    Ok(ActionResponse::ok("Task status updated"))
}

fn require_identity(ctx: &RequestContext, message: &str) -> ApiResult<Uuid> {
    ctx.identity()
        .map(|identity| identity.id)
        .ok_or_else(|| ApiError::unauthorized(message))
}

/// Parses the `id` form field
fn task_id(data: &FormData) -> Result<Uuid, FieldErrors> {
    let mut errors = FieldErrors::new();

    match data.get("id").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => errors.add("id", "Task id is required"),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => return Ok(id),
            Err(_) => errors.add("id", "Task id is invalid"),
        },
    }

    Err(errors)
}

fn log_rows(action: TaskAction, id: Uuid, owner: Uuid, rows: u64) {
    if rows == 0 {
        info!(%action, task_id = %id, user_id = %owner, "Task action matched no rows");
    } else {
        debug!(%action, task_id = %id, user_id = %owner, rows, "Task action applied");
    }
}

fn log_store_error(action: TaskAction, owner: Uuid, error: &StoreError) {
    error!(%action, user_id = %owner, error = %error, "Task store operation failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_action_from_query() {
        let empty = FormData::new();
        assert_eq!(
            TaskAction::from_request(Some("action=create"), &empty).unwrap(),
            TaskAction::Create
        );
        assert_eq!(
            TaskAction::from_request(Some("/toggleStatus"), &empty).unwrap(),
            TaskAction::ToggleStatus
        );
        assert_eq!(
            TaskAction::from_request(Some("/delete="), &empty).unwrap(),
            TaskAction::Delete
        );
    }

    #[test]
    fn test_action_from_form_field() {
        let data = form(&[("action", "update"), ("id", "x")]);
        assert_eq!(TaskAction::from_request(None, &data).unwrap(), TaskAction::Update);
    }

    #[test]
    fn test_unknown_or_missing_action() {
        let empty = FormData::new();
        assert!(matches!(
            TaskAction::from_request(Some("action=archive"), &empty),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            TaskAction::from_request(None, &empty),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_task_id_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(task_id(&form(&[("id", id.to_string().as_str())])).unwrap(), id);

        let missing = task_id(&FormData::new()).unwrap_err();
        assert_eq!(missing.get("id").unwrap(), ["Task id is required"]);

        let invalid = task_id(&form(&[("id", "42")])).unwrap_err();
        assert_eq!(invalid.get("id").unwrap(), ["Task id is invalid"]);
    }
}
