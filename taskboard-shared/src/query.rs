/// Task list query builder
///
/// Turns the untrusted list query string
/// (`?sort=&direction=&status=&priority=&search=`) into a [`TaskQuery`]
/// that every store executes the same way:
///
/// 1. `user_id = owner` (always, cannot be removed)
/// 2. `status = ?` / `priority = ?` when given and not `all`
/// 3. `title ILIKE %search%` when `search` is non-empty
/// 4. `ORDER BY <sort> <direction>` (default `created_at DESC`), followed by
///    `created_at DESC` when sorting on anything else
///
/// # Example
///
/// ```
/// use taskboard_shared::query::{ListParams, SortDirection, SortField, TaskQuery};
/// use uuid::Uuid;
///
/// let params = ListParams {
///     sort: Some("title".to_string()),
///     direction: Some("asc".to_string()),
///     ..ListParams::default()
/// };
///
/// let query = TaskQuery::from_params(Uuid::new_v4(), &params);
/// let ordering = query.ordering();
/// assert_eq!(ordering[0].field, SortField::Title);
/// assert_eq!(ordering[0].direction, SortDirection::Asc);
/// assert_eq!(ordering[1].field, SortField::CreatedAt);
/// assert_eq!(ordering[1].direction, SortDirection::Desc);
/// ```

use serde::Deserialize;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::models::{Task, TaskPriority, TaskStatus};

/// Filter value meaning "no filter"
pub const ALL_SENTINEL: &str = "all";

/// Raw list query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

/// Sortable task columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    Status,
    DueDate,
}

impl SortField {
    /// Column name in the `tasks` collection
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::DueDate => "due_date",
        }
    }

    /// Parses a column name; anything else is rejected
    pub fn from_column(column: &str) -> Option<SortField> {
        match column {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "title" => Some(SortField::Title),
            "priority" => Some(SortField::Priority),
            "status" => Some(SortField::Status),
            "due_date" => Some(SortField::DueDate),
            _ => None,
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Status => a.status.cmp(&b.status),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Only an explicit `asc` sorts ascending
    pub fn from_param(value: Option<&str>) -> SortDirection {
        match value {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One `ORDER BY` term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Owner-scoped, filtered and ordered read of the task collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    owner: Uuid,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    search: Option<String>,
    sort: SortField,
    direction: SortDirection,
}

impl TaskQuery {
    /// All tasks of `owner`, newest first
    pub fn for_owner(owner: Uuid) -> Self {
        Self {
            owner,
            status: None,
            priority: None,
            search: None,
            sort: SortField::default(),
            direction: SortDirection::default(),
        }
    }

    /// Builds a query from raw list parameters
    ///
    /// Unknown sort columns fall back to `created_at`; unknown filter values
    /// are ignored like `all`.
    pub fn from_params(owner: Uuid, params: &ListParams) -> Self {
        let sort = match params.sort.as_deref().filter(|s| !s.is_empty()) {
            Some(column) => SortField::from_column(column).unwrap_or_else(|| {
                tracing::debug!(column, "Ignoring unknown sort column");
                SortField::default()
            }),
            None => SortField::default(),
        };

        let mut query = Self::for_owner(owner)
            .sorted_by(sort, SortDirection::from_param(params.direction.as_deref()));

        if let Some(raw) = filter_value(params.status.as_deref()) {
            match raw.parse::<TaskStatus>() {
                Ok(status) => query = query.with_status(status),
                Err(_) => tracing::debug!(status = raw, "Ignoring unknown status filter"),
            }
        }

        if let Some(raw) = filter_value(params.priority.as_deref()) {
            match raw.parse::<TaskPriority>() {
                Ok(priority) => query = query.with_priority(priority),
                Err(_) => tracing::debug!(priority = raw, "Ignoring unknown priority filter"),
            }
        }

        if let Some(term) = params.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.with_search(term);
        }

        query
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sorted_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = field;
        self.direction = direction;
        self
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    pub fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Ordering terms: the requested sort, plus a `created_at DESC`
    /// tiebreaker whenever the primary key is not `created_at`
    pub fn ordering(&self) -> Vec<SortOrder> {
        let mut ordering = vec![SortOrder {
            field: self.sort,
            direction: self.direction,
        }];

        if self.sort != SortField::CreatedAt {
            ordering.push(SortOrder {
                field: SortField::CreatedAt,
                direction: SortDirection::Desc,
            });
        }

        ordering
    }

    /// Whether `task` passes the owner predicate and every filter
    pub fn matches(&self, task: &Task) -> bool {
        if task.user_id != self.owner {
            return false;
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        match &self.search {
            Some(term) => task.title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }

    /// Compares two tasks by [`TaskQuery::ordering`]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self.ordering()
            .iter()
            .map(|order| {
                let ordering = order.field.compare(a, b);
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Filters and orders an in-memory collection
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}

/// A filter value that actually filters: present, non-empty, not `all`
fn filter_value(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != ALL_SENTINEL)
}
