/// Task form schema
///
/// | field         | required | constraint                         |
/// |---------------|----------|------------------------------------|
/// | `title`       | yes      | 1-100 characters                   |
/// | `description` | no       | at most 500 characters             |
/// | `priority`    | yes      | `Low`, `Medium` or `High`          |
/// | `due_date`    | yes      | `YYYY-MM-DD`                       |
/// | `status`      | no       | `Pending`, `In Progress`, `Completed`; defaults to `Pending` |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{field, FieldErrors, FormData};
use crate::models::{TaskInput, TaskPriority, TaskStatus};

const TITLE_REQUIRED: &str = "Title is required";
const PRIORITY_MESSAGE: &str = "Please select a priority level";
const STATUS_MESSAGE: &str = "Please select a valid status";
const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw task form as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    /// Emptiness is checked in [`TaskForm::into_input`]
    #[validate(
        required(message = "Title is required"),
        length(max = 100, message = "Title must be 100 characters or less")
    )]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    pub description: Option<String>,

    #[validate(required(message = "Please select a priority level"))]
    pub priority: Option<String>,

    #[validate(
        required(message = "Due date is required"),
        length(min = 1, message = "Due date is required")
    )]
    pub due_date: Option<String>,

    /// Absent means `Pending`
    pub status: Option<String>,
}

impl TaskForm {
    /// Picks the task fields out of submitted form data
    pub fn from_form(data: &FormData) -> Self {
        Self {
            title: field(data, "title"),
            description: field(data, "description"),
            priority: field(data, "priority"),
            due_date: field(data, "due_date"),
            status: field(data, "status"),
        }
    }

    /// Validates the form and converts it into typed task fields
    ///
    /// An empty description is normalised to `None`.
    pub fn into_input(self) -> Result<TaskInput, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        if self.title.as_deref() == Some("") {
            errors.add("title", TITLE_REQUIRED);
        }

        let priority = match self.priority.as_deref() {
            Some(raw) => match raw.parse::<TaskPriority>() {
                Ok(priority) => Some(priority),
                Err(_) => {
                    errors.add("priority", PRIORITY_MESSAGE);
                    None
                }
            },
            None => None,
        };

        let due_date = match self.due_date.as_deref() {
            Some(raw) if !raw.is_empty() => match NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("due_date", "Due date must be a valid date (YYYY-MM-DD)");
                    None
                }
            },
            _ => None,
        };

        let status = match self.status.as_deref() {
            None => Some(TaskStatus::default()),
            Some(raw) => match raw.parse::<TaskStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.add("status", STATUS_MESSAGE);
                    None
                }
            },
        };

        match (self.title, priority, due_date, status) {
            (Some(title), Some(priority), Some(due_date), Some(status)) if errors.is_empty() => {
                Ok(TaskInput {
                    title,
                    description: self.description.filter(|d| !d.is_empty()),
                    priority,
                    due_date,
                    status,
                })
            }
            _ => Err(errors),
        }
    }
}
