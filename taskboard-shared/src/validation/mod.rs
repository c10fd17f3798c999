/// Form validation
///
/// Each schema is a `validator`-derived form struct plus a conversion into
/// typed data. Validation is pure and synchronous and returns a tagged
/// result: `Ok(typed)` or `Err(FieldErrors)`, where [`FieldErrors`] maps each
/// offending field to every message raised for it, so a form can render
/// errors next to the right inputs.
///
/// # Schemas
///
/// - [`auth::SignUpForm`]: email, password, confirmPassword (must match)
/// - [`auth::LoginForm`]: email, password
/// - [`task::TaskForm`]: title, description, priority, due_date, status
///
/// # Example
///
/// ```
/// use taskboard_shared::validation::task::TaskForm;
///
/// let form = TaskForm {
///     title: Some(String::new()),
///     ..TaskForm::default()
/// };
///
/// let errors = form.into_input().unwrap_err();
/// assert!(errors.contains("title"));
/// assert!(errors.contains("priority"));
/// ```

pub mod auth;
pub mod task;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Raw submitted form fields, echoed back on failure for repopulation
pub type FormData = BTreeMap<String, String>;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for `field`, keeping earlier messages
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Moves every message of `field` into the other field name.
    ///
    /// Used where the Rust field name differs from the submitted form name.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(messages) = self.0.remove(from) {
            self.0.entry(to.to_string()).or_default().extend(messages);
        }
    }

    /// Merges all messages of `other` into `self`
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Reads an optional field out of submitted form data
pub(crate) fn field(data: &FormData, name: &str) -> Option<String> {
    data.get(name).cloned()
}
