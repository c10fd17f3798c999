/// Domain models
///
/// # Models
///
/// - `task`: Tasks, their priority/status enums and write inputs
/// - `identity`: Identities and sessions issued by the identity provider

pub mod identity;
pub mod task;

pub use identity::{Identity, Session};
pub use task::{
    NewTask, StatusChange, Task, TaskChanges, TaskInput, TaskPriority, TaskScope, TaskStatus,
};
