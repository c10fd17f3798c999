/// API route handlers
///
/// - `health`: health check
/// - `pages`: page data loaders and guards (home, session, signup, login)
/// - `auth`: sign-up, login and logout form actions
/// - `tasks`: task list loader and task form actions

pub mod auth;
pub mod health;
pub mod pages;
pub mod tasks;
