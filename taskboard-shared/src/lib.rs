//! # Taskboard Shared Library
//!
//! Domain types and backend access used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: tasks and identities
//! - `validation`: form schemas producing typed input or field errors
//! - `query`: owner-scoped list queries (filters, search, ordering)
//! - `backend`: hosted identity provider client and shared configuration
//! - `store`: task persistence (data API, PostgreSQL, in-memory)
//! - `auth`: session cookies and the per-request context
//! - `db`: PostgreSQL pool and migrations for the direct store

pub mod auth;
pub mod backend;
pub mod db;
pub mod models;
pub mod query;
pub mod store;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
