/// Middleware for the API server
///
/// - `session`: resolves the caller's identity from session cookies
/// - `security`: security response headers

pub mod security;
pub mod session;
