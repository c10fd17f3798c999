/// Session plumbing shared by the API layers
///
/// # Modules
///
/// - [`cookies`]: reading and writing the session token cookies
/// - [`context`]: the per-request [`context::RequestContext`]
/// - [`messages`]: user-facing messages for provider failures
///
/// Token verification itself is delegated to the identity provider; see
/// [`crate::backend::auth`].

pub mod context;
pub mod cookies;
pub mod messages;

pub use context::RequestContext;
