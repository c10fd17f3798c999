/// Per-request authentication context
///
/// The session layer resolves the caller once per request and stores a
/// [`RequestContext`] in the request extensions. Handlers take it with
/// `Extension<RequestContext>`.
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::context::RequestContext;
///
/// async fn handler(Extension(ctx): Extension<RequestContext>) -> String {
///     match ctx.identity() {
///         Some(identity) => format!("Hello, {}", identity.id),
///         None => "Hello, stranger".to_string(),
///     }
/// }
/// ```

use std::fmt;
use std::sync::Arc;

use crate::models::Identity;
use crate::store::TaskStore;

#[derive(Clone)]
pub struct RequestContext {
    /// Provider-verified identity, `None` for anonymous requests
    pub identity: Option<Identity>,

    /// Access token the identity was verified with (after any refresh)
    pub access_token: Option<String>,

    /// Task store bound to this caller's credentials
    pub tasks: Arc<dyn TaskStore>,
}

impl RequestContext {
    pub fn anonymous(tasks: Arc<dyn TaskStore>) -> Self {
        Self {
            identity: None,
            access_token: None,
            tasks,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("identity", &self.identity)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use uuid::Uuid;

    #[test]
    fn test_debug_redacts_token() {
        let ctx = RequestContext {
            identity: Some(Identity {
                id: Uuid::new_v4(),
                email: Some("ada@example.com".to_string()),
            }),
            access_token: Some("secret-token".to_string()),
            tasks: Arc::new(MemoryTaskStore::new()),
        };

        let debug = format!("{:?}", ctx);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
        assert!(ctx.is_authenticated());
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::anonymous(Arc::new(MemoryTaskStore::new()));
        assert!(ctx.identity().is_none());
        assert!(!ctx.is_authenticated());
    }
}
