/// Identity and session types handed out by the identity provider
///
/// These are read-only to this service: the provider issues, rotates and
/// revokes them, we only carry them between cookies and provider calls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user reference
///
/// Deserializes from the provider's user object; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user ID, used as the owner of tasks
    pub id: Uuid,

    /// Email address, if the provider exposes one
    #[serde(default)]
    pub email: Option<String>,
}

/// A session issued by the provider (sign-in, sign-up or refresh)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer token
    pub access_token: String,

    /// Long-lived token used to rotate the access token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// The identity this session belongs to
    pub user: Identity,
}

impl Session {
    /// Default access token lifetime when the provider omits `expires_in`
    pub const DEFAULT_EXPIRES_IN: i64 = 3600;

    /// Access token lifetime, falling back to one hour
    pub fn expires_in_seconds(&self) -> i64 {
        self.expires_in.unwrap_or(Self::DEFAULT_EXPIRES_IN)
    }
}
