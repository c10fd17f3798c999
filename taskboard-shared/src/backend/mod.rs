/// Hosted backend (identity provider + data API)
///
/// The service talks to a GoTrue-compatible identity endpoint under
/// `{url}/auth/v1` and a PostgREST-compatible data endpoint under
/// `{url}/rest/v1`. Both require the project's anon key in the `apikey`
/// header.
///
/// # Modules
///
/// - [`auth`]: [`auth::AuthProvider`] trait and the HTTP implementation
///
/// The data endpoint client lives in [`crate::store::postgrest`].

pub mod auth;

use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the hosted backend
///
/// Built once at start-up and shared read-only by every request-scoped
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`
    pub url: String,

    /// Public anon key sent as `apikey`
    pub anon_key: String,

    /// Per-request timeout for backend HTTP calls
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            request_timeout_seconds: Self::DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// URL of an identity endpoint, `path` without leading slash
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    /// URL of a data collection
    pub fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.url, collection)
    }

    /// Builds the shared HTTP client used by all backend clients
    pub fn http_client(&self) -> Result<reqwest::Client, BackendError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::from)
    }
}

/// Errors from the identity provider or the data API
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error status
    #[error("{message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The backend answered with a body we could not decode
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

/// Backend result type alias
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// HTTP status of a provider error
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }

    /// The backend could not judge the request: unreachable, failing (5xx)
    /// or rate limiting (429). Says nothing about the credentials sent.
    pub fn is_unavailable(&self) -> bool {
        self.is_network() || matches!(self.status(), Some(status) if status >= 500 || status == 429)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Error body shapes used by GoTrue and PostgREST
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
}

/// Turns a non-success response into [`BackendError::Provider`]
pub(crate) async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

    let message = body
        .message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("backend returned status {}", status));

    let code = body.error_code.or_else(|| match body.code {
        Some(serde_json::Value::String(code)) => Some(code),
        _ => body.error,
    });

    BackendError::Provider {
        status,
        code,
        message,
    }
}
