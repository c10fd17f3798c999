/// Identity provider client
///
/// Identity is always verified by asking the provider (`GET /auth/v1/user`)
/// rather than trusting whatever token a cookie holds; token signing,
/// expiry and rotation stay entirely on the provider side.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::backend::{auth::{AuthProvider, GoTrueClient}, BackendConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BackendConfig::new("https://project.supabase.co", "anon-key");
/// let auth = GoTrueClient::new(config)?;
///
/// let session = auth.sign_in_with_password("ada@example.com", "hunter22").await?;
/// let identity = auth.get_user(&session.access_token).await?;
/// assert_eq!(identity.id, session.user.id);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{error_from_response, BackendConfig, BackendResult};
use crate::models::{Identity, Session};

/// Result of a sign-up call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is active and signed in
    SignedIn(Session),

    /// The account exists but the email must be confirmed first
    ConfirmationRequired(Identity),
}

/// Operations this service needs from the identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verifies an access token with the provider and returns its identity
    async fn get_user(&self, access_token: &str) -> BackendResult<Identity>;

    /// Exchanges a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session>;

    /// Email/password sign-in
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Email/password sign-up
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome>;

    /// Revokes the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}

/// GoTrue-compatible HTTP client
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
}

/// Sign-up response: a session when auto-confirm is on, else the bare user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(Identity),
}

impl GoTrueClient {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let http = config.http_client()?;
        Ok(Self::with_client(http, Arc::new(config)))
    }

    /// Shares an existing HTTP client and configuration
    pub fn with_client(http: reqwest::Client, config: Arc<BackendConfig>) -> Self {
        Self { http, config }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.config.auth_url(path))
            .header("apikey", &self.config.anon_key)
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> BackendResult<Session> {
        let response = self
            .request(reqwest::Method::POST, "token")
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json::<Session>().await?)
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> BackendResult<Identity> {
        let response = self
            .request(reqwest::Method::GET, "user")
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            debug!(error = %err, "Access token rejected by identity provider");
            return Err(err);
        }

        Ok(response.json::<Identity>().await?)
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let response = self
            .request(reqwest::Method::POST, "signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(session) => SignUpOutcome::SignedIn(session),
            SignUpResponse::User(identity) => SignUpOutcome::ConfirmationRequired(identity),
        })
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let response = self
            .request(reqwest::Method::POST, "logout")
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            warn!(error = %err, "Sign-out rejected by identity provider");
            return Err(err);
        }

        Ok(())
    }
}
