//! Common test utilities for integration tests
//!
//! - `StubAuth`: in-process identity provider keyed by access token
//! - `FailingStore`: a task store whose every call fails
//! - `TestContext`: router over the in-memory store plus request helpers

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU16, Ordering},
        Arc, Mutex,
    },
};
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    backend::{
        auth::{AuthProvider, SignUpOutcome},
        BackendConfig, BackendError, BackendResult,
    },
    models::{
        Identity, NewTask, Session, StatusChange, Task, TaskChanges, TaskPriority, TaskScope,
        TaskStatus,
    },
    query::TaskQuery,
    store::{MemoryTaskStore, StoreError, StoreResult, TaskStore, TaskStoreFactory},
};
use tower::Service as _;
use uuid::Uuid;

fn rejected(status: u16, message: &str) -> BackendError {
    BackendError::Provider {
        status,
        code: None,
        message: message.to_string(),
    }
}

/// Identity provider double
#[derive(Default)]
pub struct StubAuth {
    /// access token -> identity
    tokens: Mutex<HashMap<String, Identity>>,

    /// refresh token -> identity it refreshes
    refresh_tokens: Mutex<HashMap<String, Identity>>,

    /// email -> (password, identity)
    accounts: Mutex<HashMap<String, (String, Identity)>>,

    /// When set, every call fails as if the provider were down
    pub unreachable: AtomicBool,

    /// When non-zero, every call is answered with this error status
    pub failing_status: AtomicU16,
}

impl StubAuth {
    /// Registers a user and returns a valid access token for it
    pub fn issue_token(&self, email: &str) -> (Identity, String) {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        let token = format!("access-{}", Uuid::new_v4());
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), identity.clone());
        (identity, token)
    }

    /// Registers a refresh token for `identity`
    pub fn issue_refresh_token(&self, identity: &Identity) -> String {
        let token = format!("refresh-{}", Uuid::new_v4());
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(token.clone(), identity.clone());
        token
    }

    pub fn add_account(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), identity.clone()));
        identity
    }

    pub fn is_active(&self, access_token: &str) -> bool {
        self.tokens.lock().unwrap().contains_key(access_token)
    }

    fn check_reachable(&self) -> BackendResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        match self.failing_status.load(Ordering::SeqCst) {
            0 => Ok(()),
            status => Err(rejected(status, "Service Unavailable")),
        }
    }

    fn new_session(&self, identity: Identity) -> Session {
        let access_token = format!("access-{}", Uuid::new_v4());
        let refresh_token = self.issue_refresh_token(&identity);
        self.tokens
            .lock()
            .unwrap()
            .insert(access_token.clone(), identity.clone());

        Session {
            access_token,
            refresh_token,
            expires_in: Some(3600),
            user: identity,
        }
    }
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn get_user(&self, access_token: &str) -> BackendResult<Identity> {
        self.check_reachable()?;
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| rejected(401, "invalid JWT: token is expired"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        self.check_reachable()?;
        let identity = self
            .refresh_tokens
            .lock()
            .unwrap()
            .remove(refresh_token)
            .ok_or_else(|| rejected(400, "Invalid Refresh Token: Refresh Token Not Found"))?;
        Ok(self.new_session(identity))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.check_reachable()?;
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((expected, identity)) if expected == password => Ok(self.new_session(identity)),
            _ => Err(rejected(400, "Invalid login credentials")),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        self.check_reachable()?;
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(rejected(422, "User already registered"));
        }
        let identity = self.add_account(email, password);
        Ok(SignUpOutcome::SignedIn(self.new_session(identity)))
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        self.check_reachable()?;
        self.tokens.lock().unwrap().remove(access_token);
        Ok(())
    }
}

/// Task store that fails every operation
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> StoreResult<T> {
        Err(StoreError::Unavailable("simulated outage".to_string()))
    }
}

#[async_trait]
impl TaskStore for FailingStore {
    async fn list(&self, _query: &TaskQuery) -> StoreResult<Vec<Task>> {
        Self::fail()
    }

    async fn insert(&self, _task: NewTask) -> StoreResult<()> {
        Self::fail()
    }

    async fn update(&self, _scope: TaskScope, _changes: TaskChanges) -> StoreResult<u64> {
        Self::fail()
    }

    async fn delete(&self, _scope: TaskScope) -> StoreResult<u64> {
        Self::fail()
    }

    async fn set_status(&self, _scope: TaskScope, _change: StatusChange) -> StoreResult<u64> {
        Self::fail()
    }
}

impl TaskStoreFactory for FailingStore {
    fn bind(&self, _access_token: Option<&str>) -> Arc<dyn TaskStore> {
        Arc::new(self.clone())
    }
}

/// Router plus the doubles behind it
pub struct TestContext {
    pub app: Router,
    pub auth: Arc<StubAuth>,
    pub store: MemoryTaskStore,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryTaskStore::new();
        Self::build(store.clone(), Arc::new(store))
    }

    /// Context whose task store always fails
    pub fn with_failing_store() -> Self {
        Self::build(MemoryTaskStore::new(), Arc::new(FailingStore))
    }

    fn build(store: MemoryTaskStore, factory: Arc<dyn TaskStoreFactory>) -> Self {
        let auth = Arc::new(StubAuth::default());
        let config = Config::for_backend(BackendConfig::new("http://127.0.0.1:9", "anon"));
        let state = AppState::new(config, auth.clone(), factory);

        Self {
            app: build_router(state),
            auth,
            store,
        }
    }

    pub async fn call(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, access_cookie(token));
        }
        self.call(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, token: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, access_cookie(token));
        }
        self.call(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub fn access_cookie(token: &str) -> String {
    format!("tb-access-token={}", token)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// A stored task for seeding, created `age_minutes` ago
pub fn task(owner: Uuid, title: &str, priority: TaskPriority, status: TaskStatus, age_minutes: i64) -> Task {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Task {
        id: Uuid::new_v4(),
        user_id: owner,
        title: title.to_string(),
        description: None,
        priority,
        status,
        due_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        created_at,
        updated_at: created_at,
    }
}
