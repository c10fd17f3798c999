/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::backend::auth::GoTrueClient;
/// use taskboard_shared::store::MemoryTaskStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let auth = GoTrueClient::new(config.backend.clone())?;
/// let state = AppState::new(config, Arc::new(auth), Arc::new(MemoryTaskStore::new()));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_layer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::{backend::auth::AuthProvider, store::TaskStoreFactory};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Identity provider
    pub auth: Arc<dyn AuthProvider>,

    /// Builds the request-bound task store
    pub tasks: Arc<dyn TaskStoreFactory>,

    /// Pool of the direct PostgreSQL store, when that store is in use
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(config: Config, auth: Arc<dyn AuthProvider>, tasks: Arc<dyn TaskStoreFactory>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            tasks,
            db: None,
        }
    }

    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }

    /// Whether session cookies get the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete router
///
/// ```text
/// GET  /health
/// GET  /session          layout data: { session: { user } | null }
/// GET  /                 { user }, anonymous -> 303 /login
/// GET  /signup, /login   {}, authenticated -> 303 /
/// POST /signup, /login, /logout
/// GET  /tasks            { user, tasks }, anonymous -> 303 /login
/// POST /tasks?action=    create | update | delete | toggleStatus
/// ```
///
/// The session layer runs on every route so each handler sees a
/// `RequestContext`.
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/session", get(routes::pages::session))
        .route("/", get(routes::pages::home))
        .route(
            "/signup",
            get(routes::pages::signup_page).post(routes::auth::signup),
        )
        .route("/login", get(routes::pages::login_page).post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route(
            "/tasks",
            get(routes::tasks::load_tasks).post(routes::tasks::task_action),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
