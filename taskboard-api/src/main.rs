//! # Taskboard API Server
//!
//! Task-management service backed by a hosted identity provider and, by
//! default, the provider's data API.
//!
//! ## Usage
//!
//! ```bash
//! BACKEND_URL=https://project.supabase.co BACKEND_ANON_KEY=... cargo run -p taskboard-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON logs and `RUST_LOG` to override the filter.

use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StoreKind},
};
use taskboard_shared::{
    backend::auth::{AuthProvider, GoTrueClient},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    store::{MemoryTaskStore, PgTaskStore, PostgrestStoreFactory, TaskStoreFactory},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let backend = Arc::new(config.backend.clone());
    let http = backend
        .http_client()
        .context("Failed to build backend HTTP client")?;
    let auth: Arc<dyn AuthProvider> = Arc::new(GoTrueClient::with_client(http.clone(), backend.clone()));

    let (tasks, db): (Arc<dyn TaskStoreFactory>, Option<PgPool>) = match config.store.kind {
        StoreKind::Rest => (Arc::new(PostgrestStoreFactory::new(http, backend)), None),
        StoreKind::Postgres => {
            let database = config
                .store
                .database
                .clone()
                .context("Postgres store selected without database configuration")?;
            let pool = create_pool(database)
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool).await.context("Failed to run migrations")?;
            (Arc::new(PgTaskStore::new(pool.clone())), Some(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory task store; tasks are lost on restart");
            (Arc::new(MemoryTaskStore::new()), None)
        }
    };

    tracing::info!(store = %config.store.kind, backend = %config.backend.url, "Backends configured");

    let address = config.bind_address();
    let mut state = AppState::new(config, auth, tasks);
    if let Some(pool) = db.clone() {
        state = state.with_database(pool);
    }

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = db {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
