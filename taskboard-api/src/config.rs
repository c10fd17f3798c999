/// Configuration management for the API server
///
/// Configuration is read from environment variables (and a `.env` file when
/// present) into typed sections.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `APP_ENV`: `production` enables `Secure` cookies and HSTS
/// - `BACKEND_URL`: hosted backend base URL (required)
/// - `BACKEND_ANON_KEY`: hosted backend anon key (required)
/// - `BACKEND_TIMEOUT_SECONDS`: per-request timeout for backend calls (default: 10)
/// - `TASK_STORE`: `rest` (default), `postgres` or `memory`
/// - `DATABASE_URL`: PostgreSQL URL, required when `TASK_STORE=postgres`
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::{env, fmt, str::FromStr};
use taskboard_shared::{backend::BackendConfig, db::pool::DatabaseConfig};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    /// Hosted identity provider and data API
    pub backend: BackendConfig,

    /// Where tasks are persisted
    pub store: StoreConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HTTPS-only cookies, HSTS)
    pub production: bool,
}

/// Task persistence backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// Hosted data API over HTTP
    #[default]
    Rest,

    /// Direct PostgreSQL connection
    Postgres,

    /// Process memory; data is lost on restart
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Rest => "rest",
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "postgrest" => Ok(StoreKind::Rest),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => anyhow::bail!("unknown TASK_STORE {:?} (expected rest, postgres or memory)", other),
        }
    }
}

/// Task store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub kind: StoreKind,

    /// Pool settings, present only for [`StoreKind::Postgres`]
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let backend_url = env::var("BACKEND_URL")
            .map_err(|_| anyhow::anyhow!("BACKEND_URL environment variable is required"))?;
        let anon_key = env::var("BACKEND_ANON_KEY")
            .map_err(|_| anyhow::anyhow!("BACKEND_ANON_KEY environment variable is required"))?;

        let mut backend = BackendConfig::new(backend_url, anon_key);
        if let Ok(timeout) = env::var("BACKEND_TIMEOUT_SECONDS") {
            backend.request_timeout_seconds = timeout
                .parse()
                .context("BACKEND_TIMEOUT_SECONDS must be a number of seconds")?;
        }

        let kind = match env::var("TASK_STORE") {
            Ok(value) => value.parse::<StoreKind>()?,
            Err(_) => StoreKind::default(),
        };

        let database = match kind {
            StoreKind::Postgres => {
                let url = env::var("DATABASE_URL").map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL environment variable is required for TASK_STORE=postgres")
                })?;
                let mut database = DatabaseConfig::new(url);
                if let Ok(max) = env::var("DATABASE_MAX_CONNECTIONS") {
                    database.max_connections =
                        max.parse().context("DATABASE_MAX_CONNECTIONS must be a number")?;
                }
                Some(database)
            }
            StoreKind::Rest | StoreKind::Memory => None,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            backend,
            store: StoreConfig { kind, database },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Development defaults around the given backend, used by tests
    pub fn for_backend(backend: BackendConfig) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            backend,
            store: StoreConfig {
                kind: StoreKind::Memory,
                database: None,
            },
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
