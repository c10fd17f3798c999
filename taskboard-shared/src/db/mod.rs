/// Direct PostgreSQL access
///
/// Only used when the service is configured with the `postgres` store; the
/// default store talks to the hosted data API over HTTP.
///
/// - `pool`: connection pool with a health check
/// - `migrations`: embedded schema migrations

pub mod migrations;
pub mod pool;
