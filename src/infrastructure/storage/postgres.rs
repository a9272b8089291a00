//! PostgreSQL connection pooling

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Build the bounded connection pool the store adapters run against
///
/// The pool is created once at startup and shared; each store operation
/// acquires a connection for a single statement and releases it on every
/// exit path.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::connection(format!("Failed to connect to PostgreSQL: {}", e)))
}
