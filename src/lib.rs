//! Keygate
//!
//! Project-scoped API key authorization:
//! - Key-sets of three privilege tiers (master, read, write) per project
//! - Durable PostgreSQL storage behind a bounded connection pool
//! - Read-through verification cache with per-project single-flight loads
//!
//! The service is consumed in-process by an authorization layer; no wire
//! protocol is exposed here.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{AccessKeyType, DomainError, ProjectApiKeys};
pub use infrastructure::api_key::ApiKeyService;

use std::sync::Arc;

use infrastructure::api_key::{ApiKeyGenerator, PostgresApiKeyStore};
use infrastructure::storage::connect_pool;
use tracing::info;

/// Connect to PostgreSQL, ensure the key schema exists and assemble the
/// API key service.
pub async fn create_api_key_service(
    config: &AppConfig,
) -> Result<ApiKeyService<PostgresApiKeyStore>, DomainError> {
    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(&config.database).await?;
    info!("PostgreSQL connection established");

    let store = PostgresApiKeyStore::new(pool, ApiKeyGenerator::default());
    store.ensure_table().await?;

    Ok(ApiKeyService::new(Arc::new(store)))
}
