//! API key infrastructure implementations
//!
//! This module provides key generation, the durable store backends,
//! the verification cache and the service that orchestrates them.

mod cache;
mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use cache::KeyCache;
pub use generator::ApiKeyGenerator;
pub use postgres_repository::PostgresApiKeyStore;
pub use repository::InMemoryApiKeyStore;
pub use service::ApiKeyService;
