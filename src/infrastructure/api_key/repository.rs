//! In-memory key store implementation
//!
//! Backing store for tests and single-process deployments without
//! PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::generator::ApiKeyGenerator;
use crate::domain::api_key::{ApiKeyStore, KeyPartitions, ProjectApiKeys};
use crate::domain::DomainError;

/// In-memory implementation of [`ApiKeyStore`]
#[derive(Debug)]
pub struct InMemoryApiKeyStore {
    rows: Arc<RwLock<HashMap<i32, ProjectApiKeys>>>,
    next_id: AtomicI32,
    generator: ApiKeyGenerator,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI32::new(0),
            generator: ApiKeyGenerator::default(),
        }
    }

    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }
}

impl Default for InMemoryApiKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn create_api_keys(&self, project: &str) -> Result<ProjectApiKeys, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let keys = ProjectApiKeys::new(
            id,
            project,
            self.generator.generate(),
            self.generator.generate(),
            self.generator.generate(),
            Utc::now(),
        );

        self.rows.write().await.insert(id, keys.clone());
        Ok(keys)
    }

    async fn revoke_api_keys(&self, project: &str, id: i32) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if rows.get(&id).is_some_and(|row| row.project() == project) {
            rows.remove(&id);
        }
        Ok(())
    }

    async fn revoke_all_keys(&self, project: &str) -> Result<(), DomainError> {
        self.rows
            .write()
            .await
            .retain(|_, row| row.project() != project);
        Ok(())
    }

    async fn get_api_keys(&self, ids: &[i32]) -> Result<Vec<ProjectApiKeys>, DomainError> {
        let rows = self.rows.read().await;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn load_project_keys(&self, project: &str) -> Result<KeyPartitions, DomainError> {
        let rows = self.rows.read().await;
        let mut partitions = KeyPartitions::new();

        for row in rows.values().filter(|row| row.project() == project) {
            partitions.insert_set(row);
        }

        Ok(partitions)
    }
}
