//! API key service
//!
//! Public contract for key-set issuance, revocation and verification.
//! Owns both the durable store handle and the verification cache, and
//! enforces the consistency policy between them.

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::KeyCache;
use crate::domain::api_key::{AccessKeyType, ApiKeyStore, ProjectApiKeys};
use crate::domain::DomainError;

/// Service for managing project API key-sets
#[derive(Debug)]
pub struct ApiKeyService<S>
where
    S: ApiKeyStore,
{
    store: Arc<S>,
    cache: KeyCache<S>,
}

impl<S: ApiKeyStore> ApiKeyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        let cache = KeyCache::new(Arc::clone(&store));
        Self { store, cache }
    }

    /// Issue a new key-set for the project and return it, including the
    /// store-assigned id.
    pub async fn create_api_keys(&self, project: &str) -> Result<ProjectApiKeys, DomainError> {
        info!("Issuing key-set for project: {}", project);

        let keys = self.store.create_api_keys(project).await?;
        self.cache.invalidate(project).await;

        info!("Key-set issued: project={}, id={}", project, keys.id());
        Ok(keys)
    }

    /// Revoke one key-set. The store delete commits before the cache entry
    /// is dropped, so a concurrent verification cannot repopulate the cache
    /// with the deleted keys; the next verification misses and reloads.
    pub async fn revoke_api_keys(&self, project: &str, id: i32) -> Result<(), DomainError> {
        info!("Revoking key-set: project={}, id={}", project, id);

        self.store.revoke_api_keys(project, id).await?;
        self.cache.invalidate(project).await;

        Ok(())
    }

    /// Revoke every key-set of the project, with the same
    /// write-then-invalidate ordering as [`Self::revoke_api_keys`].
    pub async fn revoke_all_keys(&self, project: &str) -> Result<(), DomainError> {
        info!("Revoking all key-sets for project: {}", project);

        self.store.revoke_all_keys(project).await?;
        self.cache.invalidate(project).await;

        Ok(())
    }

    /// Bulk-fetch key-sets by id, straight from the store. Missing ids are
    /// omitted from the result; no cache involvement.
    pub async fn get_api_keys(&self, ids: &[i32]) -> Result<Vec<ProjectApiKeys>, DomainError> {
        self.store.get_api_keys(ids).await
    }

    /// Check whether `api_key` is a currently valid key of exactly the
    /// requested tier for the project.
    ///
    /// Two-phase: a hit in the cached partition answers without touching
    /// the store; on a miss the entry is force-reloaded once and the
    /// membership of the fresh partition is the answer. The reload covers
    /// both a key issued after the cache was populated and a key revoked
    /// since. Store failures during the reload propagate; they are never
    /// reported as an invalid key.
    pub async fn check_permission(
        &self,
        project: &str,
        key_type: AccessKeyType,
        api_key: &str,
    ) -> Result<bool, DomainError> {
        let cached = self.cache.get(project).await?;
        if cached.contains(key_type, api_key) {
            return Ok(true);
        }

        debug!(
            "Key miss for project={}, type={}; forcing cache refresh",
            project, key_type
        );

        let reloaded = self.cache.refresh(project).await?;
        Ok(reloaded.contains(key_type, api_key))
    }

    /// Drop every cached entry for every project. Administrative reset;
    /// subsequent verifications repopulate lazily.
    pub fn clear_cache(&self) {
        info!("Clearing key cache for all projects");
        self.cache.clear();
    }
}
