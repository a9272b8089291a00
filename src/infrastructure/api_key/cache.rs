//! Verification key cache
//!
//! Read-through cache of per-project key partitions, populated from the
//! durable store. Concurrent first accesses for the same project collapse
//! into a single store load.

use std::fmt;
use std::sync::Arc;

use moka::future::Cache;
use tracing::debug;

use crate::domain::api_key::{ApiKeyStore, KeyPartitions};
use crate::domain::DomainError;

/// Per-project cache of valid keys, partitioned by tier
///
/// Entries have no expiry and no size bound; staleness is managed solely
/// through explicit invalidation and refresh by the owning service.
pub struct KeyCache<S: ApiKeyStore> {
    store: Arc<S>,
    entries: Cache<String, Arc<KeyPartitions>>,
}

impl<S: ApiKeyStore> KeyCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            entries: Cache::builder().build(),
        }
    }

    /// Cached partitions for the project, loading them from the store on
    /// first access.
    ///
    /// Concurrent calls for the same uncached project coalesce into one
    /// `load_project_keys` and all receive the same result. A failed load
    /// propagates to every waiting caller and is not cached, so the next
    /// access retries the store.
    pub async fn get(&self, project: &str) -> Result<Arc<KeyPartitions>, DomainError> {
        let store = Arc::clone(&self.store);
        let key = project.to_string();

        self.entries
            .try_get_with(project.to_string(), async move {
                debug!(project = %key, "Loading key partitions from store");
                store.load_project_keys(&key).await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<DomainError>| (*e).clone())
    }

    /// Drop the project's entry; the next `get` repopulates from the store
    pub async fn invalidate(&self, project: &str) {
        self.entries.invalidate(project).await;
    }

    /// Unconditionally reload the project's entry from the store,
    /// replacing any cached value.
    ///
    /// On a failed load the error propagates and the previous entry, if
    /// any, is left in place rather than replaced with an empty one.
    pub async fn refresh(&self, project: &str) -> Result<Arc<KeyPartitions>, DomainError> {
        let partitions = Arc::new(self.store.load_project_keys(project).await?);
        self.entries
            .insert(project.to_string(), Arc::clone(&partitions))
            .await;
        Ok(partitions)
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl<S: ApiKeyStore> fmt::Debug for KeyCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
