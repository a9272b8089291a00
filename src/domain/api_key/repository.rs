//! Durable key store contract

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{KeyPartitions, ProjectApiKeys};
use crate::domain::DomainError;

/// Contract for the durable key store
///
/// Implementations persist one row per issued key-set and have no cache
/// awareness; invalidation after a mutating call is the caller's
/// responsibility.
#[async_trait]
pub trait ApiKeyStore: Send + Sync + Debug {
    /// Generate a fresh key-set for the project, persist it and return the
    /// stored row including its assigned id.
    async fn create_api_keys(&self, project: &str) -> Result<ProjectApiKeys, DomainError>;

    /// Delete the key-set matching both project and id. Deleting a
    /// non-existent pair is a no-op.
    async fn revoke_api_keys(&self, project: &str, id: i32) -> Result<(), DomainError>;

    /// Delete every key-set of the project. Idempotent on empty projects.
    async fn revoke_all_keys(&self, project: &str) -> Result<(), DomainError>;

    /// Bulk lookup by id. Ids with no matching row are omitted from the
    /// result; order is store-determined.
    async fn get_api_keys(&self, ids: &[i32]) -> Result<Vec<ProjectApiKeys>, DomainError>;

    /// Scan all of the project's rows and partition the key columns by
    /// tier. Used exclusively to (re)populate the verification cache.
    async fn load_project_keys(&self, project: &str) -> Result<KeyPartitions, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock key store for testing cache and service behavior
    ///
    /// Generates deterministic keys, counts partition loads and can be
    /// switched into a failing state.
    #[derive(Debug, Default)]
    pub struct MockApiKeyStore {
        rows: Arc<RwLock<HashMap<i32, ProjectApiKeys>>>,
        next_id: AtomicI32,
        should_fail: Arc<RwLock<bool>>,
        loads: AtomicUsize,
    }

    impl MockApiKeyStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        /// Number of `load_project_keys` calls observed so far
        pub fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock store configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ApiKeyStore for MockApiKeyStore {
        async fn create_api_keys(&self, project: &str) -> Result<ProjectApiKeys, DomainError> {
            self.check_should_fail().await?;

            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let keys = ProjectApiKeys::new(
                id,
                project,
                format!("master-{project}-{id}"),
                format!("read-{project}-{id}"),
                format!("write-{project}-{id}"),
                Utc::now(),
            );

            self.rows.write().await.insert(id, keys.clone());
            Ok(keys)
        }

        async fn revoke_api_keys(&self, project: &str, id: i32) -> Result<(), DomainError> {
            self.check_should_fail().await?;

            let mut rows = self.rows.write().await;
            if rows.get(&id).is_some_and(|row| row.project() == project) {
                rows.remove(&id);
            }
            Ok(())
        }

        async fn revoke_all_keys(&self, project: &str) -> Result<(), DomainError> {
            self.check_should_fail().await?;

            self.rows
                .write()
                .await
                .retain(|_, row| row.project() != project);
            Ok(())
        }

        async fn get_api_keys(&self, ids: &[i32]) -> Result<Vec<ProjectApiKeys>, DomainError> {
            self.check_should_fail().await?;

            let rows = self.rows.read().await;
            Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
        }

        async fn load_project_keys(&self, project: &str) -> Result<KeyPartitions, DomainError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.check_should_fail().await?;

            let rows = self.rows.read().await;
            let mut partitions = KeyPartitions::new();

            for row in rows.values().filter(|row| row.project() == project) {
                partitions.insert_set(row);
            }

            Ok(partitions)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_create_assigns_increasing_ids() {
            let store = MockApiKeyStore::new();

            let first = store.create_api_keys("analytics").await.unwrap();
            let second = store.create_api_keys("analytics").await.unwrap();

            assert_eq!(first.id(), 1);
            assert_eq!(second.id(), 2);
        }

        #[tokio::test]
        async fn test_revoke_requires_matching_project() {
            let store = MockApiKeyStore::new();
            let keys = store.create_api_keys("analytics").await.unwrap();

            // Wrong project leaves the row in place
            store.revoke_api_keys("other", keys.id()).await.unwrap();
            assert_eq!(store.get_api_keys(&[keys.id()]).await.unwrap().len(), 1);

            store.revoke_api_keys("analytics", keys.id()).await.unwrap();
            assert!(store.get_api_keys(&[keys.id()]).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_load_counts_attempts() {
            let store = MockApiKeyStore::new();
            store.create_api_keys("analytics").await.unwrap();

            store.load_project_keys("analytics").await.unwrap();
            store.set_should_fail(true).await;
            assert!(store.load_project_keys("analytics").await.is_err());

            assert_eq!(store.loads(), 2);
        }
    }
}
