//! PostgreSQL key store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::generator::ApiKeyGenerator;
use crate::domain::api_key::{AccessKeyType, ApiKeyStore, KeyPartitions, ProjectApiKeys};
use crate::domain::DomainError;

/// PostgreSQL implementation of [`ApiKeyStore`]
///
/// Every operation acquires a pooled connection for exactly one statement;
/// sqlx returns the connection on all exit paths including cancellation.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyStore {
    pool: PgPool,
    generator: ApiKeyGenerator,
}

impl PostgresApiKeyStore {
    pub fn new(pool: PgPool, generator: ApiKeyGenerator) -> Self {
        Self { pool, generator }
    }

    /// Ensure the key-set table exists. Idempotent; run once at startup.
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id SERIAL PRIMARY KEY,
                project TEXT NOT NULL,
                read_key TEXT NOT NULL,
                write_key TEXT NOT NULL,
                master_key TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to create api_keys table", e))?;

        // The partition load scans by project
        sqlx::query("CREATE INDEX IF NOT EXISTS api_keys_project_idx ON api_keys (project)")
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to create api_keys index", e))?;

        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for PostgresApiKeyStore {
    async fn create_api_keys(&self, project: &str) -> Result<ProjectApiKeys, DomainError> {
        let master_key = self.generator.generate();
        let read_key = self.generator.generate();
        let write_key = self.generator.generate();

        let row = sqlx::query(
            r#"
            INSERT INTO api_keys (project, master_key, read_key, write_key)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(project)
        .bind(&master_key)
        .bind(&read_key)
        .bind(&write_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to insert key-set", e))?;

        let id: i32 = row.get("id");
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(ProjectApiKeys::new(
            id, project, master_key, read_key, write_key, created_at,
        ))
    }

    async fn revoke_api_keys(&self, project: &str, id: i32) -> Result<(), DomainError> {
        // rows_affected is deliberately ignored: deleting a missing pair
        // is a no-op, not an error
        sqlx::query("DELETE FROM api_keys WHERE project = $1 AND id = $2")
            .bind(project)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete key-set", e))?;

        Ok(())
    }

    async fn revoke_all_keys(&self, project: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM api_keys WHERE project = $1")
            .bind(project)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete project key-sets", e))?;

        Ok(())
    }

    async fn get_api_keys(&self, ids: &[i32]) -> Result<Vec<ProjectApiKeys>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, project, master_key, read_key, write_key, created_at
            FROM api_keys
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to fetch key-sets", e))?;

        Ok(rows
            .iter()
            .map(|row| {
                ProjectApiKeys::new(
                    row.get::<i32, _>("id"),
                    row.get::<String, _>("project"),
                    row.get::<String, _>("master_key"),
                    row.get::<String, _>("read_key"),
                    row.get::<String, _>("write_key"),
                    row.get::<DateTime<Utc>, _>("created_at"),
                )
            })
            .collect())
    }

    async fn load_project_keys(&self, project: &str) -> Result<KeyPartitions, DomainError> {
        let rows = sqlx::query(
            "SELECT master_key, read_key, write_key FROM api_keys WHERE project = $1",
        )
        .bind(project)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to load project keys", e))?;

        let mut partitions = KeyPartitions::new();

        for row in &rows {
            if let Some(key) = row.get::<Option<String>, _>("master_key") {
                partitions.insert(AccessKeyType::MasterKey, key);
            }
            if let Some(key) = row.get::<Option<String>, _>("read_key") {
                partitions.insert(AccessKeyType::ReadKey, key);
            }
            if let Some(key) = row.get::<Option<String>, _>("write_key") {
                partitions.insert(AccessKeyType::WriteKey, key);
            }
        }

        Ok(partitions)
    }
}

fn store_error(context: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::PoolTimedOut => {
            DomainError::pool_exhausted(format!("{context}: {e}"))
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            DomainError::connection(format!("{context}: {e}"))
        }
        _ => DomainError::storage(format!("{context}: {e}")),
    }
}
