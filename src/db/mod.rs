use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::cache::{CacheError, CacheStore};

pub mod migrator;
pub mod repositories;

/// Database-backed storage. Holds the search cache when the `database`
/// cache backend is selected.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }
}

#[async_trait::async_trait]
impl CacheStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.cache_repo()
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.cache_repo()
            .set(key, value, ttl)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        // One connection, so every query sees the same in-memory database.
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        let store = memory_store().await;
        store.ping().await.unwrap();

        store
            .set("search:sword:-:-", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get("search:sword:-:-").await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(store.get("search:axe:-:-").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_upsert_and_expiry() {
        let store = memory_store().await;

        store
            .set("k", "first".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k", "second".to_string(), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
