use crate::entities::{prelude::*, search_cache};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::time::Duration;

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = chrono::Utc::now().timestamp_millis();

        // Opportunistic cleanup; a failure here must not hide a live entry.
        let _ = SearchCache::delete_many()
            .filter(search_cache::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await;

        let entry = SearchCache::find()
            .filter(search_cache::Column::CacheKey.eq(key))
            .filter(search_cache::Column::ExpiresAt.gt(now))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.value))
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        let active_model = search_cache::ActiveModel {
            cache_key: Set(key.to_string()),
            value: Set(value),
            created_at: Set(now),
            expires_at: Set(now.saturating_add(ttl_ms)),
            ..Default::default()
        };

        SearchCache::insert(active_model)
            .on_conflict(
                OnConflict::column(search_cache::Column::CacheKey)
                    .update_columns([
                        search_cache::Column::Value,
                        search_cache::Column::CreatedAt,
                        search_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
