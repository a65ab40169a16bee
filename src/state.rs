use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, MemoryCache};
use crate::clients::hypixel::HypixelClient;
use crate::clients::mojang::MojangClient;
use crate::clients::{AuctionSource, SellerDirectory};
use crate::config::{CacheBackend, Config};
use crate::db::Store;
use crate::services::{CatalogLoader, SearchService, SearchSettings};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by every upstream client so connections are pooled.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("sbauction/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Long-lived dependencies, built once at startup and shared by every request.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub search_service: Arc<SearchService>,

    /// Present when the database cache backend is in use.
    pub store: Option<Store>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.hypixel.request_timeout_seconds)?;

        let auctions: Arc<dyn AuctionSource> = Arc::new(HypixelClient::with_shared_client(
            http_client.clone(),
            &config.hypixel.base_url,
        ));
        let sellers: Arc<dyn SellerDirectory> = Arc::new(MojangClient::with_shared_client(
            http_client,
            &config.mojang.base_url,
        ));

        let (cache, store): (Arc<dyn CacheStore>, Option<Store>) = match config.cache.backend {
            CacheBackend::Memory => {
                info!("Using in-memory search cache");
                (Arc::new(MemoryCache::new()), None)
            }
            CacheBackend::Database => {
                let store = Store::with_pool_options(
                    &config.cache.database_url,
                    config.cache.max_db_connections,
                    1,
                )
                .await?;
                info!("Using database search cache");
                (Arc::new(store.clone()), Some(store))
            }
        };

        let mut shared = Self::with_components(config, auctions, sellers, cache);
        shared.store = store;
        Ok(shared)
    }

    /// Assembles state from explicit upstream and cache implementations.
    #[must_use]
    pub fn with_components(
        config: Config,
        auctions: Arc<dyn AuctionSource>,
        sellers: Arc<dyn SellerDirectory>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let search_service = Arc::new(SearchService::new(
            auctions,
            sellers,
            cache,
            CatalogLoader::new(&config.catalog.item_ids_path),
            SearchSettings::from_config(&config),
        ));

        Self {
            config: Arc::new(config),
            search_service,
            store: None,
        }
    }
}
