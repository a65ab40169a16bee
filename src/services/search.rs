use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheKey, CacheStore};
use crate::clients::hypixel::Auction;
use crate::clients::{AuctionSource, SellerDirectory};
use crate::config::Config;
use crate::parser::{PriceRange, coerce_bid, item_count, matches_normalized, normalize, time_since};
use crate::services::catalog::CatalogLoader;

/// One matching buy-it-now listing, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub item_name: String,
    pub starting_bid: u64,
    #[serde(rename = "seller")]
    pub seller_display_name: String,
    pub time_display: String,
    pub image_url: Option<String>,
    /// Stack size recovered from the item bytes, when it could be read.
    #[serde(rename = "count_section")]
    pub item_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub pages: u32,
    pub page_delay: Duration,
    pub cache_ttl: Duration,
    pub seller_lookup_concurrency: usize,
}

impl SearchSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            pages: config.hypixel.pages,
            page_delay: config.hypixel.page_delay(),
            cache_ttl: config.cache.ttl(),
            seller_lookup_concurrency: config.search.seller_lookup_concurrency.max(1),
        }
    }
}

pub struct SearchService {
    auctions: Arc<dyn AuctionSource>,
    sellers: Arc<dyn SellerDirectory>,
    cache: Arc<dyn CacheStore>,
    catalog: CatalogLoader,
    settings: SearchSettings,
}

impl SearchService {
    #[must_use]
    pub fn new(
        auctions: Arc<dyn AuctionSource>,
        sellers: Arc<dyn SellerDirectory>,
        cache: Arc<dyn CacheStore>,
        catalog: CatalogLoader,
        settings: SearchSettings,
    ) -> Self {
        Self {
            auctions,
            sellers,
            cache,
            catalog,
            settings,
        }
    }

    /// Runs a search, serving it from the cache while a previous identical
    /// search is still live.
    ///
    /// Never fails: upstream, catalog and cache problems are logged and
    /// degrade the result set instead.
    pub async fn search(&self, term: &str, prices: PriceRange) -> Vec<SearchResult> {
        let key = CacheKey::for_search(term, &prices);

        if let Some(results) = self.cached(&key).await {
            metrics::counter!("search_cache_hits_total").increment(1);
            debug!(%key, count = results.len(), "Serving search from cache");
            return results;
        }
        metrics::counter!("search_cache_misses_total").increment(1);

        let results = self.collect(term, prices).await;
        self.remember(&key, &results).await;
        results
    }

    async fn cached(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        match self.cache.get(key.as_str()).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw).map_err(CacheError::from) {
                Ok(results) => Some(results),
                Err(e) => {
                    warn!(%key, error = %e, "Ignoring unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%key, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn remember(&self, key: &CacheKey, results: &[SearchResult]) {
        let value = match serde_json::to_string(results) {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "Could not serialize search results");
                return;
            }
        };

        if let Err(e) = self
            .cache
            .set(key.as_str(), value, self.settings.cache_ttl)
            .await
        {
            warn!(%key, error = %e, "Cache write failed");
        }
    }

    async fn collect(&self, term: &str, prices: PriceRange) -> Vec<SearchResult> {
        let normalized_term = normalize(term);
        info!(term, normalized = %normalized_term, "Searching auctions");

        let catalog = self.catalog.load().await;
        let image_url = catalog
            .best_match(&normalized_term)
            .and_then(|entry| entry.image.clone());

        let mut results = Vec::new();

        for page in 0..self.settings.pages {
            if page > 0 {
                tokio::time::sleep(self.settings.page_delay).await;
            }

            let listing = self.auctions.fetch_page(page).await;
            if !listing.success {
                debug!(page, "Skipping unsuccessful auction page");
                continue;
            }

            let matching: Vec<Auction> = listing
                .auctions
                .into_iter()
                .filter(|auction| {
                    auction.bin && matches_normalized(&normalized_term, &normalize(&auction.item_name))
                })
                .collect();

            debug!(page, matches = matching.len(), "Filtered auction page");
            results.extend(self.enrich(matching, image_url.as_deref()).await);
        }

        let before = results.len();
        if !prices.is_unbounded() {
            results.retain(|result| prices.contains(result.starting_bid));
        }

        info!(
            term,
            matched = before,
            returned = results.len(),
            "Search finished"
        );

        results
    }

    /// Resolves sellers with bounded concurrency; output keeps input order.
    async fn enrich(&self, auctions: Vec<Auction>, image_url: Option<&str>) -> Vec<SearchResult> {
        let now = Utc::now();
        let sellers = &self.sellers;

        stream::iter(auctions)
            .map(move |auction| async move {
                let seller = sellers.resolve(auction.auctioneer.as_deref()).await;
                build_result(auction, seller, image_url, now)
            })
            .buffered(self.settings.seller_lookup_concurrency)
            .collect()
            .await
    }
}

fn build_result(
    auction: Auction,
    seller: String,
    image_url: Option<&str>,
    now: DateTime<Utc>,
) -> SearchResult {
    SearchResult {
        starting_bid: coerce_bid(&auction.starting_bid),
        time_display: time_since(auction.start, now),
        item_count: auction.item_bytes.as_deref().and_then(item_count),
        image_url: image_url.map(str::to_string),
        seller_display_name: seller,
        item_name: auction.item_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryCache};
    use crate::clients::hypixel::AuctionPage;
    use crate::constants::UNKNOWN_SELLER;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAuctions {
        pages: Vec<AuctionPage>,
        calls: AtomicUsize,
    }

    impl FakeAuctions {
        fn new(pages: Vec<AuctionPage>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl AuctionSource for FakeAuctions {
        async fn fetch_page(&self, page: u32) -> AuctionPage {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(page as usize)
                .cloned()
                .unwrap_or_else(|| AuctionPage::failed(page))
        }
    }

    struct FakeSellers(HashMap<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl SellerDirectory for FakeSellers {
        async fn resolve(&self, seller_id: Option<&str>) -> String {
            seller_id
                .and_then(|id| self.0.get(id))
                .map_or_else(|| UNKNOWN_SELLER.to_string(), |name| (*name).to_string())
        }
    }

    struct BrokenCache;

    #[async_trait::async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    fn auction(name: &str, bid: serde_json::Value, seller: Option<&str>, bin: bool) -> Auction {
        Auction {
            item_name: name.to_string(),
            starting_bid: bid,
            auctioneer: seller.map(str::to_string),
            bin,
            start: Utc::now().timestamp_millis() - 2 * 3_600_000,
            ..Default::default()
        }
    }

    fn page(auctions: Vec<Auction>) -> AuctionPage {
        AuctionPage {
            success: true,
            auctions,
            ..Default::default()
        }
    }

    fn settings() -> SearchSettings {
        SearchSettings {
            pages: 2,
            page_delay: Duration::ZERO,
            cache_ttl: Duration::from_secs(60),
            seller_lookup_concurrency: 4,
        }
    }

    fn service(
        auctions: Arc<FakeAuctions>,
        cache: Arc<dyn CacheStore>,
        catalog: CatalogLoader,
    ) -> SearchService {
        let sellers = Arc::new(FakeSellers(HashMap::from([
            ("u1", "Technoblade"),
            ("u2", "Dream"),
        ])));
        SearchService::new(auctions, sellers, cache, catalog, settings())
    }

    fn no_catalog() -> CatalogLoader {
        CatalogLoader::new("/nonexistent/skyblock_item_ids.json")
    }

    #[tokio::test]
    async fn test_filters_by_name_and_listing_type() {
        let auctions = FakeAuctions::new(vec![
            page(vec![
                auction("Diamond Sword", json!(100), Some("u1"), true),
                auction("Diamond Sword", json!(90), Some("u1"), false),
                auction("Diamond Pickaxe", json!(80), Some("u2"), true),
            ]),
            page(vec![auction("Wooden Sword", json!("3.7"), None, true)]),
        ]);
        let service = service(auctions.clone(), Arc::new(MemoryCache::new()), no_catalog());

        let results = service.search("sword", PriceRange::default()).await;

        assert_eq!(auctions.calls(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item_name, "Diamond Sword");
        assert_eq!(results[0].starting_bid, 100);
        assert_eq!(results[0].seller_display_name, "Technoblade");
        assert_eq!(results[0].time_display, "2 hours ago");
        assert_eq!(results[0].image_url, None);
        assert_eq!(results[0].item_count, None);
        assert_eq!(results[1].item_name, "Wooden Sword");
        assert_eq!(results[1].starting_bid, 3);
        assert_eq!(results[1].seller_display_name, UNKNOWN_SELLER);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let auctions = FakeAuctions::new(vec![
            AuctionPage::failed(0),
            page(vec![auction("Hyperion", json!(1_000), Some("u2"), true)]),
        ]);
        let service = service(auctions.clone(), Arc::new(MemoryCache::new()), no_catalog());

        let results = service.search("hyperion", PriceRange::default()).await;

        assert_eq!(auctions.calls(), 2);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seller_display_name, "Dream");
    }

    #[tokio::test]
    async fn test_price_bounds_are_applied_after_collection() {
        let auctions = FakeAuctions::new(vec![
            page(vec![
                auction("Sword", json!(10), None, true),
                auction("Sword", json!(50), None, true),
            ]),
            page(vec![auction("Sword", json!(100), None, true)]),
        ]);
        let service = service(auctions, Arc::new(MemoryCache::new()), no_catalog());

        let results = service
            .search("sword", PriceRange::new(Some(20.0), Some(80.0)))
            .await;

        let bids: Vec<u64> = results.iter().map(|r| r.starting_bid).collect();
        assert_eq!(bids, vec![50]);
    }

    #[tokio::test]
    async fn test_catalog_image_attached() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"[
                {"name": "Sword", "png": "/static/sword.png"},
                {"name": "Diamond Sword", "png": "/static/diamond_sword.png"}
            ]"#,
        )
        .await
        .unwrap();

        let auctions = FakeAuctions::new(vec![page(vec![auction(
            "Diamond Sword",
            json!(5),
            None,
            true,
        )])]);
        let service = service(auctions, Arc::new(MemoryCache::new()), CatalogLoader::new(&path));

        let results = service.search("Sword", PriceRange::default()).await;
        assert_eq!(
            results[0].image_url.as_deref(),
            Some("/static/diamond_sword.png")
        );

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_repeat_search_is_served_from_cache() {
        let auctions = FakeAuctions::new(vec![page(vec![auction(
            "Aspect of the End",
            json!(250_000),
            Some("u1"),
            true,
        )])]);
        let service = Arc::new(service(
            auctions.clone(),
            Arc::new(MemoryCache::new()),
            no_catalog(),
        ));

        let first = service.search("aspect", PriceRange::default()).await;
        assert_eq!(auctions.calls(), 2);

        let (a, b) = tokio::join!(
            service.search("aspect", PriceRange::default()),
            service.search("aspect", PriceRange::default()),
        );

        assert_eq!(auctions.calls(), 2);
        assert_eq!(a, first);
        assert_eq!(b, first);
    }

    #[tokio::test]
    async fn test_empty_result_sets_are_cached_too() {
        let auctions = FakeAuctions::new(vec![page(vec![])]);
        let service = service(auctions.clone(), Arc::new(MemoryCache::new()), no_catalog());

        assert!(service.search("nothing", PriceRange::default()).await.is_empty());
        assert!(service.search("nothing", PriceRange::default()).await.is_empty());
        assert_eq!(auctions.calls(), 2);
    }

    #[tokio::test]
    async fn test_price_bounds_are_part_of_cache_key() {
        let auctions = FakeAuctions::new(vec![page(vec![auction("Sword", json!(50), None, true)])]);
        let service = service(auctions.clone(), Arc::new(MemoryCache::new()), no_catalog());

        service.search("sword", PriceRange::default()).await;
        service
            .search("sword", PriceRange::new(Some(60.0), None))
            .await;

        assert_eq!(auctions.calls(), 4);
    }

    #[tokio::test]
    async fn test_cache_failures_do_not_fail_search() {
        let auctions = FakeAuctions::new(vec![page(vec![auction("Sword", json!(1), None, true)])]);
        let service = service(auctions.clone(), Arc::new(BrokenCache), no_catalog());

        assert_eq!(service.search("sword", PriceRange::default()).await.len(), 1);
        assert_eq!(service.search("sword", PriceRange::default()).await.len(), 1);
        assert_eq!(auctions.calls(), 4);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_a_miss() {
        let cache = Arc::new(MemoryCache::new());
        let key = CacheKey::for_search("sword", &PriceRange::default());
        cache
            .set(key.as_str(), "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let auctions = FakeAuctions::new(vec![page(vec![auction("Sword", json!(1), None, true)])]);
        let service = service(auctions.clone(), cache, no_catalog());

        assert_eq!(service.search("sword", PriceRange::default()).await.len(), 1);
        assert_eq!(auctions.calls(), 2);
    }

    #[tokio::test]
    async fn test_seller_order_is_preserved() {
        let names = ["u1", "u2", "u1", "u2", "u1"];
        let auctions = FakeAuctions::new(vec![page(
            names
                .iter()
                .enumerate()
                .map(|(i, id)| auction(&format!("Sword {i}"), json!(i), Some(id), true))
                .collect(),
        )]);
        let service = service(auctions, Arc::new(MemoryCache::new()), no_catalog());

        let results = service.search("sword", PriceRange::default()).await;
        let order: Vec<&str> = results.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(order, vec!["Sword 0", "Sword 1", "Sword 2", "Sword 3", "Sword 4"]);
    }

    #[test]
    fn test_result_wire_format() {
        let result = SearchResult {
            item_name: "Hyperion".to_string(),
            starting_bid: 1,
            seller_display_name: "Dream".to_string(),
            time_display: "just now".to_string(),
            image_url: None,
            item_count: Some(1),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["seller"], "Dream");
        assert_eq!(value["count_section"], 1);
        assert!(value["image_url"].is_null());
    }
}
