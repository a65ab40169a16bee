//! Short-lived result cache with pluggable backends.

pub mod memory;

pub use memory::MemoryCache;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::constants::cache::KEY_PREFIX;
use crate::parser::PriceRange;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cached value is not valid: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key/value store with a per-entry time-to-live.
///
/// `get` never returns an entry whose TTL has elapsed. `set` replaces any
/// previous value and restarts its clock.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Composite key for a search: raw term plus optional price bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn for_search(term: &str, prices: &PriceRange) -> Self {
        let bound = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        Self(format!(
            "{KEY_PREFIX}:{}:{}:{}",
            urlencoding::encode(term),
            bound(prices.min),
            bound(prices.max)
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
