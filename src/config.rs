use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::clients::hypixel::HYPIXEL_API;
use crate::clients::mojang::MOJANG_SESSION_API;
use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub hypixel: HypixelConfig,

    pub mojang: MojangConfig,

    pub catalog: CatalogConfig,

    pub search: SearchConfig,

    pub cache: CacheConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// `"*"` allows any origin.
    pub cors_allowed_origins: Vec<String>,

    /// Directory served under `/static`, if set.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
            static_dir: Some("static".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HypixelConfig {
    pub base_url: String,

    /// Auction pages scanned per search, starting at page 0.
    pub pages: u32,

    /// Pause between consecutive page fetches.
    pub page_delay_ms: u64,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for HypixelConfig {
    fn default() -> Self {
        Self {
            base_url: HYPIXEL_API.to_string(),
            pages: constants::search::PAGES_PER_SEARCH,
            page_delay_ms: u64::try_from(constants::search::PAGE_DELAY.as_millis())
                .unwrap_or(1000),
            request_timeout_seconds: 30,
        }
    }
}

impl HypixelConfig {
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MojangConfig {
    pub base_url: String,
}

impl Default for MojangConfig {
    fn default() -> Self {
        Self {
            base_url: MOJANG_SESSION_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Item catalog (name, id, png) used for result images.
    pub item_ids_path: String,

    /// File passed through verbatim at `/skyblock_item_list.json`.
    pub item_list_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            item_ids_path: constants::files::ITEM_IDS.to_string(),
            item_list_path: constants::files::ITEM_LIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Seller lookups in flight at once per page. 1 resolves strictly in order.
    pub seller_lookup_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seller_lookup_concurrency: constants::search::SELLER_LOOKUP_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    pub ttl_seconds: u64,

    /// Only used by the `database` backend.
    pub database_url: String,

    pub max_db_connections: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl_seconds: constants::cache::SEARCH_TTL.as_secs(),
            database_url: "sqlite:data/sbauction.db".to_string(),
            max_db_connections: 5,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sbauction").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".sbauction").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hypixel.pages == 0 {
            anyhow::bail!("hypixel.pages must be at least 1");
        }

        if self.cache.ttl_seconds == 0 {
            anyhow::bail!("cache.ttl_seconds must be greater than 0");
        }

        if self.search.seller_lookup_concurrency == 0 {
            anyhow::bail!("search.seller_lookup_concurrency must be at least 1");
        }

        if self.cache.backend == CacheBackend::Database && self.cache.database_url.is_empty() {
            anyhow::bail!("cache.database_url cannot be empty when the database backend is used");
        }

        url::Url::parse(&self.hypixel.base_url).context("Invalid hypixel.base_url")?;
        url::Url::parse(&self.mojang.base_url).context("Invalid mojang.base_url")?;

        Ok(())
    }
}
