use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::AuctionSource;

pub const HYPIXEL_API: &str = "https://api.hypixel.net";

/// One page of the public auction house listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuctionPage {
    pub success: bool,
    pub page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    pub auctions: Vec<Auction>,
}

impl AuctionPage {
    /// Placeholder for a page that could not be fetched.
    #[must_use]
    pub fn failed(page: u32) -> Self {
        Self {
            success: false,
            page,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Auction {
    pub item_name: String,
    /// Left untyped; coerced later since upstream has sent floats and strings.
    pub starting_bid: Value,
    /// Seller UUID.
    pub auctioneer: Option<String>,
    /// `true` for buy-it-now listings.
    pub bin: bool,
    /// Listing start, epoch milliseconds.
    pub start: i64,
    pub item_bytes: Option<String>,
}

#[derive(Clone)]
pub struct HypixelClient {
    client: Client,
    base_url: String,
}

impl Default for HypixelClient {
    fn default() -> Self {
        Self::with_shared_client(Client::new(), HYPIXEL_API)
    }
}

impl HypixelClient {
    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auctions_url(&self, page: u32) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/v2/skyblock/auctions", self.base_url))
            .with_context(|| format!("Invalid Hypixel base URL: {}", self.base_url))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    pub async fn get_auctions(&self, page: u32) -> Result<AuctionPage> {
        let url = self.auctions_url(page)?;
        debug!(page, "Fetching auction page");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Hypixel API error: {} - {}", status, body));
        }

        let page: AuctionPage = response
            .json()
            .await
            .context("Failed to decode auction page")?;

        Ok(page)
    }
}

#[async_trait::async_trait]
impl AuctionSource for HypixelClient {
    async fn fetch_page(&self, page: u32) -> AuctionPage {
        match self.get_auctions(page).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, error = %e, "Auction page unavailable, skipping");
                metrics::counter!("upstream_page_failures_total").increment(1);
                AuctionPage::failed(page)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auctions_url() {
        let client = HypixelClient::with_shared_client(Client::new(), "https://example.test/");
        let url = client.auctions_url(1).unwrap();
        assert_eq!(url.as_str(), "https://example.test/v2/skyblock/auctions?page=1");
    }

    #[test]
    fn test_page_deserialization_tolerates_missing_fields() {
        let json = r#"{
            "success": true,
            "page": 0,
            "totalPages": 40,
            "auctions": [
                {
                    "uuid": "a1",
                    "auctioneer": "069a79f444e94726a5befca90e38aaf5",
                    "item_name": "Hyperion",
                    "starting_bid": 850000000.0,
                    "bin": true,
                    "start": 1700000000000,
                    "item_bytes": "H4sIAAAAAAAA"
                },
                { "item_name": "Stone", "starting_bid": null }
            ]
        }"#;

        let page: AuctionPage = serde_json::from_str(json).unwrap();
        assert!(page.success);
        assert_eq!(page.total_pages, 40);
        assert_eq!(page.auctions.len(), 2);
        assert!(page.auctions[0].bin);
        assert!(!page.auctions[1].bin);
        assert!(page.auctions[1].auctioneer.is_none());
        assert!(page.auctions[1].starting_bid.is_null());
    }

    async fn serve(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn upstream() -> String {
        use axum::{Json, http::StatusCode, routing::get};

        let app = axum::Router::new()
            .route(
                "/error/v2/skyblock/auctions",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/garbage/v2/skyblock/auctions",
                get(|| async { "<html>not json</html>" }),
            )
            .route(
                "/ok/v2/skyblock/auctions",
                get(|| async {
                    Json(serde_json::json!({
                        "success": true,
                        "page": 0,
                        "totalPages": 1,
                        "auctions": [{ "item_name": "Hyperion", "starting_bid": 5, "bin": true }]
                    }))
                }),
            );
        serve(app).await
    }

    #[tokio::test]
    async fn test_error_status_becomes_failed_page() {
        let base = upstream().await;
        let client = HypixelClient::with_shared_client(Client::new(), &format!("{base}/error"));

        assert!(client.get_auctions(0).await.is_err());

        let page = client.fetch_page(0).await;
        assert!(!page.success);
        assert_eq!(page.page, 0);
        assert!(page.auctions.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_becomes_failed_page() {
        let base = upstream().await;
        let client = HypixelClient::with_shared_client(Client::new(), &format!("{base}/garbage"));

        let page = client.fetch_page(1).await;
        assert!(!page.success);
        assert_eq!(page.page, 1);
        assert!(page.auctions.is_empty());
    }

    #[tokio::test]
    async fn test_successful_page_is_passed_through() {
        let base = upstream().await;
        let client = HypixelClient::with_shared_client(Client::new(), &format!("{base}/ok"));

        let page = client.fetch_page(0).await;
        assert!(page.success);
        assert_eq!(page.auctions.len(), 1);
        assert_eq!(page.auctions[0].item_name, "Hyperion");
    }

    #[test]
    fn test_failed_page() {
        let page = AuctionPage::failed(3);
        assert!(!page.success);
        assert_eq!(page.page, 3);
        assert!(page.auctions.is_empty());
    }
}
