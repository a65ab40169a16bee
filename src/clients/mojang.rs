use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::SellerDirectory;
use crate::constants::UNKNOWN_SELLER;

pub const MOJANG_SESSION_API: &str = "https://sessionserver.mojang.com";

#[derive(Debug, Deserialize)]
struct Profile {
    name: Option<String>,
}

#[derive(Clone)]
pub struct MojangClient {
    client: Client,
    base_url: String,
}

impl Default for MojangClient {
    fn default() -> Self {
        Self::with_shared_client(Client::new(), MOJANG_SESSION_API)
    }
}

impl MojangClient {
    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Looks up a player name by UUID. `Ok(None)` when the profile is unknown
    /// or carries no name.
    pub async fn get_username(&self, uuid: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/session/minecraft/profile/{}",
            self.base_url,
            urlencoding::encode(uuid)
        );
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND
            || response.status() == StatusCode::NO_CONTENT
        {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Mojang API error: {} for {}",
                response.status(),
                uuid
            ));
        }

        let profile: Profile = response
            .json()
            .await
            .context("Failed to decode Mojang profile")?;

        Ok(profile.name)
    }
}

#[async_trait::async_trait]
impl SellerDirectory for MojangClient {
    async fn resolve(&self, seller_id: Option<&str>) -> String {
        let Some(uuid) = seller_id.filter(|id| !id.is_empty()) else {
            return UNKNOWN_SELLER.to_string();
        };

        match self.get_username(uuid).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_SELLER.to_string(),
            Err(e) => {
                debug!(seller = uuid, error = %e, "Seller lookup failed");
                UNKNOWN_SELLER.to_string()
            }
        }
    }
}
