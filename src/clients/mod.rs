//! Upstream HTTP clients and the seams the search pipeline talks through.

pub mod hypixel;
pub mod mojang;

use hypixel::AuctionPage;

/// Source of auction listings, one page at a time.
///
/// Implementations never fail: an unavailable page is reported as
/// [`AuctionPage::failed`] so the caller can carry on with the next one.
#[async_trait::async_trait]
pub trait AuctionSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> AuctionPage;
}

/// Resolves seller identifiers to display names.
///
/// Returns [`crate::constants::UNKNOWN_SELLER`] when the id is absent or the
/// lookup fails for any reason.
#[async_trait::async_trait]
pub trait SellerDirectory: Send + Sync {
    async fn resolve(&self, seller_id: Option<&str>) -> String;
}
