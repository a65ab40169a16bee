use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::parser::{PriceRange, parse_price_param};

use super::{ApiError, AppState, SearchResponse};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub search_item: String,
    /// Kept as text so an empty `min_price=` means "no bound" rather than a rejection.
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl SearchRequest {
    fn price_range(&self) -> Result<PriceRange, ApiError> {
        let min = parse_price_param(self.min_price.as_deref()).map_err(ApiError::validation)?;
        let max = parse_price_param(self.max_price.as_deref()).map_err(ApiError::validation)?;
        Ok(PriceRange::new(min, max))
    }
}

pub async fn search_auctions(
    State(state): State<Arc<AppState>>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let prices = request.price_range()?;

    let results = state
        .search_service()
        .search(&request.search_item, prices)
        .await;

    Ok(Json(SearchResponse { results }))
}
