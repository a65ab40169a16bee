use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::warn;

use super::{AppState, HealthStatus};
use crate::config::CacheBackend;

pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let cache_backend = match state.config().cache.backend {
        CacheBackend::Memory => "memory",
        CacheBackend::Database => "database",
    };

    // Search keeps working without its cache, so a dead database only degrades.
    let status = match &state.shared.store {
        Some(store) => match store.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!(error = %e, "Cache database ping failed");
                "degraded"
            }
        },
        None => "ok",
    };

    Json(HealthStatus {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        cache_backend: cache_backend.to_string(),
    })
}
