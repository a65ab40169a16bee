use axum::{Json, extract::State};
use std::io::ErrorKind;
use std::sync::Arc;

use super::{ApiError, AppState};

/// Serves the configured item list file as-is.
pub async fn get_item_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = &state.config().catalog.item_list_path;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ApiError::not_found("Item list", path),
            _ => ApiError::internal(format!("Failed to read {path}: {e}")),
        })?;

    let items: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ApiError::internal(format!("Invalid JSON in {path}: {e}")))?;

    Ok(Json(items))
}
