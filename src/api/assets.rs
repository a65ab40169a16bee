use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web"]
struct Asset;

fn respond(path: &str) -> Option<axum::response::Response> {
    let content = Asset::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            [(header::CONTENT_TYPE, mime.as_ref())],
            Body::from(content.data),
        )
            .into_response(),
    )
}

/// The page shell. Results are fetched client-side, so it ships empty.
pub async fn index() -> impl IntoResponse {
    respond("index.html")
        .unwrap_or_else(|| (StatusCode::NOT_FOUND, "404 Not Found").into_response())
}

pub async fn serve_asset(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if path.is_empty() {
        return index().await.into_response();
    }

    respond(path).unwrap_or_else(|| (StatusCode::NOT_FOUND, "404 Not Found").into_response())
}
