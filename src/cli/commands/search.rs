use crate::config::Config;
use crate::parser::PriceRange;
use crate::state::SharedState;

pub async fn cmd_search(
    config: Config,
    query: &str,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;

    let results = shared
        .search_service
        .search(query, PriceRange::new(min_price, max_price))
        .await;

    let body = serde_json::json!({ "results": results });
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
