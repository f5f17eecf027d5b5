use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokenfolio_market_data::AssetRef;

use super::request_cancellation;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
pub struct PricesRequest {
    pub assets: Vec<AssetRef>,
}

/// Prices keyed by `chain:contractAddress`. Unresolved assets are absent.
#[derive(Serialize)]
pub struct PricesResponse {
    pub prices: BTreeMap<String, Decimal>,
}

fn validate_assets(assets: &[AssetRef]) -> ApiResult<()> {
    if assets.is_empty() {
        return Err(ApiError::BadRequest("assets must not be empty".to_string()));
    }
    if let Some(bad) = assets
        .iter()
        .find(|a| a.chain().is_empty() || a.contract_address().is_empty())
    {
        return Err(ApiError::BadRequest(format!(
            "chain and contractAddress are required, got '{}'",
            bad
        )));
    }
    Ok(())
}

async fn get_prices(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PricesRequest>,
) -> ApiResult<Json<PricesResponse>> {
    validate_assets(&payload.assets)?;
    let (cancel, _guard) = request_cancellation();

    let prices = state
        .pricing_service
        .resolve_prices(&payload.assets, &cancel)
        .await?;
    Ok(Json(PricesResponse {
        prices: prices
            .into_iter()
            .map(|(asset, price)| (asset.to_string(), price))
            .collect(),
    }))
}

async fn evict_prices(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PricesRequest>,
) -> ApiResult<StatusCode> {
    validate_assets(&payload.assets)?;
    let (cancel, _guard) = request_cancellation();

    state
        .pricing_service
        .evict_prices(&payload.assets, &cancel)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/prices", post(get_prices).delete(evict_prices))
}
