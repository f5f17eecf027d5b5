use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tokenfolio_core::portfolio::{holdings::Portfolio, valuation::PortfolioView};
use tokenfolio_market_data::AssetRef;

use super::dto::{HoldingInput, RemoveHoldingQuery};
use crate::{api::request_cancellation, error::ApiResult, main_lib::AppState};

pub async fn get_portfolio(
    Path(wallet): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioView>> {
    let (cancel, _guard) = request_cancellation();
    let view = state
        .valuation_service
        .value_portfolio(&wallet, &cancel)
        .await?;
    Ok(Json(view))
}

pub async fn add_holding(
    Path(wallet): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HoldingInput>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let portfolio = state
        .holdings_service
        .add_holding(&wallet, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

pub async fn update_holding(
    Path(wallet): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HoldingInput>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .holdings_service
        .update_holding(&wallet, payload.into())
        .await?;
    Ok(Json(portfolio))
}

pub async fn remove_holding(
    Path(wallet): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<RemoveHoldingQuery>,
) -> ApiResult<Json<Portfolio>> {
    let asset = AssetRef::new(&q.chain, &q.contract);
    let portfolio = state
        .holdings_service
        .remove_holding(&wallet, &asset)
        .await?;
    Ok(Json(portfolio))
}
