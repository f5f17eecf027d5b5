mod dto;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::main_lib::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallets/{wallet}/portfolio", get(handlers::get_portfolio))
        .route(
            "/wallets/{wallet}/portfolio/holdings",
            post(handlers::add_holding)
                .put(handlers::update_holding)
                .delete(handlers::remove_holding),
        )
}
