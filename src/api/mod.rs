pub mod basics;
pub mod health;
pub mod openapi;
pub mod proforma;

use crate::config::Config;
use crate::orchestration::FundamentalsService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fundamentals: Arc<FundamentalsService>,
}

impl AppState {
    pub fn new(config: Config, fundamentals: Arc<FundamentalsService>) -> Self {
        Self {
            config,
            fundamentals,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/basics", get(basics::get_basics))
        .route("/proforma", post(proforma::post_proforma))
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(cors)
        .with_state(state)
}
