#![allow(dead_code)]

use axum::http::StatusCode;
use proforma_eps::api::{self, AppState};
use proforma_eps::config::Config;
use proforma_eps::datasource::MockDataSource;
use proforma_eps::domain::{Currency, Decimal, RawFundamentals, Ticker};
use proforma_eps::orchestration::FundamentalsService;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

pub fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

/// A USD record with reported net income.
pub fn reported(symbol: &str, price: &str, shares: &str, ni: &str) -> RawFundamentals {
    RawFundamentals {
        price: Some(d(price)),
        shares_outstanding: Some(d(shares)),
        ni_ttm: Some(d(ni)),
        currency: Some(Currency::new("USD")),
        ..RawFundamentals::new(ticker(symbol))
    }
}

pub fn setup_test_app(datasource: MockDataSource) -> axum::Router {
    setup_test_app_with_timeout(datasource, Duration::from_secs(5))
}

pub fn setup_test_app_with_timeout(datasource: MockDataSource, timeout: Duration) -> axum::Router {
    let config = Config::from_env_map(HashMap::new()).unwrap();
    let fundamentals = Arc::new(FundamentalsService::new(Arc::new(datasource), timeout));
    api::create_router(AppState::new(config, fundamentals))
}

pub async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(
    app: axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
