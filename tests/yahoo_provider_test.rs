use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use proforma_eps::datasource::{DataSourceError, FundamentalsSource, YahooDataSource};
use proforma_eps::domain::{Currency, Decimal, Ticker};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Upstream {
    flaky_calls: Arc<AtomicUsize>,
    cookie_calls: Arc<AtomicUsize>,
    crumb_calls: Arc<AtomicUsize>,
    /// Bumped to invalidate every crumb handed out so far.
    session: Arc<AtomicUsize>,
}

impl Upstream {
    fn current_crumb(&self) -> String {
        format!("crumb/{}", self.session.load(Ordering::SeqCst))
    }
}

async fn cookie(State(upstream): State<Upstream>) -> axum::response::Response {
    upstream.cookie_calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::NOT_FOUND,
        [("set-cookie", "A3=session; Path=/; HttpOnly")],
    )
        .into_response()
}

async fn getcrumb(State(upstream): State<Upstream>) -> axum::response::Response {
    upstream.crumb_calls.fetch_add(1, Ordering::SeqCst);
    upstream.current_crumb().into_response()
}

fn summary(price: f64, shares: u64, eps: f64) -> serde_json::Value {
    json!({
        "quoteSummary": {
            "result": [{
                "price": {
                    "regularMarketPrice": {"raw": price, "fmt": price.to_string()},
                    "currency": "USD"
                },
                "defaultKeyStatistics": {
                    "sharesOutstanding": {"raw": shares},
                    "trailingEps": {"raw": eps}
                }
            }],
            "error": null
        }
    })
}

async fn quote_summary(
    Path(ticker): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(upstream): State<Upstream>,
) -> axum::response::Response {
    if params.get("crumb") != Some(&upstream.current_crumb()) {
        let body = json!({"finance": {"error": {"code": "Unauthorized", "description": "Invalid Crumb"}}});
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }
    match ticker.as_str() {
        "AAPL" => Json(summary(187.5, 15000000000, 6.5)).into_response(),
        "FLAKY" => {
            // first attempt fails, the retry succeeds
            if upstream.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            } else {
                Json(summary(10.0, 1000, 0.5)).into_response()
            }
        }
        "DOWN" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "GARBLED" => "not json".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_upstream() -> (String, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/cookie", get(cookie))
        .route("/v1/test/getcrumb", get(getcrumb))
        .route("/v10/finance/quoteSummary/:ticker", get(quote_summary))
        .with_state(upstream.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), upstream)
}

fn client(base_url: String, retry_budget: Duration) -> YahooDataSource {
    YahooDataSource::new(
        base_url.clone(),
        format!("{}/cookie", base_url),
        Duration::from_secs(2),
        retry_budget,
        "proforma-eps-test",
    )
    .unwrap()
}

fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

#[tokio::test]
async fn test_fetches_and_parses_quote_summary() {
    let (base_url, _upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::ZERO);

    let raw = source.fetch_fundamentals(&ticker("AAPL")).await.unwrap();
    assert_eq!(raw.price, Some(Decimal::from_str_canonical("187.5").unwrap()));
    assert_eq!(
        raw.shares_outstanding,
        Some(Decimal::from_str_canonical("15000000000").unwrap())
    );
    assert_eq!(raw.eps_ttm, Some(Decimal::from_str_canonical("6.5").unwrap()));
    assert_eq!(raw.ni_ttm, None);
    assert_eq!(raw.currency, Some(Currency::new("USD")));
}

#[tokio::test]
async fn test_unknown_ticker_is_not_found() {
    let (base_url, _upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::from_secs(1));

    let err = source.fetch_fundamentals(&ticker("ZZZZ")).await.unwrap_err();
    assert_eq!(err, DataSourceError::NotFound("ZZZZ".to_string()));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let (base_url, upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::from_secs(5));

    let raw = source.fetch_fundamentals(&ticker("FLAKY")).await.unwrap();
    assert_eq!(raw.price, Some(Decimal::from_str_canonical("10").unwrap()));
    assert_eq!(upstream.flaky_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_error_after_budget_is_http_error() {
    let (base_url, _upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::ZERO);

    let err = source.fetch_fundamentals(&ticker("DOWN")).await.unwrap_err();
    assert!(matches!(err, DataSourceError::HttpError { status: 503, .. }));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let (base_url, _upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::from_secs(1));

    let err = source.fetch_fundamentals(&ticker("GARBLED")).await.unwrap_err();
    assert!(matches!(err, DataSourceError::ParseError(_)));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = client(format!("http://{}", addr), Duration::ZERO);
    let err = source.fetch_fundamentals(&ticker("AAPL")).await.unwrap_err();
    assert!(matches!(err, DataSourceError::NetworkError(_)));
}

#[tokio::test]
async fn test_crumb_is_fetched_once_and_reused() {
    let (base_url, upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::ZERO);

    source.fetch_fundamentals(&ticker("AAPL")).await.unwrap();
    source.fetch_fundamentals(&ticker("AAPL")).await.unwrap();
    assert_eq!(upstream.cookie_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.crumb_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_crumb_is_refreshed_once() {
    let (base_url, upstream) = spawn_upstream().await;
    let source = client(base_url, Duration::ZERO);

    source.fetch_fundamentals(&ticker("AAPL")).await.unwrap();
    upstream.session.fetch_add(1, Ordering::SeqCst);

    let raw = source.fetch_fundamentals(&ticker("AAPL")).await.unwrap();
    assert_eq!(raw.eps_ttm, Some(Decimal::from_str_canonical("6.5").unwrap()));
    assert_eq!(upstream.crumb_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_crumb_endpoint_is_http_error() {
    // A provider with no crumb endpoint at all.
    let app = Router::new().route(
        "/v10/finance/quoteSummary/:ticker",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let source = client(format!("http://{}", addr), Duration::ZERO);
    let err = source.fetch_fundamentals(&ticker("AAPL")).await.unwrap_err();
    assert!(matches!(err, DataSourceError::HttpError { status: 404, .. }));
}
