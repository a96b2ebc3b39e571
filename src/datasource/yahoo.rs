//! Yahoo Finance `quoteSummary` client.
//!
//! `quoteSummary` only answers requests that carry a session cookie and the
//! matching crumb. The client collects the cookie from the cookie URL, asks
//! `/v1/test/getcrumb` for a crumb, caches it, and fetches a fresh one once
//! when the provider rejects the cached crumb with 401.

use super::{DataSourceError, FundamentalsSource};
use crate::domain::{Currency, Decimal, RawFundamentals, Ticker};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal as RustDecimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";

const MODULES: &str = "price,defaultKeyStatistics,financialData";

/// Fundamentals source backed by the `v10/finance/quoteSummary` endpoint.
#[derive(Debug, Clone)]
pub struct YahooDataSource {
    client: Client,
    base_url: String,
    cookie_url: String,
    retry_budget: Duration,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooDataSource {
    /// Create a client. `request_timeout` bounds each HTTP attempt;
    /// `retry_budget` bounds the total time spent retrying transient failures
    /// (zero disables retries). `cookie_url` is visited once per session to
    /// obtain the cookie the crumb is bound to.
    pub fn new(
        base_url: String,
        cookie_url: String,
        request_timeout: Duration,
        retry_budget: Duration,
        user_agent: &str,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| DataSourceError::Other(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_url,
            retry_budget,
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        }
    }

    /// Cached crumb, or a new one when there is none or `refresh` is set.
    ///
    /// The lock is held through the handshake so concurrent callers share one.
    async fn crumb(&self, refresh: bool) -> Result<String, DataSourceError> {
        let mut cached = self.crumb.lock().await;
        if let (false, Some(crumb)) = (refresh, cached.as_ref()) {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 on success; only the Set-Cookie header matters.
        if let Err(e) = self.client.get(&self.cookie_url).send().await {
            warn!("Provider cookie request to {} failed: {}", self.cookie_url, e);
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let crumb = retry(self.backoff(), || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                let err = DataSourceError::NetworkError(e.to_string());
                warn!("Provider crumb request failed: {}", err);
                backoff::Error::transient(err)
            })?;
            let response = check_status(response, "crumb")?;
            let body = response.text().await.map_err(|e| {
                backoff::Error::permanent(DataSourceError::ParseError(e.to_string()))
            })?;
            let crumb = body.trim();
            if crumb.is_empty() {
                return Err(backoff::Error::permanent(DataSourceError::ParseError(
                    "Empty crumb".to_string(),
                )));
            }
            Ok(crumb.to_string())
        })
        .await?;

        info!("Obtained provider crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn get_quote_summary(
        &self,
        ticker: &Ticker,
        crumb: &str,
    ) -> Result<serde_json::Value, DataSourceError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);

        retry(self.backoff(), || async {
            let response = self
                .client
                .get(&url)
                .query(&[("modules", MODULES), ("crumb", crumb)])
                .send()
                .await
                .map_err(|e| {
                    let err = DataSourceError::NetworkError(e.to_string());
                    warn!("Provider request for {} failed: {}", ticker, err);
                    backoff::Error::transient(err)
                })?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(backoff::Error::permanent(DataSourceError::NotFound(
                    ticker.to_string(),
                )));
            }
            let response = check_status(response, ticker.as_str())?;

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

/// Sort a non-success response into transient (429, 5xx) and permanent failures.
fn check_status(
    response: Response,
    subject: &str,
) -> Result<Response, backoff::Error<DataSourceError>> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Provider rate limited request for {}", subject);
        return Err(backoff::Error::transient(DataSourceError::RateLimited));
    }
    if status.is_server_error() {
        warn!("Provider returned {} for {}", status, subject);
        return Err(backoff::Error::transient(DataSourceError::HttpError {
            status: status.as_u16(),
            message: "Server error".to_string(),
        }));
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(backoff::Error::permanent(DataSourceError::HttpError {
            status: status.as_u16(),
            message: "Unauthorized".to_string(),
        }));
    }
    if !status.is_success() {
        return Err(backoff::Error::permanent(DataSourceError::HttpError {
            status: status.as_u16(),
            message: "Client error".to_string(),
        }));
    }
    Ok(response)
}

#[async_trait]
impl FundamentalsSource for YahooDataSource {
    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<RawFundamentals, DataSourceError> {
        debug!("Fetching fundamentals for ticker={}", ticker);
        let crumb = self.crumb(false).await?;
        let response = match self.get_quote_summary(ticker, &crumb).await {
            Err(DataSourceError::HttpError { status: 401, .. }) => {
                warn!("Provider rejected crumb for {}; refreshing", ticker);
                let crumb = self.crumb(true).await?;
                self.get_quote_summary(ticker, &crumb).await?
            }
            other => other?,
        };
        parse_quote_summary(ticker, &response)
    }
}

/// Map a `quoteSummary` response onto a raw record.
///
/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}` and sends `{}` when
/// it has no value; both absent and empty nodes become `None`.
pub(crate) fn parse_quote_summary(
    ticker: &Ticker,
    body: &serde_json::Value,
) -> Result<RawFundamentals, DataSourceError> {
    let summary = body
        .get("quoteSummary")
        .ok_or_else(|| DataSourceError::ParseError("Missing quoteSummary field".to_string()))?;

    let result = match summary.get("result").and_then(|r| r.as_array()) {
        Some(results) if !results.is_empty() => &results[0],
        _ => {
            let code = summary
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str())
                .unwrap_or("");
            if code.eq_ignore_ascii_case("not found") {
                return Err(DataSourceError::NotFound(ticker.to_string()));
            }
            return Err(DataSourceError::ParseError(format!(
                "Empty quoteSummary result for {}",
                ticker
            )));
        }
    };

    let price_module = result.get("price");
    let stats = result.get("defaultKeyStatistics");
    let financial = result.get("financialData");

    let price = match raw_number(price_module, "regularMarketPrice")? {
        Some(p) => Some(p),
        None => raw_number(financial, "currentPrice")?,
    };

    let currency = price_module
        .and_then(|m| m.get("currency"))
        .or_else(|| financial.and_then(|m| m.get("financialCurrency")))
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(Currency::new);

    Ok(RawFundamentals {
        ticker: ticker.clone(),
        price,
        shares_outstanding: raw_number(stats, "sharesOutstanding")?,
        eps_ttm: raw_number(stats, "trailingEps")?,
        ni_ttm: raw_number(stats, "netIncomeToCommon")?,
        currency,
    })
}

fn raw_number(
    module: Option<&serde_json::Value>,
    field: &str,
) -> Result<Option<Decimal>, DataSourceError> {
    let Some(raw) = module
        .and_then(|m| m.get(field))
        .and_then(|node| node.get("raw"))
        .filter(|v| !v.is_null())
    else {
        return Ok(None);
    };

    let text = match raw {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => {
            return Err(DataSourceError::ParseError(format!(
                "Invalid {}: {}",
                field, other
            )))
        }
    };

    RustDecimal::from_str(&text)
        .or_else(|_| RustDecimal::from_scientific(&text))
        .map(|d| Some(Decimal::new(d)))
        .map_err(|e| DataSourceError::ParseError(format!("Invalid {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parse_full_summary() {
        let body = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "regularMarketPrice": {"raw": 187.44, "fmt": "187.44"},
                        "currency": "USD"
                    },
                    "defaultKeyStatistics": {
                        "sharesOutstanding": {"raw": 15441900000_u64, "fmt": "15.44B"},
                        "trailingEps": {"raw": 6.42, "fmt": "6.42"},
                        "netIncomeToCommon": {"raw": 100913000448_u64, "fmt": "100.91B"}
                    }
                }],
                "error": null
            }
        });

        let raw = parse_quote_summary(&ticker("AAPL"), &body).unwrap();
        assert_eq!(raw.ticker, ticker("AAPL"));
        assert_eq!(raw.price, Some(d("187.44")));
        assert_eq!(raw.shares_outstanding, Some(d("15441900000")));
        assert_eq!(raw.eps_ttm, Some(d("6.42")));
        assert_eq!(raw.ni_ttm, Some(d("100913000448")));
        assert_eq!(raw.currency, Some(Currency::new("USD")));
    }

    #[test]
    fn test_parse_empty_nodes_are_absent() {
        let body = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "price": {"regularMarketPrice": {}, "currency": "EUR"},
                    "defaultKeyStatistics": {
                        "sharesOutstanding": {"raw": 1000},
                        "trailingEps": {}
                    },
                    "financialData": {"currentPrice": {"raw": 12.5}}
                }]
            }
        });

        let raw = parse_quote_summary(&ticker("SAP.DE"), &body).unwrap();
        assert_eq!(raw.price, Some(d("12.5")));
        assert_eq!(raw.eps_ttm, None);
        assert_eq!(raw.ni_ttm, None);
        assert_eq!(raw.currency, Some(Currency::new("EUR")));
    }

    #[test]
    fn test_parse_not_found_error() {
        let body = serde_json::json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: ZZZZ"}
            }
        });
        assert_eq!(
            parse_quote_summary(&ticker("ZZZZ"), &body),
            Err(DataSourceError::NotFound("ZZZZ".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        let body = serde_json::json!({"chart": {}});
        assert!(matches!(
            parse_quote_summary(&ticker("AAPL"), &body),
            Err(DataSourceError::ParseError(_))
        ));

        let body = serde_json::json!({
            "quoteSummary": {"result": [{
                "defaultKeyStatistics": {"trailingEps": {"raw": true}}
            }]}
        });
        assert!(matches!(
            parse_quote_summary(&ticker("AAPL"), &body),
            Err(DataSourceError::ParseError(_))
        ));
    }

    #[test]
    fn test_raw_number_accepts_scientific_notation() {
        let module = serde_json::json!({"sharesOutstanding": {"raw": "1.5e10"}});
        assert_eq!(
            raw_number(Some(&module), "sharesOutstanding").unwrap(),
            Some(d("15000000000"))
        );
    }
}
