//! Mock fundamentals source for testing without network calls.

use super::{DataSourceError, FundamentalsSource};
use crate::domain::{RawFundamentals, Ticker};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Mock source that serves predefined records. Unknown tickers are `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    records: HashMap<Ticker, RawFundamentals>,
    failures: HashMap<Ticker, DataSourceError>,
    delay: Option<Duration>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record` for its ticker.
    pub fn with_fundamentals(mut self, record: RawFundamentals) -> Self {
        self.records.insert(record.ticker.clone(), record);
        self
    }

    /// Fail every request for `ticker` with `error`.
    pub fn with_failure(mut self, ticker: Ticker, error: DataSourceError) -> Self {
        self.failures.insert(ticker, error);
        self
    }

    /// Sleep before answering, to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl FundamentalsSource for MockDataSource {
    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<RawFundamentals, DataSourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failures.get(ticker) {
            return Err(err.clone());
        }
        self.records
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(ticker.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Decimal};

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn record(s: &str) -> RawFundamentals {
        RawFundamentals {
            price: Some(Decimal::from_str_canonical("187.5").unwrap()),
            shares_outstanding: Some(Decimal::from_str_canonical("1000").unwrap()),
            currency: Some(Currency::new("USD")),
            ..RawFundamentals::new(ticker(s))
        }
    }

    #[tokio::test]
    async fn test_mock_serves_records() {
        let mock = MockDataSource::new().with_fundamentals(record("AAPL"));
        let got = mock.fetch_fundamentals(&ticker("aapl")).await.unwrap();
        assert_eq!(got, record("AAPL"));
    }

    #[tokio::test]
    async fn test_mock_unknown_ticker_not_found() {
        let mock = MockDataSource::new().with_fundamentals(record("AAPL"));
        let err = mock.fetch_fundamentals(&ticker("MSFT")).await.unwrap_err();
        assert_eq!(err, DataSourceError::NotFound("MSFT".to_string()));
    }

    #[tokio::test]
    async fn test_mock_failure_overrides_record() {
        let mock = MockDataSource::new()
            .with_fundamentals(record("AAPL"))
            .with_failure(ticker("AAPL"), DataSourceError::RateLimited);
        let err = mock.fetch_fundamentals(&ticker("AAPL")).await.unwrap_err();
        assert_eq!(err, DataSourceError::RateLimited);
    }
}
