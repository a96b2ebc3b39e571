use crate::datasource::{DataSourceError, FundamentalsSource};
use crate::domain::{CompanyFundamentals, Ticker};
use crate::engine::{derive_fundamentals, EngineError};
use futures::future::try_join;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Fetches raw fundamentals with a bounded timeout and completes them.
#[derive(Clone)]
pub struct FundamentalsService {
    source: Arc<dyn FundamentalsSource>,
    timeout: Duration,
}

impl FundamentalsService {
    pub fn new(source: Arc<dyn FundamentalsSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fundamentals for one ticker, `ni_ttm` populated.
    pub async fn basics(&self, ticker: &Ticker) -> Result<CompanyFundamentals, FundamentalsError> {
        let raw = tokio::time::timeout(self.timeout, self.source.fetch_fundamentals(ticker))
            .await
            .map_err(|_| DataSourceError::Timeout {
                after_ms: millis(self.timeout),
            })
            .and_then(|result| result)
            .map_err(|e| {
                tracing::warn!("Fundamentals lookup for {} failed: {}", ticker, e);
                e
            })?;

        let fundamentals = derive_fundamentals(raw)?;
        tracing::debug!(
            "Fundamentals for {}: ni_ttm={} ({:?}), shares={}",
            ticker,
            fundamentals.ni_ttm,
            fundamentals.ni_source,
            fundamentals.shares_outstanding
        );
        Ok(fundamentals)
    }

    /// Acquirer and target fundamentals, fetched concurrently.
    pub async fn pair(
        &self,
        acquirer: &Ticker,
        target: &Ticker,
    ) -> Result<(CompanyFundamentals, CompanyFundamentals), FundamentalsError> {
        try_join(self.basics(acquirer), self.basics(target)).await
    }
}

/// Whole milliseconds, saturating for durations beyond `u64::MAX` ms.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Error)]
pub enum FundamentalsError {
    #[error(transparent)]
    Source(#[from] DataSourceError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
