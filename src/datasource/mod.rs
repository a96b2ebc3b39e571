//! Fundamentals provider abstraction.
//!
//! Providers return whatever they have as [`RawFundamentals`]; deciding
//! whether that record is usable is left to [`crate::engine::derive`].

use crate::domain::{RawFundamentals, Ticker};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod yahoo;

pub use mock::MockDataSource;
pub use yahoo::YahooDataSource;

/// Source of per-ticker fundamentals (price, shares, trailing EPS, net income, currency).
///
/// Implementations own their retry policy; callers bound each call with a timeout.
#[async_trait]
pub trait FundamentalsSource: Send + Sync + fmt::Debug {
    /// Fetch the latest fundamentals for `ticker`.
    ///
    /// # Returns
    /// A record with every field the provider knows; absent fields are `None`.
    /// An unknown ticker is [`DataSourceError::NotFound`].
    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<RawFundamentals, DataSourceError>;
}

/// Error type for provider calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The provider does not know the ticker.
    NotFound(String),
    /// Network error (e.g., connection refused, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error)
    HttpError { status: u16, message: String },
    /// Invalid JSON or unexpected response shape
    ParseError(String),
    RateLimited,
    /// The call did not complete within the configured timeout.
    Timeout { after_ms: u64 },
    Other(String),
}

impl DataSourceError {
    /// Upstream unavailable (as opposed to the ticker being unknown).
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, DataSourceError::NotFound(_))
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NotFound(ticker) => write!(f, "Unknown ticker: {}", ticker),
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Timeout { after_ms } => {
                write!(f, "Provider timed out after {}ms", after_ms)
            }
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
