//! Company fundamentals as consumed by the pro forma engine.

use crate::domain::{Currency, Decimal, Ticker};
use serde::{Deserialize, Serialize};

/// Fundamentals exactly as a provider returned them; any field may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFundamentals {
    pub ticker: Ticker,
    pub price: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
    /// Trailing twelve-month diluted EPS.
    pub eps_ttm: Option<Decimal>,
    /// Trailing twelve-month net income, when the provider reports it directly.
    pub ni_ttm: Option<Decimal>,
    pub currency: Option<Currency>,
}

impl RawFundamentals {
    /// An empty record for `ticker`.
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            price: None,
            shares_outstanding: None,
            eps_ttm: None,
            ni_ttm: None,
            currency: None,
        }
    }
}

/// Where `ni_ttm` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NetIncomeSource {
    /// Reported by the provider.
    Reported,
    /// Computed as `eps_ttm * shares_outstanding`.
    Derived,
}

/// Complete, validated fundamentals for one company.
///
/// Built by [`crate::engine::derive_fundamentals`]; `ni_ttm` is always set and
/// `shares_outstanding` is strictly positive when built that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyFundamentals {
    pub ticker: Ticker,
    pub price: Decimal,
    pub shares_outstanding: Decimal,
    pub eps_ttm: Option<Decimal>,
    pub ni_ttm: Decimal,
    pub ni_source: NetIncomeSource,
    pub currency: Currency,
}
