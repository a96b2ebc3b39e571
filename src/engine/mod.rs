//! Pure computation: fundamentals derivation and the pro forma EPS engine.
//!
//! Nothing in here performs I/O or holds state between calls.

use crate::domain::{Currency, Decimal, Ticker};
use thiserror::Error;

pub mod derive;
pub mod proforma;

pub use derive::{derive_fundamentals, ensure_same_currency};
pub use proforma::compute_pro_forma;

/// Value-level failures of the engine. No partial results are ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("missing fundamental data for {ticker}: {}", fields.join(", "))]
    MissingFundamentalData {
        ticker: Ticker,
        fields: Vec<&'static str>,
    },
    #[error("currency mismatch: acquirer reports in {acquirer}, target in {target}")]
    CurrencyMismatch { acquirer: Currency, target: Currency },
    #[error("invalid fundamentals for {ticker}: {reason}")]
    InvalidFundamentals { ticker: Ticker, reason: String },
    #[error("division by zero computing {context}")]
    DivisionByZero { context: &'static str },
    #[error("arithmetic overflow computing {context}")]
    Overflow { context: &'static str },
}

/// Unwrap a checked operation, naming the quantity being computed on overflow.
pub(crate) fn checked(value: Option<Decimal>, context: &'static str) -> Result<Decimal, EngineError> {
    value.ok_or(EngineError::Overflow { context })
}
