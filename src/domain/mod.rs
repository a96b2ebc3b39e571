//! Domain types for the pro forma EPS service.
//!
//! - Decimal wrapper used for every amount, count and rate
//! - Ticker and Currency primitives
//! - Fundamentals (raw provider records and the validated form)
//! - Deal structure (raw payload, validated tagged variant)
//! - Pro forma result and its bridge

pub mod deal;
pub mod decimal;
pub mod fundamentals;
pub mod primitives;
pub mod result;

pub use deal::{
    CashFunding, Consideration, DealStructure, DealType, RawDealStructure, ValidationError,
};
pub use decimal::Decimal;
pub use fundamentals::{CompanyFundamentals, NetIncomeSource, RawFundamentals};
pub use primitives::{Currency, Ticker, TickerParseError};
pub use result::{Affects, BridgeItem, BridgeLabel, ProFormaResult};
