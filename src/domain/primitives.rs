//! Domain primitives: Ticker, Currency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_TICKER_LEN: usize = 16;

/// Market ticker symbol (e.g. "AAPL", "BRK-B", "RDS.A").
///
/// Always trimmed and upper-cased, including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Ticker(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerParseError {
    #[error("ticker must not be empty")]
    Empty,
    #[error("ticker is longer than {MAX_TICKER_LEN} characters")]
    TooLong,
    #[error("ticker contains invalid character {0:?}")]
    InvalidChar(char),
}

impl Ticker {
    /// Parse and normalize a user-supplied ticker.
    pub fn parse(input: &str) -> Result<Self, TickerParseError> {
        let symbol = input.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(TickerParseError::Empty);
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(TickerParseError::TooLong);
        }
        if let Some(c) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(TickerParseError::InvalidChar(c));
        }
        Ok(Ticker(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-like currency code reported by the fundamentals provider (e.g. "USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        Currency(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalizes_case_and_whitespace() {
        let t = Ticker::parse("  aapl ").unwrap();
        assert_eq!(t.as_str(), "AAPL");
        assert_eq!(t.to_string(), "AAPL");
    }

    #[test]
    fn test_ticker_accepts_exchange_suffixes() {
        assert!(Ticker::parse("BRK-B").is_ok());
        assert!(Ticker::parse("VOD.L").is_ok());
        assert!(Ticker::parse("^GSPC").is_ok());
        assert!(Ticker::parse("EURUSD=X").is_ok());
    }

    #[test]
    fn test_ticker_rejects_bad_input() {
        assert_eq!(Ticker::parse("   "), Err(TickerParseError::Empty));
        assert_eq!(
            Ticker::parse("AAPL/../x"),
            Err(TickerParseError::InvalidChar('/'))
        );
        assert_eq!(
            Ticker::parse("ABCDEFGHIJKLMNOPQ"),
            Err(TickerParseError::TooLong)
        );
    }

    #[test]
    fn test_currency_is_uppercased() {
        assert_eq!(Currency::new("usd"), Currency::new("USD"));
        assert_eq!(Currency::new(" gbp").to_string(), "GBP");
    }

    #[test]
    fn test_ticker_serializes_as_plain_string() {
        let json = serde_json::to_string(&Ticker::parse("msft").unwrap()).unwrap();
        assert_eq!(json, "\"MSFT\"");
    }

    #[test]
    fn test_ticker_deserialization_validates() {
        let t: Ticker = serde_json::from_str("\" brk-b \"").unwrap();
        assert_eq!(t.as_str(), "BRK-B");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
        assert!(serde_json::from_str::<Ticker>("\"AB CD\"").is_err());
    }
}
