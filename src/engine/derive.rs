//! Derived fundamentals: completes a raw provider record.

use super::EngineError;
use crate::domain::{CompanyFundamentals, NetIncomeSource, RawFundamentals};

/// Turn a provider record into complete [`CompanyFundamentals`].
///
/// Reported net income wins; otherwise it is derived as
/// `eps_ttm * shares_outstanding`. Every absent field needed for that is
/// named in the error.
pub fn derive_fundamentals(raw: RawFundamentals) -> Result<CompanyFundamentals, EngineError> {
    let mut missing = Vec::new();
    if raw.price.is_none() {
        missing.push("price");
    }
    if raw.shares_outstanding.is_none() {
        missing.push("shares_outstanding");
    }

    let net_income = match (raw.ni_ttm, raw.eps_ttm, raw.shares_outstanding) {
        (Some(ni), _, _) => Some((ni, NetIncomeSource::Reported)),
        (None, Some(eps), Some(shares)) => {
            let Some(ni) = eps.checked_mul(shares) else {
                return Err(EngineError::InvalidFundamentals {
                    ticker: raw.ticker,
                    reason: format!(
                        "eps_ttm {} x shares_outstanding {} is out of range",
                        eps, shares
                    ),
                });
            };
            Some((ni, NetIncomeSource::Derived))
        }
        (None, eps, _) => {
            missing.push("ni_ttm");
            if eps.is_none() {
                missing.push("eps_ttm");
            }
            None
        }
    };

    if raw.currency.is_none() {
        missing.push("currency");
    }

    let (Some(price), Some(shares_outstanding), Some((ni_ttm, ni_source)), Some(currency)) =
        (raw.price, raw.shares_outstanding, net_income, raw.currency)
    else {
        return Err(EngineError::MissingFundamentalData {
            ticker: raw.ticker,
            fields: missing,
        });
    };

    if !shares_outstanding.is_positive() {
        return Err(EngineError::InvalidFundamentals {
            ticker: raw.ticker,
            reason: format!("shares_outstanding must be positive, got {}", shares_outstanding),
        });
    }
    if price.is_negative() {
        return Err(EngineError::InvalidFundamentals {
            ticker: raw.ticker,
            reason: format!("price must not be negative, got {}", price),
        });
    }

    Ok(CompanyFundamentals {
        ticker: raw.ticker,
        price,
        shares_outstanding,
        eps_ttm: raw.eps_ttm,
        ni_ttm,
        ni_source,
        currency,
    })
}

/// Acquirer and target must report in the same currency; nothing is converted.
pub fn ensure_same_currency(
    acquirer: &CompanyFundamentals,
    target: &CompanyFundamentals,
) -> Result<(), EngineError> {
    if acquirer.currency != target.currency {
        return Err(EngineError::CurrencyMismatch {
            acquirer: acquirer.currency.clone(),
            target: target.currency.clone(),
        });
    }
    Ok(())
}
