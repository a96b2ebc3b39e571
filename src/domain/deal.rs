//! Deal structure: raw request payload and its validated, normalized form.

use crate::domain::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for any currency amount in a deal (one quadrillion).
const MAX_AMOUNT: Decimal = Decimal::from_inner(dec!(1000000000000000));
const MAX_EXCHANGE_RATIO: Decimal = Decimal::from_inner(dec!(1000000));

/// A rejected deal parameter. `field` is the payload field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Deal parameters as received on the wire. Nothing is validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RawDealStructure {
    /// One of `cash`, `stock`, `mixed` (`mix` is accepted as an alias).
    #[serde(rename = "type")]
    #[schema(example = "stock")]
    pub deal_type: Option<String>,
    /// Acquirer shares issued per target share. Required for stock and mixed deals.
    #[schema(value_type = Option<f64>, example = 0.2)]
    pub exchange_ratio: Option<Decimal>,
    /// Cash paid to target holders. Required for cash and mixed deals.
    #[schema(value_type = Option<f64>)]
    pub cash_consideration: Option<Decimal>,
    /// Fraction of consideration paid in cash for mixed deals, in [0, 1].
    #[schema(value_type = Option<f64>)]
    pub cash_pct: Option<Decimal>,
    /// Pre-tax interest rate on debt raised to fund the cash portion.
    #[schema(value_type = Option<f64>)]
    pub financing_rate: Option<Decimal>,
    /// Fraction of the cash paid out of existing balances instead of new debt, in [0, 1].
    #[schema(value_type = Option<f64>)]
    pub cash_on_hand_pct: Option<Decimal>,
    /// Pre-tax interest the acquirer stops earning on balances paid out.
    #[schema(value_type = Option<f64>)]
    pub foregone_interest_rate: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub synergies_pre_tax: Option<Decimal>,
    /// Flat tax rate in [0, 1].
    #[schema(value_type = Option<f64>, example = 0.21)]
    pub tax_rate: Option<Decimal>,
    /// Post-tax amortization of purchase-price-allocation step-ups.
    #[schema(value_type = Option<f64>)]
    pub ppa_amort_post_tax: Option<Decimal>,
}

impl RawDealStructure {
    pub fn new(deal_type: &str) -> Self {
        Self {
            deal_type: Some(deal_type.to_string()),
            ..Default::default()
        }
    }

    pub fn with_exchange_ratio(mut self, value: Decimal) -> Self {
        self.exchange_ratio = Some(value);
        self
    }

    pub fn with_cash_consideration(mut self, value: Decimal) -> Self {
        self.cash_consideration = Some(value);
        self
    }

    pub fn with_cash_pct(mut self, value: Decimal) -> Self {
        self.cash_pct = Some(value);
        self
    }

    pub fn with_financing_rate(mut self, value: Decimal) -> Self {
        self.financing_rate = Some(value);
        self
    }

    pub fn with_cash_on_hand_pct(mut self, value: Decimal) -> Self {
        self.cash_on_hand_pct = Some(value);
        self
    }

    pub fn with_foregone_interest_rate(mut self, value: Decimal) -> Self {
        self.foregone_interest_rate = Some(value);
        self
    }

    pub fn with_synergies_pre_tax(mut self, value: Decimal) -> Self {
        self.synergies_pre_tax = Some(value);
        self
    }

    pub fn with_tax_rate(mut self, value: Decimal) -> Self {
        self.tax_rate = Some(value);
        self
    }

    pub fn with_ppa_amort_post_tax(mut self, value: Decimal) -> Self {
        self.ppa_amort_post_tax = Some(value);
        self
    }

    /// Validate and normalize into a [`DealStructure`].
    pub fn build(&self) -> Result<DealStructure, ValidationError> {
        DealStructure::normalize(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    Cash,
    Stock,
    Mixed,
}

impl DealType {
    fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(DealType::Cash),
            "stock" => Ok(DealType::Stock),
            "mixed" | "mix" => Ok(DealType::Mixed),
            other => Err(ValidationError::new(
                "type",
                format!("must be cash, stock, or mixed, got {:?}", other),
            )),
        }
    }
}

impl std::fmt::Display for DealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealType::Cash => write!(f, "cash"),
            DealType::Stock => write!(f, "stock"),
            DealType::Mixed => write!(f, "mixed"),
        }
    }
}

/// How the cash paid to target holders is funded.
///
/// `cash_on_hand_pct` of the cash comes from existing balances and costs
/// `foregone_interest_rate`; the rest is new debt at `financing_rate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CashFunding {
    pub financing_rate: Decimal,
    pub cash_on_hand_pct: Decimal,
    pub foregone_interest_rate: Decimal,
}

/// How target holders are paid. Each variant carries exactly the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consideration {
    Cash {
        cash_consideration: Decimal,
        funding: CashFunding,
    },
    Stock {
        exchange_ratio: Decimal,
    },
    /// Without `cash_pct` both components apply to the full consideration.
    /// With it, new shares scale by `1 - cash_pct` and financed cash by `cash_pct`.
    Mixed {
        exchange_ratio: Decimal,
        cash_consideration: Decimal,
        funding: CashFunding,
        cash_pct: Option<Decimal>,
    },
}

/// A validated deal structure. Only obtainable through [`DealStructure::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealStructure {
    consideration: Consideration,
    synergies_pre_tax: Decimal,
    tax_rate: Decimal,
    ppa_amort_post_tax: Decimal,
    ignored_fields: Vec<&'static str>,
}

impl DealStructure {
    /// Validate raw parameters and apply defaults.
    ///
    /// Fields that do not apply to the chosen type are neither validated nor
    /// used; they are listed in [`DealStructure::ignored_fields`].
    pub fn normalize(raw: &RawDealStructure) -> Result<Self, ValidationError> {
        let deal_type = DealType::parse(
            raw.deal_type
                .as_deref()
                .ok_or_else(|| ValidationError::new("type", "is required"))?,
        )?;

        let tax_rate = raw
            .tax_rate
            .ok_or_else(|| ValidationError::new("tax_rate", "is required"))?;
        if tax_rate.is_negative() || tax_rate > Decimal::one() {
            return Err(ValidationError::new(
                "tax_rate",
                format!("must be between 0 and 1, got {}", tax_rate),
            ));
        }

        let synergies_pre_tax =
            non_negative(raw.synergies_pre_tax, "synergies_pre_tax")?.unwrap_or_default();
        let ppa_amort_post_tax =
            non_negative(raw.ppa_amort_post_tax, "ppa_amort_post_tax")?.unwrap_or_default();

        let mut ignored_fields = Vec::new();
        let mut ignore = |present: bool, field: &'static str| {
            if present {
                ignored_fields.push(field);
            }
        };

        let consideration = match deal_type {
            DealType::Cash => {
                ignore(raw.exchange_ratio.is_some(), "exchange_ratio");
                ignore(raw.cash_pct.is_some(), "cash_pct");
                Consideration::Cash {
                    cash_consideration: required_cash(raw)?,
                    funding: cash_funding(raw)?,
                }
            }
            DealType::Stock => {
                ignore(raw.cash_consideration.is_some(), "cash_consideration");
                ignore(raw.financing_rate.is_some(), "financing_rate");
                ignore(raw.cash_pct.is_some(), "cash_pct");
                ignore(raw.cash_on_hand_pct.is_some(), "cash_on_hand_pct");
                ignore(raw.foregone_interest_rate.is_some(), "foregone_interest_rate");
                Consideration::Stock {
                    exchange_ratio: required_exchange_ratio(raw)?,
                }
            }
            DealType::Mixed => {
                let cash_pct = fraction(raw.cash_pct, "cash_pct")?;
                Consideration::Mixed {
                    exchange_ratio: required_exchange_ratio(raw)?,
                    cash_consideration: required_cash(raw)?,
                    funding: cash_funding(raw)?,
                    cash_pct,
                }
            }
        };

        Ok(Self {
            consideration,
            synergies_pre_tax,
            tax_rate,
            ppa_amort_post_tax,
            ignored_fields,
        })
    }

    pub fn deal_type(&self) -> DealType {
        match self.consideration {
            Consideration::Cash { .. } => DealType::Cash,
            Consideration::Stock { .. } => DealType::Stock,
            Consideration::Mixed { .. } => DealType::Mixed,
        }
    }

    pub fn consideration(&self) -> &Consideration {
        &self.consideration
    }

    pub fn exchange_ratio(&self) -> Option<Decimal> {
        match self.consideration {
            Consideration::Stock { exchange_ratio } => Some(exchange_ratio),
            Consideration::Mixed { exchange_ratio, .. } => Some(exchange_ratio),
            Consideration::Cash { .. } => None,
        }
    }

    pub fn cash_consideration(&self) -> Option<Decimal> {
        match self.consideration {
            Consideration::Cash {
                cash_consideration, ..
            } => Some(cash_consideration),
            Consideration::Mixed {
                cash_consideration, ..
            } => Some(cash_consideration),
            Consideration::Stock { .. } => None,
        }
    }

    /// `None` for stock deals.
    pub fn funding(&self) -> Option<CashFunding> {
        match self.consideration {
            Consideration::Cash { funding, .. } => Some(funding),
            Consideration::Mixed { funding, .. } => Some(funding),
            Consideration::Stock { .. } => None,
        }
    }

    /// Zero for stock deals and for unfinanced cash.
    pub fn financing_rate(&self) -> Decimal {
        self.funding().unwrap_or_default().financing_rate
    }

    pub fn foregone_interest_rate(&self) -> Decimal {
        self.funding().unwrap_or_default().foregone_interest_rate
    }

    pub fn cash_on_hand_pct(&self) -> Decimal {
        self.funding().unwrap_or_default().cash_on_hand_pct
    }

    pub fn cash_pct(&self) -> Option<Decimal> {
        match self.consideration {
            Consideration::Mixed { cash_pct, .. } => cash_pct,
            _ => None,
        }
    }

    pub fn synergies_pre_tax(&self) -> Decimal {
        self.synergies_pre_tax
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn ppa_amort_post_tax(&self) -> Decimal {
        self.ppa_amort_post_tax
    }

    /// Supplied fields that the deal type does not use.
    pub fn ignored_fields(&self) -> &[&'static str] {
        &self.ignored_fields
    }
}

fn non_negative(
    value: Option<Decimal>,
    field: &'static str,
) -> Result<Option<Decimal>, ValidationError> {
    match value {
        Some(v) if v.is_negative() => Err(ValidationError::new(
            field,
            format!("must not be negative, got {}", v),
        )),
        other => at_most(other, field, MAX_AMOUNT),
    }
}

fn at_most(
    value: Option<Decimal>,
    field: &'static str,
    max: Decimal,
) -> Result<Option<Decimal>, ValidationError> {
    match value {
        Some(v) if v > max => Err(ValidationError::new(
            field,
            format!("must not exceed {}, got {}", max, v),
        )),
        other => Ok(other),
    }
}

fn required_cash(raw: &RawDealStructure) -> Result<Decimal, ValidationError> {
    non_negative(raw.cash_consideration, "cash_consideration")?.ok_or_else(|| {
        ValidationError::new("cash_consideration", "is required for cash and mixed deals")
    })
}

fn required_exchange_ratio(raw: &RawDealStructure) -> Result<Decimal, ValidationError> {
    let ratio = raw.exchange_ratio.ok_or_else(|| {
        ValidationError::new("exchange_ratio", "is required for stock and mixed deals")
    })?;
    if !ratio.is_positive() {
        return Err(ValidationError::new(
            "exchange_ratio",
            format!("must be positive, got {}", ratio),
        ));
    }
    at_most(Some(ratio), "exchange_ratio", MAX_EXCHANGE_RATIO)?;
    Ok(ratio)
}

fn fraction(value: Option<Decimal>, field: &'static str) -> Result<Option<Decimal>, ValidationError> {
    match value {
        Some(v) if v.is_negative() || v > Decimal::one() => Err(ValidationError::new(
            field,
            format!("must be between 0 and 1, got {}", v),
        )),
        other => Ok(other),
    }
}

/// Rates are fractions; anything above 100% is rejected. Absent rates are zero.
fn cash_funding(raw: &RawDealStructure) -> Result<CashFunding, ValidationError> {
    let financing_rate = non_negative(raw.financing_rate, "financing_rate")?;
    let foregone_interest_rate =
        non_negative(raw.foregone_interest_rate, "foregone_interest_rate")?;
    Ok(CashFunding {
        financing_rate: at_most(financing_rate, "financing_rate", Decimal::one())?
            .unwrap_or_default(),
        cash_on_hand_pct: fraction(raw.cash_on_hand_pct, "cash_on_hand_pct")?.unwrap_or_default(),
        foregone_interest_rate: at_most(
            foregone_interest_rate,
            "foregone_interest_rate",
            Decimal::one(),
        )?
        .unwrap_or_default(),
    })
}
