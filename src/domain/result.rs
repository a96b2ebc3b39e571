//! Output of the pro forma engine.

use crate::domain::{Decimal, DealType};
use serde::{Deserialize, Serialize};

/// Whether a bridge line moves earnings, the share count, or EPS itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Affects {
    NetIncome,
    Shares,
    Eps,
}

/// Bridge line labels, in the order they appear in a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BridgeLabel {
    TargetNiContribution,
    SynergiesAfterTax,
    FinancingCostAfterTax,
    ForegoneInterestAfterTax,
    AmortizationDrag,
    NetIncomeChange,
    ShareDilution,
    EpsChange,
}

impl BridgeLabel {
    pub fn affects(&self) -> Affects {
        match self {
            BridgeLabel::TargetNiContribution
            | BridgeLabel::SynergiesAfterTax
            | BridgeLabel::FinancingCostAfterTax
            | BridgeLabel::ForegoneInterestAfterTax
            | BridgeLabel::AmortizationDrag
            | BridgeLabel::NetIncomeChange => Affects::NetIncome,
            BridgeLabel::ShareDilution => Affects::Shares,
            BridgeLabel::EpsChange => Affects::Eps,
        }
    }

    /// Deal adjustments on top of the simple sum of both companies' earnings.
    pub fn is_ni_adjustment(&self) -> bool {
        matches!(
            self,
            BridgeLabel::SynergiesAfterTax
                | BridgeLabel::FinancingCostAfterTax
                | BridgeLabel::ForegoneInterestAfterTax
                | BridgeLabel::AmortizationDrag
        )
    }
}

/// One signed line of the bridge. Costs are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BridgeItem {
    pub label: BridgeLabel,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub affects: Affects,
}

impl BridgeItem {
    pub fn new(label: BridgeLabel, amount: Decimal) -> Self {
        Self {
            label,
            amount,
            affects: label.affects(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProFormaResult {
    pub deal_type: DealType,
    #[schema(value_type = f64)]
    pub standalone_eps: Decimal,
    #[schema(value_type = f64)]
    pub pro_forma_eps: Decimal,
    /// `(pro_forma_eps - standalone_eps) / |standalone_eps|`, as a fraction.
    ///
    /// Divides by the magnitude rather than the signed standalone EPS so that the
    /// sign always matches the direction of the EPS change. For a loss-making
    /// acquirer the signed form would report a smaller loss per share as dilution.
    #[schema(value_type = f64)]
    pub accretion_dilution_pct: Decimal,
    pub is_accretive: bool,
    #[schema(value_type = f64)]
    pub combined_net_income: Decimal,
    #[schema(value_type = f64)]
    pub combined_diluted_shares: Decimal,
    #[schema(value_type = f64)]
    pub new_shares_issued: Decimal,
    /// Pre-tax synergies that make the deal EPS-neutral; `None` at a 100% tax rate.
    #[schema(value_type = Option<f64>)]
    pub breakeven_synergies_pre_tax: Option<Decimal>,
    pub bridge: Vec<BridgeItem>,
    pub notes: Vec<String>,
}

impl ProFormaResult {
    pub fn bridge_item(&self, label: BridgeLabel) -> Option<&BridgeItem> {
        self.bridge.iter().find(|item| item.label == label)
    }

    /// Sum of the net income adjustments (synergies, financing, foregone interest, amortization).
    pub fn ni_adjustments_total(&self) -> Decimal {
        self.bridge
            .iter()
            .filter(|item| item.label.is_ni_adjustment())
            .map(|item| item.amount)
            .sum()
    }
}
