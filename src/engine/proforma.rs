//! Pro forma EPS engine: accretion/dilution of a deal for the acquirer.
//!
//! ```text
//! standalone_eps  = NI_a / S_a
//! combined_ni     = NI_a + NI_t + synergies * (1 - t) - ppa_amort
//!                   - debt * r * (1 - t) - on_hand * r_foregone * (1 - t)
//! combined_shares = S_a + S_t * exchange_ratio
//! pro_forma_eps   = combined_ni / combined_shares
//! accretion       = (pro_forma_eps - standalone_eps) / |standalone_eps|
//! ```
//!
//! Fundamentals come from a provider and are unbounded, so every product or
//! sum that involves them is checked and reported as [`EngineError::Overflow`].

use super::{checked, ensure_same_currency, EngineError};
use crate::domain::{
    BridgeItem, BridgeLabel, CompanyFundamentals, Consideration, DealStructure, Decimal,
    NetIncomeSource, ProFormaResult,
};

/// Compute standalone and pro forma EPS, accretion/dilution and the bridge.
///
/// Either a complete result or a named failure; never a partial result.
pub fn compute_pro_forma(
    acquirer: &CompanyFundamentals,
    target: &CompanyFundamentals,
    deal: &DealStructure,
) -> Result<ProFormaResult, EngineError> {
    ensure_positive_shares(acquirer)?;
    ensure_positive_shares(target)?;
    ensure_same_currency(acquirer, target)?;

    let after_tax = Decimal::one() - deal.tax_rate();

    let standalone_eps = acquirer
        .ni_ttm
        .checked_div(acquirer.shares_outstanding)
        .ok_or(EngineError::DivisionByZero {
            context: "standalone_eps",
        })?;

    // Deal inputs are bounded at normalization, so these products cannot overflow.
    let synergies_after_tax = deal.synergies_pre_tax() * after_tax;
    let amortization_drag = deal.ppa_amort_post_tax();
    let (new_shares_issued, cash_paid) = consideration_effects(deal, target)?;
    let funding = deal.funding().unwrap_or_default();
    let paid_from_balances = cash_paid * funding.cash_on_hand_pct;
    let paid_from_debt = cash_paid - paid_from_balances;
    let financing_cost_after_tax = paid_from_debt * funding.financing_rate * after_tax;
    let foregone_interest_after_tax =
        paid_from_balances * funding.foregone_interest_rate * after_tax;

    let combined_net_income = [
        target.ni_ttm,
        synergies_after_tax,
        -amortization_drag,
        -financing_cost_after_tax,
        -foregone_interest_after_tax,
    ]
    .into_iter()
    .try_fold(acquirer.ni_ttm, |acc, term| {
        checked(acc.checked_add(term), "combined_net_income")
    })?;
    let combined_diluted_shares = checked(
        acquirer.shares_outstanding.checked_add(new_shares_issued),
        "combined_diluted_shares",
    )?;

    let pro_forma_eps = combined_net_income
        .checked_div(combined_diluted_shares)
        .ok_or(EngineError::DivisionByZero {
            context: "pro_forma_eps",
        })?;

    let eps_change = checked(pro_forma_eps.checked_sub(standalone_eps), "eps_change")?;
    let accretion_dilution_pct =
        eps_change
            .checked_div(standalone_eps.abs())
            .ok_or(EngineError::DivisionByZero {
                context: "accretion_dilution_pct",
            })?;

    let net_income_change = checked(
        combined_net_income.checked_sub(acquirer.ni_ttm),
        "net_income_change",
    )?;
    let breakeven_synergies_pre_tax = breakeven_synergies(
        standalone_eps,
        combined_diluted_shares,
        checked(
            combined_net_income.checked_sub(synergies_after_tax),
            "breakeven_synergies_pre_tax",
        )?,
        after_tax,
    )?;

    let bridge = vec![
        BridgeItem::new(BridgeLabel::TargetNiContribution, target.ni_ttm),
        BridgeItem::new(BridgeLabel::SynergiesAfterTax, synergies_after_tax),
        BridgeItem::new(BridgeLabel::FinancingCostAfterTax, -financing_cost_after_tax),
        BridgeItem::new(
            BridgeLabel::ForegoneInterestAfterTax,
            -foregone_interest_after_tax,
        ),
        BridgeItem::new(BridgeLabel::AmortizationDrag, -amortization_drag),
        BridgeItem::new(BridgeLabel::NetIncomeChange, net_income_change),
        BridgeItem::new(BridgeLabel::ShareDilution, new_shares_issued),
        BridgeItem::new(BridgeLabel::EpsChange, eps_change),
    ];

    Ok(ProFormaResult {
        deal_type: deal.deal_type(),
        standalone_eps,
        pro_forma_eps,
        accretion_dilution_pct,
        is_accretive: !eps_change.is_negative(),
        combined_net_income,
        combined_diluted_shares,
        new_shares_issued,
        breakeven_synergies_pre_tax,
        bridge,
        notes: notes(acquirer, target, deal),
    })
}

fn ensure_positive_shares(company: &CompanyFundamentals) -> Result<(), EngineError> {
    if !company.shares_outstanding.is_positive() {
        return Err(EngineError::InvalidFundamentals {
            ticker: company.ticker.clone(),
            reason: format!(
                "shares_outstanding must be positive, got {}",
                company.shares_outstanding
            ),
        });
    }
    Ok(())
}

/// Returns `(new_shares_issued, cash_paid)` for the consideration.
fn consideration_effects(
    deal: &DealStructure,
    target: &CompanyFundamentals,
) -> Result<(Decimal, Decimal), EngineError> {
    let issue = |exchange_ratio: Decimal| {
        checked(
            target.shares_outstanding.checked_mul(exchange_ratio),
            "new_shares_issued",
        )
    };
    Ok(match *deal.consideration() {
        Consideration::Cash {
            cash_consideration, ..
        } => (Decimal::zero(), cash_consideration),
        Consideration::Stock { exchange_ratio } => (issue(exchange_ratio)?, Decimal::zero()),
        Consideration::Mixed {
            exchange_ratio,
            cash_consideration,
            cash_pct,
            ..
        } => {
            let full_issue = issue(exchange_ratio)?;
            match cash_pct {
                Some(pct) => (
                    checked(
                        full_issue.checked_mul(Decimal::one() - pct),
                        "new_shares_issued",
                    )?,
                    cash_consideration * pct,
                ),
                None => (full_issue, cash_consideration),
            }
        }
    })
}

/// Pre-tax synergies `S` solving `(ni_ex_synergies + S * (1 - t)) / shares = standalone_eps`.
///
/// Clamped at zero: a negative answer means the deal is accretive without synergies.
/// `None` when nothing survives tax.
fn breakeven_synergies(
    standalone_eps: Decimal,
    combined_shares: Decimal,
    ni_ex_synergies: Decimal,
    after_tax: Decimal,
) -> Result<Option<Decimal>, EngineError> {
    const CONTEXT: &str = "breakeven_synergies_pre_tax";
    let required = checked(standalone_eps.checked_mul(combined_shares), CONTEXT)?;
    let shortfall = checked(required.checked_sub(ni_ex_synergies), CONTEXT)?;
    if after_tax.is_zero() {
        return Ok(None);
    }
    checked(shortfall.checked_div(after_tax), CONTEXT).map(|s| Some(s.max(Decimal::zero())))
}

fn notes(
    acquirer: &CompanyFundamentals,
    target: &CompanyFundamentals,
    deal: &DealStructure,
) -> Vec<String> {
    let mut notes = Vec::new();

    for field in deal.ignored_fields() {
        notes.push(format!("{} ignored for a {} deal.", field, deal.deal_type()));
    }

    if !acquirer.ni_ttm.is_positive() {
        notes.push(format!(
            "{} net income is not positive; accretion is measured against a loss-making base.",
            acquirer.ticker
        ));
    }

    for company in [acquirer, target] {
        if company.ni_source == NetIncomeSource::Derived {
            notes.push(format!(
                "{} net income derived from trailing EPS x shares outstanding.",
                company.ticker
            ));
        }
    }

    match *deal.consideration() {
        Consideration::Mixed { cash_pct: None, .. } => notes.push(
            "Mixed deal without cash_pct: exchange ratio and cash consideration both applied in full."
                .to_string(),
        ),
        Consideration::Mixed {
            cash_pct: Some(pct),
            ..
        } => notes.push(format!(
            "Mix fraction applied: {}% cash, {}% stock.",
            (pct * Decimal::hundred()).round_dp(2),
            ((Decimal::one() - pct) * Decimal::hundred()).round_dp(2)
        )),
        _ => {}
    }

    if let (Some(cash), Some(funding)) = (deal.cash_consideration(), deal.funding()) {
        if funding.cash_on_hand_pct.is_positive() {
            notes.push(format!(
                "{}% of cash paid from balances on hand at {}% foregone interest.",
                (funding.cash_on_hand_pct * Decimal::hundred()).round_dp(2),
                (funding.foregone_interest_rate * Decimal::hundred()).round_dp(2)
            ));
        }
        if cash.is_positive()
            && funding.cash_on_hand_pct < Decimal::one()
            && funding.financing_rate.is_zero()
        {
            notes.push("Cash portion assumed unfinanced (financing_rate = 0).".to_string());
        }
    }

    notes
}
