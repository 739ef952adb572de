//! Depreciation, debt, interest and tax lines.
//!
//! Two interest and two tax formulas coexist on purpose: the per-SKU
//! statement finances machine capex only and floors tax at zero, while the
//! case-level statement finances machine and infra capex plus a working
//! capital investment and lets tax go negative. Which of the two reflects
//! the intended business rule is unresolved, so both stay separately named.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::case::{FinanceInput, OpsInput, Sku};
use crate::math::safe_div;
use crate::types::{Money, Rate};

/// Floor on working-capital days in the case-level debt sizing.
pub const MIN_WORKING_CAPITAL_DAYS_FOR_DEBT: Decimal = dec!(60);

const DAYS_IN_YEAR: Decimal = dec!(365);

/// Straight-line annual depreciation for one SKU's assets.
pub fn build_depreciation_for_sku(ops: &OpsInput) -> Money {
    safe_div(ops.machine_capex(), ops.machine_life())
        + safe_div(ops.mould_capex(), ops.mould_life())
        + safe_div(ops.infra_capex(), ops.infra_life())
}

/// Case depreciation: the sum across SKUs, identical in every year.
pub fn build_case_depreciation(skus: &[Sku]) -> Money {
    skus.iter().map(|s| build_depreciation_for_sku(&s.ops)).sum()
}

/// Debt-financed capex on the per-SKU path: machines only, infra excluded.
pub fn capex_for_debt_machine_only(ops: &OpsInput) -> Money {
    ops.machine_capex()
}

/// `debt_share * machine capex * cost_of_debt`
pub fn build_interest_for_sku(ops: &OpsInput, finance: &FinanceInput) -> Money {
    let opening_debt = finance.debt_share * capex_for_debt_machine_only(ops);
    opening_debt * finance.cost_of_debt
}

/// Debt-financed capex on the case path: machines plus infra.
pub fn capex_for_debt_case(skus: &[Sku]) -> Money {
    skus.iter()
        .map(|s| s.ops.machine_capex() + s.ops.infra_capex())
        .sum()
}

/// Year-1 working-capital investment, `max(60, days) / 365 * net revenue`
/// per SKU. `revenue_y1` is aligned with `skus`.
pub fn working_capital_investment(skus: &[Sku], revenue_y1: &[Money]) -> Money {
    skus.iter()
        .zip(revenue_y1.iter())
        .map(|(sku, revenue)| {
            let days = sku.ops.working_capital_days().max(MIN_WORKING_CAPITAL_DAYS_FOR_DEBT);
            days / DAYS_IN_YEAR * revenue
        })
        .sum()
}

/// `debt_share * (machine + infra capex + WC investment) * cost_of_debt`
pub fn build_interest_for_case(
    skus: &[Sku],
    revenue_y1: &[Money],
    finance: &FinanceInput,
) -> Money {
    let financed = capex_for_debt_case(skus) + working_capital_investment(skus, revenue_y1);
    finance.debt_share * financed * finance.cost_of_debt
}

/// Per-SKU tax: no credit for losses.
pub fn tax_floored(pbt: Money, rate: Rate) -> Money {
    pbt.max(Decimal::ZERO) * rate
}

/// Case-level tax: losses produce a negative tax (benefit).
pub fn tax_unfloored(pbt: Money, rate: Rate) -> Money {
    pbt * rate
}
