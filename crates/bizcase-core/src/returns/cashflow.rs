use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::case::Sku;
use crate::pnl::{PnlYear, SkuProjection};
use crate::time_value::discount_factor;
use crate::types::{Money, Rate, HORIZON_YEARS};

const DAYS_IN_YEAR: Decimal = dec!(365);

/// One year of the free-cash-flow schedule. Year 0 carries the upfront
/// investment only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowYear {
    pub year: u32,
    pub ebit: Money,
    /// EBIT after tax at the statutory rate
    pub nopat: Money,
    pub depreciation: Money,
    pub nwc: Money,
    pub change_in_nwc: Money,
    pub fcf: Money,
    pub discount_factor: Decimal,
    pub present_value: Money,
    pub cumulative_fcf: Money,
}

/// All machine, mould and infra capex across SKUs, spent in year 0.
pub fn total_capex(skus: &[Sku]) -> Money {
    skus.iter().map(|s| s.ops.total_capex()).sum()
}

/// Net working capital per projection year:
/// `Σ_sku working_capital_days / 365 * net revenue`. `projections` is
/// aligned with `skus`.
pub fn nwc_by_year(skus: &[Sku], projections: &[SkuProjection]) -> Vec<Money> {
    (0..HORIZON_YEARS)
        .map(|i| {
            skus.iter()
                .zip(projections.iter())
                .filter_map(|(sku, p)| {
                    let revenue = p.pnl.get(i)?.revenue_net;
                    Some(sku.ops.working_capital_days() / DAYS_IN_YEAR * revenue)
                })
                .sum()
        })
        .collect()
}

/// Year 0 plus one entry per P&L year.
///
/// `fcf = EBIT * (1 - t) + depreciation - ΔNWC`, discounted at `wacc`;
/// cumulative FCF is undiscounted.
pub fn build_cashflows(
    pnl: &[PnlYear],
    nwc: &[Money],
    tax_rate: Rate,
    capex0: Money,
    wacc: Rate,
) -> Vec<CashflowYear> {
    let mut out = Vec::with_capacity(pnl.len() + 1);
    out.push(CashflowYear {
        year: 0,
        fcf: -capex0,
        discount_factor: Decimal::ONE,
        present_value: -capex0,
        cumulative_fcf: -capex0,
        ..CashflowYear::default()
    });

    let mut prev_nwc = Decimal::ZERO;
    let mut cumulative = -capex0;
    for (i, year) in pnl.iter().enumerate() {
        let nwc_y = nwc.get(i).copied().unwrap_or(Decimal::ZERO);
        let change_in_nwc = nwc_y - prev_nwc;
        let nopat = year.ebit * (Decimal::ONE - tax_rate);
        let fcf = nopat + year.depreciation - change_in_nwc;
        let df = discount_factor(wacc, i + 1);
        cumulative += fcf;

        out.push(CashflowYear {
            year: year.year,
            ebit: year.ebit,
            nopat,
            depreciation: year.depreciation,
            nwc: nwc_y,
            change_in_nwc,
            fcf,
            discount_factor: df,
            present_value: fcf * df,
            cumulative_fcf: cumulative,
        });
        prev_nwc = nwc_y;
    }
    out
}

/// First year whose cumulative FCF is non-negative.
pub fn payback_year(cashflows: &[CashflowYear]) -> Option<u32> {
    cashflows
        .iter()
        .find(|cf| cf.cumulative_fcf >= Decimal::ZERO)
        .map(|cf| cf.year)
}

/// Payback with linear interpolation inside the crossing year:
/// `(k - 1) + |cumulative[k-1]| / fcf[k]`.
pub fn payback_interpolated(cashflows: &[CashflowYear]) -> Option<Decimal> {
    let k = cashflows
        .iter()
        .position(|cf| cf.cumulative_fcf >= Decimal::ZERO)?;
    if k == 0 {
        return Some(Decimal::from(cashflows[0].year));
    }
    let before = &cashflows[k - 1];
    let crossing = &cashflows[k];
    if crossing.fcf.is_zero() {
        return Some(Decimal::from(crossing.year));
    }
    Some(Decimal::from(before.year) + (-before.cumulative_fcf) / crossing.fcf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::OpsInput;

    fn pnl_with_ebit(ebits: &[Money], depreciation: Money) -> Vec<PnlYear> {
        ebits
            .iter()
            .enumerate()
            .map(|(i, e)| PnlYear {
                year: (i + 1) as u32,
                ebit: *e,
                depreciation,
                ..PnlYear::default()
            })
            .collect()
    }

    #[test]
    fn test_total_capex() {
        let sku = Sku {
            ops: OpsInput {
                cost_of_new_machine: dec!(100),
                cost_of_old_mould: dec!(20),
                cost_of_new_infra: dec!(5),
                ..OpsInput::default()
            },
            ..Sku::default()
        };
        assert_eq!(total_capex(&[sku.clone(), sku]), dec!(250));
        assert_eq!(total_capex(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_cashflow_schedule() {
        let pnl = pnl_with_ebit(&[dec!(100), dec!(100)], dec!(50));
        let nwc = vec![dec!(30), dec!(40)];
        let cfs = build_cashflows(&pnl, &nwc, dec!(0.25), dec!(200), Decimal::ZERO);

        assert_eq!(cfs.len(), 3);
        assert_eq!(cfs[0].fcf, dec!(-200));
        assert_eq!(cfs[0].change_in_nwc, Decimal::ZERO);
        // 75 + 50 - 30
        assert_eq!(cfs[1].fcf, dec!(95));
        assert_eq!(cfs[1].change_in_nwc, dec!(30));
        // 75 + 50 - 10
        assert_eq!(cfs[2].fcf, dec!(115));
        assert_eq!(cfs[2].cumulative_fcf, dec!(10));
        assert_eq!(cfs[2].present_value, dec!(115));
    }

    #[test]
    fn test_present_value_discounting() {
        let pnl = pnl_with_ebit(&[dec!(110)], Decimal::ZERO);
        let cfs = build_cashflows(&pnl, &[], Decimal::ZERO, Decimal::ZERO, dec!(0.1));
        assert_eq!(cfs[1].present_value.round_dp(8), dec!(100));
    }

    #[test]
    fn test_payback() {
        let pnl = pnl_with_ebit(&[dec!(100), dec!(100), dec!(100)], Decimal::ZERO);
        let cfs = build_cashflows(&pnl, &[], Decimal::ZERO, dec!(250), Decimal::ZERO);
        assert_eq!(payback_year(&cfs), Some(3));
        assert_eq!(payback_interpolated(&cfs), Some(dec!(2.5)));
    }

    #[test]
    fn test_payback_never_reached() {
        let pnl = pnl_with_ebit(&[dec!(10), dec!(10)], Decimal::ZERO);
        let cfs = build_cashflows(&pnl, &[], Decimal::ZERO, dec!(1000), Decimal::ZERO);
        assert_eq!(payback_year(&cfs), None);
        assert_eq!(payback_interpolated(&cfs), None);
    }

    #[test]
    fn test_payback_without_investment_is_year_zero() {
        let pnl = pnl_with_ebit(&[dec!(10)], Decimal::ZERO);
        let cfs = build_cashflows(&pnl, &[], Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(payback_year(&cfs), Some(0));
        assert_eq!(payback_interpolated(&cfs), Some(Decimal::ZERO));
    }
}
