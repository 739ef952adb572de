pub mod cashflow;
pub mod roce;

pub use cashflow::{
    build_cashflows, nwc_by_year, payback_interpolated, payback_year, total_capex, CashflowYear,
};
pub use roce::{build_roce, RoceYear};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::case::FinanceInput;
use crate::config::EngineConfig;
use crate::time_value::{irr_with, npv};
use crate::types::{Money, Rate};

/// Investment returns of the whole case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Returns {
    pub wacc: Rate,
    pub npv: Money,
    /// `None` when the FCF series has no root or the solver does not converge
    pub irr: Option<Rate>,
    pub payback_years: Option<u32>,
    pub payback_interpolated: Option<Decimal>,
    pub roce: Vec<RoceYear>,
}

/// `d * kd * (1 - t) + (1 - d) * ke`
pub fn calculate_wacc(finance: &FinanceInput) -> Rate {
    let d = finance.debt_share;
    d * finance.cost_of_debt * (Decimal::ONE - finance.tax_rate)
        + (Decimal::ONE - d) * finance.cost_of_equity
}

/// NPV, IRR and payback from a cash-flow schedule; RoCE is supplied by the
/// caller since it needs the P&L.
pub fn calculate_returns(
    cashflows: &[CashflowYear],
    wacc: Rate,
    roce: Vec<RoceYear>,
    config: &EngineConfig,
) -> Returns {
    let flows: Vec<Money> = cashflows.iter().map(|cf| cf.fcf).collect();
    Returns {
        wacc,
        npv: npv(wacc, &flows),
        irr: irr_with(
            &flows,
            config.irr_guess,
            config.irr_tolerance,
            config.irr_max_iterations,
        ),
        payback_years: payback_year(cashflows),
        payback_interpolated: payback_interpolated(cashflows),
        roce,
    }
}
