use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{floor_zero, safe_div};
use crate::pnl::PnlYear;
use crate::types::{Money, Rate};

/// Return on capital employed for one projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoceYear {
    pub year: u32,
    pub roce: Rate,
    /// Capex less accumulated depreciation, floored at 0
    pub net_block: Money,
    pub working_capital: Money,
    pub capital_employed: Money,
}

/// `roce = EBIT / (net block + NWC)`; 0 whenever capital employed is 0.
/// `nwc` is aligned with `pnl`.
pub fn build_roce(pnl: &[PnlYear], nwc: &[Money], total_capex: Money) -> Vec<RoceYear> {
    let mut accumulated_depreciation = Decimal::ZERO;
    pnl.iter()
        .enumerate()
        .map(|(i, year)| {
            accumulated_depreciation += year.depreciation;
            let net_block = floor_zero(total_capex - accumulated_depreciation);
            let working_capital = nwc.get(i).copied().unwrap_or(Decimal::ZERO);
            let capital_employed = net_block + working_capital;
            RoceYear {
                year: year.year,
                roce: safe_div(year.ebit, capital_employed),
                net_block,
                working_capital,
                capital_employed,
            }
        })
        .collect()
}
