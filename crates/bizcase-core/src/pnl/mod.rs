pub mod aggregate;
pub mod builder;
pub mod financing;

pub use aggregate::{
    aggregate_pnl, aggregate_volumes, calculate_pnl_per_kg, wa_per_kg, weighted_price_per_kg,
    PnlPerKg,
};
pub use builder::{build_sku_pnl, manpower_cost_annual, power_cost_annual, sga_cost, PnlYear, SkuProjection};
pub use financing::{
    build_case_depreciation, build_depreciation_for_sku, build_interest_for_case,
    build_interest_for_sku, capex_for_debt_case, capex_for_debt_machine_only, tax_floored,
    tax_unfloored, working_capital_investment,
};
