//! Full projection pipeline: volumes, prices, P&L, cash flows and returns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, warn};

use crate::case::{BusinessCase, Sku};
use crate::config::EngineConfig;
use crate::error::BizCaseError;
use crate::pnl::{
    aggregate_pnl, aggregate_volumes, build_sku_pnl, calculate_pnl_per_kg,
    weighted_price_per_kg, PnlPerKg, PnlYear, SkuProjection,
};
use crate::returns::{
    build_cashflows, build_roce, calculate_returns, calculate_wacc, nwc_by_year, total_capex,
    CashflowYear, Returns,
};
use crate::types::{with_metadata, ComputationOutput, Money, HORIZON_YEARS};
use crate::volume::{Capacity, YearVolumes};
use crate::BizCaseResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuCapacity {
    pub sku_id: String,
    pub capacity: Capacity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPrice {
    pub year: u32,
    pub price_per_kg: Money,
}

/// Year-0 investment split by asset class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapexSummary {
    pub machine: Money,
    pub mould: Money,
    pub infra: Money,
    pub total: Money,
}

impl CapexSummary {
    pub fn from_skus(skus: &[Sku]) -> Self {
        let mut summary = CapexSummary::default();
        for sku in skus {
            summary.machine += sku.ops.machine_capex();
            summary.mould += sku.ops.mould_capex();
            summary.infra += sku.ops.infra_capex();
        }
        summary.total = total_capex(skus);
        summary
    }
}

/// Everything derived for a case in one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcOutput {
    pub capacity: Vec<SkuCapacity>,
    pub volumes: Vec<YearVolumes>,
    pub weighted_price_per_kg: Vec<WeightedPrice>,
    pub pnl: Vec<PnlYear>,
    pub pnl_per_kg: Vec<PnlPerKg>,
    pub capex: CapexSummary,
    pub cashflows: Vec<CashflowYear>,
    pub returns: Returns,
    pub by_sku: Vec<SkuProjection>,
}

impl CalcOutput {
    /// Year-1 PAT of the case.
    pub fn pat_year1(&self) -> Money {
        self.pnl.first().map(|y| y.pat).unwrap_or(Decimal::ZERO)
    }

    /// PAT summed over the horizon.
    pub fn pat_total(&self) -> Money {
        self.pnl.iter().map(|y| y.pat).sum()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the pipeline with the default [`EngineConfig`].
pub fn calculate_scenario(case: &BusinessCase) -> CalcOutput {
    calculate_scenario_with(case, &EngineConfig::default())
}

pub fn calculate_scenario_with(case: &BusinessCase, config: &EngineConfig) -> CalcOutput {
    let finance = &case.finance;
    let skus = &case.skus;

    let by_sku: Vec<SkuProjection> = skus.iter().map(|s| build_sku_pnl(s, finance)).collect();

    let volumes = aggregate_volumes(&by_sku);
    let weighted_price_per_kg = (1..=HORIZON_YEARS as u32)
        .map(|year| WeightedPrice {
            year,
            price_per_kg: weighted_price_per_kg(&by_sku, year),
        })
        .collect();
    let pnl = aggregate_pnl(&by_sku, skus, finance);
    let pnl_per_kg = calculate_pnl_per_kg(&pnl);
    debug!(skus = skus.len(), "aggregated case p&l");

    let capex = CapexSummary::from_skus(skus);
    let wacc = calculate_wacc(finance);
    let nwc = nwc_by_year(skus, &by_sku);
    let cashflows = build_cashflows(&pnl, &nwc, finance.tax_rate, capex.total, wacc);
    let roce = build_roce(&pnl, &nwc, capex.total);
    let returns = calculate_returns(&cashflows, wacc, roce, config);
    debug!(
        wacc = %wacc,
        npv = %returns.npv,
        irr = ?returns.irr,
        payback = ?returns.payback_years,
        "computed returns"
    );

    CalcOutput {
        capacity: by_sku
            .iter()
            .map(|p| SkuCapacity {
                sku_id: p.sku_id.clone(),
                capacity: p.capacity.clone(),
            })
            .collect(),
        volumes,
        weighted_price_per_kg,
        pnl,
        pnl_per_kg,
        capex,
        cashflows,
        returns,
        by_sku,
    }
}

/// [`calculate_scenario_with`] for callers that must not unwind: a case
/// whose values overflow `Decimal` arithmetic comes back as
/// [`BizCaseError::Overflow`].
pub fn try_calculate_scenario(case: &BusinessCase, config: &EngineConfig) -> BizCaseResult<CalcOutput> {
    panic::catch_unwind(AssertUnwindSafe(|| calculate_scenario_with(case, config))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "projection aborted".to_string());
        warn!(case = %case.id, error = %message, "projection overflowed");
        BizCaseError::Overflow(message)
    })
}

/// Domain warnings for a finished run.
pub fn collect_warnings(case: &BusinessCase, output: &CalcOutput) -> Vec<String> {
    let mut warnings = Vec::new();

    if case.skus.is_empty() {
        warnings.push("Case has no SKUs; all outputs are zero".to_string());
    }
    for sku in &output.by_sku {
        if !sku.capacity_exceeded_years.is_empty() {
            warnings.push(format!(
                "SKU '{}' volume exceeds theoretical capacity in year(s) {:?}",
                sku.sku_id, sku.capacity_exceeded_years
            ));
        }
    }
    for cf in output.cashflows.iter().filter(|cf| cf.year > 0) {
        if cf.fcf < Decimal::ZERO {
            warnings.push(format!("Negative free cash flow in year {}: {}", cf.year, cf.fcf));
        }
    }
    if output.returns.irr.is_none() {
        warnings.push("IRR is undefined for this cash-flow series".to_string());
    }
    if output.returns.payback_years.is_none() {
        warnings.push(format!(
            "Investment is not paid back within {HORIZON_YEARS} years"
        ));
    }
    warnings
}

/// Pipeline run wrapped in the standard output envelope.
pub fn run_business_case(
    case: &BusinessCase,
    config: &EngineConfig,
) -> ComputationOutput<CalcOutput> {
    let start = Instant::now();
    let (output, warnings) = match try_calculate_scenario(case, config) {
        Ok(output) => {
            let warnings = collect_warnings(case, &output);
            (output, warnings)
        }
        Err(e) => {
            let empty = BusinessCase {
                skus: Vec::new(),
                ..case.clone()
            };
            (calculate_scenario_with(&empty, config), vec![format!("{e}; outputs are zero")])
        }
    };

    let assumptions = serde_json::json!({
        "horizon_years": HORIZON_YEARS,
        "finance": &case.finance,
        "sku_count": case.skus.len(),
        "irr_guess": config.irr_guess.to_string(),
        "volume_growth": match case.finance.volume_growth {
            Some(g) => g.to_string(),
            None => "default curve 10/15/20/25%".to_string(),
        },
    });

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Five-year business case projection (per-SKU P&L, FCF, NPV/IRR, RoCE)",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}
