use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::case::BusinessCase;
use crate::config::EngineConfig;
use crate::engine::calculate_scenario_with;
use crate::error::BizCaseError;
use crate::pricing::conversion_recovery_per_piece;
use crate::types::{with_metadata, ComputationOutput, Money, Pieces, Rate};
use crate::BizCaseResult;

use super::customer::{generate_quote, CustomerQuote};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    Npv(Money),
    Irr(Rate),
}

impl OptimizationTarget {
    fn value(self) -> Decimal {
        match self {
            OptimizationTarget::Npv(v) | OptimizationTarget::Irr(v) => v,
        }
    }
}

/// Which price components the scale factor multiplies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustMode {
    #[default]
    ConversionOnly,
    AllComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOptimizationRequest {
    pub target: OptimizationTarget,
    #[serde(default)]
    pub mode: AdjustMode,
    #[serde(default = "default_quote_name")]
    pub quote_name: String,
    #[serde(default = "default_gst_rate")]
    pub gst_rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantities: Option<BTreeMap<String, Pieces>>,
}

fn default_quote_name() -> String {
    "Optimised quote".to_string()
}

fn default_gst_rate() -> Rate {
    dec!(0.18)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOptimization {
    pub factor: Decimal,
    pub target: OptimizationTarget,
    /// Metric at `factor`; `None` when IRR is undefined there
    pub achieved: Option<Decimal>,
    pub converged: bool,
    pub iterations: u32,
    pub adjusted_case: BusinessCase,
    pub quote: CustomerQuote,
}

/// Deep copy of `case` with the selected price components scaled by `factor`.
pub fn scale_components(case: &BusinessCase, mode: AdjustMode, factor: Decimal) -> BusinessCase {
    let mut copy = case.clone();
    for sku in &mut copy.skus {
        let conversion = conversion_recovery_per_piece(&sku.sales, &sku.costing);
        sku.sales.conversion_recovery_rs_per_piece = Some(conversion * factor);

        if mode == AdjustMode::AllComponents {
            let c = &mut sku.costing;
            c.resin_rs_per_kg *= factor;
            c.freight_inwards_rs_per_kg *= factor;
            c.freight_outwards_rs_per_kg *= factor;
            c.packaging_rs_per_kg *= factor;
            c.mb_rs_per_kg = c.mb_rs_per_kg.map(|v| v * factor);
            c.mould_amortisation_rs_per_piece =
                c.mould_amortisation_rs_per_piece.map(|v| v * factor);
        }
    }
    copy
}

fn evaluate(
    case: &BusinessCase,
    mode: AdjustMode,
    target: OptimizationTarget,
    factor: Decimal,
    config: &EngineConfig,
) -> Option<Decimal> {
    let adjusted = scale_components(case, mode, factor);
    let returns = calculate_scenario_with(&adjusted, config).returns;
    match target {
        OptimizationTarget::Npv(_) => Some(returns.npv),
        OptimizationTarget::Irr(_) => returns.irr,
    }
}

/// Undefined IRR counts as below any target.
fn below(metric: Option<Decimal>, target: Decimal) -> bool {
    metric.map_or(true, |m| m < target)
}

fn within(metric: Option<Decimal>, target: Decimal, tolerance: Decimal) -> bool {
    let band = tolerance * target.abs().max(Decimal::ONE);
    metric.is_some_and(|m| (m - target).abs() <= band)
}

/// Bisection on the price scale factor so the case reaches the target NPV or
/// IRR. Assumes the metric rises with the factor; if the target lies outside
/// the bounded range the nearest bound is returned with `converged = false`.
pub fn optimize_quote(
    case: &BusinessCase,
    request: &QuoteOptimizationRequest,
    config: &EngineConfig,
) -> BizCaseResult<ComputationOutput<QuoteOptimization>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if case.skus.is_empty() {
        return Err(BizCaseError::InsufficientData(
            "At least one SKU required to optimise a quote".into(),
        ));
    }
    if config.optimize_min_factor > config.optimize_max_factor {
        return Err(BizCaseError::InvalidInput {
            field: "optimize_min_factor".into(),
            reason: "Lower factor bound must be <= upper bound".into(),
        });
    }

    let target = request.target.value();
    let tol = config.optimize_tolerance;
    let mut lo = config.optimize_min_factor;
    let mut hi = config.optimize_max_factor;
    let mut iterations = 0u32;

    let m_lo = evaluate(case, request.mode, request.target, lo, config);
    let m_hi = evaluate(case, request.mode, request.target, hi, config);

    let (factor, achieved, converged) = if !below(m_lo, target) {
        warnings.push(format!(
            "Target already met at the lower factor bound {lo}"
        ));
        (lo, m_lo, within(m_lo, target, tol))
    } else if below(m_hi, target) {
        warn!(target = %target, "quote target not reachable within factor bounds");
        warnings.push(format!(
            "Target {target} not reachable with factor <= {hi}; returning upper bound"
        ));
        (hi, m_hi, false)
    } else {
        let mut best = (hi, m_hi);
        let mut converged = within(m_hi, target, tol);
        while !converged && iterations < config.optimize_max_iterations {
            iterations += 1;
            let mid = (lo + hi) / dec!(2);
            let m_mid = evaluate(case, request.mode, request.target, mid, config);
            if within(m_mid, target, tol) {
                best = (mid, m_mid);
                converged = true;
            } else if below(m_mid, target) {
                lo = mid;
            } else {
                hi = mid;
                best = (mid, m_mid);
            }
        }
        if !converged {
            warnings.push(format!(
                "Search stopped after {iterations} iterations without reaching tolerance"
            ));
        }
        (best.0, best.1, converged)
    };
    debug!(factor = %factor, iterations, converged, "quote optimisation finished");

    let adjusted_case = scale_components(case, request.mode, factor);
    let quote = generate_quote(
        &adjusted_case,
        &request.quote_name,
        request.gst_rate,
        request.quantities.as_ref(),
    );

    let output = QuoteOptimization {
        factor,
        target: request.target,
        achieved,
        converged,
        iterations,
        adjusted_case,
        quote,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bisection on price scale factor to a target NPV/IRR",
        &serde_json::json!({
            "mode": request.mode,
            "factor_bounds": [config.optimize_min_factor.to_string(), config.optimize_max_factor.to_string()],
            "max_iterations": config.optimize_max_iterations,
            "tolerance": tol.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CostingInput, FinanceInput, OpsInput, PlantMaster, SalesInput, Sku};

    fn case() -> BusinessCase {
        BusinessCase {
            id: "c1".into(),
            name: "Preform".into(),
            skus: vec![Sku {
                id: "s1".into(),
                sales: SalesInput {
                    product_weight_grams: dec!(100),
                    base_annual_volume: dec!(1_000_000),
                    conversion_recovery_rs_per_piece: Some(dec!(2)),
                },
                ops: OpsInput {
                    cost_of_new_machine: dec!(2_000_000),
                    ..OpsInput::default()
                },
                costing: CostingInput {
                    resin_rs_per_kg: dec!(80),
                    ..CostingInput::default()
                },
                plant_master: PlantMaster {
                    conversion_per_kg: dec!(10),
                    ..PlantMaster::default()
                },
                ..Sku::default()
            }],
            finance: FinanceInput {
                cost_of_equity: dec!(0.12),
                tax_rate: dec!(0.25),
                volume_growth: Some(Decimal::ZERO),
                ..FinanceInput::default()
            },
            ..BusinessCase::default()
        }
    }

    fn request(target: OptimizationTarget, mode: AdjustMode) -> QuoteOptimizationRequest {
        QuoteOptimizationRequest {
            target,
            mode,
            quote_name: "Q".into(),
            gst_rate: dec!(0.18),
            quantities: None,
        }
    }

    #[test]
    fn test_reaches_npv_target() {
        let target = dec!(100000);
        let out = optimize_quote(
            &case(),
            &request(OptimizationTarget::Npv(target), AdjustMode::ConversionOnly),
            &EngineConfig::default(),
        )
        .unwrap()
        .result;
        assert!(out.converged);
        let achieved = out.achieved.unwrap();
        assert!((achieved - target).abs() <= dec!(10));
        assert!(out.factor > Decimal::ONE && out.factor < dec!(5));
        let conv = out.adjusted_case.skus[0].sales.conversion_recovery_rs_per_piece.unwrap();
        assert_eq!(conv, dec!(2) * out.factor);
        assert_eq!(out.quote.lines[0].components.conversion, conv);
    }

    #[test]
    fn test_unreachable_target_returns_upper_bound() {
        let out = optimize_quote(
            &case(),
            &request(OptimizationTarget::Npv(dec!(1_000_000_000)), AdjustMode::ConversionOnly),
            &EngineConfig::default(),
        )
        .unwrap();
        assert!(!out.result.converged);
        assert_eq!(out.result.factor, dec!(5));
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_all_components_scales_costing() {
        let scaled = scale_components(&case(), AdjustMode::AllComponents, dec!(1.1));
        assert_eq!(scaled.skus[0].costing.resin_rs_per_kg, dec!(88));
        let only_conv = scale_components(&case(), AdjustMode::ConversionOnly, dec!(1.1));
        assert_eq!(only_conv.skus[0].costing.resin_rs_per_kg, dec!(80));
        assert_eq!(only_conv.skus[0].sales.conversion_recovery_rs_per_piece, Some(dec!(2.2)));
    }

    #[test]
    fn test_empty_case_is_rejected() {
        let result = optimize_quote(
            &BusinessCase::default(),
            &request(OptimizationTarget::Irr(dec!(0.2)), AdjustMode::ConversionOnly),
            &EngineConfig::default(),
        );
        assert!(matches!(result, Err(BizCaseError::InsufficientData(_))));
    }
}
