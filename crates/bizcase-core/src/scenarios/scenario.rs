use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::case::path::{apply_path_update, PathUpdate};
use crate::case::model::DEFAULT_WORKING_CAPITAL_DAYS;
use crate::case::BusinessCase;
use crate::config::EngineConfig;
use crate::engine::try_calculate_scenario;
use crate::types::{Money, Rate};

use super::objective::{metric_deviation, metric_deviation_pct, Metric, MetricValues, Objective};
use super::variable::SensitivityVariable;

const PROBABILITY_TOLERANCE: Decimal = dec!(0.001);

// ---------------------------------------------------------------------------
// Named scenario bundle
// ---------------------------------------------------------------------------

/// Simultaneous percentage deltas applied to every SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedScenario {
    pub volume: Rate,
    pub conversion_recovery: Rate,
    pub conversion_cost: Rate,
    pub working_capital_days: Rate,
}

/// Deep copy of `case` with the bundle applied. Working-capital days start
/// from 60 when unset or zero.
pub fn apply_named_scenario(case: &BusinessCase, scenario: &NamedScenario) -> BusinessCase {
    let mut copy = case.clone();
    SensitivityVariable::Volume.apply(&mut copy, PathUpdate::Percentage(scenario.volume));
    SensitivityVariable::ConversionRecovery
        .apply(&mut copy, PathUpdate::Percentage(scenario.conversion_recovery));
    SensitivityVariable::ConversionCost
        .apply(&mut copy, PathUpdate::Percentage(scenario.conversion_cost));

    for sku in &mut copy.skus {
        let current = sku
            .ops
            .working_capital_days
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_WORKING_CAPITAL_DAYS);
        let next = PathUpdate::Percentage(scenario.working_capital_days).saturating_apply(current);
        sku.ops.working_capital_days = Some(next.max(Decimal::ZERO));
    }
    copy
}

// ---------------------------------------------------------------------------
// Scenario batch
// ---------------------------------------------------------------------------

/// A what-if case: path overrides plus an optional named bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    /// Dotted path to update, e.g. `{"skus.*.costing.resin_rs_per_kg": {"percentage": "0.1"}}`
    #[serde(default)]
    pub overrides: BTreeMap<String, PathUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<NamedScenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<Rate>,
    pub metrics: MetricValues,
    pub deviation: MetricValues,
    pub deviation_pct: MetricValues,
    /// Overrides that could not be applied
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub baseline: MetricValues,
    pub results: Vec<ScenarioResult>,
    /// Present when every scenario has a probability and they sum to 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_weighted_npv: Option<Money>,
    pub warnings: Vec<String>,
}

fn run_one(
    case: &BusinessCase,
    def: &ScenarioDefinition,
    objective: &Objective,
    baseline: &MetricValues,
    config: &EngineConfig,
) -> (ScenarioResult, Option<Money>) {
    let mut scenario_case = match &def.bundle {
        Some(bundle) => apply_named_scenario(case, bundle),
        None => case.clone(),
    };

    let mut skipped = Vec::new();
    for (path, update) in &def.overrides {
        if let Err(e) = apply_path_update(&mut scenario_case, path, *update) {
            warn!(scenario = %def.name, path = %path, error = %e, "override skipped");
            skipped.push(format!("{path}: {e}"));
        }
    }

    let (metrics, npv) = match try_calculate_scenario(&scenario_case, config) {
        Ok(output) => (objective.evaluate(&output), Some(output.returns.npv)),
        Err(e) => {
            warn!(scenario = %def.name, error = %e, "scenario not evaluated");
            skipped.push(format!("projection: {e}"));
            (MetricValues::new(), None)
        }
    };
    let result = ScenarioResult {
        name: def.name.clone(),
        probability: def.probability,
        deviation: metric_deviation(&metrics, baseline),
        deviation_pct: metric_deviation_pct(&metrics, baseline),
        metrics,
        skipped,
    };
    (result, npv)
}

/// Run each scenario on its own copy of `case` and compare with baseline.
pub fn run_scenarios(
    case: &BusinessCase,
    scenarios: &[ScenarioDefinition],
    objective: &Objective,
    config: &EngineConfig,
) -> ScenarioReport {
    let (baseline, baseline_warning) = match try_calculate_scenario(case, config) {
        Ok(output) => (objective.evaluate(&output), None),
        Err(e) => (MetricValues::new(), Some(format!("baseline: {e}"))),
    };

    let runs: Vec<(ScenarioResult, Option<Money>)> = scenarios
        .par_iter()
        .map(|def| run_one(case, def, objective, &baseline, config))
        .collect();

    let mut warnings: Vec<String> = baseline_warning.into_iter().collect();
    warnings.extend(
        runs.iter()
            .flat_map(|(r, _)| r.skipped.iter().map(move |s| format!("{}: skipped {s}", r.name))),
    );

    let probabilities: Option<Vec<Rate>> = scenarios.iter().map(|s| s.probability).collect();
    let probability_weighted_npv = match probabilities {
        Some(probs) if !probs.is_empty() => {
            let total: Rate = probs.iter().copied().sum();
            if (total - Decimal::ONE).abs() <= PROBABILITY_TOLERANCE {
                // any unevaluated scenario leaves the weighted NPV undefined
                probs
                    .iter()
                    .zip(runs.iter())
                    .map(|(p, (_, npv))| npv.map(|v| *p * v))
                    .sum::<Option<Money>>()
            } else {
                warnings.push(format!(
                    "Scenario probabilities sum to {total}, not 1; weighted NPV omitted"
                ));
                None
            }
        }
        _ => None,
    };

    let results = runs.into_iter().map(|(r, _)| r).collect();
    ScenarioReport {
        baseline,
        results,
        probability_weighted_npv,
        warnings,
    }
}

/// NPV of a single scenario; convenience for callers that only rank cases.
pub fn scenario_npv(result: &ScenarioResult) -> Option<Money> {
    result.metrics.get(&Metric::Npv).copied().flatten()
}
