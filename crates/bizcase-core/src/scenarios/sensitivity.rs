use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::case::path::{apply_path_update, PathUpdate};
use crate::case::BusinessCase;
use crate::config::EngineConfig;
use crate::engine::try_calculate_scenario;
use crate::error::BizCaseError;
use crate::BizCaseResult;

use super::objective::{metric_deviation, MetricValues, Objective};
use super::variable::SensitivityVariable;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// What a perturbation moves: one of the named variables, or any numeric
/// field by dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationTarget {
    Variable(String),
    Path(String),
}

impl PerturbationTarget {
    pub fn label(&self) -> String {
        match self {
            PerturbationTarget::Variable(id) => id.clone(),
            PerturbationTarget::Path(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaMode {
    /// `v * (1 + delta)`
    #[default]
    Percentage,
    /// `v + delta`
    Additive,
}

impl DeltaMode {
    pub fn update(self, delta: Decimal) -> PathUpdate {
        match self {
            DeltaMode::Percentage => PathUpdate::Percentage(delta),
            DeltaMode::Additive => PathUpdate::Additive(delta),
        }
    }
}

/// One target swept over a list of deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSpec {
    pub target: PerturbationTarget,
    pub deltas: Vec<Decimal>,
    #[serde(default)]
    pub mode: DeltaMode,
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Applied,
    /// The path could not be resolved, is not numeric, or the perturbed
    /// case overflowed
    Skipped,
    /// The variable id is not one of the named variables
    Unknown,
    /// Aborted before the run started
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRun {
    pub target: String,
    pub delta: Decimal,
    pub mode: DeltaMode,
    pub status: RunStatus,
    pub metrics: MetricValues,
    /// `metrics - baseline`
    pub deviation: MetricValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub baseline: MetricValues,
    pub results: Vec<SensitivityRun>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Apply a target/delta pair to `case` in place.
pub fn apply_target(
    case: &mut BusinessCase,
    target: &PerturbationTarget,
    update: PathUpdate,
) -> BizCaseResult<()> {
    match target {
        PerturbationTarget::Variable(id) => {
            let variable = SensitivityVariable::parse(id).ok_or_else(|| {
                BizCaseError::InvalidInput {
                    field: "variable".into(),
                    reason: format!("unknown sensitivity variable '{id}'"),
                }
            })?;
            variable.apply(case, update);
            Ok(())
        }
        PerturbationTarget::Path(path) => apply_path_update(case, path, update).map(|_| ()),
    }
}

fn evaluate_one(
    case: &BusinessCase,
    spec: &PerturbationSpec,
    delta: Decimal,
    objective: &Objective,
    baseline: &MetricValues,
    config: &EngineConfig,
    abort: &AtomicBool,
) -> SensitivityRun {
    let mut run = SensitivityRun {
        target: spec.target.label(),
        delta,
        mode: spec.mode,
        status: RunStatus::Applied,
        metrics: MetricValues::new(),
        deviation: MetricValues::new(),
        message: None,
    };

    if abort.load(Ordering::Relaxed) {
        run.status = RunStatus::Cancelled;
        return run;
    }

    if let PerturbationTarget::Variable(id) = &spec.target {
        if SensitivityVariable::parse(id).is_none() {
            run.status = RunStatus::Unknown;
            run.message = Some(format!("unknown sensitivity variable '{id}'"));
            return run;
        }
    }

    let mut perturbed = case.clone();
    if let Err(e) = apply_target(&mut perturbed, &spec.target, spec.mode.update(delta)) {
        warn!(target = %run.target, error = %e, "skipping perturbation");
        run.status = RunStatus::Skipped;
        run.message = Some(e.to_string());
        return run;
    }

    match try_calculate_scenario(&perturbed, config) {
        Ok(output) => {
            run.metrics = objective.evaluate(&output);
            run.deviation = metric_deviation(&run.metrics, baseline);
        }
        Err(e) => {
            run.status = RunStatus::Skipped;
            run.message = Some(e.to_string());
        }
    }
    run
}

/// Sensitivity runs with the default config and no abort.
pub fn run_sensitivity(
    case: &BusinessCase,
    specs: &[PerturbationSpec],
    objective: &Objective,
) -> SensitivityReport {
    run_sensitivity_with_abort(
        case,
        specs,
        objective,
        &EngineConfig::default(),
        &AtomicBool::new(false),
    )
}

/// Every `(spec, delta)` pair re-runs the full pipeline on its own deep copy
/// of `case`, in parallel. `abort` is checked before each run starts; runs
/// not started are reported as [`RunStatus::Cancelled`]. Result order
/// follows the input order.
pub fn run_sensitivity_with_abort(
    case: &BusinessCase,
    specs: &[PerturbationSpec],
    objective: &Objective,
    config: &EngineConfig,
    abort: &AtomicBool,
) -> SensitivityReport {
    let mut warnings = Vec::new();
    let baseline = match try_calculate_scenario(case, config) {
        Ok(output) => objective.evaluate(&output),
        Err(e) => {
            warnings.push(format!("baseline: {e}"));
            MetricValues::new()
        }
    };

    let jobs: Vec<(&PerturbationSpec, Decimal)> = specs
        .iter()
        .flat_map(|spec| spec.deltas.iter().map(move |d| (spec, *d)))
        .collect();
    debug!(runs = jobs.len(), "running sensitivity");

    let results: Vec<SensitivityRun> = jobs
        .par_iter()
        .map(|(spec, delta)| evaluate_one(case, spec, *delta, objective, &baseline, config, abort))
        .collect();

    warnings.extend(results.iter().filter_map(|r| match r.status {
            RunStatus::Applied => None,
            RunStatus::Cancelled => Some(format!("{} ({}) cancelled", r.target, r.delta)),
            RunStatus::Skipped | RunStatus::Unknown => Some(format!(
                "{} ({}) skipped: {}",
                r.target,
                r.delta,
                r.message.as_deref().unwrap_or("not applied")
            )),
        }));

    SensitivityReport {
        baseline,
        results,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CostingInput, FinanceInput, OpsInput, PlantMaster, SalesInput, Sku};
    use crate::scenarios::objective::Metric;
    use rust_decimal_macros::dec;

    fn case() -> BusinessCase {
        BusinessCase {
            id: "c1".into(),
            name: "Closure".into(),
            skus: vec![Sku {
                id: "s1".into(),
                sales: SalesInput {
                    product_weight_grams: dec!(100),
                    base_annual_volume: dec!(100000),
                    conversion_recovery_rs_per_piece: Some(dec!(3)),
                },
                ops: OpsInput {
                    cost_of_new_machine: dec!(500000),
                    ..OpsInput::default()
                },
                costing: CostingInput {
                    resin_rs_per_kg: dec!(80),
                    ..CostingInput::default()
                },
                plant_master: PlantMaster {
                    conversion_per_kg: dec!(10),
                    sga_per_kg: dec!(2),
                    ..PlantMaster::default()
                },
                ..Sku::default()
            }],
            finance: FinanceInput {
                debt_share: dec!(0.5),
                cost_of_debt: dec!(0.1),
                cost_of_equity: dec!(0.15),
                tax_rate: dec!(0.25),
                volume_growth: Some(Decimal::ZERO),
                ..FinanceInput::default()
            },
            ..BusinessCase::default()
        }
    }

    fn npv_only() -> Objective {
        Objective {
            metrics: vec![Metric::Npv],
        }
    }

    #[test]
    fn test_variable_sweep_moves_npv() {
        let specs = vec![PerturbationSpec {
            target: PerturbationTarget::Variable("conversionRecovery".into()),
            deltas: vec![dec!(-0.1), Decimal::ZERO, dec!(0.1)],
            mode: DeltaMode::Percentage,
        }];
        let report = run_sensitivity(&case(), &specs, &npv_only());
        assert_eq!(report.results.len(), 3);
        assert!(report.results.iter().all(|r| r.status == RunStatus::Applied));

        let npv = |i: usize| report.results[i].metrics[&Metric::Npv].unwrap();
        assert!(npv(0) < npv(1));
        assert!(npv(1) < npv(2));
        assert_eq!(report.results[1].deviation[&Metric::Npv], Some(Decimal::ZERO));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_variable_and_bad_path_do_not_abort() {
        let specs = vec![
            PerturbationSpec {
                target: PerturbationTarget::Variable("tonnage".into()),
                deltas: vec![dec!(0.1)],
                mode: DeltaMode::Percentage,
            },
            PerturbationSpec {
                target: PerturbationTarget::Path("skus.0.npd.plant".into()),
                deltas: vec![dec!(0.1)],
                mode: DeltaMode::Percentage,
            },
            PerturbationSpec {
                target: PerturbationTarget::Path("skus.0.costing.resinRsPerKg".into()),
                deltas: vec![dec!(5)],
                mode: DeltaMode::Additive,
            },
        ];
        let report = run_sensitivity(&case(), &specs, &npv_only());
        assert_eq!(report.results[0].status, RunStatus::Unknown);
        assert_eq!(report.results[1].status, RunStatus::Skipped);
        assert_eq!(report.results[2].status, RunStatus::Applied);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_abort_cancels_every_run() {
        let specs = vec![PerturbationSpec {
            target: PerturbationTarget::Variable("volume".into()),
            deltas: vec![dec!(0.1), dec!(0.2)],
            mode: DeltaMode::Percentage,
        }];
        let abort = AtomicBool::new(true);
        let report = run_sensitivity_with_abort(
            &case(),
            &specs,
            &npv_only(),
            &EngineConfig::default(),
            &abort,
        );
        assert!(report.results.iter().all(|r| r.status == RunStatus::Cancelled));
        assert!(report.baseline[&Metric::Npv].is_some());
    }

    #[test]
    fn test_baseline_case_is_untouched() {
        let base = case();
        let specs = vec![PerturbationSpec {
            target: PerturbationTarget::Path("skus.*.sales.base_annual_volume".into()),
            deltas: vec![dec!(0.5)],
            mode: DeltaMode::Percentage,
        }];
        let report = run_sensitivity(&base, &specs, &npv_only());
        assert_eq!(base, case());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status, RunStatus::Applied);
        assert!(report.results[0].deviation[&Metric::Npv].unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_run_is_skipped_and_batch_continues() {
        let specs = vec![
            PerturbationSpec {
                target: PerturbationTarget::Path("finance.volume_growth".into()),
                deltas: vec![dec!(1000000)],
                mode: DeltaMode::Additive,
            },
            PerturbationSpec {
                target: PerturbationTarget::Variable("volume".into()),
                deltas: vec![dec!(0.1)],
                mode: DeltaMode::Percentage,
            },
        ];
        let report = run_sensitivity(&case(), &specs, &npv_only());
        assert_eq!(report.results[0].status, RunStatus::Skipped);
        assert!(report.results[0]
            .message
            .as_deref()
            .is_some_and(|m| m.contains("overflow")));
        assert_eq!(report.results[1].status, RunStatus::Applied);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_spec_json_shape() {
        let spec: PerturbationSpec = serde_json::from_str(
            r#"{"target": {"path": "finance.tax_rate"}, "deltas": ["0.01"], "mode": "additive"}"#,
        )
        .unwrap();
        assert_eq!(spec.target, PerturbationTarget::Path("finance.tax_rate".into()));
        assert_eq!(spec.mode, DeltaMode::Additive);
    }
}
