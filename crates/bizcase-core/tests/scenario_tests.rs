mod common;

use std::collections::BTreeMap;

use bizcase_core::case::path::{apply_path_update, read_path, sweepable_paths, PathUpdate};
use bizcase_core::scenarios::{
    apply_delta, apply_named_scenario, run_scenarios, run_sensitivity, sensitivity_grid,
    DeltaMode, GridAxis, Metric, NamedScenario, Objective, PerturbationSpec, PerturbationTarget,
    RunStatus, ScenarioDefinition, SensitivityVariable,
};
use bizcase_core::{calculate_scenario, EngineConfig};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{two_sku_case, unset_optionals_case};

fn npv_only() -> Objective {
    Objective {
        metrics: vec![Metric::Npv],
    }
}

// ===========================================================================
// Copies never alias the base case
// ===========================================================================

#[test]
fn test_perturbed_copy_leaves_base_untouched() {
    let base = two_sku_case();
    let snapshot = base.clone();

    let bumped = apply_delta(&base, SensitivityVariable::Volume, dec!(0.1));
    assert_eq!(base, snapshot);
    assert_eq!(bumped.skus[0].sales.base_annual_volume, dec!(440000));
    assert_eq!(bumped.skus[1].sales.base_annual_volume, dec!(1100000));
}

#[test]
fn test_named_bundle_applies_all_deltas_at_once() {
    let base = two_sku_case();
    let bundle = NamedScenario {
        volume: dec!(-0.2),
        conversion_recovery: dec!(0.05),
        conversion_cost: dec!(0.1),
        working_capital_days: dec!(0.5),
    };
    let out = apply_named_scenario(&base, &bundle);

    assert_eq!(out.skus[0].sales.base_annual_volume, dec!(320000));
    assert_eq!(out.skus[0].sales.conversion_recovery_rs_per_piece, Some(dec!(4.2)));
    assert_eq!(out.skus[0].plant_master.conversion_per_kg, dec!(11));
    // unset working-capital days start from 60
    assert_eq!(out.skus[0].ops.working_capital_days, Some(dec!(90)));
    assert_eq!(base.skus[0].ops.working_capital_days, None);
}

#[test]
fn test_variable_clamps() {
    let base = two_sku_case();
    let gone = apply_delta(&base, SensitivityVariable::Volume, dec!(-1.5));
    assert!(gone.skus.iter().all(|s| s.sales.base_annual_volume == Decimal::ZERO));

    let capped = apply_delta(&base, SensitivityVariable::Oee, dec!(0.3));
    assert!(capped.skus.iter().all(|s| s.ops.oee == Decimal::ONE));
}

// ===========================================================================
// Path updates
// ===========================================================================

#[test]
fn test_wildcard_path_updates_every_sku() {
    let mut case = two_sku_case();
    let touched = apply_path_update(
        &mut case,
        "skus.*.costing.resin_rs_per_kg",
        PathUpdate::Percentage(dec!(0.1)),
    )
    .unwrap();
    assert_eq!(touched, 2);
    assert_eq!(
        read_path(&case, "skus.*.costing.resin_rs_per_kg").unwrap(),
        vec![dec!(88), dec!(88)]
    );
}

#[test]
fn test_bad_paths_are_errors_not_panics() {
    let mut case = two_sku_case();
    for path in ["skus.9.sales.base_annual_volume", "skus.0.sales.colour", "finance", ""] {
        assert!(
            apply_path_update(&mut case, path, PathUpdate::Additive(dec!(1))).is_err(),
            "{path} should not resolve"
        );
    }
    assert_eq!(case, two_sku_case());
}

// ===========================================================================
// Sensitivity and scenarios
// ===========================================================================

#[test]
fn test_zero_delta_matches_baseline() {
    let case = two_sku_case();
    let specs = vec![PerturbationSpec {
        target: PerturbationTarget::Variable("resin_price".into()),
        deltas: vec![Decimal::ZERO],
        mode: DeltaMode::Percentage,
    }];
    let report = run_sensitivity(&case, &specs, &npv_only());
    let run = &report.results[0];
    assert_eq!(run.status, RunStatus::Applied);
    assert_eq!(run.metrics, report.baseline);
    assert_eq!(run.deviation[&Metric::Npv], Some(Decimal::ZERO));
}

#[test]
fn test_zero_delta_on_every_path_keeps_npv() {
    let case = unset_optionals_case();
    let specs: Vec<PerturbationSpec> = [DeltaMode::Percentage, DeltaMode::Additive]
        .into_iter()
        .flat_map(|mode| {
            sweepable_paths().into_iter().map(move |path| PerturbationSpec {
                target: PerturbationTarget::Path(path),
                deltas: vec![Decimal::ZERO],
                mode,
            })
        })
        .collect();
    let report = run_sensitivity(&case, &specs, &npv_only());
    assert!(report.baseline[&Metric::Npv].is_some());

    for run in &report.results {
        if run.target == "finance.volume_growth" {
            // no single rate to move while the default curve applies
            assert_eq!(run.status, RunStatus::Skipped, "{}", run.target);
        } else {
            assert_eq!(run.status, RunStatus::Applied, "{}", run.target);
            assert_eq!(run.metrics, report.baseline, "{} ({:?})", run.target, run.mode);
        }
    }
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn test_recovery_path_scales_value_add_fallback() {
    let mut case = unset_optionals_case();
    case.skus[0].costing.value_add_rs_per_piece = Some(dec!(4));
    case.skus[1].costing.value_add_rs_per_piece = Some(dec!(1));

    let explicit = {
        let mut c = case.clone();
        c.skus[0].sales.conversion_recovery_rs_per_piece = Some(dec!(4.4));
        c.skus[1].sales.conversion_recovery_rs_per_piece = Some(dec!(1.1));
        c
    };

    let mut bumped = case.clone();
    apply_path_update(
        &mut bumped,
        "skus.*.sales.conversion_recovery_rs_per_piece",
        PathUpdate::Percentage(dec!(0.1)),
    )
    .unwrap();

    let base_npv = calculate_scenario(&case).returns.npv;
    let bumped_npv = calculate_scenario(&bumped).returns.npv;
    assert!(bumped_npv > base_npv);
    assert_eq!(bumped_npv, calculate_scenario(&explicit).returns.npv);
}

#[test]
fn test_huge_growth_delta_is_skipped_not_fatal() {
    let mut case = two_sku_case();
    case.finance.volume_growth = Some(Decimal::ZERO);
    let specs = vec![PerturbationSpec {
        target: PerturbationTarget::Path("finance.volume_growth".into()),
        deltas: vec![dec!(1000000), dec!(0.05)],
        mode: DeltaMode::Additive,
    }];
    let report = run_sensitivity(&case, &specs, &npv_only());
    assert_eq!(report.results[0].status, RunStatus::Skipped);
    assert_eq!(report.results[1].status, RunStatus::Applied);
    assert!(report.results[1].deviation[&Metric::Npv].unwrap() > Decimal::ZERO);
}

#[test]
fn test_higher_recovery_raises_npv() {
    let case = two_sku_case();
    let specs = vec![PerturbationSpec {
        target: PerturbationTarget::Variable("conversion_recovery".into()),
        deltas: vec![dec!(-0.1), dec!(0.1)],
        mode: DeltaMode::Percentage,
    }];
    let report = run_sensitivity(&case, &specs, &npv_only());
    let down = report.results[0].deviation[&Metric::Npv].unwrap();
    let up = report.results[1].deviation[&Metric::Npv].unwrap();
    assert!(down < Decimal::ZERO);
    assert!(up > Decimal::ZERO);
}

#[test]
fn test_scenario_batch_with_probabilities() {
    let case = two_sku_case();
    let baseline_npv = calculate_scenario(&case).returns.npv;

    let mut overrides = BTreeMap::new();
    overrides.insert("skus.0.sales.nothing".to_string(), PathUpdate::Set(dec!(1)));
    let scenarios = vec![
        ScenarioDefinition {
            name: "As planned".into(),
            overrides: BTreeMap::new(),
            bundle: None,
            probability: Some(dec!(0.5)),
        },
        ScenarioDefinition {
            name: "Typo".into(),
            overrides,
            bundle: None,
            probability: Some(dec!(0.5)),
        },
    ];

    let report = run_scenarios(&case, &scenarios, &npv_only(), &EngineConfig::default());
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[1].skipped.len(), 1);
    assert_eq!(report.warnings.len(), 1);

    let weighted = report.probability_weighted_npv.expect("probabilities sum to 1");
    assert!((weighted - baseline_npv).abs() < dec!(0.0001));
}

#[test]
fn test_grid_centre_matches_baseline() {
    let case = two_sku_case();
    let axis = |name: &str| GridAxis {
        target: PerturbationTarget::Variable(name.into()),
        mode: DeltaMode::Percentage,
        min: dec!(-0.1),
        max: dec!(0.1),
        step: dec!(0.1),
    };
    let out = sensitivity_grid(
        &case,
        &axis("volume"),
        &axis("resin_price"),
        Metric::Npv,
        &EngineConfig::default(),
    )
    .unwrap();
    let grid = out.result;
    assert_eq!(grid.matrix.len(), 3);
    assert!(grid.matrix.iter().all(|row| row.len() == 3));
    assert_eq!(grid.matrix[1][1], grid.base_case_value);
    assert_eq!(grid.base_case_value, Some(calculate_scenario(&case).returns.npv));
}
