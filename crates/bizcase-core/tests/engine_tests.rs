mod common;

use bizcase_core::math::round2;
use bizcase_core::pricing::calculate_rm_mb_per_kg;
use bizcase_core::volume::DEFAULT_GROWTH_CURVE;
use bizcase_core::{calculate_scenario, run_business_case, EngineConfig};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{reference_case, two_sku_case};

// ===========================================================================
// Reference case
// ===========================================================================

#[test]
fn test_reference_rm_and_mb_per_kg() {
    let case = reference_case();
    let rm_mb = calculate_rm_mb_per_kg(&case.skus[0].costing);
    // (80 * 0.95 + 5) * 1.02
    assert_eq!(rm_mb.rm, dec!(82.62));
    // 81 * 0.15 * 1.02 = 12.393
    assert_eq!(round2(rm_mb.mb), dec!(12.39));
}

#[test]
fn test_reference_depreciation() {
    let out = calculate_scenario(&reference_case());
    // 2,000,000 over the default 15-year machine life
    for year in &out.pnl {
        assert_eq!(round2(year.depreciation), dec!(133333.33));
    }
    assert_eq!(round2(out.by_sku[0].pnl[0].depreciation), dec!(133333.33));
}

#[test]
fn test_reference_volumes_and_price() {
    let out = calculate_scenario(&reference_case());
    assert_eq!(out.volumes.len(), 5);
    assert_eq!(out.volumes[0].pieces, dec!(10000));
    assert_eq!(out.volumes[0].weight_kg, dec!(1000));
    // 82.62 + 12.393 + 2 / 0.1 value add, per kg, times 0.1 kg
    assert_eq!(out.pnl[0].price_per_piece, dec!(11.5013));
    assert_eq!(out.pnl[0].revenue_net, dec!(115013));
    assert_eq!(out.weighted_price_per_kg[0].price_per_kg, dec!(115.013));
}

#[test]
fn test_reference_capex_summary() {
    let out = calculate_scenario(&reference_case());
    assert_eq!(out.capex.machine, dec!(2000000));
    assert_eq!(out.capex.mould, Decimal::ZERO);
    assert_eq!(out.capex.total, dec!(2000000));
    // year 0 plus five projection years
    assert_eq!(out.cashflows.len(), 6);
    assert_eq!(out.cashflows[0].fcf, dec!(-2000000));
}

// ===========================================================================
// Statement identities
// ===========================================================================

#[test]
fn test_case_statement_identities_hold_every_year() {
    let out = calculate_scenario(&two_sku_case());
    for y in &out.pnl {
        assert_eq!(y.ebit, y.ebitda - y.depreciation, "year {}", y.year);
        assert_eq!(y.pbt, y.ebit - y.interest, "year {}", y.year);
        assert_eq!(y.pat, y.pbt - y.tax, "year {}", y.year);
        assert_eq!(y.tax, y.pbt * dec!(0.25), "case tax is not floored");
    }
}

#[test]
fn test_case_lines_sum_sku_lines_down_to_ebitda() {
    let out = calculate_scenario(&two_sku_case());
    for (i, y) in out.pnl.iter().enumerate() {
        let revenue: Decimal = out.by_sku.iter().map(|p| p.pnl[i].revenue_net).sum();
        let ebitda: Decimal = out.by_sku.iter().map(|p| p.pnl[i].ebitda).sum();
        let pieces: Decimal = out.by_sku.iter().map(|p| p.pnl[i].volume_pieces).sum();
        assert_eq!(y.revenue_net, revenue);
        assert_eq!(y.ebitda, ebitda);
        assert_eq!(y.volume_pieces, pieces);
    }
}

#[test]
fn test_default_growth_curve_compounds() {
    let out = calculate_scenario(&two_sku_case());
    let lid = &out.by_sku[1].volumes;
    let mut expected = dec!(1_000_000);
    for (i, rate) in DEFAULT_GROWTH_CURVE.iter().enumerate() {
        expected *= Decimal::ONE + rate;
        assert_eq!(lid[i + 1].pieces, expected);
    }
}

#[test]
fn test_cumulative_fcf_starts_from_capex() {
    let out = calculate_scenario(&two_sku_case());
    let capex = out.capex.total;
    let mut running = -capex;
    assert_eq!(out.cashflows[0].cumulative_fcf, running);
    for cf in out.cashflows.iter().skip(1) {
        running += cf.fcf;
        assert_eq!(cf.cumulative_fcf, running);
    }
}

#[test]
fn test_profitable_case_has_irr_and_payback() {
    let out = calculate_scenario(&two_sku_case());
    assert!(out.returns.npv > Decimal::ZERO, "npv = {}", out.returns.npv);
    let irr = out.returns.irr.expect("irr should converge");
    assert!(irr > out.returns.wacc);
    assert!(out.returns.payback_years.is_some());
    assert_eq!(out.returns.roce.len(), 5);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_empty_case_yields_zero_outputs_and_a_warning() {
    let mut case = reference_case();
    case.skus.clear();
    let env = run_business_case(&case, &EngineConfig::default());
    assert!(env.result.pnl.iter().all(|y| y.revenue_net.is_zero()));
    assert_eq!(env.result.returns.npv, Decimal::ZERO);
    assert!(!env.warnings.is_empty());
}

#[test]
fn test_envelope_serialises_decimals_as_strings() {
    let env = run_business_case(&reference_case(), &EngineConfig::default());
    let json = serde_json::to_value(&env).unwrap();
    assert!(json["result"]["pnl"][0]["revenue_net"].is_string());
    assert_eq!(json["metadata"]["precision"], "rust_decimal_128bit");
}

#[test]
fn test_case_json_round_trip_gives_identical_projection() {
    let case = two_sku_case();
    let json = serde_json::to_string(&case).unwrap();
    let back: bizcase_core::BusinessCase = serde_json::from_str(&json).unwrap();
    assert_eq!(calculate_scenario(&back), calculate_scenario(&case));
}
