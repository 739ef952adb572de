use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::case::path::PathUpdate;
use crate::case::{BusinessCase, Sku};
use crate::math::{clamp, floor_zero};
use crate::pricing::conversion_recovery_per_piece;

/// The fixed set of headline inputs a sensitivity run can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    Volume,
    ConversionRecovery,
    ResinPrice,
    ConversionCost,
    Oee,
    MachineCost,
    MouldCost,
    Sga,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 8] = [
        SensitivityVariable::Volume,
        SensitivityVariable::ConversionRecovery,
        SensitivityVariable::ResinPrice,
        SensitivityVariable::ConversionCost,
        SensitivityVariable::Oee,
        SensitivityVariable::MachineCost,
        SensitivityVariable::MouldCost,
        SensitivityVariable::Sga,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SensitivityVariable::Volume => "volume",
            SensitivityVariable::ConversionRecovery => "conversion_recovery",
            SensitivityVariable::ResinPrice => "resin_price",
            SensitivityVariable::ConversionCost => "conversion_cost",
            SensitivityVariable::Oee => "oee",
            SensitivityVariable::MachineCost => "machine_cost",
            SensitivityVariable::MouldCost => "mould_cost",
            SensitivityVariable::Sga => "sga",
        }
    }

    /// Accepts `conversion_recovery` or `conversionRecovery`; `None` for an
    /// unknown id.
    pub fn parse(id: &str) -> Option<Self> {
        let normalised: String = id
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|v| v.id().replace('_', "") == normalised)
    }

    /// Current value for one SKU. Conversion recovery reads the effective
    /// rate (sales recovery, else costing value add).
    pub fn get(self, sku: &Sku) -> Decimal {
        match self {
            SensitivityVariable::Volume => sku.sales.base_annual_volume,
            SensitivityVariable::ConversionRecovery => {
                conversion_recovery_per_piece(&sku.sales, &sku.costing)
            }
            SensitivityVariable::ResinPrice => sku.costing.resin_rs_per_kg,
            SensitivityVariable::ConversionCost => sku.plant_master.conversion_per_kg,
            SensitivityVariable::Oee => sku.ops.oee,
            SensitivityVariable::MachineCost => sku.ops.cost_of_new_machine,
            SensitivityVariable::MouldCost => sku.ops.cost_of_new_mould,
            SensitivityVariable::Sga => sku.plant_master.sga_per_kg,
        }
    }

    /// Volume: >= 0 and whole pieces. OEE: 0..=1. Money: >= 0.
    pub fn clamp(self, value: Decimal) -> Decimal {
        match self {
            SensitivityVariable::Volume => floor_zero(value).round_dp(0),
            SensitivityVariable::Oee => clamp(value, Decimal::ZERO, Decimal::ONE),
            _ => floor_zero(value),
        }
    }

    /// Write a clamped value to one SKU.
    pub fn set(self, sku: &mut Sku, value: Decimal) {
        let v = self.clamp(value);
        match self {
            SensitivityVariable::Volume => sku.sales.base_annual_volume = v,
            SensitivityVariable::ConversionRecovery => {
                sku.sales.conversion_recovery_rs_per_piece = Some(v)
            }
            SensitivityVariable::ResinPrice => sku.costing.resin_rs_per_kg = v,
            SensitivityVariable::ConversionCost => sku.plant_master.conversion_per_kg = v,
            SensitivityVariable::Oee => sku.ops.oee = v,
            SensitivityVariable::MachineCost => sku.ops.cost_of_new_machine = v,
            SensitivityVariable::MouldCost => sku.ops.cost_of_new_mould = v,
            SensitivityVariable::Sga => {
                // split rates follow the blended rate
                let pm = &mut sku.plant_master;
                let factor = if pm.sga_per_kg.is_zero() {
                    None
                } else {
                    Some(v / pm.sga_per_kg)
                };
                pm.sga_per_kg = v;
                if let Some(f) = factor {
                    pm.plant_sga_per_kg = floor_zero(pm.plant_sga_per_kg * f);
                    pm.corp_sga_per_kg = floor_zero(pm.corp_sga_per_kg * f);
                }
            }
        }
    }

    /// Apply `update` to every SKU of `case` in place.
    pub fn apply(self, case: &mut BusinessCase, update: PathUpdate) {
        for sku in &mut case.skus {
            let next = update.saturating_apply(self.get(sku));
            self.set(sku, next);
        }
    }
}

/// Deep copy of `case` with every SKU's `variable` scaled by `1 + delta`.
pub fn apply_delta(case: &BusinessCase, variable: SensitivityVariable, delta: Decimal) -> BusinessCase {
    let mut copy = case.clone();
    variable.apply(&mut copy, PathUpdate::Percentage(delta));
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CostingInput, OpsInput, PlantMaster, SalesInput};
    use rust_decimal_macros::dec;

    fn case() -> BusinessCase {
        BusinessCase {
            skus: vec![Sku {
                sales: SalesInput {
                    base_annual_volume: dec!(10001),
                    ..SalesInput::default()
                },
                ops: OpsInput {
                    oee: dec!(0.9),
                    cost_of_new_machine: dec!(1000),
                    ..OpsInput::default()
                },
                costing: CostingInput {
                    resin_rs_per_kg: dec!(80),
                    value_add_rs_per_piece: Some(dec!(2)),
                    ..CostingInput::default()
                },
                plant_master: PlantMaster {
                    sga_per_kg: dec!(4),
                    plant_sga_per_kg: dec!(2),
                    corp_sga_per_kg: dec!(1),
                    ..PlantMaster::default()
                },
                ..Sku::default()
            }],
            ..BusinessCase::default()
        }
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(SensitivityVariable::parse("volume"), Some(SensitivityVariable::Volume));
        assert_eq!(
            SensitivityVariable::parse("conversionRecovery"),
            Some(SensitivityVariable::ConversionRecovery)
        );
        assert_eq!(
            SensitivityVariable::parse("resin_price"),
            Some(SensitivityVariable::ResinPrice)
        );
        assert_eq!(SensitivityVariable::parse("tonnage"), None);
    }

    #[test]
    fn test_apply_delta_is_a_deep_copy() {
        let base = case();
        let bumped = apply_delta(&base, SensitivityVariable::ResinPrice, dec!(0.1));
        assert_eq!(bumped.skus[0].costing.resin_rs_per_kg, dec!(88));
        assert_eq!(base.skus[0].costing.resin_rs_per_kg, dec!(80));
    }

    #[test]
    fn test_volume_rounds_and_floors() {
        let base = case();
        let v = apply_delta(&base, SensitivityVariable::Volume, dec!(0.05));
        // 10001 * 1.05 = 10501.05
        assert_eq!(v.skus[0].sales.base_annual_volume, dec!(10501));
        let v = apply_delta(&base, SensitivityVariable::Volume, dec!(-2));
        assert_eq!(v.skus[0].sales.base_annual_volume, Decimal::ZERO);
    }

    #[test]
    fn test_oee_capped_at_one() {
        let v = apply_delta(&case(), SensitivityVariable::Oee, dec!(0.5));
        assert_eq!(v.skus[0].ops.oee, Decimal::ONE);
    }

    #[test]
    fn test_conversion_recovery_uses_effective_rate() {
        let v = apply_delta(&case(), SensitivityVariable::ConversionRecovery, dec!(0.5));
        assert_eq!(v.skus[0].sales.conversion_recovery_rs_per_piece, Some(dec!(3)));
    }

    #[test]
    fn test_sga_moves_split_rates() {
        let v = apply_delta(&case(), SensitivityVariable::Sga, dec!(-0.5));
        let pm = &v.skus[0].plant_master;
        assert_eq!(pm.sga_per_kg, dec!(2));
        assert_eq!(pm.plant_sga_per_kg, dec!(1));
        assert_eq!(pm.corp_sga_per_kg, dec!(0.5));
    }

    #[test]
    fn test_money_floors_at_zero() {
        let base = case();
        let v = apply_delta(&base, SensitivityVariable::MachineCost, dec!(-1.5));
        assert_eq!(v.skus[0].ops.cost_of_new_machine, Decimal::ZERO);
        let mut additive = base.clone();
        SensitivityVariable::ResinPrice.apply(&mut additive, PathUpdate::Additive(dec!(5)));
        assert_eq!(additive.skus[0].costing.resin_rs_per_kg, dec!(85));
    }
}
