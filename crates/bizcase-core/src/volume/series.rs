use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::case::{FinanceInput, Sku};
use crate::math::grams_to_kg;
use crate::types::{Kg, Pieces, Rate, HORIZON_YEARS};

/// Year-on-year growth applied to years 2..=5 when the case carries no
/// explicit growth rate.
pub const DEFAULT_GROWTH_CURVE: [Rate; HORIZON_YEARS - 1] =
    [dec!(0.10), dec!(0.15), dec!(0.20), dec!(0.25)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearVolumes {
    pub year: u32,
    pub pieces: Pieces,
    pub weight_kg: Kg,
}

fn year_volumes(year: usize, pieces: Pieces, weight_grams: Decimal) -> YearVolumes {
    YearVolumes {
        year: year as u32,
        pieces,
        weight_kg: pieces * grams_to_kg(weight_grams),
    }
}

/// Constant-growth series: year 1 = `base`, then `prev * (1 + growth)`.
/// Values are not rounded.
pub fn calculate_volumes(
    weight_grams: Decimal,
    base: Pieces,
    growth: Rate,
    horizon: usize,
) -> Vec<YearVolumes> {
    let mut out = Vec::with_capacity(horizon);
    let mut pieces = base;
    for year in 1..=horizon {
        if year > 1 {
            pieces *= Decimal::ONE + growth;
        }
        out.push(year_volumes(year, pieces, weight_grams));
    }
    out
}

/// Fixed-curve series over the full horizon using [`DEFAULT_GROWTH_CURVE`],
/// compounded on the previous year. Ignores capacity.
pub fn compute_volumes(weight_grams: Decimal, base: Pieces) -> Vec<YearVolumes> {
    let mut out = Vec::with_capacity(HORIZON_YEARS);
    let mut pieces = base;
    for year in 1..=HORIZON_YEARS {
        if year > 1 {
            pieces *= Decimal::ONE + DEFAULT_GROWTH_CURVE[year - 2];
        }
        out.push(year_volumes(year, pieces, weight_grams));
    }
    out
}

/// Explicit growth when the case sets one, otherwise the default curve.
pub fn build_sku_volumes(sku: &Sku, finance: &FinanceInput) -> Vec<YearVolumes> {
    let weight = sku.sales.product_weight_grams;
    let base = sku.sales.base_annual_volume;
    match finance.volume_growth {
        Some(growth) => calculate_volumes(weight, base, growth, HORIZON_YEARS),
        None => compute_volumes(weight, base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_volumes() {
        let vols = calculate_volumes(dec!(100), dec!(10000), Decimal::ZERO, 5);
        assert_eq!(vols.len(), 5);
        assert_eq!(vols[0].year, 1);
        assert_eq!(vols[0].pieces, dec!(10000));
        assert_eq!(vols[0].weight_kg, dec!(1000));
        for v in &vols {
            assert_eq!(v.pieces, dec!(10000));
            assert_eq!(v.weight_kg, dec!(1000));
        }
    }

    #[test]
    fn test_growth_compounds() {
        let vols = calculate_volumes(dec!(50), dec!(1000), dec!(0.10), 3);
        assert_eq!(vols[1].pieces, dec!(1100));
        assert_eq!(vols[2].pieces, dec!(1210));
        assert_eq!(vols[2].weight_kg, dec!(60.5));
    }

    #[test]
    fn test_default_curve() {
        let vols = compute_volumes(dec!(100), dec!(10000));
        let pieces: Vec<Decimal> = vols.iter().map(|v| v.pieces).collect();
        // 10000, *1.10, *1.15, *1.20, *1.25
        assert_eq!(
            pieces,
            vec![dec!(10000), dec!(11000), dec!(12650), dec!(15180), dec!(18975)]
        );
        assert_eq!(vols[4].year, 5);
    }

    #[test]
    fn test_builders_diverge() {
        let sku = Sku {
            sales: crate::case::SalesInput {
                product_weight_grams: dec!(20),
                base_annual_volume: dec!(5000),
                conversion_recovery_rs_per_piece: None,
            },
            ..Sku::default()
        };
        let curve = build_sku_volumes(&sku, &FinanceInput::default());
        let flat = build_sku_volumes(
            &sku,
            &FinanceInput {
                volume_growth: Some(Decimal::ZERO),
                ..FinanceInput::default()
            },
        );
        assert_eq!(curve[1].pieces, dec!(5500));
        assert_eq!(flat[1].pieces, dec!(5000));
    }
}
