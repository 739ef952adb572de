use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::case::{CostingInput, SalesInput};
use crate::math::{compound_inflation_series, grams_to_kg, safe_div};
use crate::types::{Kg, Money, HORIZON_YEARS};

/// Landed resin and masterbatch cost per kg of product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmMbPerKg {
    /// Discounted resin plus inward freight, before wastage
    pub rm_base: Money,
    /// Masterbatch before wastage
    pub mb_base: Money,
    pub rm: Money,
    pub mb: Money,
}

/// RM and MB per kg, both wastage-inflated.
///
/// `rm = (resin * (1 - discount) + freight_in) * (1 + wastage)`;
/// `mb = rm_base * mb_ratio * (1 + wastage)`, or `mb_price * (1 + wastage)`
/// when the override is set.
pub fn calculate_rm_mb_per_kg(costing: &CostingInput) -> RmMbPerKg {
    let wastage_factor = Decimal::ONE + costing.wastage;
    let rm_base = costing.resin_rs_per_kg * (Decimal::ONE - costing.resin_discount)
        + costing.freight_inwards_rs_per_kg;
    let mb_base = if costing.use_mb_price_override {
        costing.mb_rs_per_kg.unwrap_or_default()
    } else {
        rm_base * costing.mb_ratio
    };

    RmMbPerKg {
        rm_base,
        mb_base,
        rm: rm_base * wastage_factor,
        mb: mb_base * wastage_factor,
    }
}

pub fn per_piece_to_per_kg(value_per_piece: Money, weight_kg: Kg) -> Money {
    safe_div(value_per_piece, weight_kg)
}

/// Conversion charge per piece: the sales recovery rate if set, else the
/// costing value-add, else 0.
pub fn conversion_recovery_per_piece(sales: &SalesInput, costing: &CostingInput) -> Money {
    sales
        .conversion_recovery_rs_per_piece
        .or(costing.value_add_rs_per_piece)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceComponentsPerKg {
    pub rm: Money,
    pub mb: Money,
    /// Conversion recovery / value add
    pub value_add: Money,
    pub packaging: Money,
    pub freight_out: Money,
    pub total: Money,
}

impl PriceComponentsPerKg {
    pub fn new(rm: Money, mb: Money, value_add: Money, packaging: Money, freight_out: Money) -> Self {
        Self {
            rm,
            mb,
            value_add,
            packaging,
            freight_out,
            total: rm + mb + value_add + packaging + freight_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceYear {
    pub year: u32,
    pub per_kg: PriceComponentsPerKg,
    pub price_per_piece: Money,
}

/// Per-kg price build-up and per-piece price for each projection year.
///
/// RM and MB follow the compounded RM inflation series, value add follows
/// the conversion inflation series; packaging and outward freight are flat.
pub fn build_price_by_year(sales: &SalesInput, costing: &CostingInput) -> Vec<PriceYear> {
    let weight_kg = grams_to_kg(sales.product_weight_grams);
    let rm_mb = calculate_rm_mb_per_kg(costing);
    let value_add =
        per_piece_to_per_kg(conversion_recovery_per_piece(sales, costing), weight_kg);

    let rm_factors = compound_inflation_series(&costing.rm_inflation, HORIZON_YEARS);
    let conv_factors = compound_inflation_series(&costing.conversion_inflation, HORIZON_YEARS);

    let prices: Vec<PriceYear> = rm_factors
        .iter()
        .zip(conv_factors.iter())
        .enumerate()
        .map(|(i, (rm_f, conv_f))| {
            let per_kg = PriceComponentsPerKg::new(
                rm_mb.rm * rm_f,
                rm_mb.mb * rm_f,
                value_add * conv_f,
                costing.packaging_rs_per_kg,
                costing.freight_outwards_rs_per_kg,
            );
            let price_per_piece = per_kg.total * weight_kg;
            PriceYear {
                year: (i + 1) as u32,
                per_kg,
                price_per_piece,
            }
        })
        .collect();

    debug!(
        rm = %rm_mb.rm,
        mb = %rm_mb.mb,
        value_add = %value_add,
        "built price series"
    );
    prices
}
