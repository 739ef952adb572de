use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::case::{FinanceInput, Sku};
use crate::math::safe_div;
use crate::types::{Kg, Money, HORIZON_YEARS};
use crate::volume::YearVolumes;

use super::builder::{PnlYear, SkuProjection};
use super::financing::{build_case_depreciation, build_interest_for_case, tax_unfloored};

/// Case volumes: pieces and kg summed across SKUs per year.
pub fn aggregate_volumes(projections: &[SkuProjection]) -> Vec<YearVolumes> {
    (0..HORIZON_YEARS)
        .map(|i| {
            let mut total = YearVolumes {
                year: (i + 1) as u32,
                pieces: Decimal::ZERO,
                weight_kg: Decimal::ZERO,
            };
            for v in projections.iter().filter_map(|p| p.volumes.get(i)) {
                total.pieces += v.pieces;
                total.weight_kg += v.weight_kg;
            }
            total
        })
        .collect()
}

fn add_lines(acc: &mut PnlYear, y: &PnlYear) {
    acc.volume_pieces += y.volume_pieces;
    acc.weight_kg += y.weight_kg;
    acc.revenue_gross += y.revenue_gross;
    acc.revenue_net += y.revenue_net;
    acc.rm_cost += y.rm_cost;
    acc.mb_cost += y.mb_cost;
    acc.packaging_cost += y.packaging_cost;
    acc.freight_out_cost += y.freight_out_cost;
    acc.material_cost += y.material_cost;
    acc.material_margin += y.material_margin;
    acc.conversion_cost += y.conversion_cost;
    acc.power_cost += y.power_cost;
    acc.manpower_cost += y.manpower_cost;
    acc.gross_margin += y.gross_margin;
    acc.plant_sga_cost += y.plant_sga_cost;
    acc.corp_sga_cost += y.corp_sga_cost;
    acc.sga_cost += y.sga_cost;
    acc.ebitda += y.ebitda;
}

/// Case P&L. Lines down to EBITDA are summed across SKUs; depreciation,
/// interest and tax are recomputed on the case path (case interest with the
/// working-capital investment, unfloored tax).
pub fn aggregate_pnl(
    projections: &[SkuProjection],
    skus: &[Sku],
    finance: &FinanceInput,
) -> Vec<PnlYear> {
    let depreciation = build_case_depreciation(skus);
    let revenue_y1: Vec<Money> = projections
        .iter()
        .map(|p| p.pnl.first().map(|y| y.revenue_net).unwrap_or(Decimal::ZERO))
        .collect();
    let interest = build_interest_for_case(skus, &revenue_y1, finance);

    (0..HORIZON_YEARS)
        .map(|i| {
            let mut year = PnlYear {
                year: (i + 1) as u32,
                depreciation,
                ..PnlYear::default()
            };
            for y in projections.iter().filter_map(|p| p.pnl.get(i)) {
                add_lines(&mut year, y);
            }
            year.price_per_piece = safe_div(year.revenue_net, year.volume_pieces);
            let pbt = year.ebitda - depreciation - interest;
            year.restate_below_ebitda(interest, tax_unfloored(pbt, finance.tax_rate));
            year
        })
        .collect()
}

/// `Σ(value * weight) / Σ weight`, 0 when empty or weightless.
pub fn wa_per_kg(values_with_weights: &[(Money, Kg)]) -> Money {
    let (num, den) = values_with_weights
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(n, d), (v, w)| (n + v * w, d + w));
    safe_div(num, den)
}

/// Weight-weighted average price per kg across SKUs for a 1-based year.
pub fn weighted_price_per_kg(projections: &[SkuProjection], year: u32) -> Money {
    let idx = (year as usize).saturating_sub(1);
    let pairs: Vec<(Money, Kg)> = projections
        .iter()
        .filter_map(|p| {
            let price = p.prices.get(idx)?;
            let volume = p.volumes.get(idx)?;
            Some((price.per_kg.total, volume.weight_kg))
        })
        .collect();
    wa_per_kg(&pairs)
}

/// Aggregated P&L lines expressed per kg of product sold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlPerKg {
    pub year: u32,
    pub revenue_net: Money,
    pub rm_cost: Money,
    pub mb_cost: Money,
    pub packaging_cost: Money,
    pub freight_out_cost: Money,
    pub material_cost: Money,
    pub material_margin: Money,
    pub conversion_cost: Money,
    pub gross_margin: Money,
    pub sga_cost: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub ebit: Money,
    pub interest: Money,
    pub pbt: Money,
    pub tax: Money,
    pub pat: Money,
}

pub fn calculate_pnl_per_kg(pnl: &[PnlYear]) -> Vec<PnlPerKg> {
    pnl.iter()
        .map(|y| {
            let per = |v: Money| safe_div(v, y.weight_kg);
            PnlPerKg {
                year: y.year,
                revenue_net: per(y.revenue_net),
                rm_cost: per(y.rm_cost),
                mb_cost: per(y.mb_cost),
                packaging_cost: per(y.packaging_cost),
                freight_out_cost: per(y.freight_out_cost),
                material_cost: per(y.material_cost),
                material_margin: per(y.material_margin),
                conversion_cost: per(y.conversion_cost),
                gross_margin: per(y.gross_margin),
                sga_cost: per(y.sga_cost),
                ebitda: per(y.ebitda),
                depreciation: per(y.depreciation),
                ebit: per(y.ebit),
                interest: per(y.interest),
                pbt: per(y.pbt),
                tax: per(y.tax),
                pat: per(y.pat),
            }
        })
        .collect()
}
