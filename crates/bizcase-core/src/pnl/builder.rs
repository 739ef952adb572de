use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::case::{FinanceInput, OpsInput, PlantMaster, Sku};
use crate::pricing::{build_price_by_year, PriceYear};
use crate::types::{Kg, Money, Pieces};
use crate::volume::{build_sku_volumes, calculate_capacity, Capacity, YearVolumes};

use super::financing::{build_depreciation_for_sku, build_interest_for_sku, tax_floored};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One year of a profit & loss statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlYear {
    pub year: u32,
    pub volume_pieces: Pieces,
    pub weight_kg: Kg,
    pub price_per_piece: Money,
    pub revenue_gross: Money,
    pub revenue_net: Money,
    pub rm_cost: Money,
    pub mb_cost: Money,
    pub packaging_cost: Money,
    pub freight_out_cost: Money,
    /// RM + MB + packaging + outward freight
    pub material_cost: Money,
    pub material_margin: Money,
    pub conversion_cost: Money,
    /// Annual power bill, reported but not deducted (conversion/kg covers it)
    pub power_cost: Money,
    /// Annual manpower bill, reported but not deducted
    pub manpower_cost: Money,
    pub gross_margin: Money,
    pub plant_sga_cost: Money,
    pub corp_sga_cost: Money,
    pub sga_cost: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub ebit: Money,
    pub interest: Money,
    pub pbt: Money,
    pub tax: Money,
    pub pat: Money,
}

impl PnlYear {
    /// Re-derive EBIT through PAT after depreciation, interest or tax change.
    pub(crate) fn restate_below_ebitda(&mut self, interest: Money, tax: Money) {
        self.ebit = self.ebitda - self.depreciation;
        self.interest = interest;
        self.pbt = self.ebit - interest;
        self.tax = tax;
        self.pat = self.pbt - tax;
    }
}

/// Everything the engine derives for a single SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuProjection {
    pub sku_id: String,
    pub sku_name: String,
    pub capacity: Capacity,
    pub volumes: Vec<YearVolumes>,
    pub prices: Vec<PriceYear>,
    pub pnl: Vec<PnlYear>,
    /// Years in which volume is above the theoretical annual capacity
    pub capacity_exceeded_years: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Cost lines
// ---------------------------------------------------------------------------

/// `power units/hour * hours/day * days/year * rate`
pub fn power_cost_annual(ops: &OpsInput, plant: &PlantMaster) -> Money {
    ops.power_units_per_hour * ops.hours_per_day() * ops.days_per_year() * plant.power_rate_per_unit
}

/// `headcount * shifts/day * days/year * rate per shift`
pub fn manpower_cost_annual(ops: &OpsInput, plant: &PlantMaster) -> Money {
    ops.manpower_count * ops.shifts() * ops.days_per_year() * plant.manpower_rate_per_shift
}

/// Split SGA into (plant, corporate, charged). With `include_corp_sga` the
/// charge is plant + corporate; otherwise the blended rate applies and the
/// split lines are still reported.
pub fn sga_cost(plant: &PlantMaster, weight_kg: Kg, include_corp_sga: bool) -> (Money, Money, Money) {
    let plant_sga = plant.plant_sga_per_kg * weight_kg;
    let corp_sga = plant.corp_sga_per_kg * weight_kg;
    let charged = if include_corp_sga {
        plant_sga + corp_sga
    } else {
        plant.sga_per_kg * weight_kg
    };
    (plant_sga, corp_sga, charged)
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// Per-SKU statement for one year. Interest and tax use the per-SKU rules.
fn build_pnl_year(
    sku: &Sku,
    finance: &FinanceInput,
    volume: &YearVolumes,
    price: &PriceYear,
    depreciation: Money,
    interest: Money,
) -> PnlYear {
    let kg = volume.weight_kg;
    let plant = &sku.plant_master;

    let revenue_gross = price.price_per_piece * volume.pieces;
    let revenue_net = revenue_gross;

    let rm_cost = price.per_kg.rm * kg;
    let mb_cost = price.per_kg.mb * kg;
    let packaging_cost = price.per_kg.packaging * kg;
    let freight_out_cost = price.per_kg.freight_out * kg;
    let material_cost = rm_cost + mb_cost + packaging_cost + freight_out_cost;

    let conversion_cost = plant.conversion_per_kg * kg;
    let gross_margin = revenue_net - material_cost - conversion_cost;
    let (plant_sga_cost, corp_sga_cost, sga) = sga_cost(plant, kg, finance.include_corp_sga);
    let ebitda = gross_margin - sga;

    let mut year = PnlYear {
        year: volume.year,
        volume_pieces: volume.pieces,
        weight_kg: kg,
        price_per_piece: price.price_per_piece,
        revenue_gross,
        revenue_net,
        rm_cost,
        mb_cost,
        packaging_cost,
        freight_out_cost,
        material_cost,
        material_margin: revenue_net - material_cost,
        conversion_cost,
        power_cost: power_cost_annual(&sku.ops, plant),
        manpower_cost: manpower_cost_annual(&sku.ops, plant),
        gross_margin,
        plant_sga_cost,
        corp_sga_cost,
        sga_cost: sga,
        ebitda,
        depreciation,
        ..PnlYear::default()
    };
    let pbt = ebitda - depreciation - interest;
    year.restate_below_ebitda(interest, tax_floored(pbt, finance.tax_rate));
    year
}

/// Capacity, volumes, prices and the five-year statement for one SKU.
pub fn build_sku_pnl(sku: &Sku, finance: &FinanceInput) -> SkuProjection {
    let capacity = calculate_capacity(&sku.npd, &sku.ops);
    let volumes = build_sku_volumes(sku, finance);
    let prices = build_price_by_year(&sku.sales, &sku.costing);
    let depreciation = build_depreciation_for_sku(&sku.ops);
    let interest = build_interest_for_sku(&sku.ops, finance);

    let pnl: Vec<PnlYear> = volumes
        .iter()
        .zip(prices.iter())
        .map(|(v, p)| build_pnl_year(sku, finance, v, p, depreciation, interest))
        .collect();

    let capacity_exceeded_years = volumes
        .iter()
        .filter(|v| capacity.is_exceeded_by(v.pieces))
        .map(|v| v.year)
        .collect();

    debug!(
        sku = %sku.id,
        depreciation = %depreciation,
        interest = %interest,
        revenue_y1 = %pnl.first().map(|y| y.revenue_net).unwrap_or(Decimal::ZERO),
        "built sku projection"
    );

    SkuProjection {
        sku_id: sku.id.clone(),
        sku_name: sku.name.clone(),
        capacity,
        volumes,
        prices,
        pnl,
        capacity_exceeded_years,
    }
}
