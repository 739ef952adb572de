use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::grams_to_kg;
use crate::types::{Kg, Money, Pieces, Rate, Years};

// ---------------------------------------------------------------------------
// Documented defaults for absent optional inputs
// ---------------------------------------------------------------------------

pub const DEFAULT_HOURS_PER_DAY: Decimal = dec!(24);
pub const DEFAULT_DAYS_PER_YEAR: Decimal = dec!(365);
pub const DEFAULT_SHIFTS_PER_DAY: Decimal = dec!(3);
pub const DEFAULT_MACHINE_LIFE_YEARS: Years = dec!(15);
pub const DEFAULT_MOULD_LIFE_YEARS: Years = dec!(15);
pub const DEFAULT_INFRA_LIFE_YEARS: Years = dec!(30);
pub const DEFAULT_WORKING_CAPITAL_DAYS: Decimal = dec!(60);

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

/// A priced business case: one or more SKUs sharing one financing structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessCase {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skus: Vec<Sku>,
    #[serde(default)]
    pub finance: FinanceInput,
}

/// A single product configuration within a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sales: SalesInput,
    #[serde(default)]
    pub npd: NpdInput,
    #[serde(default)]
    pub ops: OpsInput,
    #[serde(default)]
    pub costing: CostingInput,
    #[serde(default)]
    pub plant_master: PlantMaster,
}

impl Sku {
    /// Product weight per piece in kg.
    pub fn weight_kg(&self) -> Kg {
        grams_to_kg(self.sales.product_weight_grams)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesInput {
    pub product_weight_grams: Decimal,
    /// Year-1 volume in pieces
    pub base_annual_volume: Pieces,
    /// Conversion recovery charged to the customer (Rs/piece)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_recovery_rs_per_piece: Option<Money>,
}

/// New-product-development inputs. Identifiers are descriptive, except
/// `plant`, which keys the plant-master lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpdInput {
    pub cavities: Decimal,
    pub cycle_time_seconds: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymer: Option<String>,
}

/// Operations and capital inputs.
///
/// `cost_of_new_*` only counts when the matching `new_*_required` flag is
/// set (the default); `cost_of_old_*` always counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_hours_per_day: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_days_per_year: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shifts_per_day: Option<Decimal>,
    /// Overall equipment effectiveness, 0..=1
    pub oee: Rate,
    pub power_units_per_hour: Decimal,
    pub manpower_count: Decimal,
    #[serde(default = "default_true")]
    pub new_machine_required: bool,
    pub cost_of_new_machine: Money,
    pub cost_of_old_machine: Money,
    #[serde(default = "default_true")]
    pub new_mould_required: bool,
    pub cost_of_new_mould: Money,
    pub cost_of_old_mould: Money,
    #[serde(default = "default_true")]
    pub new_infra_required: bool,
    pub cost_of_new_infra: Money,
    pub cost_of_old_infra: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_of_machine_years: Option<Years>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_of_mould_years: Option<Years>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_of_infra_years: Option<Years>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_capital_days: Option<Decimal>,
}

impl Default for OpsInput {
    fn default() -> Self {
        Self {
            operating_hours_per_day: None,
            working_days_per_year: None,
            shifts_per_day: None,
            oee: Decimal::ONE,
            power_units_per_hour: Decimal::ZERO,
            manpower_count: Decimal::ZERO,
            new_machine_required: true,
            cost_of_new_machine: Decimal::ZERO,
            cost_of_old_machine: Decimal::ZERO,
            new_mould_required: true,
            cost_of_new_mould: Decimal::ZERO,
            cost_of_old_mould: Decimal::ZERO,
            new_infra_required: true,
            cost_of_new_infra: Decimal::ZERO,
            cost_of_old_infra: Decimal::ZERO,
            life_of_machine_years: None,
            life_of_mould_years: None,
            life_of_infra_years: None,
            working_capital_days: None,
        }
    }
}

impl OpsInput {
    pub fn hours_per_day(&self) -> Decimal {
        self.operating_hours_per_day.unwrap_or(DEFAULT_HOURS_PER_DAY)
    }

    pub fn days_per_year(&self) -> Decimal {
        self.working_days_per_year.unwrap_or(DEFAULT_DAYS_PER_YEAR)
    }

    pub fn shifts(&self) -> Decimal {
        self.shifts_per_day.unwrap_or(DEFAULT_SHIFTS_PER_DAY)
    }

    pub fn machine_life(&self) -> Years {
        self.life_of_machine_years.unwrap_or(DEFAULT_MACHINE_LIFE_YEARS)
    }

    pub fn mould_life(&self) -> Years {
        self.life_of_mould_years.unwrap_or(DEFAULT_MOULD_LIFE_YEARS)
    }

    pub fn infra_life(&self) -> Years {
        self.life_of_infra_years.unwrap_or(DEFAULT_INFRA_LIFE_YEARS)
    }

    pub fn working_capital_days(&self) -> Decimal {
        self.working_capital_days.unwrap_or(DEFAULT_WORKING_CAPITAL_DAYS)
    }

    pub fn machine_capex(&self) -> Money {
        gated(self.new_machine_required, self.cost_of_new_machine) + self.cost_of_old_machine
    }

    pub fn mould_capex(&self) -> Money {
        gated(self.new_mould_required, self.cost_of_new_mould) + self.cost_of_old_mould
    }

    pub fn infra_capex(&self) -> Money {
        gated(self.new_infra_required, self.cost_of_new_infra) + self.cost_of_old_infra
    }

    pub fn total_capex(&self) -> Money {
        self.machine_capex() + self.mould_capex() + self.infra_capex()
    }
}

fn gated(required: bool, cost: Money) -> Money {
    if required {
        cost
    } else {
        Decimal::ZERO
    }
}

/// Material and conversion costing. Percentages are decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingInput {
    pub resin_rs_per_kg: Money,
    pub resin_discount: Rate,
    pub freight_inwards_rs_per_kg: Money,
    pub wastage: Rate,
    /// Masterbatch cost as a share of the resin landed cost
    pub mb_ratio: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mb_rs_per_kg: Option<Money>,
    pub use_mb_price_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_add_rs_per_piece: Option<Money>,
    pub packaging_rs_per_kg: Money,
    pub freight_outwards_rs_per_kg: Money,
    /// Year-on-year RM/MB inflation, index 0 = year 1 (ignored)
    pub rm_inflation: Vec<Rate>,
    /// Year-on-year conversion inflation, index 0 = year 1 (ignored)
    pub conversion_inflation: Vec<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mould_amortisation_rs_per_piece: Option<Money>,
}

/// Per-plant operating rates, looked up by plant name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantMaster {
    pub plant: String,
    pub power_per_kg: Money,
    pub manpower_per_kg: Money,
    pub r_and_m_per_kg: Money,
    pub other_mfg_per_kg: Money,
    pub plant_sga_per_kg: Money,
    pub corp_sga_per_kg: Money,
    pub conversion_per_kg: Money,
    /// Blended selling, general & administrative expenses per kg
    pub sga_per_kg: Money,
    pub power_rate_per_unit: Money,
    pub manpower_rate_per_shift: Money,
}

/// Case-level financing assumptions. Rates are decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceInput {
    /// Share of capital funded by debt
    pub debt_share: Rate,
    pub cost_of_debt: Rate,
    pub cost_of_equity: Rate,
    pub tax_rate: Rate,
    pub include_corp_sga: bool,
    /// Explicit year-on-year volume growth; absent means the default curve
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_growth: Option<Rate>,
}
