//! Dotted-path access to the numeric inputs of a [`BusinessCase`].
//!
//! Paths are resolved against a fixed registry of lenses rather than by
//! reflection, so a malformed path is a recoverable error and never a panic:
//!
//! ```text
//! finance.<field>
//! skus.<index|*>.<group>.<field>
//! skus.<index|*>.costing.rm_inflation.<year-index>
//! ```
//!
//! Segments may be written in camelCase (`skus.0.costing.resinRsPerKg`).
//! Absent optional fields read as their documented default and become
//! explicit values once written.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{BusinessCase, FinanceInput, Sku};
use crate::error::BizCaseError;
use crate::pricing::conversion_recovery_per_piece;
use crate::types::HORIZON_YEARS;
use crate::BizCaseResult;

/// How a numeric field is changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathUpdate {
    /// `v * (1 + delta)`
    Percentage(Decimal),
    /// `v + delta`
    Additive(Decimal),
    /// Literal override
    Set(Decimal),
}

impl PathUpdate {
    /// New value for `current`; `None` when the result leaves the `Decimal`
    /// range.
    pub fn apply(self, current: Decimal) -> Option<Decimal> {
        match self {
            PathUpdate::Percentage(delta) => Decimal::ONE
                .checked_add(delta)
                .and_then(|factor| current.checked_mul(factor)),
            PathUpdate::Additive(delta) => current.checked_add(delta),
            PathUpdate::Set(value) => Some(value),
        }
    }

    /// Like [`PathUpdate::apply`], pinned to `Decimal::MAX` / `MIN` on
    /// overflow.
    pub fn saturating_apply(self, current: Decimal) -> Decimal {
        self.apply(current).unwrap_or_else(|| {
            let negative = match self {
                PathUpdate::Percentage(delta) => {
                    // 1 + delta only overflows for a positive delta
                    let factor_negative = delta < Decimal::NEGATIVE_ONE;
                    current.is_sign_negative() != factor_negative
                }
                PathUpdate::Additive(delta) => delta.is_sign_negative(),
                PathUpdate::Set(value) => value.is_sign_negative(),
            };
            if negative {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        })
    }

    fn is_relative(self) -> bool {
        !matches!(self, PathUpdate::Set(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: Decimal,
    max: Option<Decimal>,
}

const NON_NEGATIVE: Bounds = Bounds {
    min: Decimal::ZERO,
    max: None,
};

const FRACTION: Bounds = Bounds {
    min: Decimal::ZERO,
    max: Some(Decimal::ONE),
};

const GROWTH: Bounds = Bounds {
    min: Decimal::NEGATIVE_ONE,
    max: None,
};

impl Bounds {
    fn apply(self, value: Decimal) -> Decimal {
        let floored = value.max(self.min);
        match self.max {
            Some(max) => floored.min(max),
            None => floored,
        }
    }
}

// ---------------------------------------------------------------------------
// SKU lenses
// ---------------------------------------------------------------------------

/// A numeric field of a [`Sku`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuField {
    ProductWeightGrams,
    BaseAnnualVolume,
    ConversionRecovery,
    Cavities,
    CycleTimeSeconds,
    OperatingHoursPerDay,
    WorkingDaysPerYear,
    ShiftsPerDay,
    Oee,
    PowerUnitsPerHour,
    ManpowerCount,
    CostOfNewMachine,
    CostOfOldMachine,
    CostOfNewMould,
    CostOfOldMould,
    CostOfNewInfra,
    CostOfOldInfra,
    LifeOfMachineYears,
    LifeOfMouldYears,
    LifeOfInfraYears,
    WorkingCapitalDays,
    ResinRsPerKg,
    ResinDiscount,
    FreightInwardsRsPerKg,
    Wastage,
    MbRatio,
    MbRsPerKg,
    ValueAddRsPerPiece,
    PackagingRsPerKg,
    FreightOutwardsRsPerKg,
    MouldAmortisationRsPerPiece,
    RmInflation(usize),
    ConversionInflation(usize),
    PowerPerKg,
    ManpowerPerKg,
    RAndMPerKg,
    OtherMfgPerKg,
    PlantSgaPerKg,
    CorpSgaPerKg,
    ConversionPerKg,
    SgaPerKg,
    PowerRatePerUnit,
    ManpowerRatePerShift,
}

const SKU_FIELDS: &[(&str, SkuField)] = &[
    ("sales.product_weight_grams", SkuField::ProductWeightGrams),
    ("sales.base_annual_volume", SkuField::BaseAnnualVolume),
    ("sales.conversion_recovery_rs_per_piece", SkuField::ConversionRecovery),
    ("npd.cavities", SkuField::Cavities),
    ("npd.cycle_time_seconds", SkuField::CycleTimeSeconds),
    ("ops.operating_hours_per_day", SkuField::OperatingHoursPerDay),
    ("ops.working_days_per_year", SkuField::WorkingDaysPerYear),
    ("ops.shifts_per_day", SkuField::ShiftsPerDay),
    ("ops.oee", SkuField::Oee),
    ("ops.power_units_per_hour", SkuField::PowerUnitsPerHour),
    ("ops.manpower_count", SkuField::ManpowerCount),
    ("ops.cost_of_new_machine", SkuField::CostOfNewMachine),
    ("ops.cost_of_old_machine", SkuField::CostOfOldMachine),
    ("ops.cost_of_new_mould", SkuField::CostOfNewMould),
    ("ops.cost_of_old_mould", SkuField::CostOfOldMould),
    ("ops.cost_of_new_infra", SkuField::CostOfNewInfra),
    ("ops.cost_of_old_infra", SkuField::CostOfOldInfra),
    ("ops.life_of_machine_years", SkuField::LifeOfMachineYears),
    ("ops.life_of_mould_years", SkuField::LifeOfMouldYears),
    ("ops.life_of_infra_years", SkuField::LifeOfInfraYears),
    ("ops.working_capital_days", SkuField::WorkingCapitalDays),
    ("costing.resin_rs_per_kg", SkuField::ResinRsPerKg),
    ("costing.resin_discount", SkuField::ResinDiscount),
    ("costing.freight_inwards_rs_per_kg", SkuField::FreightInwardsRsPerKg),
    ("costing.wastage", SkuField::Wastage),
    ("costing.mb_ratio", SkuField::MbRatio),
    ("costing.mb_rs_per_kg", SkuField::MbRsPerKg),
    ("costing.value_add_rs_per_piece", SkuField::ValueAddRsPerPiece),
    ("costing.packaging_rs_per_kg", SkuField::PackagingRsPerKg),
    ("costing.freight_outwards_rs_per_kg", SkuField::FreightOutwardsRsPerKg),
    ("costing.mould_amortisation_rs_per_piece", SkuField::MouldAmortisationRsPerPiece),
    ("plant_master.power_per_kg", SkuField::PowerPerKg),
    ("plant_master.manpower_per_kg", SkuField::ManpowerPerKg),
    ("plant_master.r_and_m_per_kg", SkuField::RAndMPerKg),
    ("plant_master.other_mfg_per_kg", SkuField::OtherMfgPerKg),
    ("plant_master.plant_sga_per_kg", SkuField::PlantSgaPerKg),
    ("plant_master.corp_sga_per_kg", SkuField::CorpSgaPerKg),
    ("plant_master.conversion_per_kg", SkuField::ConversionPerKg),
    ("plant_master.sga_per_kg", SkuField::SgaPerKg),
    ("plant_master.power_rate_per_unit", SkuField::PowerRatePerUnit),
    ("plant_master.manpower_rate_per_shift", SkuField::ManpowerRatePerShift),
];

const SKU_SERIES: &[&str] = &["costing.rm_inflation", "costing.conversion_inflation"];

const SKU_NON_NUMERIC: &[&str] = &[
    "npd.machine",
    "npd.plant",
    "npd.polymer",
    "ops.new_machine_required",
    "ops.new_mould_required",
    "ops.new_infra_required",
    "costing.use_mb_price_override",
    "plant_master.plant",
];

impl SkuField {
    /// Resolve `group.field` (snake_case) plus an optional series index.
    fn lookup(path: &str, key: &str, index: Option<&str>) -> BizCaseResult<Self> {
        if SKU_SERIES.contains(&key) {
            let Some(raw) = index else {
                return Err(BizCaseError::NotNumeric { path: path.into() });
            };
            let i = parse_index(path, raw)?;
            if i >= HORIZON_YEARS {
                return Err(invalid(path, format!("series index {i} outside the {HORIZON_YEARS}-year horizon")));
            }
            return Ok(if key == "costing.rm_inflation" {
                SkuField::RmInflation(i)
            } else {
                SkuField::ConversionInflation(i)
            });
        }
        if index.is_some() {
            return Err(invalid(path, "unexpected trailing segment"));
        }
        if let Some((_, field)) = SKU_FIELDS.iter().find(|(name, _)| *name == key) {
            return Ok(*field);
        }
        if SKU_NON_NUMERIC.contains(&key) {
            return Err(BizCaseError::NotNumeric { path: path.into() });
        }
        Err(invalid(path, format!("unknown SKU field '{key}'")))
    }

    fn bounds(self) -> Bounds {
        match self {
            SkuField::Oee | SkuField::ResinDiscount | SkuField::Wastage => FRACTION,
            SkuField::RmInflation(_) | SkuField::ConversionInflation(_) => GROWTH,
            _ => NON_NEGATIVE,
        }
    }

    /// Current value; absent optionals read as their documented default.
    pub fn read(self, sku: &Sku) -> Decimal {
        let (sales, npd, ops, costing, pm) =
            (&sku.sales, &sku.npd, &sku.ops, &sku.costing, &sku.plant_master);
        match self {
            SkuField::ProductWeightGrams => sales.product_weight_grams,
            SkuField::BaseAnnualVolume => sales.base_annual_volume,
            SkuField::ConversionRecovery => conversion_recovery_per_piece(sales, costing),
            SkuField::Cavities => npd.cavities,
            SkuField::CycleTimeSeconds => npd.cycle_time_seconds,
            SkuField::OperatingHoursPerDay => ops.hours_per_day(),
            SkuField::WorkingDaysPerYear => ops.days_per_year(),
            SkuField::ShiftsPerDay => ops.shifts(),
            SkuField::Oee => ops.oee,
            SkuField::PowerUnitsPerHour => ops.power_units_per_hour,
            SkuField::ManpowerCount => ops.manpower_count,
            SkuField::CostOfNewMachine => ops.cost_of_new_machine,
            SkuField::CostOfOldMachine => ops.cost_of_old_machine,
            SkuField::CostOfNewMould => ops.cost_of_new_mould,
            SkuField::CostOfOldMould => ops.cost_of_old_mould,
            SkuField::CostOfNewInfra => ops.cost_of_new_infra,
            SkuField::CostOfOldInfra => ops.cost_of_old_infra,
            SkuField::LifeOfMachineYears => ops.machine_life(),
            SkuField::LifeOfMouldYears => ops.mould_life(),
            SkuField::LifeOfInfraYears => ops.infra_life(),
            SkuField::WorkingCapitalDays => ops.working_capital_days(),
            SkuField::ResinRsPerKg => costing.resin_rs_per_kg,
            SkuField::ResinDiscount => costing.resin_discount,
            SkuField::FreightInwardsRsPerKg => costing.freight_inwards_rs_per_kg,
            SkuField::Wastage => costing.wastage,
            SkuField::MbRatio => costing.mb_ratio,
            SkuField::MbRsPerKg => costing.mb_rs_per_kg.unwrap_or_default(),
            SkuField::ValueAddRsPerPiece => costing.value_add_rs_per_piece.unwrap_or_default(),
            SkuField::PackagingRsPerKg => costing.packaging_rs_per_kg,
            SkuField::FreightOutwardsRsPerKg => costing.freight_outwards_rs_per_kg,
            SkuField::MouldAmortisationRsPerPiece => {
                costing.mould_amortisation_rs_per_piece.unwrap_or_default()
            }
            SkuField::RmInflation(i) => costing.rm_inflation.get(i).copied().unwrap_or_default(),
            SkuField::ConversionInflation(i) => {
                costing.conversion_inflation.get(i).copied().unwrap_or_default()
            }
            SkuField::PowerPerKg => pm.power_per_kg,
            SkuField::ManpowerPerKg => pm.manpower_per_kg,
            SkuField::RAndMPerKg => pm.r_and_m_per_kg,
            SkuField::OtherMfgPerKg => pm.other_mfg_per_kg,
            SkuField::PlantSgaPerKg => pm.plant_sga_per_kg,
            SkuField::CorpSgaPerKg => pm.corp_sga_per_kg,
            SkuField::ConversionPerKg => pm.conversion_per_kg,
            SkuField::SgaPerKg => pm.sga_per_kg,
            SkuField::PowerRatePerUnit => pm.power_rate_per_unit,
            SkuField::ManpowerRatePerShift => pm.manpower_rate_per_shift,
        }
    }

    /// Store a value after clamping it to the field's bounds.
    pub fn write(self, sku: &mut Sku, value: Decimal) {
        let v = self.bounds().apply(value);
        let (sales, npd, ops, costing, pm) = (
            &mut sku.sales,
            &mut sku.npd,
            &mut sku.ops,
            &mut sku.costing,
            &mut sku.plant_master,
        );
        match self {
            SkuField::ProductWeightGrams => sales.product_weight_grams = v,
            SkuField::BaseAnnualVolume => sales.base_annual_volume = v,
            SkuField::ConversionRecovery => sales.conversion_recovery_rs_per_piece = Some(v),
            SkuField::Cavities => npd.cavities = v,
            SkuField::CycleTimeSeconds => npd.cycle_time_seconds = v,
            SkuField::OperatingHoursPerDay => ops.operating_hours_per_day = Some(v),
            SkuField::WorkingDaysPerYear => ops.working_days_per_year = Some(v),
            SkuField::ShiftsPerDay => ops.shifts_per_day = Some(v),
            SkuField::Oee => ops.oee = v,
            SkuField::PowerUnitsPerHour => ops.power_units_per_hour = v,
            SkuField::ManpowerCount => ops.manpower_count = v,
            SkuField::CostOfNewMachine => ops.cost_of_new_machine = v,
            SkuField::CostOfOldMachine => ops.cost_of_old_machine = v,
            SkuField::CostOfNewMould => ops.cost_of_new_mould = v,
            SkuField::CostOfOldMould => ops.cost_of_old_mould = v,
            SkuField::CostOfNewInfra => ops.cost_of_new_infra = v,
            SkuField::CostOfOldInfra => ops.cost_of_old_infra = v,
            SkuField::LifeOfMachineYears => ops.life_of_machine_years = Some(v),
            SkuField::LifeOfMouldYears => ops.life_of_mould_years = Some(v),
            SkuField::LifeOfInfraYears => ops.life_of_infra_years = Some(v),
            SkuField::WorkingCapitalDays => ops.working_capital_days = Some(v),
            SkuField::ResinRsPerKg => costing.resin_rs_per_kg = v,
            SkuField::ResinDiscount => costing.resin_discount = v,
            SkuField::FreightInwardsRsPerKg => costing.freight_inwards_rs_per_kg = v,
            SkuField::Wastage => costing.wastage = v,
            SkuField::MbRatio => costing.mb_ratio = v,
            SkuField::MbRsPerKg => costing.mb_rs_per_kg = Some(v),
            SkuField::ValueAddRsPerPiece => costing.value_add_rs_per_piece = Some(v),
            SkuField::PackagingRsPerKg => costing.packaging_rs_per_kg = v,
            SkuField::FreightOutwardsRsPerKg => costing.freight_outwards_rs_per_kg = v,
            SkuField::MouldAmortisationRsPerPiece => {
                costing.mould_amortisation_rs_per_piece = Some(v)
            }
            SkuField::RmInflation(i) => write_series(&mut costing.rm_inflation, i, v),
            SkuField::ConversionInflation(i) => {
                write_series(&mut costing.conversion_inflation, i, v)
            }
            SkuField::PowerPerKg => pm.power_per_kg = v,
            SkuField::ManpowerPerKg => pm.manpower_per_kg = v,
            SkuField::RAndMPerKg => pm.r_and_m_per_kg = v,
            SkuField::OtherMfgPerKg => pm.other_mfg_per_kg = v,
            SkuField::PlantSgaPerKg => pm.plant_sga_per_kg = v,
            SkuField::CorpSgaPerKg => pm.corp_sga_per_kg = v,
            SkuField::ConversionPerKg => pm.conversion_per_kg = v,
            SkuField::SgaPerKg => pm.sga_per_kg = v,
            SkuField::PowerRatePerUnit => pm.power_rate_per_unit = v,
            SkuField::ManpowerRatePerShift => pm.manpower_rate_per_shift = v,
        }
    }
}

fn write_series(series: &mut Vec<Decimal>, index: usize, value: Decimal) {
    if series.len() <= index {
        series.resize(index + 1, Decimal::ZERO);
    }
    series[index] = value;
}

// ---------------------------------------------------------------------------
// Finance lenses
// ---------------------------------------------------------------------------

/// A numeric field of [`FinanceInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceField {
    DebtShare,
    CostOfDebt,
    CostOfEquity,
    TaxRate,
    VolumeGrowth,
}

const FINANCE_FIELDS: &[(&str, FinanceField)] = &[
    ("debt_share", FinanceField::DebtShare),
    ("cost_of_debt", FinanceField::CostOfDebt),
    ("cost_of_equity", FinanceField::CostOfEquity),
    ("tax_rate", FinanceField::TaxRate),
    ("volume_growth", FinanceField::VolumeGrowth),
];

impl FinanceField {
    fn bounds(self) -> Bounds {
        match self {
            FinanceField::DebtShare | FinanceField::TaxRate => FRACTION,
            FinanceField::VolumeGrowth => GROWTH,
            FinanceField::CostOfDebt | FinanceField::CostOfEquity => NON_NEGATIVE,
        }
    }

    /// Absent growth reads as 0 even though the projection then follows the
    /// default curve; see [`FinanceField::relative_base`].
    pub fn read(self, finance: &FinanceInput) -> Decimal {
        match self {
            FinanceField::DebtShare => finance.debt_share,
            FinanceField::CostOfDebt => finance.cost_of_debt,
            FinanceField::CostOfEquity => finance.cost_of_equity,
            FinanceField::TaxRate => finance.tax_rate,
            FinanceField::VolumeGrowth => finance.volume_growth.unwrap_or_default(),
        }
    }

    /// The value a percentage or additive update starts from. An absent
    /// growth rate stands for a whole curve, so it has no single base.
    fn relative_base(self, path: &str, finance: &FinanceInput) -> BizCaseResult<Decimal> {
        match self {
            FinanceField::VolumeGrowth if finance.volume_growth.is_none() => {
                Err(BizCaseError::InvalidInput {
                    field: path.into(),
                    reason: "volume growth is unset (default curve); only a literal value can be applied".into(),
                })
            }
            _ => Ok(self.read(finance)),
        }
    }

    pub fn write(self, finance: &mut FinanceInput, value: Decimal) {
        let v = self.bounds().apply(value);
        match self {
            FinanceField::DebtShare => finance.debt_share = v,
            FinanceField::CostOfDebt => finance.cost_of_debt = v,
            FinanceField::CostOfEquity => finance.cost_of_equity = v,
            FinanceField::TaxRate => finance.tax_rate = v,
            FinanceField::VolumeGrowth => finance.volume_growth = Some(v),
        }
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Which SKUs a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuSelector {
    All,
    Index(usize),
}

/// A resolved, type-checked field address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Finance(FinanceField),
    Sku(SkuSelector, SkuField),
}

impl FieldPath {
    pub fn parse(path: &str) -> BizCaseResult<Self> {
        let segments: Vec<String> = path.split('.').map(to_snake_case).collect();
        let seg: Vec<&str> = segments.iter().map(String::as_str).collect();

        match seg.as_slice() {
            ["finance", field] => FINANCE_FIELDS
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, f)| FieldPath::Finance(*f))
                .ok_or_else(|| {
                    if *field == "include_corp_sga" {
                        BizCaseError::NotNumeric { path: path.into() }
                    } else {
                        invalid(path, format!("unknown finance field '{field}'"))
                    }
                }),
            ["skus", selector, group, field, rest @ ..] if rest.len() <= 1 => {
                let selector = if *selector == "*" {
                    SkuSelector::All
                } else {
                    SkuSelector::Index(parse_index(path, selector)?)
                };
                let key = format!("{group}.{field}");
                let field = SkuField::lookup(path, &key, rest.first().copied())?;
                Ok(FieldPath::Sku(selector, field))
            }
            ["skus", _, "id" | "name"] => Err(BizCaseError::NotNumeric { path: path.into() }),
            _ => Err(invalid(
                path,
                "expected finance.<field> or skus.<index|*>.<group>.<field>",
            )),
        }
    }
}

/// Every numeric SKU path template (with `*` selector), for automated sweeps.
pub fn sweepable_paths() -> Vec<String> {
    let mut paths: Vec<String> = FINANCE_FIELDS
        .iter()
        .map(|(name, _)| format!("finance.{name}"))
        .collect();
    paths.extend(SKU_FIELDS.iter().map(|(name, _)| format!("skus.*.{name}")));
    paths
}

/// Read every value a path addresses (several for a `*` selector).
pub fn read_path(case: &BusinessCase, path: &str) -> BizCaseResult<Vec<Decimal>> {
    match FieldPath::parse(path)? {
        FieldPath::Finance(field) => Ok(vec![field.read(&case.finance)]),
        FieldPath::Sku(SkuSelector::All, field) => {
            Ok(case.skus.iter().map(|sku| field.read(sku)).collect())
        }
        FieldPath::Sku(SkuSelector::Index(i), field) => case
            .skus
            .get(i)
            .map(|sku| vec![field.read(sku)])
            .ok_or_else(|| sku_out_of_range(path, i, case.skus.len())),
    }
}

/// Apply `update` to every field the path addresses, in place. Returns the
/// number of fields written.
pub fn apply_path_update(
    case: &mut BusinessCase,
    path: &str,
    update: PathUpdate,
) -> BizCaseResult<usize> {
    match FieldPath::parse(path)? {
        FieldPath::Finance(field) => {
            let current = if update.is_relative() {
                field.relative_base(path, &case.finance)?
            } else {
                field.read(&case.finance)
            };
            field.write(&mut case.finance, next_value(path, update, current)?);
            Ok(1)
        }
        FieldPath::Sku(SkuSelector::All, field) => {
            let next: Vec<Decimal> = case
                .skus
                .iter()
                .map(|sku| next_value(path, update, field.read(sku)))
                .collect::<BizCaseResult<_>>()?;
            for (sku, value) in case.skus.iter_mut().zip(next) {
                field.write(sku, value);
            }
            Ok(case.skus.len())
        }
        FieldPath::Sku(SkuSelector::Index(i), field) => {
            let count = case.skus.len();
            let sku = case
                .skus
                .get_mut(i)
                .ok_or_else(|| sku_out_of_range(path, i, count))?;
            let next = next_value(path, update, field.read(sku))?;
            field.write(sku, next);
            Ok(1)
        }
    }
}

fn next_value(path: &str, update: PathUpdate, current: Decimal) -> BizCaseResult<Decimal> {
    update.apply(current).ok_or_else(|| BizCaseError::InvalidInput {
        field: path.into(),
        reason: format!("{update:?} on {current} is out of range"),
    })
}

/// `camelCase` / `PascalCase` segment to `snake_case`; acronym runs stay
/// together (`corpSGAPerKg` -> `corp_sga_per_kg`).
fn to_snake_case(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

fn parse_index(path: &str, raw: &str) -> BizCaseResult<usize> {
    raw.parse::<usize>()
        .map_err(|_| invalid(path, format!("'{raw}' is not an index")))
}

fn sku_out_of_range(path: &str, index: usize, len: usize) -> BizCaseError {
    invalid(path, format!("SKU index {index} out of range ({len} SKUs)"))
}

fn invalid(path: &str, reason: impl Into<String>) -> BizCaseError {
    BizCaseError::InvalidPath {
        path: path.into(),
        reason: reason.into(),
    }
}
