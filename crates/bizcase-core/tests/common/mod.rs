#![allow(dead_code)]

use bizcase_core::case::{
    BusinessCase, CostingInput, FinanceInput, NpdInput, OpsInput, PlantMaster, SalesInput, Sku,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Single-SKU reference case: 100 g part, 10,000 pieces, resin 80 Rs/kg
/// with 5% discount, 5 Rs/kg inward freight, 2% wastage and 15% MB.
pub fn reference_sku() -> Sku {
    Sku {
        id: "sku-1".into(),
        name: "Jar 500ml".into(),
        sales: SalesInput {
            product_weight_grams: dec!(100),
            base_annual_volume: dec!(10000),
            conversion_recovery_rs_per_piece: Some(dec!(2)),
        },
        npd: NpdInput {
            cavities: dec!(4),
            cycle_time_seconds: dec!(20),
            plant: Some("Pune".into()),
            ..NpdInput::default()
        },
        ops: OpsInput {
            cost_of_new_machine: dec!(2_000_000),
            ..OpsInput::default()
        },
        costing: CostingInput {
            resin_rs_per_kg: dec!(80),
            resin_discount: dec!(0.05),
            freight_inwards_rs_per_kg: dec!(5),
            wastage: dec!(0.02),
            mb_ratio: dec!(0.15),
            ..CostingInput::default()
        },
        plant_master: PlantMaster::default(),
    }
}

pub fn reference_finance() -> FinanceInput {
    FinanceInput {
        debt_share: dec!(0.5),
        cost_of_debt: dec!(0.1),
        cost_of_equity: dec!(0.15),
        tax_rate: dec!(0.25),
        include_corp_sga: false,
        volume_growth: Some(Decimal::ZERO),
    }
}

pub fn reference_case() -> BusinessCase {
    BusinessCase {
        id: "case-1".into(),
        name: "Reference jar".into(),
        skus: vec![reference_sku()],
        finance: reference_finance(),
        ..BusinessCase::default()
    }
}

/// A profitable two-SKU case with plant rates and real capex.
pub fn two_sku_case() -> BusinessCase {
    let plant = PlantMaster {
        plant: "Pune".into(),
        conversion_per_kg: dec!(10),
        plant_sga_per_kg: dec!(1.5),
        corp_sga_per_kg: dec!(0.5),
        sga_per_kg: dec!(2),
        ..PlantMaster::default()
    };
    let mut cap = reference_sku();
    cap.sales.base_annual_volume = dec!(400000);
    cap.sales.conversion_recovery_rs_per_piece = Some(dec!(4));
    cap.ops.cost_of_new_machine = dec!(1_500_000);
    cap.ops.cost_of_new_mould = dec!(300_000);
    cap.plant_master = plant.clone();

    let mut lid = reference_sku();
    lid.id = "sku-2".into();
    lid.name = "Lid 83mm".into();
    lid.sales.product_weight_grams = dec!(20);
    lid.sales.base_annual_volume = dec!(1_000_000);
    lid.sales.conversion_recovery_rs_per_piece = Some(dec!(1));
    lid.ops.cost_of_new_machine = dec!(800_000);
    lid.ops.cost_of_new_infra = dec!(600_000);
    lid.plant_master = plant;

    BusinessCase {
        id: "case-2".into(),
        name: "Jar and lid".into(),
        skus: vec![cap, lid],
        finance: FinanceInput {
            volume_growth: None,
            ..reference_finance()
        },
        ..BusinessCase::default()
    }
}

/// [`two_sku_case`] with every optional input left unset, so each read goes
/// through its default.
pub fn unset_optionals_case() -> BusinessCase {
    let mut case = two_sku_case();
    for sku in &mut case.skus {
        sku.sales.conversion_recovery_rs_per_piece = None;
        sku.costing.value_add_rs_per_piece = None;
        sku.costing.mb_rs_per_kg = None;
        sku.costing.mould_amortisation_rs_per_piece = None;
        sku.ops.operating_hours_per_day = None;
        sku.ops.working_days_per_year = None;
        sku.ops.shifts_per_day = None;
        sku.ops.life_of_machine_years = None;
        sku.ops.life_of_mould_years = None;
        sku.ops.life_of_infra_years = None;
        sku.ops.working_capital_days = None;
    }
    case.finance.volume_growth = None;
    case
}
