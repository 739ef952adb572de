use clap::Args;
use serde_json::Value;

use bizcase_core::case::model::PlantMaster;
use bizcase_core::case::store::apply_plant_master;
use bizcase_core::{run_business_case, BusinessCase, EngineConfig};

use crate::input;

/// Arguments for a full projection run
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Plant master table to resolve each SKU's `npd.plant` against
    #[arg(long)]
    pub plants: Option<String>,

    /// Drop the per-SKU breakdown from the output
    #[arg(long)]
    pub no_sku_detail: bool,
}

pub fn run_calculate(args: CalculateArgs, config: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let mut case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;

    let mut missing = Vec::new();
    if let Some(path) = args.plants.as_deref() {
        let plants: Vec<PlantMaster> = input::file::read_input(path)?;
        missing = apply_plant_master(&mut case, &plants);
    }

    let mut envelope = run_business_case(&case, config);
    for plant in missing {
        envelope
            .warnings
            .push(format!("Plant '{plant}' not found in plant master; SKU rates kept"));
    }
    if args.no_sku_detail {
        envelope.result.by_sku.clear();
    }
    Ok(serde_json::to_value(envelope)?)
}
