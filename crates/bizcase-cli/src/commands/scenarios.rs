use clap::Args;
use serde_json::Value;
use std::time::Instant;

use bizcase_core::scenarios::{run_scenarios as run_scenario_batch, Objective, ScenarioDefinition};
use bizcase_core::{with_metadata, BusinessCase, EngineConfig};

use crate::input;

/// Arguments for a what-if scenario batch
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// File with a list of scenario definitions
    #[arg(long)]
    pub scenarios: String,
}

pub fn run_scenarios(args: ScenariosArgs, config: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;
    let definitions: Vec<ScenarioDefinition> = input::file::read_input(&args.scenarios)?;
    if definitions.is_empty() {
        return Err("At least one scenario required".into());
    }

    let report = run_scenario_batch(&case, &definitions, &Objective::default(), config);
    let warnings = report.warnings.clone();
    let elapsed = start.elapsed().as_micros() as u64;
    let envelope = with_metadata(
        "What-if scenarios vs base case",
        &serde_json::json!({
            "num_scenarios": definitions.len(),
            "names": definitions.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        report,
    );
    Ok(serde_json::to_value(envelope)?)
}
