use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use bizcase_core::case::path::sweepable_paths;
use bizcase_core::scenarios::{
    run_sensitivity_with_abort, sensitivity_grid, DeltaMode, GridAxis, Metric, Objective,
    PerturbationSpec, PerturbationTarget,
};
use bizcase_core::{with_metadata, BusinessCase, EngineConfig};

use crate::input;

/// Arguments for one-way sensitivity runs
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// File with a list of perturbation specs (overrides --target/--deltas)
    #[arg(long)]
    pub specs: Option<String>,

    /// Named variable (volume, resin_price, ...) or dotted field path
    #[arg(long)]
    pub target: Option<String>,

    /// Comma-separated deltas, e.g. "-0.1,0,0.1"
    #[arg(long, allow_hyphen_values = true)]
    pub deltas: Option<String>,

    /// Add deltas instead of scaling by (1 + delta)
    #[arg(long)]
    pub additive: bool,

    /// Sweep every numeric field path of the case with --deltas
    #[arg(long, conflicts_with_all = ["target", "specs"])]
    pub all_paths: bool,

    /// Comma-separated metrics: npv, irr, pnl_y1, pnl_total
    #[arg(long)]
    pub metrics: Option<String>,
}

/// Arguments for a two-way sensitivity grid
#[derive(Args)]
pub struct GridArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// First axis as target:min:max:step (e.g. "volume:-0.2:0.2:0.1")
    #[arg(long, allow_hyphen_values = true)]
    pub axis1: String,

    /// Second axis as target:min:max:step
    #[arg(long, allow_hyphen_values = true)]
    pub axis2: String,

    /// Metric for the grid cells
    #[arg(long, default_value = "npv")]
    pub metric: String,
}

/// Dotted strings are field paths, anything else a named variable.
fn parse_target(raw: &str) -> PerturbationTarget {
    if raw.contains('.') {
        PerturbationTarget::Path(raw.to_string())
    } else {
        PerturbationTarget::Variable(raw.to_string())
    }
}

fn parse_metric(raw: &str) -> Result<Metric, Box<dyn std::error::Error>> {
    let quoted = format!("\"{}\"", raw.trim().to_ascii_lowercase());
    serde_json::from_str(&quoted)
        .map_err(|_| format!("Unknown metric '{raw}' (expected npv, irr, pnl_y1, pnl_total)").into())
}

fn parse_decimals(raw: &str) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<Decimal>()
                .map_err(|e| format!("Invalid delta '{s}': {e}").into())
        })
        .collect()
}

fn parse_axis(spec: &str) -> Result<GridAxis, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.rsplitn(4, ':').collect();
    if parts.len() != 4 {
        return Err(format!("Axis must be target:min:max:step, got '{spec}'").into());
    }
    // rsplitn yields step, max, min, target
    Ok(GridAxis {
        target: parse_target(parts[3]),
        mode: DeltaMode::Percentage,
        min: parts[2].parse()?,
        max: parts[1].parse()?,
        step: parts[0].parse()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs, config: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;

    let mode = if args.additive {
        DeltaMode::Additive
    } else {
        DeltaMode::Percentage
    };
    let deltas = parse_decimals(args.deltas.as_deref().unwrap_or("-0.1,0.1"))?;

    let specs: Vec<PerturbationSpec> = if let Some(ref path) = args.specs {
        input::file::read_input(path)?
    } else if args.all_paths {
        sweepable_paths()
            .into_iter()
            .map(|path| PerturbationSpec {
                target: PerturbationTarget::Path(path),
                deltas: deltas.clone(),
                mode,
            })
            .collect()
    } else {
        let target = args
            .target
            .as_deref()
            .ok_or("--target, --all-paths or --specs is required")?;
        vec![PerturbationSpec {
            target: parse_target(target),
            deltas,
            mode,
        }]
    };

    let objective = match args.metrics.as_deref() {
        Some(raw) => Objective {
            metrics: raw.split(',').map(parse_metric).collect::<Result<_, _>>()?,
        },
        None => Objective::default(),
    };

    let abort = AtomicBool::new(false);
    let report = run_sensitivity_with_abort(&case, &specs, &objective, config, &abort);
    let warnings = report.warnings.clone();
    let elapsed = start.elapsed().as_micros() as u64;
    let envelope = with_metadata(
        "One-way sensitivity (full pipeline re-run per delta)",
        &serde_json::json!({ "runs": report.results.len(), "metrics": objective.metrics }),
        warnings,
        elapsed,
        report,
    );
    Ok(serde_json::to_value(envelope)?)
}

pub fn run_grid(args: GridArgs, config: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;
    let axis_1 = parse_axis(&args.axis1)?;
    let axis_2 = parse_axis(&args.axis2)?;
    let metric = parse_metric(&args.metric)?;
    let result = sensitivity_grid(&case, &axis_1, &axis_2, metric, config)?;
    Ok(serde_json::to_value(result)?)
}
