use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use bizcase_core::quote::{
    generate_quote, optimize_quote, validate_quote, AdjustMode, CustomerQuote, OptimizationTarget,
    QuoteOptimizationRequest,
};
use bizcase_core::{with_metadata, BusinessCase, EngineConfig};

use crate::input;

/// Arguments for quote generation
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Quote name shown on the output
    #[arg(long, default_value = "Customer quote")]
    pub name: String,

    /// GST rate (e.g. 0.18 for 18%)
    #[arg(long, default_value = "0.18")]
    pub gst_rate: Decimal,

    /// File mapping SKU id to quoted quantity
    #[arg(long)]
    pub quantities: Option<String>,
}

/// Arguments for quote validation
#[derive(Args)]
pub struct ValidateQuoteArgs {
    /// Path to a quote produced by `bizcase quote`; stdin when omitted
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AdjustArg {
    ConversionOnly,
    AllComponents,
}

/// Arguments for quote optimisation
#[derive(Args)]
pub struct OptimizeQuoteArgs {
    /// Path to the business case (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Full request file (overrides the target flags)
    #[arg(long)]
    pub request: Option<String>,

    /// Target NPV
    #[arg(long, conflicts_with = "target_irr", allow_hyphen_values = true)]
    pub target_npv: Option<Decimal>,

    /// Target IRR (e.g. 0.2 for 20%)
    #[arg(long)]
    pub target_irr: Option<Decimal>,

    /// Components the scale factor applies to
    #[arg(long, value_enum, default_value = "conversion-only")]
    pub mode: AdjustArg,

    /// GST rate for the resulting quote
    #[arg(long, default_value = "0.18")]
    pub gst_rate: Decimal,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;
    let quantities: Option<BTreeMap<String, Decimal>> = match args.quantities {
        Some(ref path) => Some(input::file::read_input(path)?),
        None => None,
    };

    let quote = generate_quote(&case, &args.name, args.gst_rate, quantities.as_ref());
    let warnings = validate_quote(&quote)
        .issues
        .into_iter()
        .map(|i| match i.sku_id {
            Some(id) => format!("{id}: {}", i.message),
            None => i.message,
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    let envelope = with_metadata(
        "Year-1 per-piece cost build-up with GST",
        &serde_json::json!({ "gst_rate": args.gst_rate.to_string(), "skus": case.skus.len() }),
        warnings,
        elapsed,
        quote,
    );
    Ok(serde_json::to_value(envelope)?)
}

pub fn run_validate_quote(args: ValidateQuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::load(args.input.as_deref(), "Quote")?;
    // accept either a bare quote or the envelope printed by `bizcase quote`
    let quote_value = match raw.get("result") {
        Some(inner) => inner.clone(),
        None => raw,
    };
    let quote: CustomerQuote = serde_json::from_value(quote_value)?;
    Ok(serde_json::to_value(validate_quote(&quote))?)
}

pub fn run_optimize_quote(
    args: OptimizeQuoteArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let case: BusinessCase = input::load(args.input.as_deref(), "Business case")?;

    let request: QuoteOptimizationRequest = if let Some(ref path) = args.request {
        input::file::read_input(path)?
    } else {
        let target = match (args.target_npv, args.target_irr) {
            (Some(npv), _) => OptimizationTarget::Npv(npv),
            (None, Some(irr)) => OptimizationTarget::Irr(irr),
            (None, None) => return Err("--target-npv or --target-irr is required (or provide --request)".into()),
        };
        QuoteOptimizationRequest {
            target,
            mode: match args.mode {
                AdjustArg::ConversionOnly => AdjustMode::ConversionOnly,
                AdjustArg::AllComponents => AdjustMode::AllComponents,
            },
            quote_name: "Optimised quote".to_string(),
            gst_rate: args.gst_rate,
            quantities: None,
        }
    };

    let result = optimize_quote(&case, &request, config)?;
    Ok(serde_json::to_value(result)?)
}
