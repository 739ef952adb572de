use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use bizcase_core::quote::{CustomerQuote, QuoteOptimizationRequest};
use bizcase_core::scenarios::{GridAxis, Metric, Objective, PerturbationSpec, ScenarioDefinition};
use bizcase_core::{BusinessCase, EngineConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Request envelopes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CalculateRequest {
    case: BusinessCase,
    #[serde(default)]
    config: EngineConfig,
}

#[derive(Deserialize)]
struct SensitivityRequest {
    case: BusinessCase,
    specs: Vec<PerturbationSpec>,
    #[serde(default)]
    objective: Objective,
    #[serde(default)]
    config: EngineConfig,
}

#[derive(Deserialize)]
struct GridRequest {
    case: BusinessCase,
    axis_1: GridAxis,
    axis_2: GridAxis,
    metric: Metric,
    #[serde(default)]
    config: EngineConfig,
}

#[derive(Deserialize)]
struct ScenariosRequest {
    case: BusinessCase,
    scenarios: Vec<ScenarioDefinition>,
    #[serde(default)]
    objective: Objective,
    #[serde(default)]
    config: EngineConfig,
}

#[derive(Deserialize)]
struct QuoteRequest {
    case: BusinessCase,
    quote_name: String,
    gst_rate: Decimal,
    #[serde(default)]
    quantities: Option<BTreeMap<String, Decimal>>,
}

#[derive(Deserialize)]
struct OptimizeRequest {
    case: BusinessCase,
    request: QuoteOptimizationRequest,
    #[serde(default)]
    config: EngineConfig,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let input: CalculateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::run_business_case(&input.case, &input.config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let abort = std::sync::atomic::AtomicBool::new(false);
    let output = bizcase_core::scenarios::run_sensitivity_with_abort(
        &input.case,
        &input.specs,
        &input.objective,
        &input.config,
        &abort,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_grid(input_json: String) -> NapiResult<String> {
    let input: GridRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::scenarios::sensitivity_grid(
        &input.case,
        &input.axis_1,
        &input.axis_2,
        input.metric,
        &input.config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_scenarios(input_json: String) -> NapiResult<String> {
    let input: ScenariosRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::scenarios::run_scenarios(
        &input.case,
        &input.scenarios,
        &input.objective,
        &input.config,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_quote(input_json: String) -> NapiResult<String> {
    let input: QuoteRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::quote::generate_quote(
        &input.case,
        &input.quote_name,
        input.gst_rate,
        input.quantities.as_ref(),
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_quote(input_json: String) -> NapiResult<String> {
    let quote: CustomerQuote = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::quote::validate_quote(&quote);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_quote(input_json: String) -> NapiResult<String> {
    let input: OptimizeRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizcase_core::quote::optimize_quote(&input.case, &input.request, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
