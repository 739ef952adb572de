use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values (Rs). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Piece counts. Kept fractional inside series; rounded at presentation.
pub type Pieces = Decimal;

/// Weights in kilograms
pub type Kg = Decimal;

/// Asset lives and working-capital periods
pub type Years = Decimal;

/// Fixed projection horizon in years.
pub const HORIZON_YEARS: usize = 5;

/// Envelope returned by every top-level operation: the result plus what
/// produced it and anything the caller should look at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub engine_version: String,
    pub horizon_years: usize,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` in a [`ComputationOutput`]. Assumptions that fail to
/// serialise are recorded as `null`.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    let assumptions = serde_json::to_value(assumptions).unwrap_or(serde_json::Value::Null);
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions,
        warnings,
        metadata: ComputationMetadata {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            horizon_years: HORIZON_YEARS,
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
