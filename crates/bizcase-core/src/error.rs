use thiserror::Error;

/// Errors surfaced by the engine. Projection itself never fails: degenerate
/// inputs produce zeros and warnings, so these come from path updates, case
/// lookup, grids, quote optimisation and out-of-range projections.
#[derive(Debug, Error)]
pub enum BizCaseError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A dotted path that does not resolve to a case field
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The path resolves, but to a text or flag field
    #[error("Field '{path}' is not numeric")]
    NotNumeric { path: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A projection whose intermediate values leave the `Decimal` range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}
