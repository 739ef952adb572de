pub mod customer;
pub mod optimize;

pub use customer::{
    generate_quote, quote_components, validate_quote, CustomerQuote, QuoteComponents, QuoteIssue,
    QuoteLine, QuoteTotals, QuoteValidation,
};
pub use optimize::{
    optimize_quote, scale_components, AdjustMode, OptimizationTarget, QuoteOptimization,
    QuoteOptimizationRequest,
};
