pub mod case;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod pnl;
pub mod pricing;
pub mod returns;
pub mod time_value;
pub mod types;
pub mod volume;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "quote")]
pub mod quote;

pub use case::{BusinessCase, FinanceInput, Sku};
pub use config::EngineConfig;
pub use engine::{
    calculate_scenario, calculate_scenario_with, run_business_case, try_calculate_scenario, CalcOutput,
};
pub use error::BizCaseError;
pub use types::*;

/// Standard result type for all business-case operations
pub type BizCaseResult<T> = Result<T, BizCaseError>;
