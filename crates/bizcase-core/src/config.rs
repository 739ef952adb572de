use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::{CONVERGENCE_THRESHOLD, DEFAULT_IRR_GUESS, MAX_IRR_ITERATIONS};
use crate::types::Rate;

pub const DEFAULT_GRID_MAX_POINTS: usize = 1000;

/// Solver settings for the projection engine and the quote search.
///
/// Every field has a default, so a partial JSON/YAML document is enough to
/// override a single knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting rate for the Newton-Raphson IRR
    pub irr_guess: Rate,
    /// Absolute NPV tolerance at which IRR is accepted
    pub irr_tolerance: Decimal,
    pub irr_max_iterations: u32,
    /// Lower bound of the quote optimisation scale factor
    pub optimize_min_factor: Decimal,
    /// Upper bound of the quote optimisation scale factor
    pub optimize_max_factor: Decimal,
    pub optimize_max_iterations: u32,
    /// Relative tolerance on the optimisation target
    pub optimize_tolerance: Decimal,
    /// Most values one sensitivity-grid axis may sweep
    pub grid_max_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            irr_guess: DEFAULT_IRR_GUESS,
            irr_tolerance: CONVERGENCE_THRESHOLD,
            irr_max_iterations: MAX_IRR_ITERATIONS,
            optimize_min_factor: Decimal::ZERO,
            optimize_max_factor: dec!(5),
            optimize_max_iterations: 60,
            optimize_tolerance: dec!(0.0001),
            grid_max_points: DEFAULT_GRID_MAX_POINTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"irr_guess": "0.2"}"#).unwrap();
        assert_eq!(cfg.irr_guess, dec!(0.2));
        assert_eq!(cfg.irr_max_iterations, MAX_IRR_ITERATIONS);
        assert_eq!(cfg.optimize_max_factor, dec!(5));
        assert_eq!(cfg.grid_max_points, DEFAULT_GRID_MAX_POINTS);
    }
}
