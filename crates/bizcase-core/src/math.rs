//! Small numeric helpers shared by every pipeline stage.
//!
//! Every division in the engine goes through [`safe_div`], so zero weights,
//! zero volumes and missing optional inputs degrade to 0 instead of panicking.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Kg, Rate};

const GRAMS_PER_KG: Decimal = dec!(1000);

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

pub fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

pub fn grams_to_kg(grams: Decimal) -> Kg {
    grams / GRAMS_PER_KG
}

/// Round to 2 decimal places, midpoint away from zero. Presentation only.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Cumulative multiplier series over `horizon` years.
///
/// `factor[0] = 1` and `factor[i] = factor[i-1] * (1 + rates[i])`. The rate at
/// index 0 is ignored (year 1 carries no inflation) and missing trailing
/// rates count as 0.
pub fn compound_inflation_series(rates: &[Rate], horizon: usize) -> Vec<Decimal> {
    let mut factors = Vec::with_capacity(horizon);
    let mut factor = Decimal::ONE;
    for i in 0..horizon {
        if i > 0 {
            let rate = rates.get(i).copied().unwrap_or(Decimal::ZERO);
            factor *= Decimal::ONE + rate;
        }
        factors.push(factor);
    }
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(-3), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_regular() {
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(dec!(1.2), Decimal::ZERO, Decimal::ONE), Decimal::ONE);
        assert_eq!(clamp(dec!(-0.1), Decimal::ZERO, Decimal::ONE), Decimal::ZERO);
        assert_eq!(clamp(dec!(0.85), Decimal::ZERO, Decimal::ONE), dec!(0.85));
    }

    #[test]
    fn test_grams_to_kg() {
        assert_eq!(grams_to_kg(dec!(100)), dec!(0.1));
    }

    #[test]
    fn test_round2_midpoint() {
        assert_eq!(round2(dec!(82.625)), dec!(82.63));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(133333.3333)), dec!(133333.33));
    }

    #[test]
    fn test_compound_series_recurrence() {
        let rates = vec![dec!(0), dec!(0.05), dec!(0.10), dec!(0.02), dec!(0)];
        let series = compound_inflation_series(&rates, 5);
        assert_eq!(series[0], Decimal::ONE);
        for i in 1..5 {
            assert_eq!(series[i], series[i - 1] * (Decimal::ONE + rates[i]));
        }
        assert_eq!(series[2], dec!(1.155));
    }

    #[test]
    fn test_compound_series_ignores_year_one_rate() {
        let series = compound_inflation_series(&[dec!(0.5)], 3);
        assert_eq!(series, vec![Decimal::ONE, Decimal::ONE, Decimal::ONE]);
    }

    #[test]
    fn test_compound_series_short_input_pads_with_zero() {
        let series = compound_inflation_series(&[dec!(0), dec!(0.1)], 4);
        assert_eq!(series.len(), 4);
        assert_eq!(series[1], dec!(1.1));
        assert_eq!(series[3], dec!(1.1));
    }
}
