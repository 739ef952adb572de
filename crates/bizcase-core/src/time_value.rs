use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

pub const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
pub const MAX_IRR_ITERATIONS: u32 = 100;
pub const DEFAULT_IRR_GUESS: Rate = dec!(0.1);

const MIN_RATE: Rate = dec!(-0.99);
const MAX_RATE: Rate = dec!(100);

/// `1 / (1 + rate)^period`, built by repeated multiplication.
///
/// Returns 0 when the compounded factor is 0 (rate of exactly -100%).
pub fn discount_factor(rate: Rate, period: usize) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    let mut compounded = Decimal::ONE;
    for _ in 0..period {
        compounded *= one_plus_r;
    }
    if compounded.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE / compounded
    }
}

/// Net Present Value of a series of cash flows, index 0 undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Money {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf * discount_factor(rate, t))
        .sum()
}

/// True when the series holds at least one strictly negative and one
/// strictly positive flow.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    has_negative && has_positive
}

/// Internal Rate of Return using Newton-Raphson with the default tolerance
/// and iteration cap.
pub fn irr(cash_flows: &[Money], guess: Rate) -> Option<Rate> {
    irr_with(cash_flows, guess, CONVERGENCE_THRESHOLD, MAX_IRR_ITERATIONS)
}

/// Newton-Raphson IRR. `None` means undefined: fewer than two flows, no sign
/// change, a flat derivative, an arithmetic overflow, or no convergence
/// within `max_iterations`.
pub fn irr_with(
    cash_flows: &[Money],
    guess: Rate,
    tolerance: Decimal,
    max_iterations: u32,
) -> Option<Rate> {
    if cash_flows.len() < 2 || !has_sign_change(cash_flows) {
        return None;
    }

    let mut rate = guess;

    for _ in 0..max_iterations {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows)?;

        if npv_val.abs() < tolerance {
            return Some(rate);
        }
        if dnpv.is_zero() {
            return None;
        }

        rate -= npv_val.checked_div(dnpv)?;

        // Guard against divergence
        if rate < MIN_RATE {
            rate = MIN_RATE;
        } else if rate > MAX_RATE {
            rate = MAX_RATE;
        }
    }

    None
}

fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let term = (t_dec * cf).checked_div(discount.checked_mul(one_plus_r)?)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}
