use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::case::BusinessCase;
use crate::config::EngineConfig;
use crate::engine::try_calculate_scenario;
use crate::error::BizCaseError;
use crate::types::{with_metadata, ComputationOutput};
use crate::BizCaseResult;

use super::objective::Metric;
use super::sensitivity::{apply_target, DeltaMode, PerturbationTarget};

/// One axis of a two-way table: a target swept from `min` to `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub target: PerturbationTarget,
    #[serde(default)]
    pub mode: DeltaMode,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOutput {
    pub axis_1: String,
    pub axis_2: String,
    pub axis_1_values: Vec<Decimal>,
    pub axis_2_values: Vec<Decimal>,
    pub metric: Metric,
    /// `matrix[i][j]` is the metric at `axis_1_values[i]`, `axis_2_values[j]`
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Metric of the unperturbed case
    pub baseline_value: Option<Decimal>,
    /// Value of the cell at `base_case_position`. Equals `baseline_value`
    /// only when both ranges are centred on a zero delta.
    pub base_case_value: Option<Decimal>,
    /// Cell closest to the mid-point of both ranges
    pub base_case_position: (usize, usize),
}

fn sweep_values(axis: &GridAxis, max_points: usize) -> BizCaseResult<Vec<Decimal>> {
    let invalid = |reason: String| BizCaseError::InvalidInput {
        field: format!("axis:{}", axis.target.label()),
        reason,
    };
    if axis.step <= Decimal::ZERO {
        return Err(invalid("Step must be positive".into()));
    }
    if axis.min > axis.max {
        return Err(invalid("Min must be <= max".into()));
    }

    let too_many = || invalid(format!("Sweep exceeds {max_points} points"));
    let steps = axis
        .max
        .checked_sub(axis.min)
        .and_then(|span| span.checked_div(axis.step))
        .ok_or_else(too_many)?
        .floor();
    if steps >= Decimal::from(max_points) {
        return Err(too_many());
    }

    let mut values = Vec::new();
    let mut current = axis.min;
    while current <= axis.max {
        values.push(current);
        match current.checked_add(axis.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < axis.max {
            values.push(axis.max);
        }
    }
    if values.len() > max_points {
        return Err(too_many());
    }
    Ok(values)
}

fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Two-way sensitivity table of `metric` over two swept targets.
///
/// Both targets are checked against the case before sweeping, so an unknown
/// variable or path is an error here rather than a grid of blanks.
pub fn sensitivity_grid(
    case: &BusinessCase,
    axis_1: &GridAxis,
    axis_2: &GridAxis,
    metric: Metric,
    config: &EngineConfig,
) -> BizCaseResult<ComputationOutput<GridOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let v1_values = sweep_values(axis_1, config.grid_max_points)?;
    let v2_values = sweep_values(axis_2, config.grid_max_points)?;

    let mut check = case.clone();
    apply_target(&mut check, &axis_1.target, axis_1.mode.update(Decimal::ZERO))?;
    apply_target(&mut check, &axis_2.target, axis_2.mode.update(Decimal::ZERO))?;

    let matrix: Vec<Vec<Option<Decimal>>> = v1_values
        .par_iter()
        .map(|v1| {
            v2_values
                .iter()
                .map(|v2| {
                    let mut cell = case.clone();
                    apply_target(&mut cell, &axis_1.target, axis_1.mode.update(*v1)).ok()?;
                    apply_target(&mut cell, &axis_2.target, axis_2.mode.update(*v2)).ok()?;
                    metric.evaluate(&try_calculate_scenario(&cell, config).ok()?)
                })
                .collect()
        })
        .collect();

    let baseline_value = try_calculate_scenario(case, config)
        .ok()
        .and_then(|output| metric.evaluate(&output));

    let undefined = matrix.iter().flatten().filter(|c| c.is_none()).count();
    if undefined > 0 {
        warnings.push(format!("{undefined} cell(s) have an undefined {metric:?}"));
    }

    let mid1 = axis_1.min + (axis_1.max - axis_1.min) / dec!(2);
    let mid2 = axis_2.min + (axis_2.max - axis_2.min) / dec!(2);
    let base_row = closest_index(&v1_values, mid1);
    let base_col = closest_index(&v2_values, mid2);
    let base_case_value = matrix
        .get(base_row)
        .and_then(|row| row.get(base_col))
        .copied()
        .flatten();

    let output = GridOutput {
        axis_1: axis_1.target.label(),
        axis_2: axis_2.target.label(),
        axis_1_values: v1_values,
        axis_2_values: v2_values,
        metric,
        matrix,
        baseline_value,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Two-way sensitivity grid (full pipeline re-run per cell)",
        &serde_json::json!({
            "axis_1": axis_1,
            "axis_2": axis_2,
            "metric": metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
