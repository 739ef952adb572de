use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::CalcOutput;

/// A headline figure a perturbation run is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Npv,
    Irr,
    /// Year-1 PAT
    PnlY1,
    /// PAT summed over the horizon
    PnlTotal,
}

impl Metric {
    /// `None` only for an undefined IRR.
    pub fn evaluate(self, output: &CalcOutput) -> Option<Decimal> {
        match self {
            Metric::Npv => Some(output.returns.npv),
            Metric::Irr => output.returns.irr,
            Metric::PnlY1 => Some(output.pat_year1()),
            Metric::PnlTotal => Some(output.pat_total()),
        }
    }
}

pub type MetricValues = BTreeMap<Metric, Option<Decimal>>;

/// Which metrics each run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub metrics: Vec<Metric>,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            metrics: vec![Metric::Npv, Metric::Irr, Metric::PnlY1, Metric::PnlTotal],
        }
    }
}

impl Objective {
    pub fn evaluate(&self, output: &CalcOutput) -> MetricValues {
        self.metrics.iter().map(|m| (*m, m.evaluate(output))).collect()
    }
}

/// `run - baseline` per metric; `None` when either side is undefined.
pub fn metric_deviation(run: &MetricValues, baseline: &MetricValues) -> MetricValues {
    run.iter()
        .map(|(metric, value)| {
            let base = baseline.get(metric).copied().flatten();
            (*metric, value.zip(base).map(|(v, b)| v - b))
        })
        .collect()
}

/// `(run - baseline) / |baseline|` per metric; `None` when the baseline is
/// zero or either side is undefined.
pub fn metric_deviation_pct(run: &MetricValues, baseline: &MetricValues) -> MetricValues {
    run.iter()
        .map(|(metric, value)| {
            let base = baseline.get(metric).copied().flatten();
            let pct = value
                .zip(base)
                .filter(|(_, b)| !b.is_zero())
                .map(|(v, b)| (v - b) / b.abs());
            (*metric, pct)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deviation_handles_undefined_and_zero() {
        let baseline: MetricValues = [
            (Metric::Npv, Some(dec!(100))),
            (Metric::Irr, None),
            (Metric::PnlY1, Some(Decimal::ZERO)),
        ]
        .into_iter()
        .collect();
        let run: MetricValues = [
            (Metric::Npv, Some(dec!(80))),
            (Metric::Irr, Some(dec!(0.1))),
            (Metric::PnlY1, Some(dec!(5))),
        ]
        .into_iter()
        .collect();

        let abs = metric_deviation(&run, &baseline);
        assert_eq!(abs[&Metric::Npv], Some(dec!(-20)));
        assert_eq!(abs[&Metric::Irr], None);
        assert_eq!(abs[&Metric::PnlY1], Some(dec!(5)));

        let pct = metric_deviation_pct(&run, &baseline);
        assert_eq!(pct[&Metric::Npv], Some(dec!(-0.2)));
        assert_eq!(pct[&Metric::PnlY1], None);
    }

    #[test]
    fn test_metric_serde_names() {
        let json = serde_json::to_string(&Objective::default()).unwrap();
        assert_eq!(json, r#"{"metrics":["npv","irr","pnl_y1","pnl_total"]}"#);
    }
}
