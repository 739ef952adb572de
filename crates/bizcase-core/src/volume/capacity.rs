use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::case::{NpdInput, OpsInput};
use crate::types::Pieces;

const SECONDS_PER_MINUTE: Decimal = dec!(60);

/// Theoretical machine capacity for one SKU.
///
/// `None` means unbounded: a zero cycle time has no finite capacity. Capacity
/// is reported alongside volumes but never caps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub units_per_hour: Option<Decimal>,
    pub units_per_day: Option<Decimal>,
    pub annual_capacity_pieces: Option<Pieces>,
}

impl Capacity {
    /// True when `pieces` is above a finite annual capacity.
    pub fn is_exceeded_by(&self, pieces: Pieces) -> bool {
        matches!(self.annual_capacity_pieces, Some(cap) if pieces > cap)
    }
}

/// `units/hour = cavities * (60 / cycle_time) * oee`, then scaled by
/// operating hours per day (default 24) and working days per year (default
/// 365).
pub fn calculate_capacity(npd: &NpdInput, ops: &OpsInput) -> Capacity {
    if npd.cycle_time_seconds.is_zero() {
        return Capacity {
            units_per_hour: None,
            units_per_day: None,
            annual_capacity_pieces: None,
        };
    }

    let units_per_hour = npd.cavities * (SECONDS_PER_MINUTE / npd.cycle_time_seconds) * ops.oee;
    let units_per_day = units_per_hour * ops.hours_per_day();
    let annual = units_per_day * ops.days_per_year();

    Capacity {
        units_per_hour: Some(units_per_hour),
        units_per_day: Some(units_per_day),
        annual_capacity_pieces: Some(annual),
    }
}
