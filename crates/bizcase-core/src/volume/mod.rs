pub mod capacity;
pub mod series;

pub use capacity::{calculate_capacity, Capacity};
pub use series::{build_sku_volumes, calculate_volumes, compute_volumes, YearVolumes, DEFAULT_GROWTH_CURVE};
