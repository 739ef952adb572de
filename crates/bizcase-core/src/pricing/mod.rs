pub mod price;

pub use price::{
    build_price_by_year, calculate_rm_mb_per_kg, conversion_recovery_per_piece,
    per_piece_to_per_kg, PriceComponentsPerKg, PriceYear, RmMbPerKg,
};
