pub mod model;
pub mod path;
pub mod store;

pub use model::*;
