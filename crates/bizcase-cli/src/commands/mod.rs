pub mod calculate;
pub mod quote;
pub mod scenarios;
pub mod sensitivity;

use bizcase_core::EngineConfig;

use crate::input;

/// Engine settings from `--config`, defaults otherwise.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => input::file::read_input(p),
        None => Ok(EngineConfig::default()),
    }
}
