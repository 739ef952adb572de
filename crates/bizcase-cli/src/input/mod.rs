pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load `--input` from a file, else from piped stdin.
pub fn load<T: DeserializeOwned>(path: Option<&str>, what: &str) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_input(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err(format!("{what} required: pass --input <file> or pipe JSON/YAML on stdin").into()),
    }
}
