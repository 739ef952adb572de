use serde_json::Value;
use std::io::{self, Read};

/// Read a piped JSON or YAML document from stdin.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

fn parse_document(raw: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // JSON first; brace-led input is never retried as YAML
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => {
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                return Err(json_err.into());
            }
            let value: Value = serde_yaml::from_str(trimmed)?;
            Ok(Some(value))
        }
    }
}
