use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

// Interface predicted-TM keys, newer spelling first.
pub const PRIMARY_KEY: &str = "iptm";
pub const FALLBACK_KEY: &str = "protein_iptm";

#[derive(Debug, Error)]
pub enum ConfidenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid confidence JSON: {0}")]
    Parse(String),
}

// Missing or non-numeric keys are Ok(None); only unreadable files error.
pub fn interface_confidence(
    path: &Path,
    primary: &str,
    fallback: &str,
) -> Result<Option<f64>, ConfidenceError> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| ConfidenceError::Parse(format!("{}: {}", path.display(), e)))?;
    let metric = match value.get(primary) {
        Some(v) => Some(v),
        None => value.get(fallback),
    };
    Ok(metric.and_then(numeric))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
