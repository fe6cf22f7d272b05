use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a complex definition: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComplexDefinition {
    // No default: a file without a sequences list is not a definition.
    pub sequences: Vec<ComplexEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComplexEntry {
    #[serde(default)]
    pub protein: Option<ProteinChains>,
}

// Loosely typed: id is a bare scalar in some inputs and a list in others.
#[derive(Debug, Clone, Deserialize)]
pub struct ProteinChains {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub sequence: Option<Value>,
}

impl ComplexDefinition {
    pub fn chain_sequence(&self, chain_id: &str) -> Option<&str> {
        // A matching entry without a string sequence does not end the scan.
        for entry in &self.sequences {
            let protein = match &entry.protein {
                Some(p) => p,
                None => continue,
            };
            let id = match &protein.id {
                Some(id) => id,
                None => continue,
            };
            if !id_matches(id, chain_id) {
                continue;
            }
            if let Some(Value::String(seq)) = &protein.sequence {
                return Some(seq);
            }
        }
        None
    }
}

pub fn load(path: &Path) -> Result<ComplexDefinition, DocumentError> {
    let text = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .map_err(|e| DocumentError::Parse(format!("{}: {}", path.display(), e))),
        _ => serde_json::from_str(&text)
            .map_err(|e| DocumentError::Parse(format!("{}: {}", path.display(), e))),
    }
}

// "B" and ["B"] match identically; numbers render in decimal form.
fn id_matches(id: &Value, chain_id: &str) -> bool {
    match id {
        Value::String(s) => s == chain_id,
        Value::Number(n) => n.to_string() == chain_id,
        Value::Array(items) => items
            .iter()
            .any(|item| !item.is_array() && id_matches(item, chain_id)),
        _ => false,
    }
}
