use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::results::complex::DocumentError;
use crate::results::confidence::ConfidenceError;
use crate::results::table::TableError;
use crate::scorer::ScorerError;

pub mod af3;
pub mod antibody;
pub mod boltz;

// Fatal for the whole run; per-candidate problems are a HarvestError.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error(transparent)]
    Scorer(#[from] ScorerError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Confidence(#[from] ConfidenceError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdRule {
    Above,
    AtLeast,
}

impl ThresholdRule {
    pub fn admits(self, value: f64, threshold: f64) -> bool {
        match self {
            ThresholdRule::Above => value > threshold,
            ThresholdRule::AtLeast => value >= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub harvested: usize,
    pub written: usize,
}

pub(crate) fn resolve_output(root: &Path, explicit: Option<&Path>, default_name: &str) -> PathBuf {
    // relative paths anchor at the run root, not the process cwd
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => root.join(path),
        None => root.join(default_name),
    }
}
