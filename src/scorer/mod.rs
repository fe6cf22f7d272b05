use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("failed to launch scorer: {0}")]
    Launch(String),
    #[error("scorer failed: {0}")]
    Failed(String),
    #[error("expected output missing: {0}")]
    OutputMissing(String),
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub command: PathBuf,
    pub d0_chain: u32,
    pub d0_domain: u32,
}

impl ScorerConfig {
    pub fn ensure_scored(
        &self,
        working_dir: &Path,
        inputs: [&str; 2],
    ) -> Result<PathBuf, ScorerError> {
        let output_name = self.expected_output_name(inputs[1]);
        let output_path = working_dir.join(&output_name);
        // Existing output wins; inputs may be gone by now.
        if output_path.is_file() {
            debug!(
                "{}: {} already present, scorer not invoked",
                working_dir.display(),
                output_name
            );
            return Ok(output_path);
        }

        for name in inputs {
            if !working_dir.join(name).is_file() {
                return Err(ScorerError::MissingInput(format!(
                    "{} in {}",
                    name,
                    working_dir.display()
                )));
            }
        }

        info!(
            "scoring {} ({} {} {} {})",
            working_dir.display(),
            inputs[0],
            inputs[1],
            self.d0_chain,
            self.d0_domain
        );
        let status = Command::new(&self.command)
            .arg(inputs[0])
            .arg(inputs[1])
            .arg(self.d0_chain.to_string())
            .arg(self.d0_domain.to_string())
            .current_dir(working_dir)
            .status()
            .map_err(|e| ScorerError::Launch(format!("{}: {}", self.command.display(), e)))?;
        if !status.success() {
            return Err(ScorerError::Failed(format!(
                "{} in {}",
                status,
                working_dir.display()
            )));
        }

        // Exit status alone is not trusted.
        if !output_path.is_file() {
            return Err(ScorerError::OutputMissing(format!(
                "{} after successful exit in {}",
                output_name,
                working_dir.display()
            )));
        }
        Ok(output_path)
    }

    pub fn expected_output_name(&self, structure_name: &str) -> String {
        let stem = Path::new(structure_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(structure_name);
        format!("{}_{}_{}.txt", stem, self.d0_chain, self.d0_domain)
    }
}

#[cfg(test)]
mod tests;
