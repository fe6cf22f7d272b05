use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

// Type of the pre-aggregated summary row in scorer output.
const MAX_ROW_TYPE: &str = "max";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no header line: {0}")]
    MissingHeader(String),
    #[error("required column missing: {0}")]
    MissingColumn(String),
    #[error("no usable data rows: {0}")]
    NoData(String),
}

// Whitespace-separated scorer output, addressed through the header only.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    path: PathBuf,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl ScoreTable {
    pub fn load(path: &Path) -> Result<ScoreTable, TableError> {
        let text = fs::read_to_string(path)?;
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = match lines.next() {
            Some(line) => line,
            None => return Err(TableError::MissingHeader(path.display().to_string())),
        };

        let mut columns = HashMap::new();
        for (idx, name) in header.split_whitespace().enumerate() {
            // first occurrence wins on duplicate names
            columns.entry(name.to_string()).or_insert(idx);
        }

        let rows = lines
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect();

        Ok(ScoreTable {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    // First max-typed row whose queried columns all parse; otherwise the
    // largest value column among parseable rows, first wins ties.
    pub fn select(
        &self,
        value_column: &str,
        companions: &[&str],
        type_column: Option<&str>,
    ) -> Result<Vec<f64>, TableError> {
        let mut indices = Vec::with_capacity(1 + companions.len());
        for name in std::iter::once(value_column).chain(companions.iter().copied()) {
            match self.columns.get(name) {
                Some(idx) => indices.push(*idx),
                None => {
                    return Err(TableError::MissingColumn(format!(
                        "{} in {}",
                        name,
                        self.path.display()
                    )));
                }
            }
        }
        let metric_width = indices.iter().copied().max().unwrap_or(0);

        if let Some(name) = type_column {
            let type_idx = match self.columns.get(name) {
                Some(idx) => *idx,
                None => {
                    return Err(TableError::MissingColumn(format!(
                        "{} in {}",
                        name,
                        self.path.display()
                    )));
                }
            };
            let width = metric_width.max(type_idx);
            for row in &self.rows {
                if row.len() <= width {
                    continue;
                }
                if row[type_idx] != MAX_ROW_TYPE {
                    continue;
                }
                if let Some(values) = parse_row(row, &indices) {
                    return Ok(values);
                }
            }
        }

        let mut best: Option<Vec<f64>> = None;
        for row in &self.rows {
            if row.len() <= metric_width {
                continue;
            }
            let values = match parse_row(row, &indices) {
                Some(v) => v,
                None => continue,
            };
            match &best {
                Some(current) if values[0] <= current[0] => {}
                _ => best = Some(values),
            }
        }

        match best {
            Some(values) => Ok(values),
            None => Err(TableError::NoData(format!(
                "{} in {}",
                value_column,
                self.path.display()
            ))),
        }
    }
}

fn parse_row(row: &[String], indices: &[usize]) -> Option<Vec<f64>> {
    let mut out = Vec::with_capacity(indices.len());
    for &idx in indices {
        out.push(row[idx].parse::<f64>().ok()?);
    }
    Some(out)
}
