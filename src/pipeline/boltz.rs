use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::discovery::{self, Candidate};
use crate::report;
use crate::results::complex;
use crate::results::confidence::{self, FALLBACK_KEY, PRIMARY_KEY};
use crate::results::table::ScoreTable;
use crate::scorer::ScorerConfig;

use super::{HarvestError, PipelineError, RunSummary, ThresholdRule, resolve_output};

const WORKING_SUBPATH: &str = "boltz_results_input/predictions/input";
const PAE_NAME: &str = "pae_input_model_0.npz";
const STRUCTURE_NAME: &str = "input_model_0.cif";
const CONFIDENCE_NAME: &str = "confidence_input_model_0.json";
const COMPLEX_NAME: &str = "input.yaml";
const VALUE_COLUMN: &str = "ipSAE";
const TYPE_COLUMN: &str = "Type";
const DEFAULT_OUTPUT: &str = "overview.csv";
const REPORT_HEADER: [&str; 4] = ["binder_id", "ipSAE", "ipTM", "sequence_B"];

#[derive(Debug, Clone)]
pub struct BoltzParams {
    pub root: PathBuf,
    pub scorer: PathBuf,
    pub prefix: String,
    pub chain: String,
    pub threshold: f64,
    pub d0_chain: u32,
    pub d0_domain: u32,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BoltzRecord {
    pub id: String,
    pub ipsae: f64,
    pub iptm: Option<f64>,
    pub sequence: Option<String>,
}

pub fn run(params: &BoltzParams) -> Result<RunSummary, PipelineError> {
    if !params.scorer.is_file() {
        return Err(PipelineError::Config(format!(
            "scorer not found at {}",
            params.scorer.display()
        )));
    }
    if !params.root.is_dir() {
        return Err(PipelineError::Config(format!(
            "root directory not found at {}",
            params.root.display()
        )));
    }
    let scorer = ScorerConfig {
        command: params.scorer.clone(),
        d0_chain: params.d0_chain,
        d0_domain: params.d0_domain,
    };

    let candidates =
        discovery::enumerate(&params.root, &params.prefix, Path::new(WORKING_SUBPATH))?;
    info!(
        "found {} candidate directories under {}",
        candidates.len(),
        params.root.display()
    );

    let mut records = Vec::new();
    for candidate in &candidates {
        match harvest(candidate, &scorer, &params.chain) {
            Ok(record) => {
                info!(
                    "{}: ipSAE={:.4}, ipTM={}, seq_len={}",
                    record.id,
                    record.ipsae,
                    record
                        .iptm
                        .map(|v| format!("{:.4}", v))
                        .unwrap_or_else(|| "NA".to_string()),
                    record
                        .sequence
                        .as_ref()
                        .map(|s| s.len().to_string())
                        .unwrap_or_else(|| "NA".to_string()),
                );
                records.push(record);
            }
            Err(err) => warn!("{}: {}", candidate.id, err),
        }
    }

    let mut rows = Vec::new();
    for record in &records {
        if !ThresholdRule::AtLeast.admits(record.ipsae, params.threshold) {
            continue;
        }
        rows.push(vec![
            record.id.clone(),
            report::format_metric(record.ipsae),
            record.iptm.map(report::format_metric).unwrap_or_default(),
            record.sequence.clone().unwrap_or_default(),
        ]);
    }

    let out_path = resolve_output(&params.root, params.output.as_deref(), DEFAULT_OUTPUT);
    report::write_delimited(&out_path, ",", &REPORT_HEADER, &rows)?;
    info!(
        "wrote {} entries with ipSAE >= {} to {}",
        rows.len(),
        params.threshold,
        out_path.display()
    );

    Ok(RunSummary {
        discovered: candidates.len(),
        harvested: records.len(),
        written: rows.len(),
    })
}

fn harvest(
    candidate: &Candidate,
    scorer: &ScorerConfig,
    chain: &str,
) -> Result<BoltzRecord, HarvestError> {
    if !candidate.working.is_dir() {
        return Err(HarvestError::MissingInput(format!(
            "prediction directory {} not found",
            candidate.working.display()
        )));
    }

    let table_path = scorer.ensure_scored(&candidate.working, [PAE_NAME, STRUCTURE_NAME])?;
    let table = ScoreTable::load(&table_path)?;
    let values = table.select(VALUE_COLUMN, &[], Some(TYPE_COLUMN))?;
    let ipsae = values[0];

    let confidence_path = candidate.working.join(CONFIDENCE_NAME);
    let iptm = match confidence::interface_confidence(&confidence_path, PRIMARY_KEY, FALLBACK_KEY) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            warn!(
                "{}: no interface confidence in {}",
                candidate.id,
                confidence_path.display()
            );
            None
        }
        Err(err) => {
            warn!("{}: {}", candidate.id, err);
            None
        }
    };

    let sequence = chain_sequence(candidate, chain);

    Ok(BoltzRecord {
        id: candidate.id.clone(),
        ipsae,
        iptm,
        sequence,
    })
}

fn chain_sequence(candidate: &Candidate, chain: &str) -> Option<String> {
    let path = candidate.root.join(COMPLEX_NAME);
    if !path.is_file() {
        warn!("{}: {} not found", candidate.id, path.display());
        return None;
    }
    match complex::load(&path) {
        Ok(doc) => match doc.chain_sequence(chain) {
            Some(seq) => Some(seq.to_string()),
            None => {
                warn!(
                    "{}: no chain {} sequence in {}",
                    candidate.id,
                    chain,
                    path.display()
                );
                None
            }
        },
        Err(err) => {
            warn!("{}: {}", candidate.id, err);
            None
        }
    }
}
