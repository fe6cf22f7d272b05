use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::discovery::{self, Candidate};
use crate::report;
use crate::results::table::ScoreTable;
use crate::scorer::ScorerConfig;

use super::{HarvestError, PipelineError, RunSummary, ThresholdRule, resolve_output};

const VALUE_COLUMN: &str = "ipSAE";
const COMPANION_COLUMN: &str = "ipTM_af";
const TYPE_COLUMN: &str = "Type";
const DEFAULT_OVERVIEW: &str = "overview_ipsae.tsv";
const DEFAULT_SEQUENCES: &str = "high_ipsae_sequences.tsv";
const OVERVIEW_HEADER: [&str; 3] = ["binder", "ipSAE", "ipTM_af"];
const SEQUENCES_HEADER: [&str; 4] = ["binder", "ipSAE", "ipTM_af", "chainB_sequence"];

#[derive(Debug, Clone)]
pub struct Af3Params {
    pub root: PathBuf,
    pub scorer: PathBuf,
    pub prefix: String,
    pub sample_dir: PathBuf,
    pub chain: String,
    pub threshold: f64,
    pub d0_chain: u32,
    pub d0_domain: u32,
    pub overview_output: Option<PathBuf>,
    pub sequences_output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Af3Record {
    pub id: String,
    pub ipsae: f64,
    pub iptm: f64,
    pub sequence: Option<String>,
}

pub fn run(params: &Af3Params) -> Result<RunSummary, PipelineError> {
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
    let tag = sample_tag(&params.sample_dir);
    let confidences_name = format!("{}_confidences.json", tag);
    let structure_name = format!("{}_model.cif", tag);

    let candidates = discovery::enumerate(&params.root, &params.prefix, &params.sample_dir)?;
    info!(
        "found {} candidate directories under {}",
        candidates.len(),
        params.root.display()
    );

    let mut records = Vec::new();
    for candidate in &candidates {
        match harvest(candidate, &scorer, &confidences_name, &structure_name) {
            Ok((ipsae, iptm)) => {
                info!(
                    "{}: ipSAE = {:.6}, ipTM_af = {:.6}",
                    candidate.id, ipsae, iptm
                );
                let sequence = if ThresholdRule::Above.admits(ipsae, params.threshold) {
                    let seq = chain_sequence(candidate, &params.chain);
                    if seq.is_none() {
                        warn!(
                            "{}: ipSAE above {} but chain {} sequence not found",
                            candidate.id, params.threshold, params.chain
                        );
                    }
                    seq
                } else {
                    None
                };
                records.push(Af3Record {
                    id: candidate.id.clone(),
                    ipsae,
                    iptm,
                    sequence,
                });
            }
            Err(err) => warn!("{}: {}", candidate.id, err),
        }
    }

    let overview_rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                report::format_metric(r.ipsae),
                report::format_metric(r.iptm),
            ]
        })
        .collect();
    let overview_path = resolve_output(
        &params.root,
        params.overview_output.as_deref(),
        DEFAULT_OVERVIEW,
    );
    report::write_delimited(&overview_path, "\t", &OVERVIEW_HEADER, &overview_rows)?;

    let mut sequence_rows = Vec::new();
    for record in &records {
        if !ThresholdRule::Above.admits(record.ipsae, params.threshold) {
            continue;
        }
        sequence_rows.push(vec![
            record.id.clone(),
            report::format_metric(record.ipsae),
            report::format_metric(record.iptm),
            record.sequence.clone().unwrap_or_default(),
        ]);
    }
    let sequences_path = resolve_output(
        &params.root,
        params.sequences_output.as_deref(),
        DEFAULT_SEQUENCES,
    );
    report::write_delimited(&sequences_path, "\t", &SEQUENCES_HEADER, &sequence_rows)?;

    info!(
        "wrote {} entries to {}",
        overview_rows.len(),
        overview_path.display()
    );
    info!(
        "wrote {} high-confidence entries (ipSAE > {}) to {}",
        sequence_rows.len(),
        params.threshold,
        sequences_path.display()
    );

    Ok(RunSummary {
        discovered: candidates.len(),
        harvested: records.len(),
        written: overview_rows.len() + sequence_rows.len(),
    })
}

// t0.3/seed-1_sample-0 tags files as t0.3_seed-1_sample-0_*
pub(crate) fn sample_tag(sample_dir: &Path) -> String {
    sample_dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("_")
}

fn harvest(
    candidate: &Candidate,
    scorer: &ScorerConfig,
    confidences_name: &str,
    structure_name: &str,
) -> Result<(f64, f64), HarvestError> {
    if !candidate.working.is_dir() {
        return Err(HarvestError::MissingInput(format!(
            "sample directory {} not found",
            candidate.working.display()
        )));
    }
    let table_path = scorer.ensure_scored(&candidate.working, [confidences_name, structure_name])?;
    let table = ScoreTable::load(&table_path)?;
    let values = table.select(VALUE_COLUMN, &[COMPANION_COLUMN], Some(TYPE_COLUMN))?;
    Ok((values[0], values[1]))
}

fn chain_sequence(candidate: &Candidate, chain: &str) -> Option<String> {
    match discovery::find_complex_definition(&candidate.root) {
        Ok(Some((path, doc))) => match doc.chain_sequence(chain) {
            Some(seq) => Some(seq.to_string()),
            None => {
                debug!(
                    "{}: no chain {} entry in {}",
                    candidate.id,
                    chain,
                    path.display()
                );
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!("{}: {}", candidate.id, err);
            None
        }
    }
}
