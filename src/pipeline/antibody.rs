use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::discovery::{self, OwnedFile};
use crate::report;
use crate::results::confidence::{self, FALLBACK_KEY, PRIMARY_KEY};

use super::{HarvestError, PipelineError, RunSummary, ThresholdRule, resolve_output};

const SUMMARY_SUFFIX: &str = "_summary_confidences.json";
const HEAVY_CHAIN: &str = "B";
const LIGHT_CHAIN: &str = "C";
const OWNER_MAX_HOPS: usize = 6;
const DEFAULT_OUTPUT: &str = "iptm_pass_binders.csv";
const REPORT_HEADER: [&str; 4] = ["binder", "iptm", "heavy_chain_B", "light_chain_C"];

#[derive(Debug, Clone)]
pub struct AntibodyParams {
    pub root: PathBuf,
    pub prefix: String,
    pub threshold: f64,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AntibodyRecord {
    pub id: String,
    pub iptm: f64,
    pub heavy: String,
    pub light: String,
}

pub fn run(params: &AntibodyParams) -> Result<RunSummary, PipelineError> {
    if !params.root.is_dir() {
        return Err(PipelineError::Config(format!(
            "root directory not found at {}",
            params.root.display()
        )));
    }

    let hits = discovery::scan_owned_files(
        &params.root,
        SUMMARY_SUFFIX,
        &params.prefix,
        OWNER_MAX_HOPS,
    );
    info!(
        "found {} summary files under {}",
        hits.len(),
        params.root.display()
    );

    let mut harvested = 0usize;
    let mut records = Vec::new();
    for hit in &hits {
        match harvest(hit, params.threshold) {
            Ok(Some(record)) => {
                harvested += 1;
                info!("{}: iptm={:.4} passes", record.id, record.iptm);
                records.push(record);
            }
            Ok(None) => harvested += 1,
            Err(err) => warn!("{}: {}", hit.owner_id, err),
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                report::format_metric(r.iptm),
                r.heavy.clone(),
                r.light.clone(),
            ]
        })
        .collect();

    let summary = RunSummary {
        discovered: hits.len(),
        harvested,
        written: rows.len(),
    };
    if rows.is_empty() {
        info!("no models passed the iptm cutoff {}", params.threshold);
        return Ok(summary);
    }

    let out_path = resolve_output(&params.root, params.output.as_deref(), DEFAULT_OUTPUT);
    report::write_delimited(&out_path, ",", &REPORT_HEADER, &rows)?;
    info!("wrote {} entries to {}", rows.len(), out_path.display());
    Ok(summary)
}

fn harvest(hit: &OwnedFile, threshold: f64) -> Result<Option<AntibodyRecord>, HarvestError> {
    let iptm = match confidence::interface_confidence(&hit.file, PRIMARY_KEY, FALLBACK_KEY)? {
        Some(value) => value,
        None => {
            return Err(HarvestError::MissingInput(format!(
                "no interface confidence in {}",
                hit.file.display()
            )));
        }
    };
    if !ThresholdRule::Above.admits(iptm, threshold) {
        debug!("{}: iptm {:.4} at or below cutoff", hit.owner_id, iptm);
        return Ok(None);
    }

    let doc = match discovery::find_complex_definition(&hit.owner_root)? {
        Some((_, doc)) => doc,
        None => {
            return Err(HarvestError::MissingInput(format!(
                "no complex definition in {}",
                hit.owner_root.display()
            )));
        }
    };
    let heavy = doc.chain_sequence(HEAVY_CHAIN).unwrap_or_default().to_string();
    let light = doc.chain_sequence(LIGHT_CHAIN).unwrap_or_default().to_string();

    Ok(Some(AntibodyRecord {
        id: hit.owner_id.clone(),
        iptm,
        heavy,
        light,
    }))
}
