mod discovery;
mod pipeline;
mod report;
mod results;
mod scorer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::pipeline::af3::{self, Af3Params};
use crate::pipeline::antibody::{self, AntibodyParams};
use crate::pipeline::boltz::{self, BoltzParams};

#[derive(Parser, Debug)]
#[command(name = "binder-triage")]
#[command(version)]
#[command(about = "Confidence triage for protein-binder structure predictions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest ipSAE/ipTM from Boltz-2 prediction trees
    Boltz(BoltzArgs),
    /// Harvest ipSAE/ipTM_af from AlphaFold3 sample trees
    Af3(Af3Args),
    /// Scan antibody batches for models passing the ipTM cutoff
    Antibody(AntibodyArgs),
}

#[derive(Parser, Debug)]
struct BoltzArgs {
    /// Directory containing the candidate design directories
    #[arg(long)]
    root: PathBuf,

    /// ipSAE scorer executable
    #[arg(long)]
    scorer: PathBuf,

    /// Candidate directory name prefix
    #[arg(long, default_value = "binder_")]
    prefix: String,

    /// Binder chain id in the complex definition
    #[arg(long, default_value = "B")]
    chain: String,

    /// Minimum ipSAE for the overview report (inclusive)
    #[arg(long, default_value_t = 0.7)]
    threshold: f64,

    /// d0 scorer parameter (by-chain)
    #[arg(long, default_value_t = 10)]
    d0_chain: u32,

    /// d0 scorer parameter (by-domain)
    #[arg(long, default_value_t = 10)]
    d0_domain: u32,

    /// Report path; relative paths resolve against --root
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct Af3Args {
    /// Directory containing the candidate design directories
    #[arg(long)]
    root: PathBuf,

    /// ipSAE scorer executable
    #[arg(long)]
    scorer: PathBuf,

    /// Candidate directory name prefix
    #[arg(long, default_value = "binder_")]
    prefix: String,

    /// Per-candidate sample sub-path; its components name the sample files
    #[arg(long, default_value = "t0.3/seed-1_sample-0")]
    sample_dir: PathBuf,

    /// Binder chain id in the complex definition
    #[arg(long, default_value = "B")]
    chain: String,

    /// ipSAE cutoff for the high-confidence report (exclusive)
    #[arg(long, default_value_t = 0.75)]
    threshold: f64,

    /// d0 scorer parameter (by-chain)
    #[arg(long, default_value_t = 10)]
    d0_chain: u32,

    /// d0 scorer parameter (by-domain)
    #[arg(long, default_value_t = 10)]
    d0_domain: u32,

    /// Overview report path; relative paths resolve against --root
    #[arg(long)]
    overview_output: Option<PathBuf>,

    /// High-confidence report path; relative paths resolve against --root
    #[arg(long)]
    sequences_output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AntibodyArgs {
    /// Directory containing the antibody prediction batch
    #[arg(long)]
    root: PathBuf,

    /// Candidate directory name prefix for owner resolution
    #[arg(long, default_value = "AB")]
    prefix: String,

    /// ipTM cutoff (exclusive)
    #[arg(long, default_value_t = 0.35)]
    threshold: f64,

    /// Report path; relative paths resolve against --root
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let summary = match cli.command {
        Command::Boltz(args) => boltz::run(&BoltzParams {
            root: args.root,
            scorer: args.scorer,
            prefix: args.prefix,
            chain: args.chain,
            threshold: args.threshold,
            d0_chain: args.d0_chain,
            d0_domain: args.d0_domain,
            output: args.output,
        })
        .map_err(|e| e.to_string())?,
        Command::Af3(args) => af3::run(&Af3Params {
            root: args.root,
            scorer: args.scorer,
            prefix: args.prefix,
            sample_dir: args.sample_dir,
            chain: args.chain,
            threshold: args.threshold,
            d0_chain: args.d0_chain,
            d0_domain: args.d0_domain,
            overview_output: args.overview_output,
            sequences_output: args.sequences_output,
        })
        .map_err(|e| e.to_string())?,
        Command::Antibody(args) => antibody::run(&AntibodyParams {
            root: args.root,
            prefix: args.prefix,
            threshold: args.threshold,
            output: args.output,
        })
        .map_err(|e| e.to_string())?,
    };
    debug!(
        "done: {} discovered, {} harvested, {} rows written",
        summary.discovered, summary.harvested, summary.written
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_boltz_defaults() {
        let cli = Cli::parse_from([
            "binder-triage",
            "boltz",
            "--root",
            "designs",
            "--scorer",
            "ipsae.py",
        ]);
        match cli.command {
            Command::Boltz(args) => {
                assert_eq!(args.prefix, "binder_");
                assert_eq!(args.chain, "B");
                assert_eq!(args.threshold, 0.7);
                assert_eq!(args.d0_chain, 10);
                assert_eq!(args.d0_domain, 10);
                assert!(args.output.is_none());
            }
            other => panic!("expected boltz, got {:?}", other),
        }
    }

    #[test]
    fn test_af3_defaults() {
        let cli = Cli::parse_from([
            "binder-triage",
            "af3",
            "--root",
            "designs",
            "--scorer",
            "ipsae.py",
        ]);
        match cli.command {
            Command::Af3(args) => {
                assert_eq!(args.prefix, "binder_");
                assert_eq!(args.sample_dir, PathBuf::from("t0.3/seed-1_sample-0"));
                assert_eq!(args.chain, "B");
                assert_eq!(args.threshold, 0.75);
            }
            other => panic!("expected af3, got {:?}", other),
        }
    }

    #[test]
    fn test_antibody_defaults() {
        let cli = Cli::parse_from(["binder-triage", "antibody", "--root", "batch"]);
        match cli.command {
            Command::Antibody(args) => {
                assert_eq!(args.prefix, "AB");
                assert_eq!(args.threshold, 0.35);
                assert!(args.output.is_none());
            }
            other => panic!("expected antibody, got {:?}", other),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["binder-triage", "antibody", "--root", "batch", "-v"]);
        assert!(cli.verbose);
    }
}
