use std::fs;
use std::path::{Path, PathBuf};

use super::{ScorerConfig, ScorerError};

const INPUTS: [&str; 2] = ["pae_input_model_0.npz", "input_model_0.cif"];
const OUTPUT: &str = "input_model_0_10_10.txt";

fn config(command: PathBuf) -> ScorerConfig {
    ScorerConfig {
        command,
        d0_chain: 10,
        d0_domain: 10,
    }
}

fn write_inputs(dir: &Path) {
    for name in INPUTS {
        fs::write(dir.join(name), "placeholder").unwrap();
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake_ipsae.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn test_expected_output_name_uses_structure_stem() {
    let scorer = config(PathBuf::from("ipsae.py"));
    assert_eq!(
        scorer.expected_output_name("input_model_0.cif"),
        "input_model_0_10_10.txt"
    );
    assert_eq!(
        scorer.expected_output_name("t0.3_seed-1_sample-0_model.cif"),
        "t0.3_seed-1_sample-0_model_10_10.txt"
    );
}

#[test]
fn test_memo_hit_skips_scorer_entirely() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(OUTPUT), "Chn1 Chn2 Type ipSAE\nA B max 0.8\n").unwrap();

    // No inputs on disk and a scorer path that cannot exist: a hit on
    // the memoized output must succeed without touching either.
    let scorer = config(dir.path().join("no_such_scorer"));
    let out = scorer.ensure_scored(dir.path(), INPUTS).unwrap();
    assert_eq!(out, dir.path().join(OUTPUT));
}

#[test]
fn test_missing_input_reported_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = config(dir.path().join("no_such_scorer"));
    match scorer.ensure_scored(dir.path(), INPUTS) {
        Err(ScorerError::MissingInput(msg)) => assert!(msg.contains(INPUTS[0])),
        other => panic!("expected MissingInput, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_scorer_invoked_at_most_once() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    fs::create_dir_all(&work).unwrap();
    write_inputs(&work);
    let script = write_script(
        dir.path(),
        "echo run >> runs.log\nprintf 'Chn1 Chn2 Type ipSAE\\nA B max 0.8\\n' > input_model_0_10_10.txt",
    );

    let scorer = config(script);
    let first = scorer.ensure_scored(&work, INPUTS).unwrap();
    let second = scorer.ensure_scored(&work, INPUTS).unwrap();
    assert_eq!(first, second);

    let log = fs::read_to_string(work.join("runs.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[cfg(unix)]
#[test]
fn test_scorer_gets_bare_names_and_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    fs::create_dir_all(&work).unwrap();
    write_inputs(&work);
    let script = write_script(
        dir.path(),
        "printf '%s %s %s %s\\n' \"$1\" \"$2\" \"$3\" \"$4\" > input_model_0_10_10.txt",
    );

    let scorer = config(script);
    let out = scorer.ensure_scored(&work, INPUTS).unwrap();
    let text = fs::read_to_string(out).unwrap();
    assert_eq!(text, "pae_input_model_0.npz input_model_0.cif 10 10\n");
}

#[cfg(unix)]
#[test]
fn test_nonzero_exit_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let script = write_script(dir.path(), "exit 3");

    let scorer = config(script);
    match scorer.ensure_scored(dir.path(), INPUTS) {
        Err(ScorerError::Failed(_)) => {}
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_clean_exit_without_output_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let script = write_script(dir.path(), "exit 0");

    let scorer = config(script);
    match scorer.ensure_scored(dir.path(), INPUTS) {
        Err(ScorerError::OutputMissing(msg)) => assert!(msg.contains(OUTPUT)),
        other => panic!("expected OutputMissing, got {:?}", other),
    }
}
