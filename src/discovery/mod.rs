use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::results::complex::{self, ComplexDefinition};

#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub root: PathBuf,
    pub working: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OwnedFile {
    pub file: PathBuf,
    pub owner_id: String,
    pub owner_root: PathBuf,
}

pub fn enumerate(
    root: &Path,
    prefix: &str,
    working_subpath: &Path,
) -> std::io::Result<Vec<Candidate>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("skipping non-UTF-8 entry {:?} in {}", raw, root.display());
                continue;
            }
        };
        if !name.starts_with(prefix) {
            continue;
        }
        if !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    // binder_2 before binder_10
    names.sort_by(|a, b| natural_cmp(a, b));

    Ok(names
        .into_iter()
        .map(|id| {
            let dir = root.join(&id);
            let working = dir.join(working_subpath);
            Candidate {
                id,
                root: dir,
                working,
            }
        })
        .collect())
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (trailing_number(a), trailing_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn trailing_number(name: &str) -> Option<u64> {
    let digits = name
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    name[name.len() - digits..].parse().ok()
}

pub fn find_owning_root(start: &Path, prefix: &str, max_hops: usize) -> Option<PathBuf> {
    let mut current = start;
    // start itself spends the first hop
    for _ in 0..max_hops {
        if let Some(name) = current.file_name().and_then(|n| n.to_str()) {
            if is_candidate_name(name, prefix) {
                return Some(current.to_path_buf());
            }
        }
        current = current.parent()?;
    }
    None
}

fn is_candidate_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

pub fn find_complex_definition(
    dir: &Path,
) -> std::io::Result<Option<(PathBuf, ComplexDefinition)>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !name.ends_with(".json") {
            continue;
        }
        if !entry.path().is_file() {
            continue;
        }
        names.push(name);
    }
    names.sort();

    for name in names {
        let path = dir.join(&name);
        match complex::load(&path) {
            Ok(doc) => return Ok(Some((path, doc))),
            Err(err) => debug!("{}", err),
        }
    }
    Ok(None)
}

pub fn scan_owned_files(
    root: &Path,
    suffix: &str,
    prefix: &str,
    max_hops: usize,
) -> Vec<OwnedFile> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("unreadable entry while scanning {}: {}", root.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(suffix) {
            continue;
        }
        let file = entry.path().to_path_buf();
        let start = match file.parent() {
            Some(parent) => parent,
            None => continue,
        };
        match find_owning_root(start, prefix, max_hops) {
            Some(owner_root) => {
                let owner_id = match owner_root.file_name().and_then(|n| n.to_str()) {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                out.push(OwnedFile {
                    file,
                    owner_id,
                    owner_root,
                });
            }
            None => {
                warn!(
                    "{}: no owning {}<N> directory within {} hops",
                    file.display(),
                    prefix,
                    max_hops
                );
            }
        }
    }
    out
}
