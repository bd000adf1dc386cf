//! Accepted-issue baselines.
//!
//! A baseline records the issues present when it was taken so later runs
//! report only new ones. Issues are matched by fingerprint: display path,
//! rule id and a hash of the trimmed source line. Line numbers are left out,
//! so edits elsewhere in a file do not resurrect accepted issues, while
//! changing the flagged line itself does.

use crate::config::CONFIG_DIR;
use crate::error::Error;
use crate::lexer::LineIndex;
use crate::models::Issue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const BASELINE_FILE: &str = "baseline.json";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub path: String,
    pub rule: String,
    /// blake3 hex digest of the flagged line, surrounding whitespace removed.
    pub line_hash: String,
}

impl Fingerprint {
    pub fn of(path: &str, issue: &Issue, text: &str, lines: &LineIndex) -> Self {
        let line = text
            .get(lines.line_range(text, issue.line))
            .unwrap_or("")
            .trim();
        Fingerprint {
            path: path.to_string(),
            rule: issue.rule.clone(),
            line_hash: blake3::hash(line.as_bytes()).to_hex().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// sift version that wrote the file.
    pub version: String,
    /// Kept sorted so the file is stable across runs.
    pub fingerprints: BTreeSet<Fingerprint>,
}

impl Default for Baseline {
    fn default() -> Self {
        Baseline {
            version: env!("CARGO_PKG_VERSION").to_string(),
            fingerprints: BTreeSet::new(),
        }
    }
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint) {
        self.fingerprints.insert(fingerprint);
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

/// `<root>/.sift/baseline.json`.
pub fn baseline_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(BASELINE_FILE)
}

/// Load the baseline under `root`. A missing file is `Ok(None)`.
pub fn load_baseline(root: &Path) -> Result<Option<Baseline>, Error> {
    let path = baseline_path(root);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let baseline = serde_json::from_str(&text).map_err(|source| Error::Baseline { path, source })?;
    Ok(Some(baseline))
}

/// Write `baseline` under `root`, creating `.sift/` when needed. Returns
/// the written path.
pub fn save_baseline(root: &Path, baseline: &Baseline) -> Result<PathBuf, Error> {
    let path = baseline_path(root);
    let dir = root.join(CONFIG_DIR);
    fs::create_dir_all(&dir).map_err(|source| Error::Write { path: dir, source })?;
    let mut json = serde_json::to_string_pretty(baseline).map_err(|source| Error::Baseline {
        path: path.clone(),
        source,
    })?;
    json.push('\n');
    fs::write(&path, json).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Remove the baseline under `root`. Returns whether a file was removed.
pub fn clear_baseline(root: &Path) -> Result<bool, Error> {
    let path = baseline_path(root);
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(&path).map_err(|source| Error::Write { path, source })?;
    Ok(true)
}
