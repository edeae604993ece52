//! Output plans and atomic emission.
//!
//! The full file set is rendered into memory first. Writing stages it in a
//! temporary directory next to the destination and swaps it in with a
//! rename, so a failed run leaves the previous output untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::GenerateError;

/// Prefix of the staging directory created next to the output directory.
const STAGING_PREFIX: &str = ".hookgen-";

/// File inside the output directory listing what the last run wrote.
pub const MANIFEST_FILE: &str = ".hookgen-manifest";

const MANIFEST_HEADER: &str = "# Files written by hookgen. Do not edit.\n";

/// In-memory file set, keyed by path relative to the output root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPlan {
    files: BTreeMap<PathBuf, String>,
}

/// A planned file whose on-disk content differs, or an on-disk file the
/// plan would remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    /// Path relative to the output root.
    pub path: PathBuf,
    /// Content on disk, `None` when missing.
    pub current: Option<String>,
    /// Content the plan would write, `None` when the file would be removed.
    pub expected: Option<String>,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: String) {
        self.files.insert(path.into(), content);
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Listing of the planned files, one `/`-separated path per line.
    fn manifest(&self) -> String {
        let mut out = String::from(MANIFEST_HEADER);
        for rel in self.files.keys() {
            out.push_str(&manifest_entry(rel));
            out.push('\n');
        }
        out
    }

    /// Replace `out_dir` with exactly this file set.
    ///
    /// An existing directory is only replaced when every file in it is
    /// listed in the manifest of an earlier run.
    pub fn write_atomic(&self, out_dir: &Path) -> Result<(), GenerateError> {
        if out_dir.file_name().is_none() || (out_dir.exists() && !out_dir.is_dir()) {
            return Err(GenerateError::InvalidOutputDir(out_dir.to_path_buf()));
        }
        previous_files(out_dir)?;

        let parent = match out_dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| GenerateError::io(&parent, e))?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| GenerateError::io(&parent, e))?;
        let fresh = staging.path().join("out");
        for (rel, content) in &self.files {
            let path = fresh.join(rel);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;
            }
            fs::write(&path, content).map_err(|e| GenerateError::io(&path, e))?;
        }
        fs::create_dir_all(&fresh).map_err(|e| GenerateError::io(&fresh, e))?;
        let manifest = fresh.join(MANIFEST_FILE);
        fs::write(&manifest, self.manifest()).map_err(|e| GenerateError::io(&manifest, e))?;

        let previous = staging.path().join("previous");
        let had_previous = out_dir.exists();
        if had_previous {
            fs::rename(out_dir, &previous).map_err(|e| GenerateError::io(out_dir, e))?;
        }

        if let Err(source) = fs::rename(&fresh, out_dir) {
            if had_previous && let Err(restore) = fs::rename(&previous, out_dir) {
                warn!(
                    path = %out_dir.display(),
                    error = %restore,
                    "failed to restore previous output"
                );
            }
            return Err(GenerateError::io(out_dir, source));
        }

        debug!(path = %out_dir.display(), files = self.files.len(), "output written");
        // Dropping `staging` removes the previous output.
        Ok(())
    }

    /// Files that differ between the plan and `out_dir`, in path order.
    /// Files of an earlier run that the plan no longer contains are reported
    /// as removed; files hookgen never wrote are an error, as for
    /// [`OutputPlan::write_atomic`].
    pub fn stale_files(&self, out_dir: &Path) -> Result<Vec<StaleFile>, GenerateError> {
        let previous = previous_files(out_dir)?;

        let mut stale = Vec::new();
        for (rel, expected) in &self.files {
            let path = out_dir.join(rel);
            let current = match fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => return Err(GenerateError::io(&path, e)),
            };
            if current.as_deref() != Some(expected.as_str()) {
                stale.push(StaleFile {
                    path: rel.clone(),
                    current,
                    expected: Some(expected.clone()),
                });
            }
        }

        for rel in previous.into_iter().filter(|rel| !self.files.contains_key(rel)) {
            let current = fs::read_to_string(out_dir.join(&rel)).ok();
            stale.push(StaleFile {
                path: rel,
                current,
                expected: None,
            });
        }

        stale.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(stale)
    }
}

fn manifest_entry(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Paths listed in the manifest of `out_dir`, `None` when there is none.
fn read_manifest(out_dir: &Path) -> Result<Option<BTreeSet<PathBuf>>, GenerateError> {
    let path = out_dir.join(MANIFEST_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(GenerateError::io(&path, e)),
    };
    let listed = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split('/').collect::<PathBuf>())
        .collect();
    Ok(Some(listed))
}

/// Files under `out_dir` written by an earlier run, manifest excluded.
/// Fails on the first file no manifest accounts for.
fn previous_files(out_dir: &Path) -> Result<BTreeSet<PathBuf>, GenerateError> {
    if !out_dir.is_dir() {
        return Ok(BTreeSet::new());
    }
    let listed = read_manifest(out_dir)?.unwrap_or_default();
    let mut previous = BTreeSet::new();
    for entry in WalkDir::new(out_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(out_dir).to_path_buf();
            GenerateError::io(path, e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(out_dir) else {
            continue;
        };
        if rel == Path::new(MANIFEST_FILE) {
            continue;
        }
        if !listed.contains(rel) {
            return Err(GenerateError::UnmanagedFile {
                dir: out_dir.to_path_buf(),
                file: rel.to_path_buf(),
            });
        }
        previous.insert(rel.to_path_buf());
    }
    Ok(previous)
}
