use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::git;
use crate::lang;
use crate::scanner::{self, FunctionRecord};

/// Directory names never descended into: VCS metadata, dependency caches,
/// build output.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "build",
    "out",
    "dist",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
];

/// Everything learned about one repository. A failed clone or missing local
/// path yields `name: None` and no functions; it never aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoResult {
    pub name: Option<String>,
    pub functions: Vec<FunctionRecord>,
}

impl RepoResult {
    pub fn failed() -> Self {
        RepoResult { name: None, functions: Vec::new() }
    }
}

/// Scans one repository locator: remote URLs are shallow-cloned into an
/// ephemeral directory (discarded afterwards, success or not), local paths
/// are read in place and left untouched.
pub fn scan_repository(locator: &str, clone_timeout: Duration) -> RepoResult {
    if git::is_remote(locator) {
        let temp_dir = match tempfile::TempDir::with_prefix("funcsize-") {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Could not create scratch directory for {}: {}", locator, e);
                return RepoResult::failed();
            }
        };
        debug!("Cloning {} into {}", locator, temp_dir.path().display());
        if let Err(e) = git::clone_shallow(locator, temp_dir.path(), clone_timeout) {
            warn!("Skipping {}: {}", locator, e);
            return RepoResult::failed();
        }
        let functions = scan_tree(temp_dir.path());
        RepoResult { name: Some(repo_display_name(locator)), functions }
    } else {
        let root = Path::new(locator);
        if !root.exists() {
            warn!("Skipping {}: local path does not exist", locator);
            return RepoResult::failed();
        }
        let functions = scan_tree(root);
        RepoResult { name: Some(repo_display_name(locator)), functions }
    }
}

/// Walks `root` and scans every file whose extension has a language profile.
/// Record paths are rewritten relative to `root`; results keep discovery
/// order across all languages.
pub fn scan_tree(root: &Path) -> Vec<FunctionRecord> {
    let mut all_functions = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_excluded_dir(e.file_name())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Could not read directory entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(profile) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(lang::profile_for_extension)
        else {
            continue;
        };

        // Tolerate non-UTF-8 bytes the way a line heuristic should: lossily
        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        all_functions.extend(scanner::scan_source(profile, relative, &content));
    }

    all_functions
}

fn is_excluded_dir(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| EXCLUDED_DIRS.contains(&n)).unwrap_or(false)
}

/// Human-facing repository name: the locator's basename with any trailing
/// slash and `.git` suffix stripped.
pub fn repo_display_name(locator: &str) -> String {
    let trimmed = locator.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let base = base.strip_suffix(".git").unwrap_or(base);
    if base.is_empty() {
        "repository".to_string()
    } else {
        base.to_string()
    }
}
