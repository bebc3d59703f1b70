//! Path Utilities
//!
//! Review input discovery and report output locations.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use review_cascade_core::SourceKind;

use crate::utils::error::AppResult;

/// Expand the given paths into the reviewable files they contain.
///
/// Files are taken as-is (unsupported ones are kept so they show up as
/// failed outcomes). Directories are walked gitignore-aware and only
/// `.py`/`.sql` files are collected. Output is sorted per directory and
/// deduplicated.
pub fn collect_review_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = walk_directory(input);
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    files
}

fn walk_directory(root: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .follow_links(false)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(true)
        // dot-directories below the root (.git, .venv, ...) are never reviewed
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    let mut items = Vec::new();
    for entry in builder.build() {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if path.is_file() && SourceKind::from_path(path).is_some() {
            items.push(path.to_path_buf());
        }
    }
    items
}

/// Report file name for a run started at `timestamp` (`%Y%m%d_%H%M%S`).
///
/// The leading block of `run_id` keeps two runs in the same second apart.
pub fn report_file_name(timestamp: &str, run_id: &str) -> String {
    let tag: String = run_id.chars().filter(|c| *c != '-').take(8).collect();
    format!("code_review_report_{}_{}.json", timestamp, tag)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
