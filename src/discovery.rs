// src/discovery.rs
//! Source file discovery for directory scans.

use crate::error::{CodesimError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions collected by a directory scan.
const SOURCE_EXTENSIONS: &[&str] = &["c", "h"];

/// Compiles user-supplied exclude patterns.
///
/// # Errors
/// Returns an error if any pattern is not a valid regex.
pub fn compile_excludes(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(CodesimError::from))
        .collect()
}

/// Walks `root` and returns every source file not matching an exclude
/// pattern, sorted for deterministic pairing order.
///
/// # Errors
/// Returns an error if `root` is not a directory. Unreadable entries inside
/// the walk are skipped.
pub fn discover(root: &Path, excludes: &[Regex]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CodesimError::NotADirectory(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_source_file(path))
        .filter(|path| {
            let normalized = normalize_path(path);
            !excludes.iter().any(|re| re.is_match(&normalized))
        })
        .collect();

    files.sort();
    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Forward slashes on every platform so exclude patterns match uniformly.
fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Reads a source file as UTF-8 text.
///
/// # Errors
/// Returns an I/O error tagged with the offending path.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CodesimError::Io {
        source,
        path: path.to_path_buf(),
    })
}
