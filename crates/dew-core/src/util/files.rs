//! YAML file discovery.
//!
//! Annotation folders and domain definition folders are flat directories
//! of `*.yaml` / `*.yml` files. Discovery is non-recursive and sorted so
//! that loading order (and therefore generated output) is stable.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// File extensions recognised as YAML.
pub const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Find all YAML files directly inside `dir`, sorted by path.
///
/// Returns `NotFound` if `dir` does not exist or is not a directory.
pub fn find_yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::not_found("directory", dir.display().to_string()));
    }

    let mut files = Vec::new();
    for ext in YAML_EXTENSIONS {
        let pattern = dir.join(format!("*.{ext}"));
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern)
            .map_err(|e| Error::parse(format!("Invalid glob pattern {pattern}: {e}")))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable entry: {e}"),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Check whether `path` is a directory containing at least one YAML file.
pub fn is_yaml_folder(path: &Path) -> bool {
    find_yaml_files(path)
        .map(|files| !files.is_empty())
        .unwrap_or(false)
}
