//! Combining per-problem YAML annotations into one problems document.
//!
//! Annotators write one problem per file as a single-element YAML list.
//! The combined document is `{"problems": [...]}` in file-name order.

use dew_core::{Error, Result, find_yaml_files};
use dew_model::ProblemsFile;
use std::path::Path;

/// Combine every YAML file in `dir`.
///
/// Each file contributes the first element of its top-level list; empty
/// files are skipped and unreadable or malformed files are logged and
/// skipped. When `output` is given, the combined document is also written
/// there as pretty-printed JSON (parent directories are created).
pub async fn combine_yaml_dir(dir: &Path, output: Option<&Path>) -> Result<ProblemsFile> {
    let files = find_yaml_files(dir)?;
    if files.is_empty() {
        return Err(Error::not_found(
            "YAML annotation files",
            dir.display().to_string(),
        ));
    }

    let mut combined = ProblemsFile::default();
    for path in &files {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                continue;
            }
        };
        match serde_yaml::from_str::<Option<Vec<serde_json::Value>>>(&content) {
            Ok(Some(mut items)) if !items.is_empty() => {
                combined.problems.push(items.swap_remove(0));
            }
            Ok(_) => log::debug!("Skipped {} (no problem)", path.display()),
            Err(e) => log::warn!("Error processing {}: {e}", path.display()),
        }
    }

    if combined.problems.is_empty() {
        return Err(Error::validation(format!(
            "no valid problems found in {}",
            dir.display()
        )));
    }

    log::info!(
        "Combined {} problems from {} files in {}",
        combined.problems.len(),
        files.len(),
        dir.display()
    );

    if let Some(output) = output {
        write_problems_file(&combined, output).await?;
    }

    Ok(combined)
}

/// Write a problems document as pretty-printed JSON.
pub async fn write_problems_file(problems: &ProblemsFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(e, parent))?;
    }
    let json = serde_json::to_string_pretty(problems)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::io_with_path(e, path))?;
    log::info!("Combined problems saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_combine_in_file_order() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.yaml", "- id: second\n");
        write(dir.path(), "a.yml", "- id: first\n- id: ignored\n");
        write(dir.path(), "empty.yaml", "");
        write(dir.path(), "broken.yaml", "id: [unclosed\n");

        let combined = combine_yaml_dir(dir.path(), None).await.unwrap();
        let ids: Vec<_> = combined
            .problems
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_combine_writes_output() {
        let dir = tempdir().unwrap();
        write(dir.path(), "p.yaml", "- id: only\n  variables: {TIA: {min: 1, max: 2}}\n");
        let out = dir.path().join("out/problems_definition.json");

        combine_yaml_dir(dir.path(), Some(&out)).await.unwrap();

        let written: ProblemsFile =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.problems[0]["variables"]["TIA"]["max"], 2);
    }

    #[tokio::test]
    async fn test_no_files_is_not_found() {
        let dir = tempdir().unwrap();
        let err = combine_yaml_dir(dir.path(), None).await.unwrap_err();
        let Error::NotFound { kind, .. } = err else {
            unreachable!("Expected NotFound error variant");
        };
        assert_eq!(kind, "YAML annotation files");
    }

    #[tokio::test]
    async fn test_no_problems_is_validation_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "empty.yaml", "[]\n");
        write(dir.path(), "mapping.yaml", "id: not_a_list\n");
        let err = combine_yaml_dir(dir.path(), None).await.unwrap_err();
        assert!(err.to_string().starts_with("Validation error: no valid problems"));
    }
}
