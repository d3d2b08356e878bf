//! Template loading from a combined JSON file or a folder of annotations.

use crate::annotations::combine_yaml_dir;
use dew_core::{Error, Result, is_yaml_folder};
use dew_model::{ProblemTemplate, ProblemsFile};
use std::path::Path;

/// Load and validate problem templates.
///
/// `path` is either a folder of YAML annotations, combined on the fly
/// (and written to `combined_output` when given), or a JSON file holding
/// `{"problems": [...]}`.
pub async fn load_templates(
    path: &Path,
    combined_output: Option<&Path>,
) -> Result<Vec<ProblemTemplate>> {
    let problems = if is_yaml_folder(path) {
        log::info!("Processing YAML files from {}", path.display());
        combine_yaml_dir(path, combined_output).await?
    } else if path.is_file() {
        log::info!("Loading problems from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(e, path))?;
        serde_json::from_str::<ProblemsFile>(&content)?
    } else {
        return Err(Error::config(format!(
            "problems path {} is neither a JSON file nor a folder of YAML files",
            path.display()
        )));
    };

    let templates = problems.templates()?;
    log::info!("Loaded {} problem templates", templates.len());
    Ok(templates)
}
