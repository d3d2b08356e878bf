//! Configuration for the `dew` binary.
//!
//! Settings come from a TOML file (or a JSON file with a `.json`
//! extension, which keeps older JSON configs working). Resolution order:
//! an explicit `--config` path (or `$DEW_CONFIG`), `./dew.toml`, then
//! `<config dir>/dew/config.toml`. Without any file the defaults apply.
//! Command-line flags override whatever the file says.

use crate::cli::{GenerateArgs, GraphFormat};
use dew_core::{Error, Result};
use dew_gen::{ErrorHandling, GenerationOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "dew.toml";

/// Highest supported rounding precision.
pub const MAX_PRECISION: u32 = 10;

// ============================================================================
// Types
// ============================================================================

/// Top-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DewConfig {
    /// JSON problems file or folder of YAML annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problems_path: Option<String>,
    /// Where the generated dataset is written.
    pub output_file: String,
    /// Where combined YAML annotations are written.
    pub combined_problems_file: String,
    /// Folder of domain definition YAML files replacing the built-in ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions_dir: Option<String>,
    /// Extra catalog (splits and reference books) merged over the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<String>,
    pub variations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub precision: u32,
    pub include_terms: bool,
    pub include_restricted: bool,
    pub error_handling: ErrorHandling,
    pub graph_export: GraphExportConfig,
}

impl Default for DewConfig {
    fn default() -> Self {
        Self {
            problems_path: None,
            output_file: "annotations/outputs_json/dewpoint-math-ds.json".to_string(),
            combined_problems_file: "annotations/outputs_json/problems_definition.json"
                .to_string(),
            definitions_dir: None,
            catalog_file: None,
            variations: 1,
            seed: None,
            precision: 2,
            include_terms: false,
            include_restricted: false,
            error_handling: ErrorHandling::FailFast,
            graph_export: GraphExportConfig::default(),
        }
    }
}

/// Defaults for `dew graph export`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphExportConfig {
    pub format: GraphFormat,
    /// Output file; stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

impl DewConfig {
    /// Load settings, resolving the file as described in the module docs.
    ///
    /// An explicit path must exist; implicit locations fall back to the
    /// defaults when nothing is found.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Some(explicit) = config_path {
            let path = expand_path(explicit);
            if !path.is_file() {
                return Err(Error::not_found(
                    "config file",
                    path.display().to_string(),
                ));
            }
            return Self::from_file(&path);
        }

        match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a config file; `.json` files are parsed as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content).map_err(|e| match e {
                Error::Config { message } => {
                    Error::config(format!("{}: {message}", path.display()))
                }
                other => other,
            })
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The file `load(config_path)` reads, or the default location when
    /// none of the candidates exists.
    pub fn resolve_config_path(config_path: Option<&str>) -> Option<PathBuf> {
        if let Some(explicit) = config_path {
            return Some(expand_path(explicit));
        }
        Self::candidate_paths()
            .into_iter()
            .find(|p| p.is_file())
            .or_else(Self::default_config_path)
    }

    /// `<config dir>/dew/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dew").join("config.toml"))
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        paths.extend(Self::default_config_path());
        paths
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.variations == 0 {
            return Err(Error::validation_field(
                "variations",
                "must be at least 1",
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(Error::validation_field(
                "precision",
                format!("must be at most {MAX_PRECISION}"),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Overrides and resolved values
// ============================================================================

impl DewConfig {
    /// Apply `dew generate` flags on top of the file settings.
    pub fn with_generate_args(mut self, args: &GenerateArgs) -> Result<Self> {
        if let Some(problems) = &args.problems {
            self.problems_path = Some(problems.display().to_string());
        }
        if let Some(output) = &args.output {
            self.output_file = output.display().to_string();
        }
        if let Some(variations) = args.variations {
            self.variations = variations;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if let Some(precision) = args.precision {
            self.precision = precision;
        }
        self.include_terms |= args.include_terms;
        self.include_restricted |= args.include_restricted;
        if let Some(handling) = args.error_handling {
            self.error_handling = handling;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn generation_options(&self) -> GenerationOptions {
        let options = GenerationOptions::default()
            .with_variations(self.variations)
            .with_precision(self.precision)
            .with_include_terms(self.include_terms)
            .with_include_restricted(self.include_restricted)
            .with_error_handling(self.error_handling);
        match self.seed {
            Some(seed) => options.with_seed(seed),
            None => options,
        }
    }

    pub fn problems_path(&self) -> Option<PathBuf> {
        self.problems_path.as_deref().map(expand_path)
    }

    pub fn output_file(&self) -> PathBuf {
        expand_path(&self.output_file)
    }

    pub fn combined_problems_file(&self) -> PathBuf {
        expand_path(&self.combined_problems_file)
    }

    pub fn definitions_dir(&self) -> Option<PathBuf> {
        self.definitions_dir.as_deref().map(expand_path)
    }

    pub fn catalog_file(&self) -> Option<PathBuf> {
        self.catalog_file.as_deref().map(expand_path)
    }

    pub fn graph_output(&self) -> Option<PathBuf> {
        self.graph_export.output.as_deref().map(expand_path)
    }
}

/// Expand `~` and environment variables; unknown variables are left as is.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
