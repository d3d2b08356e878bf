//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use dew_gen::ErrorHandling;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// DEW benchmark toolkit.
#[derive(Parser, Debug)]
#[command(name = "dew")]
#[command(author, version, about = "Generate and inspect the DEW reasoning benchmark", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true, env = "DEW_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the DEW-MathQ dataset from problem templates
    Generate(GenerateArgs),

    /// Combine a folder of YAML annotations into one problems file
    Combine {
        /// Folder of YAML annotations (defaults to `problems_path`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output JSON file (defaults to `combined_problems_file`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Knowledge graph operations
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// Solve one equation for a variable
    Solve {
        /// Equation id
        #[arg(short, long)]
        equation: String,

        /// Variable to solve for
        #[arg(short, long)]
        target: String,

        /// Known value as NAME=VALUE (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
    },

    /// Convert a value between units
    #[command(allow_negative_numbers = true)]
    Convert {
        value: f64,
        from: String,
        to: String,
    },

    /// List dataset splits and reference books
    Catalog,

    /// Summarize finished datasets
    Stats {
        /// DEW-MathQ dataset (JSON array)
        #[arg(long)]
        mathq: PathBuf,

        /// DEW-LogiQ dataset (JSON array)
        #[arg(long)]
        logiq: Option<PathBuf>,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `dew generate`. Each one overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// JSON problems file or folder of YAML annotations
    #[arg(short, long)]
    pub problems: Option<PathBuf>,

    /// Dataset output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Problems per template, original version included
    #[arg(short = 'n', long)]
    pub variations: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Decimals kept for values and answers
    #[arg(long)]
    pub precision: Option<u32>,

    /// Add term definitions to hints
    #[arg(long)]
    pub include_terms: bool,

    /// Generate from templates citing restricted books
    #[arg(long)]
    pub include_restricted: bool,

    /// fail_fast, collect or skip
    #[arg(long, value_parser = parse_error_handling)]
    pub error_handling: Option<ErrorHandling>,
}

#[derive(Subcommand, Debug)]
pub enum GraphAction {
    /// Export the knowledge graph
    Export {
        /// Output format (defaults to `graph_export.format`)
        #[arg(short, long, value_enum)]
        format: Option<GraphFormat>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Graph export formats.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Nodes and edges as JSON
    #[default]
    Json,
    /// Cypher MERGE statements
    Cypher,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Print a value by dotted key
    Get { key: String },

    /// Set a value by dotted key
    Set { key: String, value: String },

    /// Write a default config file
    Init {
        /// Target file (defaults to the user config directory)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{s}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.to_string(), value))
}

fn parse_error_handling(s: &str) -> Result<ErrorHandling, String> {
    match s.to_ascii_lowercase().replace('-', "_").as_str() {
        "fail_fast" => Ok(ErrorHandling::FailFast),
        "collect" => Ok(ErrorHandling::Collect),
        "skip" => Ok(ErrorHandling::Skip),
        other => Err(format!(
            "unknown error handling '{other}' (expected fail_fast, collect or skip)"
        )),
    }
}
