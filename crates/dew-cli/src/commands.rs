//! Subcommand implementations.

use crate::cli::{Cli, Commands, GraphAction, GraphFormat};
use crate::config::DewConfig;
use crate::config_handlers::handle_config_command;
use anyhow::{Context, Result, anyhow};
use dew_core::Catalog;
use dew_expr::Bindings;
use dew_gen::{
    DatasetEntry, DatasetGenerator, GenerationStats, LogiQRecord, LogiQStats, MathQStats,
    combine_yaml_dir, load_templates, summary_table,
};
use dew_graph::KnowledgeGraph;
use dew_model::EquationLibrary;
use std::path::{Path, PathBuf};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let load = || DewConfig::load(config_path).context("Failed to load configuration");

    match cli.command {
        Commands::Config { action } => {
            handle_config_command(config_path, action)?;
        }
        Commands::Generate(args) => {
            let config = load()?.with_generate_args(&args)?;
            let (entries, stats) = cmd_generate(&config).await?;
            println!(
                "Created {} problem variations from {} templates",
                entries.len(),
                stats.templates
            );
            println!("Dataset saved to {}", config.output_file().display());
        }
        Commands::Combine { input, output } => cmd_combine(&load()?, input, output).await?,
        Commands::Graph {
            action: GraphAction::Export { format, output },
        } => {
            let config = load()?;
            let format = format.unwrap_or(config.graph_export.format);
            let output = output.or_else(|| config.graph_output());
            cmd_graph_export(&config, format, output.as_deref()).await?;
        }
        Commands::Solve {
            equation,
            target,
            set,
        } => {
            let library = load_library(&load()?)?;
            let known: Bindings = set.into_iter().collect();
            println!("{}", solve_equation(&library, &equation, &target, &known)?);
        }
        Commands::Convert { value, from, to } => {
            let library = load_library(&load()?)?;
            let units = library.units();
            let converted = units.convert(value, &from, &to)?;
            println!(
                "{value} {} = {converted} {}",
                units.display(&from),
                units.display(&to)
            );
        }
        Commands::Catalog => print!("{}", render_catalog(&load_catalog(&load()?).await?)),
        Commands::Stats { mathq, logiq } => {
            println!("{}", cmd_stats(&mathq, logiq.as_deref()).await?);
        }
    }
    Ok(())
}

// ============================================================================
// Loading shared inputs
// ============================================================================

/// The equation library, from `definitions_dir` when configured.
pub fn load_library(config: &DewConfig) -> Result<EquationLibrary> {
    let library = match config.definitions_dir() {
        Some(dir) => EquationLibrary::with_definitions_dir(&dir)
            .with_context(|| format!("Failed to load definitions from {}", dir.display()))?,
        None => EquationLibrary::builtin().context("Failed to load built-in definitions")?,
    };
    tracing::debug!(
        domains = library.domains().len(),
        equations = library.all_equations().count(),
        "Equation library loaded"
    );
    Ok(library)
}

/// The built-in catalog, extended by `catalog_file` when configured.
pub async fn load_catalog(config: &DewConfig) -> Result<Catalog> {
    let mut catalog = Catalog::builtin();
    if let Some(path) = config.catalog_file() {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        catalog.merge(Catalog::from_yaml_str(&content)?);
    }
    Ok(catalog)
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

/// Generate the dataset described by `config` and write it to
/// `output_file`.
pub async fn cmd_generate(config: &DewConfig) -> Result<(Vec<DatasetEntry>, GenerationStats)> {
    let problems_path = config
        .problems_path()
        .ok_or_else(|| anyhow!("'problems_path' is not set in the config or on the command line"))?;

    let library = load_library(config)?;
    let (graph, build) = KnowledgeGraph::build(&library);
    tracing::info!(
        nodes = build.nodes_created,
        edges = build.edges_created,
        "Knowledge graph built"
    );
    for dangling in &build.dangling_refs {
        tracing::warn!("Skipped dangling reference: {dangling}");
    }

    let combined = config.combined_problems_file();
    let templates = load_templates(&problems_path, Some(&combined))
        .await
        .with_context(|| format!("Failed to load problems from {}", problems_path.display()))?;

    let catalog = load_catalog(config).await?;
    let options = config.generation_options();
    let (entries, stats) =
        DatasetGenerator::new(&library, &graph, &catalog).generate(&templates, &options)?;

    for failure in &stats.failures {
        tracing::warn!(problem = %failure.problem_id, "{}", failure.message);
    }
    if stats.restricted_templates > 0 {
        tracing::info!(
            "{} templates cite restricted books and were left out",
            stats.restricted_templates
        );
    }

    let output = config.output_file();
    write_output(&output, &serde_json::to_string_pretty(&entries)?).await?;
    Ok((entries, stats))
}

async fn cmd_combine(
    config: &DewConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let input = input
        .or_else(|| config.problems_path())
        .ok_or_else(|| anyhow!("No input folder given and 'problems_path' is not set"))?;
    let output = output.unwrap_or_else(|| config.combined_problems_file());
    let combined = combine_yaml_dir(&input, Some(&output)).await?;
    println!(
        "Combined {} problems into {}",
        combined.problems.len(),
        output.display()
    );
    Ok(())
}

/// Export the knowledge graph to `output`, or stdout when `None`.
pub async fn cmd_graph_export(
    config: &DewConfig,
    format: GraphFormat,
    output: Option<&Path>,
) -> Result<()> {
    let library = load_library(config)?;
    let (graph, _) = KnowledgeGraph::build(&library);
    let rendered = match format {
        GraphFormat::Json => graph.to_json()?,
        GraphFormat::Cypher => graph.to_cypher()?,
    };
    match output {
        Some(path) => {
            write_output(path, &rendered).await?;
            tracing::info!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Graph exported to {}",
                path.display()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Solve one library equation and describe the result with its unit.
pub fn solve_equation(
    library: &EquationLibrary,
    equation_id: &str,
    target: &str,
    known: &Bindings,
) -> Result<String> {
    let equation = library.require_equation(equation_id)?;
    let value = equation.solve_for(target, known)?;
    let unit = equation
        .variable(target)
        .map(|v| library.units().display(&v.unit))
        .unwrap_or_default();
    Ok(format!("{target} = {value} {unit}").trim_end().to_string())
}

/// Statistics for a DEW-MathQ dataset and, optionally, a DEW-LogiQ one.
pub async fn cmd_stats(mathq: &Path, logiq: Option<&Path>) -> Result<String> {
    let content = tokio::fs::read_to_string(mathq)
        .await
        .with_context(|| format!("Failed to read {}", mathq.display()))?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array", mathq.display()))?;
    let math_stats = MathQStats::from_entries(&entries);

    let logiq_stats = match logiq {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let records: Vec<LogiQRecord> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array of records", path.display()))?;
            Some(LogiQStats::from_records(&records))
        }
        None => None,
    };

    Ok(summary_table(&math_stats, logiq_stats.as_ref()))
}

/// Splits and reference books as plain text.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Splits:\n");
    for split in &catalog.splits {
        out.push_str(&format!("  {} ({}): {}\n", split.name, split.kind, split.description));
        if let Some(url) = &split.hosting_url {
            out.push_str(&format!("    {url}\n"));
        }
    }
    out.push_str("Reference books:\n");
    for book in &catalog.books {
        let flag = if book.is_restricted() { " [restricted]" } else { "" };
        out.push_str(&format!("  {}{flag}\n    {}\n", book.id, book.citation()));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::GenerateArgs;

    #[test]
    fn test_solve_equation_with_unit() {
        let library = EquationLibrary::builtin().unwrap();
        let known: Bindings = [("TPCPY".to_string(), 1200.0), ("TWPCPY".to_string(), 800.0)]
            .into_iter()
            .collect();
        let line = solve_equation(
            &library,
            "eq_total_cost_savings_per_year_based_on_water_and_pumping",
            "TCSPY",
            &known,
        )
        .unwrap();
        assert!(line.starts_with("TCSPY = 2000"));
    }

    #[test]
    fn test_solve_equation_unknown_id() {
        let library = EquationLibrary::builtin().unwrap();
        let err = solve_equation(&library, "eq_missing", "X", &Bindings::new()).unwrap_err();
        assert!(err.to_string().contains("eq_missing"));
    }

    #[test]
    fn test_render_catalog_flags_restricted_books() {
        let text = render_catalog(&Catalog::builtin());
        assert!(text.contains("DEW-MathQ"));
        assert!(text.contains("irrigation-systems-management [restricted]"));
        assert!(!text.contains("usda-nrcs-irrigation-guide [restricted]"));
    }

    #[tokio::test]
    async fn test_generate_requires_problems_path() {
        let err = cmd_generate(&DewConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("problems_path"));
    }

    #[test]
    fn test_default_args_keep_config() {
        let config = DewConfig::default()
            .with_generate_args(&GenerateArgs::default())
            .unwrap();
        assert_eq!(config, DewConfig::default());
    }
}
