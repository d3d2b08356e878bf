//! Configuration-driven runs of the `dew` commands.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use dew_cli::commands::{cmd_generate, cmd_graph_export, cmd_stats};
use dew_cli::config_handlers::{cmd_config_get, cmd_config_init, cmd_config_set};
use dew_cli::{DewConfig, GenerateArgs, GraphFormat};
use std::path::Path;
use tempfile::TempDir;

const FIXED_COST_YAML: &str = r#"
- id: fixed_cost_02
  problem_text: "Ownership costs are {OCPY} {OCPY_unit} per year over {TIA} {TIA_unit}. What is the increased fixed cost per acre?"
  variables:
    OCPY: {min: 12000, max: 18000, default_unit: dollars}
    TIA: {min: 160, max: 320, default_unit: acres}
  equations_used: [eq_increased_ownership_fixed_cost_per_acre]
  problem_category: [economic_evaluations]
  difficulty_level: easy
  target_variables: [IOFCPA]
  final_target_variable: IOFCPA
"#;

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// A config file pointing at an annotation folder inside `dir`.
fn write_project(dir: &TempDir) -> std::path::PathBuf {
    let annotations = dir.path().join("inputs_yaml");
    std::fs::create_dir_all(&annotations).unwrap();
    std::fs::write(annotations.join("fixed_cost_02.yaml"), FIXED_COST_YAML).unwrap();

    let config_path = dir.path().join("dew.toml");
    cmd_config_init(Some(path_str(&config_path)), false).unwrap();
    let config = Some(path_str(&config_path));
    cmd_config_set(config, "problems_path", path_str(&annotations)).unwrap();
    cmd_config_set(config, "output_file", path_str(&dir.path().join("out/ds.json"))).unwrap();
    cmd_config_set(
        config,
        "combined_problems_file",
        path_str(&dir.path().join("out/problems_definition.json")),
    )
    .unwrap();
    cmd_config_set(config, "variations", "3").unwrap();
    cmd_config_set(config, "seed", "99").unwrap();
    config_path
}

#[tokio::test]
async fn test_generate_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = write_project(&dir);

    let config = DewConfig::load(Some(path_str(&config_path))).unwrap();
    let (entries, stats) = cmd_generate(&config).await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(stats.templates, 1);
    assert!(dir.path().join("out/problems_definition.json").is_file());

    let written: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out/ds.json")).unwrap())
            .unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[0]["is_original_version"], true);
    assert_eq!(written[0]["domain_id"], "fixed_cost");

    let table = cmd_stats(&dir.path().join("out/ds.json"), None).await.unwrap();
    assert!(table.contains("DEW-MathQ"));
}

#[tokio::test]
async fn test_command_line_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = write_project(&dir);

    let args = GenerateArgs {
        variations: Some(1),
        output: Some(dir.path().join("override.json")),
        ..Default::default()
    };
    let config = DewConfig::load(Some(path_str(&config_path)))
        .unwrap()
        .with_generate_args(&args)
        .unwrap();
    let (entries, _) = cmd_generate(&config).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert!(dir.path().join("override.json").is_file());
    assert!(!dir.path().join("out/ds.json").exists());
}

#[tokio::test]
async fn test_same_seed_same_dataset() {
    let dir = TempDir::new().unwrap();
    let config = DewConfig::load(Some(path_str(&write_project(&dir)))).unwrap();

    let (first, _) = cmd_generate(&config).await.unwrap();
    let (second, _) = cmd_generate(&config).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_graph_export_uses_config_defaults() {
    let dir = TempDir::new().unwrap();
    let config_path = write_project(&dir);
    let graph_file = dir.path().join("graph.cypher");
    let config = Some(path_str(&config_path));
    cmd_config_set(config, "graph_export.format", "cypher").unwrap();
    cmd_config_set(config, "graph_export.output", path_str(&graph_file)).unwrap();

    assert_eq!(cmd_config_get(config, "graph_export.format").unwrap(), "cypher");

    let loaded = DewConfig::load(config).unwrap();
    assert_eq!(loaded.graph_export.format, GraphFormat::Cypher);
    cmd_graph_export(&loaded, loaded.graph_export.format, loaded.graph_output().as_deref())
        .await
        .unwrap();

    let cypher = std::fs::read_to_string(&graph_file).unwrap();
    assert!(cypher.contains("MERGE"));
}

#[test]
fn test_legacy_json_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
  "problems_path": "annotations/inputs_yaml",
  "output_file": "annotations/outputs_json/dewpoint-math-ds.json",
  "variations": 5,
  "neo4j_uri": "neo4j://localhost:7687",
  "neo4j_user": "neo4j",
  "neo4j_password": ""
}"#,
    )
    .unwrap();

    let config = DewConfig::load(Some(path_str(&path))).unwrap();
    assert_eq!(config.variations, 5);
    assert_eq!(cmd_config_get(Some(path_str(&path)), "variations").unwrap(), "5");
    assert!(cmd_config_set(Some(path_str(&path)), "variations", "2").is_err());
}
