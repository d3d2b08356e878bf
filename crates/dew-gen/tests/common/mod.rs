//! Common test utilities for dew-gen integration tests.

use dew_core::Catalog;
use dew_graph::KnowledgeGraph;
use dew_model::EquationLibrary;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Annotation whose answer needs four chained steps.
pub const COST_SAVINGS_YAML: &str = r#"
- id: cost_savings_01
  problem_text: >-
    A {TIA} {TIA_unit} farm reduces gross irrigation from {PEGIAPY} to
    {POGIAPY} {POGIAPY_unit} per year. Fuel costs {FCPAF} {FCPAF_unit} and
    water costs {CPAF} {CPAF_unit} per acre-foot. What are the total cost
    savings per year?
  alternative_phrasings: [TO_DO]
  variables:
    TIA: {min: 120, max: 240, default_unit: acres}
    PEGIAPY: {min: 30, max: 36, default_unit: inches}
    POGIAPY: {min: 24, max: 24, default_unit: inches, is_constant: true}
    FCPAF: {min: 10, max: 20, default_unit: dollars}
    CPAF: {min: 25, max: 40, default_unit: dollars}
  equations_used:
    - eq_total_annual_water_saved
    - eq_total_pumping_cost_per_year_based_on_fuel
    - eq_total_water_purchase_cost_per_year
    - eq_total_cost_savings_per_year_based_on_water_and_pumping
  problem_category: [irrigation_system_evaluation_procedures, cost_savings]
  difficulty_level: hard
  citation: {book: usda-nrcs-irrigation-guide, chapter: 9}
  target_variables: [AFSPY, TPCPY, TWPCPY, TCSPY]
  final_target_variable: TCSPY
  multiple_choice: {num_options: 4}
"#;

/// Single-step economics annotation.
pub const FIXED_COST_YAML: &str = r#"
- id: fixed_cost_02
  problem_text: "Ownership costs are {OCPY} {OCPY_unit} per year over {TIA} {TIA_unit}. What is the increased fixed cost per acre?"
  alternative_phrasings:
    - "Spread {OCPY} {OCPY_unit} of yearly ownership cost over {TIA} {TIA_unit}: what is the cost per acre?"
  variables:
    OCPY: {min: 12000, max: 18000, default_unit: dollars}
    TIA: {min: 160, max: 320, default_unit: acres}
  equations_used: [eq_increased_ownership_fixed_cost_per_acre]
  problem_category: [economic_evaluations]
  difficulty_level: easy
  target_variables: [IOFCPA]
  final_target_variable: [IOFCPA]
"#;

/// Shared fixtures for pipeline tests.
pub struct TestHarness {
    pub library: EquationLibrary,
    pub graph: KnowledgeGraph,
    pub catalog: Catalog,
    pub dir: TempDir,
}

impl TestHarness {
    /// Built-in library, its graph, the built-in catalog, and an empty
    /// annotation folder.
    pub fn new() -> Self {
        let library = EquationLibrary::builtin().expect("built-in library loads");
        let (graph, _) = KnowledgeGraph::build(&library);
        Self {
            library,
            graph,
            catalog: Catalog::builtin(),
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// Annotation folder pre-filled with both sample annotations.
    pub fn with_annotations() -> Self {
        let harness = Self::new();
        harness.write_annotation("cost_savings_01.yaml", COST_SAVINGS_YAML);
        harness.write_annotation("fixed_cost_02.yaml", FIXED_COST_YAML);
        harness
    }

    pub fn annotations_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_annotation(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write annotation");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
