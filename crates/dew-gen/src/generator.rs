//! DEW-MathQ dataset generation.
//!
//! Each template yields `variations` problems. The first is the original
//! version, built from each variable's minimum; later ones draw values
//! uniformly from the annotated ranges. Every problem is solved, given
//! hints, and turned into a [`DatasetEntry`] with multiple-choice options.
//!
//! All randomness comes from one `StdRng`, so a seed fixes the output.

use crate::multiple_choice::{Difficulty, McQuestion, MultipleChoiceGenerator};
use crate::solver::{DEFAULT_PRECISION, FinalValue, Solver, round_to};
use chrono::{DateTime, Utc};
use dew_core::{Catalog, Error, Result};
use dew_graph::{Hints, KnowledgeGraph};
use dew_model::{EquationLibrary, ProblemInstance, ProblemTemplate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+$").expect("Invalid trailing number regex"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").expect("Invalid placeholder regex")
});

// ============================================================================
// Options & stats
// ============================================================================

/// How problem-level failures are handled.
///
/// Only errors about a single problem (an unsolvable target, a math
/// error) are subject to this; broken inputs always abort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandling {
    /// Stop on the first error.
    #[default]
    FailFast,
    /// Continue and record the errors.
    Collect,
    /// Log and skip failing problems.
    Skip,
}

/// Generation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    /// Problems per template, original version included.
    pub variations: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Decimals kept for drawn values and answers.
    pub precision: u32,
    /// Add term definitions to graph hints.
    pub include_terms: bool,
    /// Generate from templates citing restricted books.
    pub include_restricted: bool,
    pub error_handling: ErrorHandling,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            variations: 1,
            seed: None,
            precision: DEFAULT_PRECISION,
            include_terms: false,
            include_restricted: false,
            error_handling: ErrorHandling::default(),
        }
    }
}

impl GenerationOptions {
    pub fn with_variations(mut self, variations: usize) -> Self {
        self.variations = variations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_include_terms(mut self, include: bool) -> Self {
        self.include_terms = include;
        self
    }

    pub fn with_include_restricted(mut self, include: bool) -> Self {
        self.include_restricted = include;
        self
    }

    pub fn with_error_handling(mut self, handling: ErrorHandling) -> Self {
        self.error_handling = handling;
        self
    }
}

/// A problem that could not be generated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationFailure {
    pub problem_id: String,
    pub message: String,
}

/// Statistics from a generation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generated_at: DateTime<Utc>,
    pub templates: usize,
    pub produced: usize,
    /// Failures recorded under [`ErrorHandling::Collect`].
    pub failed: usize,
    /// Failures dropped under [`ErrorHandling::Skip`].
    pub skipped: usize,
    /// Templates left out because they cite a restricted book.
    pub restricted_templates: usize,
    pub failures: Vec<GenerationFailure>,
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            templates: 0,
            produced: 0,
            failed: 0,
            skipped: 0,
            restricted_templates: 0,
            failures: Vec::new(),
        }
    }
}

// ============================================================================
// Dataset entry
// ============================================================================

/// One DEW-MathQ item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Template id without its trailing number.
    pub domain_id: String,
    pub problem_id: String,
    pub is_original_version: bool,
    pub domain: String,
    pub topics: Vec<String>,
    pub difficulty_level: String,
    pub gold_problem: String,
    pub gold_solution_reasoning_steps: Vec<String>,
    /// The final target only.
    pub gold_solution_final_response: BTreeMap<String, FinalValue>,
    pub hint_for_reasoning: serde_json::Value,
    pub additional_references: Vec<serde_json::Value>,
    pub multiple_choice_options: BTreeMap<String, McQuestion>,
}

/// Template id with a trailing `_<number>` removed.
///
/// ```rust
/// use dew_gen::generator::domain_id;
///
/// assert_eq!(domain_id("water_savings_01"), "water_savings");
/// assert_eq!(domain_id("water_savings"), "water_savings");
/// ```
pub fn domain_id(template_id: &str) -> String {
    TRAILING_NUMBER.replace(template_id, "").into_owned()
}

// ============================================================================
// Generator
// ============================================================================

/// Generates dataset entries from templates.
pub struct DatasetGenerator<'a> {
    library: &'a EquationLibrary,
    graph: &'a KnowledgeGraph,
    catalog: &'a Catalog,
    mc: MultipleChoiceGenerator,
}

impl<'a> DatasetGenerator<'a> {
    pub fn new(library: &'a EquationLibrary, graph: &'a KnowledgeGraph, catalog: &'a Catalog) -> Self {
        Self {
            library,
            graph,
            catalog,
            mc: MultipleChoiceGenerator::new(),
        }
    }

    pub fn with_multiple_choice(mut self, mc: MultipleChoiceGenerator) -> Self {
        self.mc = mc;
        self
    }

    /// Generate entries for every template.
    pub fn generate(
        &self,
        templates: &[ProblemTemplate],
        options: &GenerationOptions,
    ) -> Result<(Vec<DatasetEntry>, GenerationStats)> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stats = GenerationStats::default();
        let mut entries = Vec::with_capacity(templates.len() * options.variations);

        for template in templates {
            if !options.include_restricted && self.is_restricted(template) {
                log::info!(
                    "Skipping template {}: cites a restricted reference book",
                    template.id
                );
                stats.restricted_templates += 1;
                continue;
            }
            stats.templates += 1;

            for i in 0..options.variations {
                let problem = self.generate_variation(template, i == 0, options.precision, &mut rng);
                match self.entry(template, &problem, options, &mut rng) {
                    Ok(entry) => {
                        entries.push(entry);
                        stats.produced += 1;
                    }
                    Err(e) if !e.is_instance_level() => return Err(e),
                    Err(e) => match options.error_handling {
                        ErrorHandling::FailFast => return Err(e),
                        ErrorHandling::Collect => {
                            log::warn!("Failed to generate {}: {e}", problem.id);
                            stats.failed += 1;
                            stats.failures.push(GenerationFailure {
                                problem_id: problem.id.clone(),
                                message: e.to_string(),
                            });
                        }
                        ErrorHandling::Skip => {
                            log::debug!("Skipping {}: {e}", problem.id);
                            stats.skipped += 1;
                        }
                    },
                }
            }
        }

        log::info!(
            "Created {} problem variations from {} templates",
            stats.produced,
            stats.templates
        );
        Ok((entries, stats))
    }

    fn is_restricted(&self, template: &ProblemTemplate) -> bool {
        template
            .citation
            .book
            .as_deref()
            .is_some_and(|book| self.catalog.is_restricted(book))
    }

    /// Draw one problem from `template`.
    ///
    /// The original version takes each variable's minimum; constants
    /// always take the midpoint of their range.
    pub fn generate_variation<R: Rng + ?Sized>(
        &self,
        template: &ProblemTemplate,
        original: bool,
        precision: u32,
        rng: &mut R,
    ) -> ProblemInstance {
        let variation = variation_id(rng);

        let given_values = template
            .variables
            .iter()
            .map(|(name, spec)| {
                let value = if spec.is_constant {
                    spec.midpoint()
                } else if original || spec.min >= spec.max {
                    spec.min
                } else {
                    rng.gen_range(spec.min..=spec.max)
                };
                (name.clone(), round_to(value, precision))
            })
            .collect();

        let phrasing = template
            .usable_phrasings()
            .choose(rng)
            .unwrap_or(&template.problem_text);

        let mut problem = ProblemInstance {
            id: format!("{}_{variation}", template.id),
            template_id: template.id.clone(),
            text: String::new(),
            given_values,
            target_variables: template.target_variables.clone(),
            equations_used: template.equations_used.clone(),
            is_original_version: original,
        };
        problem.text = fill_placeholders(phrasing, template, &problem);
        problem
    }

    fn entry<R: Rng + ?Sized>(
        &self,
        template: &ProblemTemplate,
        problem: &ProblemInstance,
        options: &GenerationOptions,
        rng: &mut R,
    ) -> Result<DatasetEntry> {
        let final_target = template.final_target().ok_or_else(|| {
            Error::validation_field(
                format!("{}.final_target_variable", template.id),
                "a final target variable is required",
            )
        })?;

        let (hint_value, hints) = if template.manual_hints.override_auto_hints {
            let content = template.manual_hints.content.clone();
            let parsed = serde_json::from_value::<Hints>(content.clone()).ok();
            (content, parsed)
        } else {
            let hints = self.graph.hints(problem, options.include_terms);
            (serde_json::to_value(&hints)?, Some(hints))
        };

        let units = self.graph.variables_with_units(None);
        let solution = Solver::new(self.library)
            .with_precision(options.precision)
            .solve(problem, hints.as_ref(), &units)?;

        let answer = solution
            .final_values
            .get(final_target)
            .cloned()
            .ok_or_else(|| {
                Error::unsolvable(
                    final_target,
                    format!("no equation of problem {} produced a value", problem.id),
                )
            })?;
        let final_response = BTreeMap::from([(final_target.to_string(), answer)]);

        let multiple_choice_options = self.mc.options(
            &final_response,
            template.multiple_choice.num_options,
            Difficulty::from_label(&template.difficulty_level),
            rng,
        );

        Ok(DatasetEntry {
            domain_id: domain_id(&template.id),
            problem_id: problem.id.clone(),
            is_original_version: problem.is_original_version,
            domain: template.domain(),
            topics: template.topics().to_vec(),
            difficulty_level: template.difficulty_level.clone(),
            gold_problem: problem.text.clone(),
            gold_solution_reasoning_steps: solution.steps,
            gold_solution_final_response: final_response,
            hint_for_reasoning: hint_value,
            additional_references: template.additional_references.clone(),
            multiple_choice_options,
        })
    }
}

/// First 8 hex digits of a random UUID drawn from `rng`.
fn variation_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let uuid = uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid();
    let mut id = uuid.simple().to_string();
    id.truncate(8);
    id
}

/// Replace `{VAR}` with the drawn value and `{VAR_unit}` with the
/// variable's default unit.
fn fill_placeholders(text: &str, template: &ProblemTemplate, problem: &ProblemInstance) -> String {
    let mut out = text.to_string();
    for (name, value) in &problem.given_values {
        let unit = template
            .variables
            .get(name)
            .map(|spec| spec.default_unit.as_str())
            .unwrap_or("");
        out = out
            .replace(&format!("{{{name}}}"), &format!("{value:?}"))
            .replace(&format!("{{{name}_unit}}"), unit);
    }
    if let Some(left) = PLACEHOLDER.find(&out) {
        log::warn!(
            "Problem {} has an unfilled placeholder {}",
            problem.id,
            left.as_str()
        );
    }
    out
}
