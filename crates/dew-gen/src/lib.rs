//! DEW Gen: DEW-MathQ problem generation.
//!
//! Turns annotated problem templates into dataset entries with worked
//! solutions, hints and multiple-choice options, and summarizes finished
//! datasets.
//!
//! # Modules
//!
//! - [`annotations`]: Combine per-problem YAML annotations into one document
//! - [`loader`]: Load templates from a JSON file or an annotation folder
//! - [`solver`]: Step-by-step solutions with reasoning text
//! - [`multiple_choice`]: Distractors from common calculation mistakes
//! - [`generator`]: Dataset generation with seeded randomness
//! - [`stats`]: DEW-MathQ and DEW-LogiQ dataset statistics

#![doc = include_str!("../README.md")]

pub mod annotations;
pub mod generator;
pub mod loader;
pub mod multiple_choice;
pub mod solver;
pub mod stats;

pub use annotations::{combine_yaml_dir, write_problems_file};
pub use generator::{
    DatasetEntry, DatasetGenerator, ErrorHandling, GenerationFailure, GenerationOptions,
    GenerationStats,
};
pub use loader::load_templates;
pub use multiple_choice::{Difficulty, McOption, McQuestion, MultipleChoiceGenerator};
pub use solver::{AnswerValue, FinalValue, Solution, Solver};
pub use stats::{LogiQRecord, LogiQStats, MathQStats, QuestionType, Summary, summary_table};
