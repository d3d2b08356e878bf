//! DEW Core: shared errors, catalog types, and utilities.
//!
//! This crate provides the foundational types used across all DEW crates.
//! It has no internal DEW dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`catalog`]: Dataset splits and reference-book licensing
//! - [`util`]: YAML file discovery and ID utilities

#![doc = include_str!("../README.md")]

pub mod catalog;
pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use catalog::{Catalog, DatasetSplit, License, ReferenceBook, SplitKind};
pub use error::{Error, Result};

// Convenience re-exports from util
pub use util::files::{find_yaml_files, is_yaml_folder};
pub use util::ids::normalize_id;
