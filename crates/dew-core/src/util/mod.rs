//! Utility modules for file discovery and ID computation.
//!
//! # Modules
//!
//! - [`files`]: YAML file discovery
//! - [`ids`]: ID normalization

pub mod files;
pub mod ids;
