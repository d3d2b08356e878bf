//! Integration test suite for DEW-MathQ generation.
//!
//! Runs the whole pipeline: annotation folder, equation library, knowledge
//! graph, generator, and statistics over the generated entries.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
mod integration;
