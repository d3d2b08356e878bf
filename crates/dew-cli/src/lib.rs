//! DEW CLI: the `dew` command-line tool.
//!
//! # Modules
//!
//! - [`cli`]: Argument definitions (clap)
//! - [`config`]: Layered TOML/JSON configuration
//! - [`config_handlers`]: `dew config` subcommands and dotted-key helpers
//! - [`commands`]: Generation, graph export, solving and statistics commands

#![doc = include_str!("../README.md")]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;

pub use cli::{Cli, Commands, ConfigAction, GenerateArgs, GraphAction, GraphFormat};
pub use commands::run;
pub use config::{DewConfig, GraphExportConfig};
