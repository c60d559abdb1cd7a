//! CLI, configuration, command handlers, text rendering
//!
//! This crate provides the `staysync` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use cli::Cli;
pub use config::StaysyncConfig;
pub use error::{CliError, CliResult};
