//! CLI, configuration and commands for the `batchexecute` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
