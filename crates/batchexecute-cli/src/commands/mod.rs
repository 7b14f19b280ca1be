//! Subcommand implementations.

pub mod build;
pub mod call;
pub mod config;
pub mod decode;
