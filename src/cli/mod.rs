//! CLI layer: top-level argument parsing, help and running invocations

pub mod args;
pub mod commands;
pub mod error;
pub mod help;
pub mod output;

pub use args::{Cli, Commands};
pub use error::{CliError, CliResult};
