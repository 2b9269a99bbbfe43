//! CLI-level errors (wraps infrastructure errors)

use std::process::ExitCode;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    #[error("cannot start the runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("action aborted: {0}")]
    Task(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Exit status for this error. Every failure maps to the same status.
    pub fn exit_code(&self) -> ExitCode {
        crate::exitcode::status(false)
    }
}
