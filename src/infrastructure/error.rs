//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Errors from wiring up the registry and its collaborators.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("face '{0}' is already registered")]
    DuplicateFace(String),

    #[error("face '{face}' already has an action named '{action}'")]
    DuplicateAction { face: String, action: String },

    #[error("face '{face}' has two default actions: '{first}' and '{second}'")]
    MultipleDefaults {
        face: String,
        first: String,
        second: String,
    },
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
