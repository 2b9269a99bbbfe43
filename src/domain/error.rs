//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised while constructing or serializing a resource request.
///
/// These propagate to the caller; the request model never retries or
/// suppresses them.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("could not understand URL {key}: {reason}")]
    Address { key: String, reason: String },

    #[error("query strings cannot encode option '{key}' of type {type_name}")]
    Encoding {
        key: String,
        type_name: &'static str,
    },

    #[error("malformed request document: {0}")]
    MalformedRequest(String),

    #[error("request for '{collection}' has neither a key nor a payload")]
    MissingIdentity { collection: String },

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),
}
