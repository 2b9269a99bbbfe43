//! Infrastructure layer: collaborator boundaries and DI container
//!
//! This layer defines the registry and settings traits and wires up the
//! services that depend on them.

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
