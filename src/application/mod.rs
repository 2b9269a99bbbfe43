//! Application layer: resolution, dispatch and rendering
//!
//! This layer orchestrates domain logic and depends on the registry and
//! settings boundary traits.

pub mod error;
pub mod render;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::{Dispatcher, Resolver};
