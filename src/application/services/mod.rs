//! Application services
//!
//! Concrete services that orchestrate resolution and dispatch. They depend on
//! the registry and settings boundary traits but are themselves concrete
//! structs, not traits.

mod dispatcher;
mod resolver;

pub use dispatcher::Dispatcher;
pub use resolver::{application_options, Resolver};
