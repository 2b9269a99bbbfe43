//! Domain layer: actions, options, results and resource requests
//!
//! This layer does no I/O and knows nothing about the command line parser.

pub mod action;
pub mod address;
pub mod document;
pub mod error;
pub mod option;
pub mod output;
pub mod payload;
pub mod query;
pub mod request;

pub use action::{ActionCall, ActionDescriptor, AppOptions, Invocation, RunMode};
pub use address::Addressing;
pub use error::RequestError;
pub use option::{ArgumentKind, OptionBag, OptionSpec};
pub use output::{Encoder, Output, Render, RenderFormat};
pub use payload::{Payload, PayloadCatalog, PayloadTypes, Resource};
pub use request::{Extra, Method, Request, Subject};
