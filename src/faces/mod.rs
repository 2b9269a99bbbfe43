//! Built-in faces

pub mod config;
pub mod request;

use std::sync::Arc;

use crate::domain::payload::decode_with;
use crate::domain::{PayloadCatalog, PayloadTypes, Resource};
use crate::infrastructure::traits::FaceRegistry;
use crate::infrastructure::InfraResult;

/// Payload types known to the built-in faces.
pub fn payload_catalog() -> PayloadCatalog {
    PayloadCatalog::new()
        .register("node", decode_with::<Resource>)
        .register("resource", decode_with::<Resource>)
}

/// Registry with every built-in face.
pub fn registry(payload_types: Arc<dyn PayloadTypes>) -> InfraResult<FaceRegistry> {
    FaceRegistry::new()
        .register(config::face()?)?
        .register(request::face(payload_types)?)
}
