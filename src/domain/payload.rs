//! Payloads: domain objects carried by save-style requests

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RequestError;

/// An opaque domain object with its own identity.
pub trait Payload: fmt::Debug + Send + Sync {
    /// Identity used as the request key when none is given.
    fn name(&self) -> &str;

    /// Document form embedded as a request's `instance`.
    fn to_document(&self) -> Value;
}

/// Rebuilds a payload from its document form.
pub type PayloadDecoder = fn(&Value) -> Result<Arc<dyn Payload>, RequestError>;

/// Lookup of the payload type registered for a collection.
pub trait PayloadTypes: Send + Sync {
    fn decoder(&self, collection: &str) -> Option<PayloadDecoder>;
}

/// In-memory payload type lookup.
#[derive(Default, Clone)]
pub struct PayloadCatalog {
    decoders: HashMap<String, PayloadDecoder>,
}

impl PayloadCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, collection: &str, decoder: PayloadDecoder) -> Self {
        self.decoders.insert(collection.to_string(), decoder);
        self
    }
}

impl PayloadTypes for PayloadCatalog {
    fn decoder(&self, collection: &str) -> Option<PayloadDecoder> {
        self.decoders.get(collection).copied()
    }
}

/// Decoder for any serde-deserializable payload type.
///
/// ```ignore
/// PayloadCatalog::new().register("node", decode_with::<Resource>)
/// ```
pub fn decode_with<T>(document: &Value) -> Result<Arc<dyn Payload>, RequestError>
where
    T: Payload + DeserializeOwned + 'static,
{
    let payload: T = serde_json::from_value(document.clone())
        .map_err(|e| RequestError::MalformedRequest(format!("instance: {e}")))?;
    Ok(Arc::new(payload))
}

/// Generic named resource: a name plus free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

impl Payload for Resource {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
