//! Resource requests: one addressable operation against a named collection
//!
//! A request identifies its target either by key or by payload. URI-shaped
//! keys are decomposed into server, port, protocol and environment (see
//! [`crate::domain::address`]). Requests round-trip through a document form so
//! they can cross a transport boundary.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::address::{self, Addressing};
use crate::domain::document;
use crate::domain::option::OptionBag;
use crate::domain::output::{Encoder, Render};
use crate::domain::payload::{Payload, PayloadTypes};
use crate::domain::query;
use crate::domain::RequestError;

/// Document type tag of a serialized request.
pub const REQUEST_DOCUMENT_TYPE: &str = "IndirectorRequest";

/// Operation performed against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Find,
    Search,
    Save,
    Destroy,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Find => "find",
            Method::Search => "search",
            Method::Save => "save",
            Method::Destroy => "destroy",
            Method::Head => "head",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find" => Ok(Method::Find),
            "search" => Ok(Method::Search),
            "save" => Ok(Method::Save),
            "destroy" => Ok(Method::Destroy),
            "head" => Ok(Method::Head),
            other => Err(RequestError::MalformedRequest(format!(
                "unknown method '{other}'"
            ))),
        }
    }
}

/// Third constructor argument: the key, or the payload itself.
#[derive(Debug, Clone)]
pub enum Subject {
    Key(String),
    Payload(Arc<dyn Payload>),
}

impl From<&str> for Subject {
    fn from(key: &str) -> Self {
        Subject::Key(key.to_string())
    }
}

impl From<String> for Subject {
    fn from(key: String) -> Self {
        Subject::Key(key)
    }
}

impl From<Arc<dyn Payload>> for Subject {
    fn from(payload: Arc<dyn Payload>) -> Self {
        Subject::Payload(payload)
    }
}

/// Fourth constructor argument: the options bag, or a payload.
#[derive(Debug, Clone)]
pub enum Extra {
    Options(OptionBag),
    Payload(Arc<dyn Payload>),
}

impl Default for Extra {
    fn default() -> Self {
        Extra::Options(OptionBag::new())
    }
}

impl From<OptionBag> for Extra {
    fn from(options: OptionBag) -> Self {
        Extra::Options(options)
    }
}

impl From<Arc<dyn Payload>> for Extra {
    fn from(payload: Arc<dyn Payload>) -> Self {
        Extra::Payload(payload)
    }
}

/// Option names lifted out of the options bag into dedicated fields.
pub const WELL_KNOWN_ATTRIBUTES: [&str; 8] = [
    "ip",
    "node",
    "authenticated",
    "ignore_terminus",
    "ignore_cache",
    "use_cache",
    "instance",
    "environment",
];

/// An addressable operation against a named resource collection.
#[derive(Debug, Clone)]
pub struct Request {
    collection: String,
    method: Method,
    key: String,
    payload: Option<Arc<dyn Payload>>,
    options: OptionBag,
    uri: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    environment: Option<String>,
    node: Option<String>,
    ip: Option<String>,
    authenticated: bool,
    ignore_cache: bool,
    ignore_terminus: bool,
    use_cache: Option<bool>,
}

impl Request {
    /// Build a request.
    ///
    /// `subject` is the key or, failing that, the payload; `extra` is the
    /// options bag or a payload (options then stay empty). A payload passed
    /// as `extra` wins over one passed as `subject`. Without a key, the
    /// payload's name becomes the key.
    pub fn new(
        addressing: &Addressing,
        collection: impl Into<String>,
        method: Method,
        subject: impl Into<Subject>,
        extra: impl Into<Extra>,
    ) -> Result<Self, RequestError> {
        let collection = collection.into();
        let (mut options, mut payload) = match extra.into() {
            Extra::Options(options) => (options, None),
            Extra::Payload(payload) => (OptionBag::new(), Some(payload)),
        };

        let key = match subject.into() {
            Subject::Key(key) => Some(key),
            Subject::Payload(p) => {
                payload.get_or_insert(p);
                None
            }
        };

        let mut request = Self {
            collection,
            method,
            key: String::new(),
            payload,
            options: OptionBag::new(),
            uri: None,
            server: None,
            port: None,
            protocol: None,
            environment: None,
            node: None,
            ip: None,
            authenticated: false,
            ignore_cache: false,
            ignore_terminus: false,
            use_cache: None,
        };
        request.take_attributes(&mut options)?;
        request.options = options;

        let key = match key {
            Some(key) if address::is_uri_key(&key) => request.apply_uri_key(addressing, &key)?,
            other => other,
        };

        request.key = match (key, &request.payload) {
            (Some(key), _) => key,
            (None, Some(payload)) => payload.name().to_string(),
            (None, None) => {
                return Err(RequestError::MissingIdentity {
                    collection: request.collection,
                })
            }
        };
        debug!("request: {} {}", request.method, request);
        Ok(request)
    }

    /// Rebuild a request from its document form (bare or enveloped).
    pub fn from_document(
        addressing: &Addressing,
        payload_types: &dyn PayloadTypes,
        document: &Value,
    ) -> Result<Self, RequestError> {
        let data = document::unwrap(document, REQUEST_DOCUMENT_TYPE);
        let field = |name: &str, what: &str| {
            data.get(name).and_then(Value::as_str).ok_or_else(|| {
                RequestError::MalformedRequest(format!("no {what} provided in document"))
            })
        };
        let collection = field("type", "collection name")?;
        let method: Method = field("method", "method name")?.parse()?;
        let key = field("key", "key")?;

        let options: OptionBag = match data.get("attributes") {
            None | Some(Value::Null) => OptionBag::new(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(_) => {
                return Err(RequestError::MalformedRequest(
                    "attributes must be a mapping".to_string(),
                ))
            }
        };

        let mut request = Self::new(addressing, collection, method, key, options)?;

        if let Some(instance) = data.get("instance").filter(|v| !v.is_null()) {
            let decode = payload_types.decoder(collection).ok_or_else(|| {
                RequestError::MalformedRequest(format!(
                    "no payload type registered for '{collection}'"
                ))
            })?;
            request.payload = Some(decode(instance)?);
        }
        Ok(request)
    }

    /// Parse a serialized request.
    pub fn from_json(
        addressing: &Addressing,
        payload_types: &dyn PayloadTypes,
        text: &str,
    ) -> Result<Self, RequestError> {
        Self::from_document(addressing, payload_types, &document::parse(text)?)
    }

    /// Move the well-known attributes out of `options` into fields.
    ///
    /// An `instance` option has no type to decode into, so anything but
    /// `null` is rejected; payloads are passed as `Extra::Payload` or read
    /// back through `from_document`.
    fn take_attributes(&mut self, options: &mut OptionBag) -> Result<(), RequestError> {
        for name in WELL_KNOWN_ATTRIBUTES {
            let Some(value) = options.shift_remove(name) else {
                continue;
            };
            match name {
                "instance" if !value.is_null() => {
                    return Err(RequestError::MalformedRequest(format!(
                        "'instance' option for '{}' is untyped; pass the payload itself",
                        self.collection
                    )))
                }
                "ip" => self.ip = text(&value),
                "node" => self.node = text(&value),
                "authenticated" => self.authenticated = truthy(&value),
                "ignore_terminus" => self.ignore_terminus = truthy(&value),
                "ignore_cache" => self.ignore_cache = truthy(&value),
                "use_cache" => self.use_cache = Some(truthy(&value)),
                "environment" => self.environment = text(&value),
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_uri_key(
        &mut self,
        addressing: &Addressing,
        key: &str,
    ) -> Result<Option<String>, RequestError> {
        let address = addressing.decompose(key)?;
        self.uri = Some(address.uri);
        self.server = address.server;
        self.port = address.port;
        self.protocol = address.protocol;
        if address.environment.is_some() {
            self.environment = address.environment;
        }
        Ok(address.key)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key escaped for use as a URL path segment.
    pub fn escaped_key(&self) -> String {
        urlencoding::encode(&self.key).into_owned()
    }

    pub fn payload(&self) -> Option<&Arc<dyn Payload>> {
        self.payload.as_ref()
    }

    pub fn options(&self) -> &OptionBag {
        &self.options
    }

    /// The original URI, when the key was one.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn set_environment(&mut self, environment: impl Into<String>) {
        self.environment = Some(environment.into());
    }

    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn set_node(&mut self, node: impl Into<String>) {
        self.node = Some(node.into());
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn set_ip(&mut self, ip: impl Into<String>) {
        self.ip = Some(ip.into());
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    pub fn set_ignore_cache(&mut self, ignore: bool) {
        self.ignore_cache = ignore;
    }

    pub fn set_ignore_terminus(&mut self, ignore: bool) {
        self.ignore_terminus = ignore;
    }

    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.use_cache = Some(use_cache);
    }

    pub fn is_plural(&self) -> bool {
        self.method == Method::Search
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn should_ignore_cache(&self) -> bool {
        self.ignore_cache
    }

    pub fn should_ignore_terminus(&self) -> bool {
        self.ignore_terminus
    }

    pub fn should_use_cache(&self) -> bool {
        self.use_cache.unwrap_or(true)
    }

    /// Issued on behalf of a remote client.
    pub fn is_remote(&self) -> bool {
        self.node.is_some() || self.ip.is_some()
    }

    /// Options encoded as a URL query component.
    pub fn query_string(&self) -> Result<String, RequestError> {
        query::query_string(&self.options)
    }

    /// Well-known attributes that are set, in declaration order.
    fn attributes(&self) -> Vec<(&'static str, Value)> {
        let mut attributes = Vec::new();
        if let Some(ip) = &self.ip {
            attributes.push(("ip", Value::from(ip.as_str())));
        }
        if let Some(node) = &self.node {
            attributes.push(("node", Value::from(node.as_str())));
        }
        if self.authenticated {
            attributes.push(("authenticated", Value::Bool(true)));
        }
        if self.ignore_terminus {
            attributes.push(("ignore_terminus", Value::Bool(true)));
        }
        if self.ignore_cache {
            attributes.push(("ignore_cache", Value::Bool(true)));
        }
        if let Some(use_cache) = self.use_cache {
            attributes.push(("use_cache", Value::Bool(use_cache)));
        }
        if let Some(environment) = &self.environment {
            attributes.push(("environment", Value::from(environment.as_str())));
        }
        attributes
    }

    /// Free-form options merged with the set well-known attributes.
    ///
    /// Used as header/metadata fields by network transports.
    pub fn to_hash(&self) -> OptionBag {
        let mut result = self.options.clone();
        for (name, value) in self.attributes() {
            result.insert(name.to_string(), value);
        }
        result
    }

    /// Bare document form: `{type, method, key, attributes?, instance?}`.
    pub fn to_document(&self) -> Value {
        let mut data = Map::new();
        data.insert("type".into(), Value::from(self.collection.as_str()));
        data.insert("method".into(), Value::from(self.method.as_str()));
        data.insert("key".into(), Value::from(self.key.as_str()));

        let mut attributes: Map<String, Value> = self
            .attributes()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        for (name, value) in &self.options {
            attributes.insert(name.clone(), value.clone());
        }
        if !attributes.is_empty() {
            data.insert("attributes".into(), Value::Object(attributes));
        }
        if let Some(payload) = &self.payload {
            data.insert("instance".into(), payload.to_document());
        }
        Value::Object(data)
    }

    /// Serialized, enveloped document.
    pub fn to_json(&self) -> Result<String, RequestError> {
        let envelope = document::wrap(REQUEST_DOCUMENT_TYPE, self.to_document());
        Ok(document::to_compact(&envelope)?)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            Some(uri) => f.write_str(uri),
            None => write!(f, "/{}/{}", self.collection, self.key),
        }
    }
}

impl Render for Request {
    fn to_document(&self) -> Value {
        Request::to_document(self)
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        match encoder {
            Encoder::Raw => Some(self.to_string()),
            Encoder::Toml => None,
        }
    }
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
