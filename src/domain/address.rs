//! URI-shaped request keys
//!
//! A key such as `puppet://server/certname` or
//! `https://server:8141/production/catalog/web01` carries addressing
//! information. Decomposing it yields the server, port, protocol and
//! environment, and rewrites the key to the resource-local part.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::domain::RequestError;

/// Protocol whose URIs address resources directly by path.
pub const DEFAULT_PROTOCOL: &str = "puppet";

/// Port used for [`DEFAULT_PROTOCOL`] URIs without an explicit port.
pub const DEFAULT_PORT: u16 = 8140;

/// Addressing defaults taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    /// Registered protocol scheme
    pub protocol: String,
    /// Default port for the registered protocol
    pub default_port: u16,
}

impl Default for Addressing {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            default_port: DEFAULT_PORT,
        }
    }
}

/// Result of decomposing a URI key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// The original key, retained for display
    pub uri: String,
    /// Resource-local key, if the URI had one
    pub key: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub environment: Option<String>,
}

impl Addressing {
    pub fn new(protocol: impl Into<String>, default_port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            default_port,
        }
    }

    /// Split a URI key into its addressing fields.
    ///
    /// - `file://` URIs become plain filesystem paths.
    /// - The registered protocol uses the whole path as the key.
    /// - Other schemes read the path as `environment/qualifier/key`; the
    ///   qualifier is positional filler and is dropped.
    pub fn decompose(&self, key: &str) -> Result<Address, RequestError> {
        let url = Url::parse(key).map_err(|e| RequestError::Address {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let mut address = Address {
            uri: key.to_string(),
            ..Address::default()
        };

        if url.scheme() == "file" {
            let path = url.to_file_path().map_err(|()| RequestError::Address {
                key: key.to_string(),
                reason: "not a local file path".to_string(),
            })?;
            address.key = Some(path.to_string_lossy().into_owned());
            return Ok(address);
        }

        let registered = url.scheme() == self.protocol;
        address.server = url.host_str().map(str::to_string);
        address.port = match url.port_or_known_default() {
            Some(port) => Some(port),
            None if registered => Some(self.default_port),
            None => None,
        };
        address.protocol = Some(url.scheme().to_string());

        let raw_path = url.path();
        let path = urlencoding::decode(raw_path.strip_prefix('/').unwrap_or(raw_path))
            .map_err(|e| RequestError::Address {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if registered {
            address.key = Some(path.into_owned());
            debug!("decompose: {} -> key={:?}", key, address.key);
            return Ok(address);
        }

        let mut segments = path.splitn(3, '/');
        address.environment = segments
            .next()
            .filter(|env| !env.is_empty())
            .map(str::to_string);
        let _qualifier = segments.next();
        address.key = segments.next().map(str::to_string);
        debug!(
            "decompose: {} -> environment={:?} key={:?}",
            key, address.environment, address.key
        );
        Ok(address)
    }
}

static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+://").expect("static scheme pattern"));

static ABSOLUTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/|[A-Za-z]:[\\/]|\\\\)").expect("static absolute path pattern")
});

/// Whether a key should be decomposed as a URI.
///
/// A key is URI-shaped when it starts with `word://`. Absolute filesystem
/// paths never are, whatever they contain.
pub fn is_uri_key(key: &str) -> bool {
    URI_SCHEME.is_match(key) && !is_absolute_path(key)
}

/// POSIX (`/x`), drive-letter (`C:\x`, `C:/x`) and UNC (`\\host\x`) paths.
pub fn is_absolute_path(key: &str) -> bool {
    ABSOLUTE_PATH.is_match(key)
}
