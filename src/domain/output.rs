//! Action results and the formats they can be rendered in

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Named encoders a result may implement.
///
/// This is a closed set: the resolver only ever asks for one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoder {
    /// Plain string form (`s`, `raw`)
    Raw,
    /// TOML document (`toml`)
    Toml,
}

impl Encoder {
    pub fn name(self) -> &'static str {
        match self {
            Encoder::Raw => "s",
            Encoder::Toml => "toml",
        }
    }
}

/// Output encoding applied to an action's return value before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderFormat {
    /// Console rendering: scalars as-is, mappings as aligned tables
    #[default]
    Human,
    /// Serialized document (JSON)
    Document,
    /// Encoder provided by the result itself
    Named(Encoder),
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" | "console" => Ok(RenderFormat::Human),
            "json" | "pson" | "document" => Ok(RenderFormat::Document),
            "s" | "raw" => Ok(RenderFormat::Named(Encoder::Raw)),
            "toml" => Ok(RenderFormat::Named(Encoder::Toml)),
            other => Err(format!("I don't know how to render '{other}'")),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderFormat::Human => write!(f, "console"),
            RenderFormat::Document => write!(f, "json"),
            RenderFormat::Named(encoder) => write!(f, "{}", encoder.name()),
        }
    }
}

/// Anything an action can hand back for printing.
pub trait Render: fmt::Debug + Send {
    /// Structured form used by the human and document formats.
    fn to_document(&self) -> Value;

    /// Encoder capability; `None` means the result cannot be rendered that way.
    fn encode(&self, _encoder: Encoder) -> Option<String> {
        None
    }
}

/// Boxed action result.
pub type Output = Box<dyn Render>;

impl Render for Value {
    fn to_document(&self) -> Value {
        self.clone()
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        match (encoder, self) {
            (Encoder::Raw, Value::String(s)) => Some(s.clone()),
            (Encoder::Raw, other) => Some(other.to_string()),
            (Encoder::Toml, _) => None,
        }
    }
}

impl Render for String {
    fn to_document(&self) -> Value {
        Value::String(self.clone())
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        match encoder {
            Encoder::Raw => Some(self.clone()),
            Encoder::Toml => None,
        }
    }
}

impl Render for i64 {
    fn to_document(&self) -> Value {
        Value::from(*self)
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        matches!(encoder, Encoder::Raw).then(|| self.to_string())
    }
}

impl Render for f64 {
    fn to_document(&self) -> Value {
        crate::domain::document::number(*self)
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        matches!(encoder, Encoder::Raw).then(|| self.to_string())
    }
}

impl Render for bool {
    fn to_document(&self) -> Value {
        Value::Bool(*self)
    }
}
