//! Serialized document form: JSON with a typed envelope
//!
//! Typed values are wrapped as `{"document_type": "<Type>", "data": {...}}`.
//! Non-finite floats serialize as `null` instead of failing, and parsing does
//! not limit nesting depth.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Envelope key naming the type of the wrapped document.
pub const DOCUMENT_TYPE_KEY: &str = "document_type";

/// Envelope key holding the wrapped document.
pub const DATA_KEY: &str = "data";

/// Wrap `data` in a typed envelope.
pub fn wrap(document_type: &str, data: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert(DOCUMENT_TYPE_KEY.into(), Value::from(document_type));
    envelope.insert(DATA_KEY.into(), data);
    Value::Object(envelope)
}

/// Unwrap an envelope of the given type; anything else is returned as-is.
pub fn unwrap<'a>(document: &'a Value, document_type: &str) -> &'a Value {
    match (
        document.get(DOCUMENT_TYPE_KEY).and_then(Value::as_str),
        document.get(DATA_KEY),
    ) {
        (Some(found), Some(data)) if found == document_type => data,
        _ => document,
    }
}

/// Convert a float, mapping NaN and infinities to `null`.
pub fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Compact single-line form.
pub fn to_compact(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Indented multi-line form.
pub fn to_pretty(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Parse a document without a nesting-depth limit.
pub fn parse(text: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_envelope_when_unwrapping_matching_type_then_returns_data() {
        let doc = wrap("IndirectorRequest", json!({"key": "k"}));
        assert_eq!(unwrap(&doc, "IndirectorRequest"), &json!({"key": "k"}));
        assert_eq!(unwrap(&doc, "Other"), &doc);
    }

    #[test]
    fn given_non_finite_float_when_converting_then_null() {
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(f64::INFINITY), Value::Null);
        assert_eq!(number(1.5), json!(1.5));
    }

    #[test]
    fn given_deeply_nested_document_when_parsing_then_no_depth_limit() {
        let depth = 200;
        let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn given_trailing_garbage_when_parsing_then_fails() {
        assert!(parse("{} x").is_err());
    }
}
