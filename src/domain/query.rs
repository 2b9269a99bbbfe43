//! Query-string encoding of request options for GET-style transport

use itertools::Itertools;
use serde_json::Value;

use crate::domain::document;
use crate::domain::option::OptionBag;
use crate::domain::RequestError;

/// Encode options as `?key=value&...`, in insertion order.
///
/// Strings are percent-encoded, booleans and numbers printed, sequences
/// serialized to a document and then percent-encoded. `null` values are
/// skipped. Mappings cannot be encoded. No options yields `""`.
pub fn query_string(options: &OptionBag) -> Result<String, RequestError> {
    let mut pairs = Vec::with_capacity(options.len());
    for (key, value) in options {
        let encoded = match value {
            Value::Null => continue,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => urlencoding::encode(s).into_owned(),
            Value::Array(_) => urlencoding::encode(&document::to_compact(value)?).into_owned(),
            Value::Object(_) => {
                return Err(RequestError::Encoding {
                    key: key.clone(),
                    type_name: "map",
                })
            }
        };
        pairs.push(format!("{key}={encoded}"));
    }

    if pairs.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("?{}", pairs.iter().join("&")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> OptionBag {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn given_no_options_when_encoding_then_empty() {
        assert_eq!(query_string(&OptionBag::new()).unwrap(), "");
    }

    #[test]
    fn given_only_null_values_when_encoding_then_empty() {
        assert_eq!(query_string(&bag(json!({"a": null}))).unwrap(), "");
    }

    #[test]
    fn given_string_with_reserved_characters_when_encoding_then_escaped() {
        let query = query_string(&bag(json!({"q": "a b&c"}))).unwrap();
        assert_eq!(query, "?q=a%20b%26c");
    }

    #[test]
    fn given_nested_mapping_when_encoding_then_encoding_error() {
        let err = query_string(&bag(json!({"ok": 1, "bad": {"x": 1}}))).unwrap_err();
        match err {
            RequestError::Encoding { key, type_name } => {
                assert_eq!(key, "bad");
                assert_eq!(type_name, "map");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
