//! Integration tests for result rendering

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use facecli::application::render::{render, render_human, LINE_WIDTH};
use facecli::application::ApplicationError;
use facecli::config::Settings;
use facecli::domain::{Encoder, Output, RenderFormat};
use facecli::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[test]
fn given_mapping_when_human_then_sorted_two_column_table() {
    let rendered = render_human(&json!({"b": "x", "alpha": 1}));
    assert_eq!(rendered, "alpha  1\nb      x");
}

#[test]
fn given_nested_value_too_wide_when_human_then_pretty_with_hanging_indent() {
    let tags: Vec<String> = (0..20).map(|i| format!("tag-number-{i}")).collect();
    let rendered = render_human(&json!({"id": 7, "tags": tags}));
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "id    7");
    assert_eq!(lines[1], "tags  [");
    assert_eq!(lines[2], "        \"tag-number-0\",");
    assert_eq!(*lines.last().unwrap(), "      ]");
}

#[test]
fn given_nested_value_that_fits_when_human_then_compact_on_one_line() {
    let rendered = render_human(&json!({"tags": ["a", "b"]}));
    assert_eq!(rendered, "tags  [\"a\",\"b\"]");
}

#[test]
fn given_long_string_when_human_then_wrapped_within_line_width() {
    let text = "lorem ipsum dolor sit amet ".repeat(8);
    let rendered = render_human(&json!({"description": text.trim()}));

    for line in rendered.lines().skip(1) {
        assert!(line.starts_with(&" ".repeat(13)));
    }
    assert!(rendered.lines().all(|line| line.chars().count() <= LINE_WIDTH));
}

#[rstest]
#[case(json!("as is"), "as is")]
#[case(json!(3.5), "3.5")]
#[case(json!({}), "{}")]
#[case(json!(null), "null")]
fn given_non_table_values_when_human_then_plain(
    #[case] value: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render_human(&value), expected);
}

#[test]
fn given_non_finite_float_when_document_then_null() {
    let output: Output = Box::new(f64::NAN);
    assert_eq!(render(&output, RenderFormat::Document).unwrap(), "null");
}

#[test]
fn given_settings_when_named_toml_then_encoded() {
    let output: Output = Box::new(Settings::default());
    let text = render(&output, RenderFormat::Named(Encoder::Toml)).unwrap();
    assert!(text.contains("trace = false"));
}

#[test]
fn given_value_without_toml_when_named_then_render_error() {
    let output: Output = Box::new(json!([1, 2]));
    let err = render(&output, RenderFormat::Named(Encoder::Toml)).unwrap_err();
    assert!(matches!(err, ApplicationError::Render(_)));
}

#[test]
fn given_string_when_named_raw_then_unchanged() {
    let output: Output = Box::new("plain".to_string());
    assert_eq!(
        render(&output, RenderFormat::Named(Encoder::Raw)).unwrap(),
        "plain"
    );
}
