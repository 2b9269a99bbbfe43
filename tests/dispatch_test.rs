//! Integration tests for dispatch: arity, hooks, rendering and built-in faces

use std::sync::Arc;

use anyhow::anyhow;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use facecli::application::{ApplicationError, Dispatcher, Resolver};
use facecli::config::Settings;
use facecli::domain::{ActionDescriptor, Output, RenderFormat};
use facecli::faces;
use facecli::infrastructure::di::ServiceContainer;
use facecli::infrastructure::traits::{Face, FaceRegistry};
use facecli::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn node_face() -> Face {
    Face::new("node")
        .action(
            ActionDescriptor::new("pair", |call| {
                Ok(Some(Box::new(call.arguments.join("+")) as Output))
            })
            .argument("left")
            .argument("right"),
        )
        .unwrap()
        .action(ActionDescriptor::new("quiet", |_| Ok(None)))
        .unwrap()
        .action(ActionDescriptor::new("fail", |_| {
            Err(anyhow!("backend down").context("cannot fetch node"))
        }))
        .unwrap()
        .action(
            ActionDescriptor::new("facts", |_| {
                Ok(Some(Box::new(json!({"os": "linux", "cpus": 4})) as Output))
            })
            .when_rendering(RenderFormat::Human, |output, call| {
                let count = output
                    .to_document()
                    .as_object()
                    .map_or(0, |facts| facts.len());
                Ok(Box::new(format!("{} facts for {}", count, call.face)) as Output)
            }),
        )
        .unwrap()
}

fn run(tokens: &[&str]) -> Result<Option<String>, ApplicationError> {
    let container = ServiceContainer::with_deps(
        Settings::default(),
        Arc::new(FaceRegistry::new().register(node_face()).unwrap()),
        Arc::new(faces::payload_catalog()),
    );
    let invocation = container.resolver().resolve("node", &argv(tokens))?;
    container.dispatcher().execute(&invocation)
}

// ============================================================
// Arity
// ============================================================

#[rstest]
#[case(&["pair", "a"], 1)]
#[case(&["pair", "a", "b", "c"], 3)]
#[case(&["pair"], 0)]
fn given_wrong_argument_count_when_executing_then_arity_error(
    #[case] tokens: &[&str],
    #[case] given: usize,
) {
    match run(tokens).unwrap_err() {
        ApplicationError::Arity {
            face,
            action,
            given: actual,
            wanted,
        } => {
            assert_eq!(face, "node");
            assert_eq!(action, "pair");
            assert_eq!(actual, given);
            assert_eq!(wanted, 2);
        }
        other => panic!("expected Arity, got {other:?}"),
    }
}

#[test]
fn given_exact_argument_count_when_executing_then_invoked() {
    assert_eq!(run(&["pair", "a", "b"]).unwrap().as_deref(), Some("a+b"));
}

// ============================================================
// Results
// ============================================================

#[test]
fn given_action_returning_nothing_when_executing_then_nothing_rendered() {
    assert_eq!(run(&["quiet", "x", "y"]).unwrap(), None);
}

#[test]
fn given_failing_action_when_executing_then_action_error_keeps_chain() {
    match run(&["fail"]).unwrap_err() {
        ApplicationError::Action(e) => {
            assert_eq!(e.to_string(), "cannot fetch node");
            assert_eq!(e.root_cause().to_string(), "backend down");
        }
        other => panic!("expected Action, got {other:?}"),
    }
}

#[test]
fn given_hook_for_format_when_rendering_then_hook_applied() {
    assert_eq!(run(&["facts"]).unwrap().as_deref(), Some("2 facts for node"));
}

#[test]
fn given_hook_for_other_format_when_rendering_then_raw_result_rendered() {
    let text = run(&["--render-as", "json", "facts"]).unwrap().unwrap();
    assert_eq!(text, "{\n  \"os\": \"linux\",\n  \"cpus\": 4\n}");
}

#[test]
fn given_result_without_encoder_when_rendering_then_render_error() {
    let err = run(&["--render-as", "toml", "facts"]).unwrap_err();
    assert!(matches!(err, ApplicationError::Render(_)));
}

// ============================================================
// Built-in faces
// ============================================================

fn builtin(face: &str, tokens: &[&str]) -> Result<Option<String>, ApplicationError> {
    let container = ServiceContainer::new(Settings::default()).unwrap();
    let invocation = container.resolver().resolve(face, &argv(tokens))?;
    container.dispatcher().execute(&invocation)
}

#[test]
fn given_setting_override_when_printing_config_then_override_shown() {
    let text = builtin("config", &["--masterport", "8141", "masterport"]).unwrap();
    assert_eq!(text.as_deref(), Some("8141"));
}

#[test]
fn given_toml_render_when_printing_config_then_encoder_used() {
    let text = builtin("config", &["--render-as", "toml", "print"])
        .unwrap()
        .unwrap();
    assert!(text.contains("masterport = 8140"));
    assert!(text.contains("environment = \"production\""));
}

#[test]
fn given_uri_key_when_describing_request_then_addressing_table() {
    let text = builtin(
        "request",
        &["describe", "node", "puppet://h.example.com/web01", "--node", "agent1"],
    )
    .unwrap()
    .unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"server           h.example.com"));
    assert!(lines.contains(&"port             8140"));
    assert!(lines.contains(&"key              web01"));
    assert!(lines.contains(&"remote           true"));
}

#[test]
fn given_raw_render_when_describing_request_then_original_uri() {
    let text = builtin(
        "request",
        &["--render-as", "s", "describe", "node", "puppet://h.example.com/web01"],
    )
    .unwrap();
    assert_eq!(text.as_deref(), Some("puppet://h.example.com/web01"));
}

#[test]
fn given_free_form_options_when_querying_request_then_query_string() {
    let text = builtin(
        "request",
        &["--terminus", "rest", "query", "node", "web01", "--with", "color=red", "--format"],
    )
    .unwrap();
    assert_eq!(text.as_deref(), Some("?terminus=rest&color=red&format=true"));
}

#[test]
fn given_request_when_rendering_document_then_enveloped() {
    let text = builtin("request", &["document", "node", "web01", "--ignore-cache"])
        .unwrap()
        .unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(document["document_type"], "IndirectorRequest");
    assert_eq!(document["data"]["type"], "node");
    assert_eq!(document["data"]["method"], "find");
    assert_eq!(document["data"]["key"], "web01");
    assert_eq!(document["data"]["attributes"]["ignore_cache"], true);
    assert_eq!(document["data"]["attributes"]["environment"], "production");
}

#[test]
fn given_request_arity_mismatch_when_executing_then_arity_error() {
    let err = builtin("request", &["describe", "node"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "facecli request describe takes 2 arguments, but you gave 1"
    );
}

#[test]
fn given_action_option_before_action_word_when_resolving_builtin_then_rejected() {
    let container = ServiceContainer::new(Settings::default()).unwrap();
    let resolver: Resolver = container.resolver();
    let dispatcher: Dispatcher = container.dispatcher();
    let err = resolver
        .resolve("request", &argv(&["--method", "find", "describe", "node", "x"]))
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Parse { .. }));

    let invocation = resolver
        .resolve("request", &argv(&["describe", "--method", "search", "node", "x"]))
        .unwrap();
    assert!(dispatcher.execute(&invocation).unwrap().unwrap().contains("plural           true"));
}
