//! Turning action results into text
//!
//! `Human` output is a terminal-friendly table, `Document` is pretty JSON and
//! named encoders are asked of the result itself.

use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::action::ActionCall;
use crate::domain::document;
use crate::domain::{ActionDescriptor, Output, RenderFormat};

/// Terminal width the human table is laid out for.
pub const LINE_WIDTH: usize = 79;

/// Run the format's render hook, if any, then render.
pub fn render_result(
    action: &ActionDescriptor,
    call: &ActionCall<'_>,
    format: RenderFormat,
    output: Output,
) -> ApplicationResult<String> {
    let output = match action.hook(format) {
        Some(hook) => {
            debug!("render_result: running {} hook of '{}'", format, action.name);
            hook(output, call).map_err(ApplicationError::Action)?
        }
        None => output,
    };
    render(&output, format)
}

pub fn render(output: &Output, format: RenderFormat) -> ApplicationResult<String> {
    match format {
        RenderFormat::Human => Ok(render_human(&output.to_document())),
        RenderFormat::Document => document::to_pretty(&output.to_document())
            .map_err(|e| ApplicationError::Render(e.to_string())),
        RenderFormat::Named(encoder) => output.encode(encoder).ok_or_else(|| {
            ApplicationError::Render(format!(
                "this result cannot be rendered as '{}'",
                encoder.name()
            ))
        }),
    }
}

/// Human form of a document value.
pub fn render_human(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) if !map.is_empty() => render_table(map),
        other => pretty(other),
    }
}

fn render_table(map: &Map<String, Value>) -> String {
    let column_a = map.keys().map(|k| k.chars().count()).max().unwrap_or(0) + 2;
    let column_b = LINE_WIDTH.saturating_sub(column_a).max(1);
    let indent = format!("\n{}", " ".repeat(column_a));

    map.iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .map(|(key, value)| {
            let lines = value_lines(value, column_b);
            format!("{key:<column_a$}{}", lines.join(&indent))
        })
        .join("\n")
}

fn value_lines(value: &Value, width: usize) -> Vec<String> {
    match value {
        Value::String(text) => wrap(text, width),
        other => {
            let compact = other.to_string();
            if compact.chars().count() <= width {
                vec![compact]
            } else {
                pretty(other).lines().map(str::to_string).collect()
            }
        }
    }
}

fn pretty(value: &Value) -> String {
    document::to_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = line.chars().count() + word.chars().count() + usize::from(!line.is_empty());
            if !line.is_empty() && needed > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
