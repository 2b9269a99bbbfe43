//! Option schemas contributed by faces, actions, settings and the application

use indexmap::IndexMap;
use serde_json::Value;

/// Parsed option values keyed by option name, in command-line order.
pub type OptionBag = IndexMap<String, Value>;

/// Whether an option consumes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Boolean switch
    None,
    /// `--name VALUE` or `--name=VALUE`
    Required,
    /// `--name [VALUE]`
    Optional,
}

impl ArgumentKind {
    pub fn takes_value(self) -> bool {
        !matches!(self, ArgumentKind::None)
    }
}

/// How a command-line token spelled an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    /// `--name` or `-n`: a value, if any, is the next token
    Separate,
    /// `--name=value`, `-n=value` or `-nvalue`
    Inline,
}

/// One command-line option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Key under which the parsed value lands in the option bag
    pub name: String,
    /// Long spelling without the leading dashes
    pub long: String,
    pub short: Option<char>,
    pub argument: ArgumentKind,
    /// Placeholder shown in help output
    pub value_name: Option<String>,
    pub summary: String,
}

impl OptionSpec {
    fn build(name: &str, argument: ArgumentKind, value_name: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            long: name.replace('_', "-"),
            short: None,
            argument,
            value_name: value_name.map(str::to_string),
            summary: String::new(),
        }
    }

    /// A boolean switch.
    pub fn flag(name: &str) -> Self {
        Self::build(name, ArgumentKind::None, None)
    }

    /// An option with a mandatory argument.
    pub fn value(name: &str, value_name: &str) -> Self {
        Self::build(name, ArgumentKind::Required, Some(value_name))
    }

    /// An option whose argument may be omitted.
    pub fn optional_value(name: &str, value_name: &str) -> Self {
        Self::build(name, ArgumentKind::Optional, Some(value_name))
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn long(mut self, long: &str) -> Self {
        self.long = long.to_string();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// Check whether `token` spells this option.
    ///
    /// `-` and `_` are interchangeable in long names. Short options accept
    /// an attached value only when the option takes one.
    pub fn spelled_by(&self, token: &str) -> Option<Spelling> {
        let (flag, inline) = match token.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (token, false),
        };

        if let Some(body) = flag.strip_prefix("--") {
            if !body.is_empty() && normalize(body) == normalize(&self.long) {
                return Some(if inline {
                    Spelling::Inline
                } else {
                    Spelling::Separate
                });
            }
        }

        let short = self.short?;
        let mut chars = token.chars();
        if chars.next() != Some('-') || chars.next() != Some(short) {
            return None;
        }
        match chars.as_str() {
            "" => Some(Spelling::Separate),
            _ if self.argument.takes_value() => Some(Spelling::Inline),
            _ => None,
        }
    }

    /// Synopsis fragment for help output, e.g. `--render-as FORMAT`.
    pub fn synopsis(&self) -> String {
        let mut out = match self.short {
            Some(short) => format!("-{short}|--{}", self.long),
            None => format!("--{}", self.long),
        };
        let value_name = self.value_name.as_deref().unwrap_or("VALUE");
        match self.argument {
            ArgumentKind::None => {}
            ArgumentKind::Required => out.push_str(&format!(" {value_name}")),
            ArgumentKind::Optional => out.push_str(&format!(" [{value_name}]")),
        }
        out
    }
}

fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

/// The flag part of a token, without any inline value.
pub fn flag_of(token: &str) -> &str {
    token.split_once('=').map_or(token, |(flag, _)| flag)
}
