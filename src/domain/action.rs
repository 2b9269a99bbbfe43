//! Actions exposed by faces, and the state of one invocation

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use itertools::Itertools;

use crate::config::Settings;
use crate::domain::option::{OptionBag, OptionSpec};
use crate::domain::output::{Output, RenderFormat};

/// What a handler sees of the current run.
#[derive(Debug)]
pub struct ActionCall<'a> {
    pub face: &'a str,
    pub action: &'a str,
    /// Positional arguments, action word removed
    pub arguments: &'a [String],
    pub options: &'a OptionBag,
    /// Effective settings, command-line overrides applied
    pub settings: &'a Settings,
}

/// Business logic of an action. `None` prints nothing.
pub type Handler = Arc<dyn Fn(&ActionCall<'_>) -> anyhow::Result<Option<Output>> + Send + Sync>;

/// Transforms a raw result before it is rendered in one format.
pub type RenderHook = Arc<dyn Fn(Output, &ActionCall<'_>) -> anyhow::Result<Output> + Send + Sync>;

/// A named operation of a face.
#[derive(Clone)]
pub struct ActionDescriptor {
    pub name: String,
    pub summary: String,
    /// Action-specific options, registered only once the action is known
    pub options: Vec<OptionSpec>,
    /// Names of required positional arguments; their count is the arity
    pub arguments: Vec<String>,
    pub default: bool,
    /// Preferred render format when none is requested
    pub render_as: Option<RenderFormat>,
    hooks: HashMap<RenderFormat, RenderHook>,
    handler: Handler,
}

impl ActionDescriptor {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&ActionCall<'_>) -> anyhow::Result<Option<Output>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            summary: String::new(),
            options: Vec::new(),
            arguments: Vec::new(),
            default: false,
            render_as: None,
            hooks: HashMap::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Declare a required positional argument.
    pub fn argument(mut self, name: &str) -> Self {
        self.arguments.push(name.to_string());
        self
    }

    /// Mark as the face's default action.
    pub fn default_action(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn render_as(mut self, format: RenderFormat) -> Self {
        self.render_as = Some(format);
        self
    }

    /// Register a hook run on the result before rendering it as `format`.
    pub fn when_rendering<F>(mut self, format: RenderFormat, hook: F) -> Self
    where
        F: Fn(Output, &ActionCall<'_>) -> anyhow::Result<Output> + Send + Sync + 'static,
    {
        self.hooks.insert(format, Arc::new(hook));
        self
    }

    /// Number of required positional arguments. Zero accepts any number.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn hook(&self, format: RenderFormat) -> Option<&RenderHook> {
        self.hooks.get(&format)
    }

    pub fn invoke(&self, call: &ActionCall<'_>) -> anyhow::Result<Option<Output>> {
        (self.handler)(call)
    }

    /// One-line usage, e.g. `request describe [--method METHOD] <collection> <key>`.
    pub fn synopsis(&self, face: &str) -> String {
        let options = self
            .options
            .iter()
            .map(|option| format!("[{}]", option.synopsis()));
        let arguments = self.arguments.iter().map(|argument| format!("<{argument}>"));
        std::iter::once(face.to_string())
            .chain(std::iter::once(self.name.clone()))
            .chain(options)
            .chain(arguments)
            .join(" ")
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .field("default", &self.default)
            .field("render_as", &self.render_as)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Run mode selected with `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    #[default]
    User,
    Agent,
    Server,
}

/// Values of the application's own built-in options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub debug: bool,
    pub verbose: bool,
    pub mode: RunMode,
    pub render_as: Option<RenderFormat>,
}

/// Everything resolved from one command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub face: String,
    pub action: Arc<ActionDescriptor>,
    /// No action word was given; the face's default was substituted
    pub is_default_action: bool,
    pub render_format: RenderFormat,
    /// Leftover positional tokens
    pub arguments: Vec<String>,
    /// Face and action option values
    pub options: OptionBag,
    /// Global setting overrides given on the command line
    pub settings: OptionBag,
    pub app: AppOptions,
}

impl Invocation {
    pub fn call<'a>(&'a self, settings: &'a Settings) -> ActionCall<'a> {
        ActionCall {
            face: &self.face,
            action: &self.action.name,
            arguments: &self.arguments,
            options: &self.options,
            settings,
        }
    }
}
