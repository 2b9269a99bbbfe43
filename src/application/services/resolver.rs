//! Command-line resolution
//!
//! Resolution runs in two passes. Actions contribute their own options, so
//! the option schema is unknown until the action is. Pass one finds the
//! action word while skipping every option it can already recognise; pass two
//! builds a parser from the full schema and parses the whole command line.

use std::sync::Arc;

use clap::builder::EnumValueParser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::option::{flag_of, Spelling};
use crate::domain::{
    ActionDescriptor, AppOptions, ArgumentKind, Invocation, OptionBag, OptionSpec, RunMode,
};
use crate::infrastructure::traits::{ActionRegistry, SettingsCatalog};

const ARGUMENTS_ID: &str = "arguments";

/// The application's own options, accepted by every face.
pub fn application_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::flag("debug")
            .short('d')
            .summary("Enable full debugging"),
        OptionSpec::flag("verbose")
            .short('v')
            .summary("Enable verbose output"),
        OptionSpec::value("render_as", "FORMAT")
            .summary("Render the result as human, json, s or toml"),
        OptionSpec::value("mode", "RUNMODE")
            .short('r')
            .summary("Run mode: user, agent or server"),
    ]
}

/// Where a parsed option value goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    App,
    /// A global setting; `negated` for the `--no-` spelling of a boolean
    Setting { name: String, negated: bool },
    Option,
}

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    spec: OptionSpec,
    target: Target,
}

/// Resolves a face's command line into an [`Invocation`].
pub struct Resolver {
    registry: Arc<dyn ActionRegistry>,
    settings: Arc<dyn SettingsCatalog>,
}

impl Resolver {
    pub fn new(registry: Arc<dyn ActionRegistry>, settings: Arc<dyn SettingsCatalog>) -> Self {
        Self { registry, settings }
    }

    #[instrument(skip(self), level = "debug")]
    pub fn resolve(&self, face: &str, argv: &[String]) -> ApplicationResult<Invocation> {
        if !self.registry.faces().iter().any(|f| f == face) {
            return Err(ApplicationError::UnknownFace(face.to_string()));
        }

        let word = self.discover_action(face, argv)?;
        let found = word
            .as_deref()
            .and_then(|word| self.registry.find_action(face, word));

        let (action, is_default_action) = match found {
            Some(action) => (action, false),
            None => match self.registry.default_action(face) {
                Some(action) => {
                    debug!("resolve: substituting default action '{}'", action.name);
                    (action, true)
                }
                None => {
                    return Err(ApplicationError::NoAction {
                        face: face.to_string(),
                        action: word,
                    })
                }
            },
        };

        self.parse_invocation(face, action, is_default_action, argv)
    }

    /// Find the action word without knowing the action's options.
    ///
    /// Only face options, settings and application options are recognised;
    /// any other flag fails the run.
    pub fn discover_action(&self, face: &str, argv: &[String]) -> ApplicationResult<Option<String>> {
        let known = self.discovery_options(face);
        let mut index = 0;

        while let Some(token) = argv.get(index) {
            if token == "--" {
                return Ok(argv.get(index + 1).cloned());
            }
            if !token.starts_with('-') || token == "-" {
                debug!("discover_action: action word '{}'", token);
                return Ok(Some(token.clone()));
            }

            let (spec, spelling) = known
                .iter()
                .find_map(|spec| spec.spelled_by(token).map(|spelling| (spec, spelling)))
                .or_else(|| short_cluster(&known, token))
                .ok_or_else(|| ApplicationError::Parse {
                    token: flag_of(token).to_string(),
                    message: "unrecognized option".to_string(),
                })?;

            if spec.argument.takes_value() && spelling == Spelling::Separate {
                let next_is_flag = argv
                    .get(index + 1)
                    .is_some_and(|next| next.starts_with('-'));
                if !(spec.argument == ArgumentKind::Optional && next_is_flag) {
                    index += 1;
                }
            }
            index += 1;
        }

        Ok(None)
    }

    /// Parse the whole command line against the full option schema.
    pub fn parse_invocation(
        &self,
        face: &str,
        action: Arc<ActionDescriptor>,
        is_default_action: bool,
        argv: &[String],
    ) -> ApplicationResult<Invocation> {
        let slots = self.slots(face, &action);

        let command = slots.iter().fold(
            Command::new(face.to_string())
                .no_binary_name(true)
                .disable_help_flag(true)
                .disable_version_flag(true)
                .args_override_self(true)
                .arg(
                    Arg::new(ARGUMENTS_ID)
                        .action(ArgAction::Append)
                        .num_args(1..)
                        .value_name("ARGUMENT"),
                ),
            |command, slot| command.arg(to_arg(slot)),
        );

        let matches = command.try_get_matches_from(argv).map_err(parse_error)?;

        let mut app = AppOptions::default();
        let mut found: Vec<(usize, &Slot, Value)> = Vec::new();
        for slot in &slots {
            if matches.value_source(&slot.id) != Some(ValueSource::CommandLine) {
                continue;
            }
            if slot.target == Target::App {
                apply_app_option(&mut app, slot, &matches)?;
                continue;
            }
            let index = matches.index_of(&slot.id).unwrap_or(usize::MAX);
            found.push((index, slot, option_value(slot, &matches)));
        }
        found.sort_by_key(|(index, _, _)| *index);

        let mut options = OptionBag::new();
        let mut settings = OptionBag::new();
        for (_, slot, value) in found {
            match &slot.target {
                Target::Setting { name, negated } => {
                    let value = if slot.spec.argument.takes_value() {
                        value
                    } else {
                        Value::Bool(!negated)
                    };
                    settings.insert(name.clone(), value);
                }
                _ => {
                    options.insert(slot.spec.name.clone(), value);
                }
            }
        }

        let mut arguments: Vec<String> = matches
            .get_many::<String>(ARGUMENTS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        if !is_default_action {
            if let Some(position) = arguments.iter().position(|a| *a == action.name) {
                arguments.remove(position);
            }
        }

        let render_format = app
            .render_as
            .or(action.render_as)
            .unwrap_or_default();

        debug!(
            "parse_invocation: {} {} arguments={:?} options={:?} settings={:?}",
            face, action.name, arguments, options, settings
        );

        Ok(Invocation {
            face: face.to_string(),
            action,
            is_default_action,
            render_format,
            arguments,
            options,
            settings,
            app,
        })
    }

    /// Options recognisable before the action is known.
    ///
    /// Same order and duplicate handling as the full schema, so both passes
    /// agree on which option a token spells.
    fn discovery_options(&self, face: &str) -> Vec<OptionSpec> {
        self.schema(face, &[]).into_iter().map(|slot| slot.spec).collect()
    }

    fn setting_options(&self) -> Vec<(OptionSpec, Target)> {
        self.settings
            .settings()
            .into_iter()
            .flat_map(|setting| {
                if setting.boolean {
                    vec![
                        (
                            OptionSpec::flag(&setting.name).summary(&setting.summary),
                            Target::Setting {
                                name: setting.name.clone(),
                                negated: false,
                            },
                        ),
                        (
                            OptionSpec::flag(&format!("no_{}", setting.name)),
                            Target::Setting {
                                name: setting.name,
                                negated: true,
                            },
                        ),
                    ]
                } else {
                    let value_name = setting.name.to_uppercase();
                    vec![(
                        OptionSpec::value(&setting.name, &value_name).summary(&setting.summary),
                        Target::Setting {
                            name: setting.name,
                            negated: false,
                        },
                    )]
                }
            })
            .collect()
    }

    /// The full schema of an action.
    fn slots(&self, face: &str, action: &ActionDescriptor) -> Vec<Slot> {
        self.schema(face, &action.options)
    }

    /// Built-in, setting, face and then `action_options`, in that order,
    /// with duplicate spellings dropped.
    fn schema(&self, face: &str, action_options: &[OptionSpec]) -> Vec<Slot> {
        let groups = application_options()
            .into_iter()
            .map(|spec| (spec, Target::App))
            .chain(self.setting_options())
            .chain(
                self.registry
                    .face_options(face)
                    .into_iter()
                    .chain(action_options.iter().cloned())
                    .map(|spec| (spec, Target::Option)),
            );

        let mut slots: Vec<Slot> = Vec::new();
        for (mut spec, target) in groups {
            if slots.iter().any(|slot| slot.spec.long == spec.long) {
                warn!("option --{} is already defined, ignoring duplicate", spec.long);
                continue;
            }
            if let Some(short) = spec.short {
                if slots.iter().any(|slot| slot.spec.short == Some(short)) {
                    warn!("option -{} is already defined, dropping it from --{}", short, spec.long);
                    spec.short = None;
                }
            }
            let id = match &target {
                Target::App => format!("app:{}", spec.name),
                Target::Setting { .. } => format!("setting:{}", spec.name),
                Target::Option => format!("option:{}", spec.name),
            };
            if slots.iter().any(|slot| slot.id == id) {
                warn!("option '{}' is already defined, ignoring --{}", spec.name, spec.long);
                continue;
            }
            slots.push(Slot { id, spec, target });
        }
        slots
    }
}

/// Match a cluster of short flags such as `-dv` or `-dvrserver`.
///
/// Each character up to the first value-taking option must be a known
/// switch; that option takes the rest of the token as its value, or the
/// next token when nothing follows it. The returned spec is the one that
/// decides whether the next token is consumed.
fn short_cluster<'a>(known: &'a [OptionSpec], token: &str) -> Option<(&'a OptionSpec, Spelling)> {
    let body = token.strip_prefix('-').filter(|body| !body.starts_with('-'))?;
    for (index, short) in body.char_indices() {
        let spec = known.iter().find(|spec| spec.short == Some(short))?;
        let rest = &body[index + short.len_utf8()..];
        if rest.is_empty() {
            return Some((spec, Spelling::Separate));
        }
        if spec.argument.takes_value() {
            return Some((spec, Spelling::Inline));
        }
    }
    None
}

fn to_arg(slot: &Slot) -> Arg {
    let spec = &slot.spec;
    let mut arg = Arg::new(slot.id.clone()).long(spec.long.clone());
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    if !spec.summary.is_empty() {
        arg = arg.help(spec.summary.clone());
    }
    if let Some(value_name) = &spec.value_name {
        arg = arg.value_name(value_name.clone());
    }
    arg = match spec.argument {
        ArgumentKind::None => arg.action(ArgAction::SetTrue),
        ArgumentKind::Required => arg
            .action(ArgAction::Set)
            .num_args(1)
            .allow_hyphen_values(true),
        ArgumentKind::Optional => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .default_missing_value(""),
    };
    if slot.target == Target::App && spec.name == "mode" {
        arg = arg.value_parser(EnumValueParser::<RunMode>::new());
    }
    arg
}

fn apply_app_option(app: &mut AppOptions, slot: &Slot, matches: &ArgMatches) -> ApplicationResult<()> {
    match slot.spec.name.as_str() {
        "debug" => app.debug = matches.get_flag(&slot.id),
        "verbose" => app.verbose = matches.get_flag(&slot.id),
        "mode" => {
            if let Some(mode) = matches.get_one::<RunMode>(&slot.id) {
                app.mode = *mode;
            }
        }
        "render_as" => {
            if let Some(name) = matches.get_one::<String>(&slot.id) {
                app.render_as = Some(name.parse().map_err(ApplicationError::Render)?);
            }
        }
        other => debug!("apply_app_option: ignoring '{}'", other),
    }
    Ok(())
}

fn option_value(slot: &Slot, matches: &ArgMatches) -> Value {
    match slot.spec.argument {
        ArgumentKind::None => Value::Bool(true),
        _ => match matches.get_one::<String>(&slot.id) {
            Some(value) if !value.is_empty() => Value::String(value.clone()),
            _ => Value::Bool(true),
        },
    }
}

fn parse_error(err: clap::Error) -> ApplicationError {
    let context = |kind: ContextKind| match err.get(kind) {
        Some(ContextValue::String(value)) => Some(value.clone()),
        _ => None,
    };
    let argument = context(ContextKind::InvalidArg).unwrap_or_default();
    let (token, message) = match err.kind() {
        ErrorKind::InvalidValue => (
            context(ContextKind::InvalidValue).unwrap_or_default(),
            format!("invalid value for {}", flag_of(&argument)),
        ),
        ErrorKind::UnknownArgument => (argument, "unrecognized option".to_string()),
        kind => (
            argument,
            kind.as_str().unwrap_or("invalid command line").to_string(),
        ),
    };
    ApplicationError::Parse { token, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::{Face, FaceRegistry, SettingDescriptor};

    struct NoSettings;

    impl SettingsCatalog for NoSettings {
        fn settings(&self) -> Vec<SettingDescriptor> {
            vec![SettingDescriptor::boolean("trace", "")]
        }

        fn value(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    fn resolver() -> Resolver {
        let face = Face::new("node")
            .action(
                ActionDescriptor::new("find", |_| Ok(None))
                    .option(OptionSpec::optional_value("format", "NAME")),
            )
            .unwrap();
        let registry = FaceRegistry::new().register(face).unwrap();
        Resolver::new(Arc::new(registry), Arc::new(NoSettings))
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn given_value_option_before_action_when_discovering_then_value_skipped() {
        let word = resolver()
            .discover_action("node", &argv(&["--render-as", "json", "find"]))
            .unwrap();
        assert_eq!(word.as_deref(), Some("find"));
    }

    #[test]
    fn given_double_dash_when_discovering_then_next_token_is_action() {
        let word = resolver()
            .discover_action("node", &argv(&["--", "find"]))
            .unwrap();
        assert_eq!(word.as_deref(), Some("find"));
    }

    #[test]
    fn given_action_option_before_action_when_discovering_then_parse_error() {
        let err = resolver()
            .discover_action("node", &argv(&["--format", "find"]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Parse { ref token, .. } if token == "--format"));
    }

    #[test]
    fn given_negated_boolean_setting_when_parsing_then_override_false() {
        let invocation = resolver()
            .resolve("node", &argv(&["find", "--no-trace", "x"]))
            .unwrap();
        assert_eq!(invocation.settings.get("trace"), Some(&Value::Bool(false)));
        assert_eq!(invocation.arguments, vec!["x".to_string()]);
    }

    #[test]
    fn given_short_flag_cluster_when_resolving_then_placement_does_not_matter() {
        let before = resolver()
            .resolve("node", &argv(&["-dv", "find", "x"]))
            .unwrap();
        let after = resolver()
            .resolve("node", &argv(&["find", "-dv", "x"]))
            .unwrap();

        for invocation in [before, after] {
            assert_eq!(invocation.action.name, "find");
            assert!(invocation.app.debug);
            assert!(invocation.app.verbose);
            assert_eq!(invocation.arguments, vec!["x".to_string()]);
        }
    }

    #[test]
    fn given_cluster_ending_in_value_option_when_discovering_then_value_handled() {
        let attached = resolver()
            .resolve("node", &argv(&["-dragent", "find"]))
            .unwrap();
        assert_eq!(attached.action.name, "find");
        assert_eq!(attached.app.mode, RunMode::Agent);

        let separate = resolver()
            .resolve("node", &argv(&["-vr", "server", "find"]))
            .unwrap();
        assert_eq!(separate.action.name, "find");
        assert_eq!(separate.app.mode, RunMode::Server);
    }

    #[test]
    fn given_cluster_with_unknown_short_when_discovering_then_parse_error() {
        let err = resolver()
            .discover_action("node", &argv(&["-dz", "find"]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Parse { ref token, .. } if token == "-dz"));
    }

    #[test]
    fn given_optional_value_without_value_when_parsing_then_true() {
        let invocation = resolver()
            .resolve("node", &argv(&["find", "--format"]))
            .unwrap();
        assert_eq!(invocation.options.get("format"), Some(&Value::Bool(true)));
    }
}
