//! `facecli help [face [action]]`

use std::fmt::Write;

use crate::application::services::application_options;
use crate::application::ApplicationError;
use crate::domain::OptionSpec;
use crate::infrastructure::traits::{ActionRegistry, SettingsCatalog};
use crate::APP_NAME;

use super::CliResult;

/// Help text for the whole application, one face, or one action.
pub fn render_help(
    registry: &dyn ActionRegistry,
    settings: &dyn SettingsCatalog,
    face: Option<&str>,
    action: Option<&str>,
) -> CliResult<String> {
    match (face, action) {
        (None, _) => Ok(overview(registry)),
        (Some(face), None) => face_help(registry, settings, face),
        (Some(face), Some(action)) => action_help(registry, face, action),
    }
}

fn overview(registry: &dyn ActionRegistry) -> String {
    let faces = registry.faces();
    let width = faces.iter().map(String::len).max().unwrap_or(0) + 2;

    let mut out = format!("Usage: {APP_NAME} <face> [options] [action] [arguments]\n\n");
    out.push_str("Available faces:\n");
    for face in &faces {
        let summary = registry.face_summary(face).unwrap_or_default();
        let _ = writeln!(out, "  {face:<width$}{summary}");
    }
    let _ = write!(out, "\nSee '{APP_NAME} help <face>' for more information on a face.");
    out
}

fn face_help(
    registry: &dyn ActionRegistry,
    settings: &dyn SettingsCatalog,
    face: &str,
) -> CliResult<String> {
    let Some(summary) = registry.face_summary(face) else {
        return Err(ApplicationError::UnknownFace(face.to_string()).into());
    };

    let mut out = format!("{APP_NAME} {face}: {summary}\n\n");
    let _ = writeln!(out, "USAGE: {APP_NAME} {face} [options] <action> [arguments]");

    let face_options = registry.face_options(face);
    if !face_options.is_empty() {
        out.push_str("\nOPTIONS:\n");
        out.push_str(&option_table(&face_options));
    }

    let global: Vec<OptionSpec> = settings
        .settings()
        .into_iter()
        .map(|setting| {
            let spec = if setting.boolean {
                OptionSpec::flag(&setting.name).long(&format!("[no-]{}", setting.name))
            } else {
                OptionSpec::value(&setting.name, &setting.name.to_uppercase())
            };
            spec.summary(&setting.summary)
        })
        .chain(application_options())
        .collect();
    out.push_str("\nGLOBAL OPTIONS:\n");
    out.push_str(&option_table(&global));

    out.push_str("\nACTIONS:\n");
    let actions = registry.actions(face);
    let width = actions.iter().map(|a| a.name.len()).max().unwrap_or(0) + 2;
    for action in &actions {
        let marker = if action.default { " (default)" } else { "" };
        let _ = writeln!(out, "  {:<width$}{}{marker}", action.name, action.summary);
    }
    let _ = write!(
        out,
        "\nSee '{APP_NAME} help {face} <action>' for help on a specific action."
    );
    Ok(out)
}

fn action_help(registry: &dyn ActionRegistry, face: &str, action: &str) -> CliResult<String> {
    if registry.face_summary(face).is_none() {
        return Err(ApplicationError::UnknownFace(face.to_string()).into());
    }
    let Some(descriptor) = registry.find_action(face, action) else {
        return Err(ApplicationError::NoAction {
            face: face.to_string(),
            action: Some(action.to_string()),
        }
        .into());
    };

    let mut out = format!("USAGE: {APP_NAME} {}\n", descriptor.synopsis(face));
    if !descriptor.summary.is_empty() {
        let _ = writeln!(out, "\n{}", descriptor.summary);
    }
    let mut options = registry.face_options(face);
    options.extend(descriptor.options.iter().cloned());
    if !options.is_empty() {
        out.push_str("\nOPTIONS:\n");
        out.push_str(&option_table(&options));
    }
    Ok(out.trim_end().to_string())
}

fn option_table(options: &[OptionSpec]) -> String {
    let rows: Vec<(String, &str)> = options
        .iter()
        .map(|option| (option.synopsis(), option.summary.as_str()))
        .collect();
    let width = rows.iter().map(|(s, _)| s.len()).max().unwrap_or(0) + 2;

    rows.iter()
        .map(|(synopsis, summary)| format!("  {synopsis:<width$}{summary}").trim_end().to_string() + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::{ActionDescriptor, OptionSpec};
    use crate::infrastructure::traits::{Face, FaceRegistry};

    fn registry() -> FaceRegistry {
        let face = Face::new("node")
            .summary("Nodes")
            .option(OptionSpec::value("terminus", "NAME"))
            .action(
                ActionDescriptor::new("find", |_| Ok(None))
                    .summary("Find a node")
                    .option(OptionSpec::flag("verbose_find"))
                    .argument("key"),
            )
            .unwrap();
        FaceRegistry::new().register(face).unwrap()
    }

    #[test]
    fn given_no_face_when_help_then_lists_faces() {
        let text = render_help(&registry(), &Settings::default(), None, None).unwrap();
        assert!(text.contains("  node  Nodes"));
    }

    #[test]
    fn given_face_when_help_then_lists_actions_and_options() {
        let text = render_help(&registry(), &Settings::default(), Some("node"), None).unwrap();
        assert!(text.contains("--terminus NAME"));
        assert!(text.contains("--[no-]trace"));
        assert!(text.contains("-d|--debug"));
        assert!(text.contains("  find  Find a node"));
    }

    #[test]
    fn given_action_when_help_then_synopsis() {
        let text =
            render_help(&registry(), &Settings::default(), Some("node"), Some("find")).unwrap();
        assert!(text.starts_with("USAGE: facecli node find [--verbose-find] <key>"));
    }

    #[test]
    fn given_unknown_action_when_help_then_error() {
        assert!(render_help(&registry(), &Settings::default(), Some("node"), Some("x")).is_err());
        assert!(render_help(&registry(), &Settings::default(), Some("nope"), None).is_err());
    }
}
