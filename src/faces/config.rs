//! `config` face: inspect the effective settings

use anyhow::bail;
use serde_json::{Map, Value};

use crate::config::{global_config_path, Settings};
use crate::domain::{ActionCall, ActionDescriptor, Output};
use crate::infrastructure::traits::{Face, SettingsCatalog};
use crate::infrastructure::InfraResult;

pub fn face() -> InfraResult<Face> {
    Face::new("config")
        .summary("Inspect the effective configuration")
        .action(
            ActionDescriptor::new("print", print)
                .summary("Print settings, all of them or the ones named")
                .default_action(),
        )?
        .action(
            ActionDescriptor::new("template", |_| {
                Ok(Some(Box::new(Settings::template()) as Output))
            })
            .summary("Print a commented configuration file template"),
        )?
        .action(ActionDescriptor::new("path", path).summary("Print the global config file location"))
}

fn print(call: &ActionCall<'_>) -> anyhow::Result<Option<Output>> {
    let settings = call.settings;
    match call.arguments {
        [] => Ok(Some(Box::new(settings.clone()))),
        [name] => Ok(Some(Box::new(lookup(settings, name)?))),
        names => {
            let mut values = Map::new();
            for name in names {
                values.insert(name.clone(), lookup(settings, name)?);
            }
            Ok(Some(Box::new(Value::Object(values))))
        }
    }
}

fn lookup(settings: &Settings, name: &str) -> anyhow::Result<Value> {
    match settings.value(name) {
        Some(value) => Ok(value),
        None => bail!("unknown setting '{name}'"),
    }
}

fn path(_call: &ActionCall<'_>) -> anyhow::Result<Option<Output>> {
    match global_config_path() {
        Some(path) => Ok(Some(Box::new(path.display().to_string()))),
        None => bail!("cannot determine the configuration directory"),
    }
}
