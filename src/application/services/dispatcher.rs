//! Invoking a resolved action and rendering its result

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::render::render_result;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::Invocation;

/// Runs invocations against the loaded settings.
pub struct Dispatcher {
    settings: Arc<Settings>,
}

impl Dispatcher {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Loaded settings with the invocation's command-line overrides applied.
    pub fn effective_settings(&self, invocation: &Invocation) -> ApplicationResult<Settings> {
        let mut settings = Settings::clone(&self.settings);
        settings.apply_overrides(&invocation.settings)?;
        Ok(settings)
    }

    /// Check arity, invoke the handler and render what it returned.
    ///
    /// `Ok(None)` means the action produced nothing to print.
    #[instrument(skip_all, fields(face = %invocation.face, action = %invocation.action.name))]
    pub fn execute(&self, invocation: &Invocation) -> ApplicationResult<Option<String>> {
        let settings = self.effective_settings(invocation)?;

        let wanted = invocation.action.arity();
        let given = invocation.arguments.len();
        if wanted > 0 && given != wanted {
            return Err(ApplicationError::Arity {
                face: invocation.face.clone(),
                action: invocation.action.name.clone(),
                given,
                wanted,
            });
        }

        let call = invocation.call(&settings);
        let Some(output) = invocation
            .action
            .invoke(&call)
            .map_err(ApplicationError::Action)?
        else {
            debug!("execute: no result");
            return Ok(None);
        };

        render_result(&invocation.action, &call, invocation.render_format, output).map(Some)
    }
}
