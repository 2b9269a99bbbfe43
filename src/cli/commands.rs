//! Running a resolved invocation and reporting its outcome

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};

use tokio::task::JoinError;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::domain::Invocation;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::APP_NAME;

enum Outcome {
    Finished(Result<ApplicationResult<Option<String>>, JoinError>),
    Interrupted,
}

/// Run the action, racing it against ctrl-c.
///
/// Returns whether the run succeeded. An interrupt counts as success.
pub fn execute_invocation(container: &ServiceContainer, invocation: Invocation) -> CliResult<bool> {
    execute_until(
        container,
        invocation,
        tokio::signal::ctrl_c(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
}

/// Run the action until it finishes or `interrupt` resolves.
///
/// Rendered results go to `out`, failures to `err`. If `interrupt` fails the
/// action simply runs to completion.
#[instrument(skip_all, fields(face = %invocation.face, action = %invocation.action.name))]
pub fn execute_until<F>(
    container: &ServiceContainer,
    invocation: Invocation,
    interrupt: F,
    out: &mut impl Write,
    err: &mut impl Write,
) -> CliResult<bool>
where
    F: Future<Output = io::Result<()>>,
{
    let dispatcher = container.dispatcher();
    let trace = dispatcher
        .effective_settings(&invocation)
        .map_or(container.settings.trace, |settings| settings.trace);
    let face = invocation.face.clone();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let outcome = runtime.block_on(async move {
        let mut task = tokio::task::spawn_blocking(move || dispatcher.execute(&invocation));
        tokio::select! {
            joined = &mut task => Outcome::Finished(joined),
            signal = interrupt => match signal {
                Ok(()) => Outcome::Interrupted,
                Err(e) => {
                    warn!("cannot listen for interrupts: {}", e);
                    Outcome::Finished(task.await)
                }
            },
        }
    });

    match outcome {
        Outcome::Interrupted => {
            output::write_info(out, &format!("Cancelling {face}"));
            runtime.shutdown_background();
            Ok(true)
        }
        Outcome::Finished(Err(e)) => Err(CliError::Task(e.to_string())),
        Outcome::Finished(Ok(Ok(rendered))) => {
            match rendered {
                Some(text) => output::write_info(out, &text),
                None => debug!("execute_until: nothing to print"),
            }
            Ok(true)
        }
        Outcome::Finished(Ok(Err(e))) => {
            report(&e, trace, err);
            Ok(false)
        }
    }
}

/// Print a failed run. Arity errors get a usage hint; with `trace`, the
/// error's causes follow the message.
pub fn report(err: &ApplicationError, trace: bool, out: &mut impl Write) {
    output::write_error(out, err);
    if let ApplicationError::Arity { face, action, .. } = err {
        output::write_hint(out, &format!("Try '{APP_NAME} help {face} {action}' for usage"));
        return;
    }
    if trace {
        for cause in causes(err) {
            output::write_hint(out, &format!("caused by: {cause}"));
        }
    }
}

/// Print a failure that ended the run before or around dispatch.
pub fn report_failure(err: &CliError, trace: bool, out: &mut impl Write) {
    match err {
        CliError::Infra(InfraError::Application(e)) => report(e, trace, out),
        other => {
            output::write_error(out, other);
            if trace {
                for cause in source_chain(other) {
                    output::write_hint(out, &format!("caused by: {cause}"));
                }
            }
        }
    }
}

/// The `--trace`/`--no-trace` choice on a face command line, if any.
///
/// Read before the command line is resolved, so failures to resolve it can
/// still honour the flag. The last spelling wins; `--` ends the scan.
pub fn trace_flag(argv: &[String]) -> Option<bool> {
    argv.iter()
        .take_while(|token| *token != "--")
        .filter_map(|token| match token.replace('_', "-").as_str() {
            "--trace" => Some(true),
            "--no-trace" => Some(false),
            _ => None,
        })
        .last()
}

fn causes(err: &ApplicationError) -> Vec<String> {
    match err {
        ApplicationError::Action(e) => e.chain().skip(1).map(ToString::to_string).collect(),
        other => source_chain(other),
    }
}

fn source_chain(err: &dyn Error) -> Vec<String> {
    std::iter::successors(err.source(), |&e| e.source())
        .map(ToString::to_string)
        .collect()
}
