use std::io;
use std::process::ExitCode;

use clap::Parser;
use facecli::cli::commands::{execute_invocation, report, report_failure, trace_flag};
use facecli::cli::help::render_help;
use facecli::cli::{output, Cli, CliError, CliResult, Commands};
use facecli::config::Settings;
use facecli::domain::{AppOptions, RunMode};
use facecli::infrastructure::di::ServiceContainer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let trace = match &cli.command {
        Commands::Face(argv) => trace_flag(argv).unwrap_or(false),
        Commands::Help { .. } => false,
    };

    match run(cli) {
        Ok(success) => facecli::exitcode::status(success),
        Err(e) => {
            report_failure(&e, trace, &mut io::stderr());
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> CliResult<bool> {
    let settings = Settings::load()?;
    let container = ServiceContainer::new(settings)?;

    match cli.command {
        Commands::Help { face, action } => {
            setup_logging(&AppOptions::default());
            let text = render_help(
                container.registry.as_ref(),
                container.settings.as_ref(),
                face.as_deref(),
                action.as_deref(),
            )?;
            output::info(&text);
            Ok(true)
        }
        Commands::Face(argv) => {
            let Some((face, rest)) = argv.split_first() else {
                return Err(CliError::Usage("no face given".to_string()));
            };
            let invocation = match container.resolver().resolve(face, rest) {
                Ok(invocation) => invocation,
                Err(e) => {
                    let trace = trace_flag(rest).unwrap_or(container.settings.trace);
                    report(&e, trace, &mut io::stderr());
                    return Ok(false);
                }
            };
            setup_logging(&invocation.app);
            if invocation.app.mode != RunMode::User {
                output::warning(&format!(
                    "run mode {:?} has no effect here, continuing as user",
                    invocation.app.mode
                ));
            }
            execute_invocation(&container, invocation)
        }
    }
}

fn setup_logging(app: &AppOptions) {
    tracing::debug!("INIT: Attempting logger init from main.rs");

    let filter = match (app.verbose, app.debug) {
        (false, false) => LevelFilter::WARN,
        (true, false) => LevelFilter::INFO,
        (false, true) => LevelFilter::DEBUG,
        (true, true) => LevelFilter::TRACE,
    };

    // Dependencies only log at warn and above
    let noisy_modules = ["tokio", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
            || *metadata.level() <= tracing::Level::WARN
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
