use clap::Parser;
use steptree::cli::args::Cli;
use steptree::cli::commands::execute_command;
use steptree::cli::output;
use steptree::config::Settings;
use steptree::exitcode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.project_dir.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&e);
            std::process::exit(exitcode::CONFIG);
        }
    };

    setup_logging(cli.debug, &settings.log_filter);

    if let Err(e) = execute_command(&cli, &settings) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

/// `-d` flags win over the configured filter directive.
fn setup_logging(verbosity: u8, log_filter: &str) {
    let filter = match verbosity {
        0 => EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::default().add_directive(LevelFilter::INFO.into()),
        2 => EnvFilter::default().add_directive(LevelFilter::DEBUG.into()),
        3 => EnvFilter::default().add_directive(LevelFilter::TRACE.into()),
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            EnvFilter::default().add_directive(LevelFilter::TRACE.into())
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    tracing::debug!(verbosity, "logging initialised");
}
