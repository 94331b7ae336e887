//! Wave Probe - Main CLI Application
//!
//! Issues raw HTTP GET requests in bounded concurrent waves and prints one
//! line per request to stdout.

use clap::{error::ErrorKind, Parser};
use std::process;
use wave_probe::{
    cli::{supports_color, Cli, USAGE},
    config::{display_config_summary, load_config, validate_config, ValidationLevel},
    error::Result,
    logging::Logger,
    output::{OutputCoordinator, OutputFormatterFactory},
    AppError, WaveScheduler, BUILD_TIME, GIT_COMMIT, PKG_NAME, VERSION,
};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version print and exit 0 the usual way
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => exit_with_error(AppError::from(e), supports_color()),
    };
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        exit_with_error(e, use_color);
    }
}

/// Print the error (and usage line for bad input) to stderr and exit
fn exit_with_error(error: AppError, use_color: bool) -> ! {
    eprintln!("{}", error.format_for_console(use_color));

    if error.is_usage_error() {
        eprintln!("{}", USAGE);
    }

    process::exit(error.exit_code());
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(cli)?;

    let logger = Logger::with_config("MAIN", &config);
    logger.start_session().await;
    logger.add_context_field("destination", config.destination.to_string()).await;

    if config.debug {
        eprintln!("{} v{} (built {}, commit {})", PKG_NAME, VERSION, BUILD_TIME, GIT_COMMIT.unwrap_or("unknown"));
        eprint!("{}", display_config_summary(&config));
    }

    for warning in validate_config(&config)? {
        match warning.level {
            ValidationLevel::Warning => logger.warn(&warning.message).log().await,
            ValidationLevel::Info => logger.info(&warning.message).log().await,
        }
    }

    let coordinator = OutputCoordinator::stdout(OutputFormatterFactory::from_config(&config));
    let scheduler = WaveScheduler::from_config(&config).with_logger(logger.child("SCHED"));

    let summary = scheduler
        .run(config.total_requests, config.concurrency, &coordinator)
        .await?;

    if config.summary {
        eprintln!("{}", coordinator.render_summary(&summary));
    }

    Ok(())
}
