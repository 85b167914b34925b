//! respsniff - capture network responses from a Chrome tab.
//!
//! Responses go to stdout as JSON lines; logs go to stderr and a daily log file.

mod cli;
mod cmd_capture;
mod cmd_pages;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use respsniff_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console and file output.
///
/// Log files are written to `logging.dir` with daily rotation.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = logging.dir_path();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("respsniff")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer flushing for the life of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let (file_text, file_json) = if logging.json {
        (
            None,
            Some(fmt::layer().json().with_writer(non_blocking).with_ansi(false)),
        )
    } else {
        (
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer on stderr; stdout carries captured responses
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_text)
        .with(file_json)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        config.browser.endpoint = endpoint.clone();
    }
    if let Commands::Capture(args) = &cli.command {
        args.apply(&mut config.capture);
    }

    init_tracing(&config.logging)?;
    debug!("respsniff v{}", env!("CARGO_PKG_VERSION"));

    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }

    match cli.command {
        Commands::Capture(args) => cmd_capture::run(&config, args).await,
        Commands::Pages => cmd_pages::run(&config).await,
    }
}
