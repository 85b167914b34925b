//! CLI definitions for respsniff.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use respsniff_config::CaptureConfig;

/// respsniff CLI.
#[derive(Parser)]
#[command(name = "respsniff")]
#[command(about = "Capture network responses from a Chrome tab over the DevTools protocol")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.respsniff/config.toml if present)
    #[arg(short, long, global = true, env = "RESPSNIFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// DevTools HTTP endpoint, overrides browser.endpoint
    #[arg(long, global = true, env = "RESPSNIFF_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a page and print matching responses as JSON lines
    Capture(CaptureArgs),

    /// List open browser targets
    Pages,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CaptureArgs {
    /// Page to navigate to once capture is running
    pub url: String,

    /// URL glob pattern, repeatable (e.g. "*/api/*")
    #[arg(short, long = "pattern")]
    pub patterns: Vec<String>,

    /// Number of responses to capture
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Skip response bodies
    #[arg(long)]
    pub no_body: bool,

    /// Only accept these status codes, repeatable
    #[arg(long)]
    pub status: Vec<u16>,

    /// Only accept MIME types containing this text
    #[arg(long)]
    pub mime: Option<String>,

    /// Seconds to wait for each response, overrides capture.timeout_secs
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Body fetch attempts, overrides capture.body_attempts
    #[arg(long)]
    pub body_attempts: Option<u32>,

    /// Quiet period in milliseconds, overrides capture.quiet_period_ms
    #[arg(long)]
    pub quiet_period_ms: Option<u64>,

    /// Attach to an existing target instead of opening a new tab
    #[arg(long)]
    pub target: Option<String>,

    /// Leave the opened tab running afterwards
    #[arg(long)]
    pub keep_open: bool,
}

impl CaptureArgs {
    /// Apply command-line overrides to the capture configuration.
    pub(crate) fn apply(&self, capture: &mut CaptureConfig) {
        if let Some(timeout) = self.timeout {
            capture.timeout_secs = timeout;
        }
        if let Some(attempts) = self.body_attempts {
            capture.body_attempts = attempts;
        }
        if let Some(quiet_period_ms) = self.quiet_period_ms {
            capture.quiet_period_ms = quiet_period_ms;
        }
        if !self.patterns.is_empty() {
            capture.patterns = self.patterns.clone();
        }
    }
}
