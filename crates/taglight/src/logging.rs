//! Tracing setup
//!
//! Stdout may be the response channel, so nothing is ever logged there.
//! With the debug flag set, logs are appended to the debug log file;
//! otherwise only errors reach stderr.

use crate::config::FileConfig;
use eyre::{Result, WrapErr};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides every other filter setting
pub const LOG_ENV: &str = "TAGLIGHT_LOG";

/// The filter directive in effect: environment, then config, then the
/// default for the debug flag
pub fn filter_directive(debug: bool, config: &FileConfig, env: Option<String>) -> String {
    env.filter(|directive| !directive.trim().is_empty())
        .or_else(|| config.log_filter.clone())
        .unwrap_or_else(|| if debug { "debug" } else { "error" }.to_string())
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("error"))
}

/// Install the global subscriber
pub fn init(debug: bool, config: &FileConfig) -> Result<()> {
    let directive = filter_directive(debug, config, std::env::var(LOG_ENV).ok());
    let filter = env_filter(&directive);

    let installed = if debug {
        let path = config.log_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to open debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };
    installed.map_err(|e| eyre::eyre!("Failed to install log subscriber: {e}"))
}
