// src/logging.rs
// =============================================================================
// Sets up `tracing` output for the CLI.
//
// Log lines go to stderr so `--json` output on stdout stays machine-readable.
// The level comes from RUST_LOG, then HEADER_CRAWLER_LOGLEVEL, and defaults
// to info for this crate only.
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "HEADER_CRAWLER_LOGLEVEL";

fn default_directive() -> String {
    format!("{}=info", env!("CARGO_CRATE_NAME"))
}

// Picks the filter directive: RUST_LOG wins over our own variable
fn log_directive(rust_log: Option<String>, crate_log: Option<String>) -> String {
    rust_log
        .or(crate_log)
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(default_directive)
}

pub fn init_logging() -> Result<()> {
    let directive = log_directive(std::env::var("RUST_LOG").ok(), std::env::var(LOG_ENV).ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Logger initialization error: {}", e))
}
