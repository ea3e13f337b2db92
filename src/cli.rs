// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The CLI is deliberately thin: take a URL, run the crawl, print or save
// the report. All the real work lives in checker/ and crawl/.
// =============================================================================

use crate::crawl::DEFAULT_TIMEOUT;
use crate::report::DEFAULT_REPORT_FILE;
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "header-crawler",
    version,
    about = "Crawl a web page and audit the security headers of the page and every link on it",
    long_about = "header-crawler fetches a page, tests its HTTP response headers against a fixed \
                  list of security best practices, then does the same for every link on the page."
)]
pub struct Cli {
    /// URL of the page to crawl (e.g., https://example.com)
    ///
    /// "http://" is added when no scheme is given.
    /// Required unless --list-rules is used.
    #[arg(required_unless_present = "list_rules")]
    pub url: Option<String>,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to a file
    ///
    /// `--output` alone writes header_vulnerability_report.json
    #[arg(long, short, num_args = 0..=1, default_missing_value = DEFAULT_REPORT_FILE)]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Print the header rules and exit
    #[arg(long)]
    pub list_rules: bool,
}

// Cleans up what the user typed
//
// Examples:
//   "  example.com " -> "http://example.com"
//   "https://a.com"  -> "https://a.com"
//   ""               -> error
pub fn normalize_url(input: &str) -> Result<String> {
    let input = input.trim();

    if input.is_empty() {
        bail!("Please enter a URL.");
    }

    if input.starts_with("http") {
        Ok(input.to_string())
    } else {
        Ok(format!("http://{}", input))
    }
}
