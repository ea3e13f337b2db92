// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Run the crawl (Ctrl-C cancels it)
// 4. Print the summary or JSON report, optionally save it
// 5. Exit with proper code (0 = all safe, 1 = issues found, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - header rules, evaluator, link extraction
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the crawl engine
mod error; // src/error.rs - error types
mod logging; // src/logging.rs - tracing setup
mod report; // src/report.rs - the report and its text/JSON forms

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use crawl::{CrawlConfig, Crawler};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every checked URL passed every rule
//   Ok(1) = at least one issue found
//   Err = the crawl could not run (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    if cli.list_rules {
        print_rules();
        return Ok(0);
    }

    logging::init_logging()?;

    let base_url = cli::normalize_url(cli.url.as_deref().unwrap_or_default())?;

    let config = CrawlConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..CrawlConfig::default()
    };

    // Ctrl-C flips the token; the crawler checks it around every request
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping crawl");
            on_ctrl_c.cancel();
        }
    });

    let crawler = Crawler::new(&config)?.with_cancellation(cancel);
    let report = crawler.crawl(&base_url).await?;

    if cli.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        for line in report.summary_lines() {
            println!("{}", line);
        }
    }

    if let Some(path) = &cli.output {
        report.export(path)?;
        info!(path = %path.display(), "JSON report written");
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

// Prints the rule catalogue, one rule per line
fn print_rules() {
    for (index, rule) in checker::HEADER_RULES.iter().enumerate() {
        println!("{:>2}. {:<30} {}", index + 1, rule.name, rule.issue);
    }
}
