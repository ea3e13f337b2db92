// src/error.rs
// =============================================================================
// Error types for the crawl engine and the report exporter.
//
// Only failures that stop a crawl live here. A link that cannot be fetched
// is not an error: it ends up inside the report as
// "Could not be checked: ..." and the crawl carries on.
// =============================================================================

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a crawl or an export.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The shared HTTP client could not be built.
    #[error("HTTP client initialization error: {0}")]
    Client(#[source] reqwest::Error),

    /// The base page could not be retrieved at all.
    #[error("Could not fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The base page answered with a 4xx or 5xx status.
    #[error("Could not fetch {url}: server answered with HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The crawl was stopped through its cancellation token.
    #[error("Crawl cancelled before all links were checked")]
    Cancelled,

    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not write report to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
