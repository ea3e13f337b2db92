// src/crawl/mod.rs
// =============================================================================
// This module runs the crawl itself.
//
// Features:
// - One hop only: the base page and the links on it, nothing further
// - One shared HTTP client, one request in flight at a time
// - Per-link failures are recorded in the report instead of aborting
// - Cancellable between (and during) link fetches
// =============================================================================

mod engine;

// Re-export the crawl engine
pub use engine::{CrawlConfig, Crawler, DEFAULT_TIMEOUT};
