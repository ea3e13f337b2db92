// src/report.rs
// =============================================================================
// The structured result of one crawl, plus the two ways we hand it out:
// - summary_lines(): plain text lines for a terminal or any other front end
// - to_json_pretty() / export(): indented JSON for saving to disk
//
// The JSON has exactly four top-level fields:
//   base_url, links, header_test_results, vulnerabilities
//
// Rust concepts:
// - serde derive: Serialize/Deserialize generated from the struct definition
// - IndexMap: a map that iterates in insertion order (HashMap does not)
// =============================================================================

use crate::checker::ALL_HEADERS_SAFE;
use crate::error::CrawlError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file name used when exporting a report.
pub const DEFAULT_REPORT_FILE: &str = "header_vulnerability_report.json";

pub const HEADER_RESULTS_HEADING: &str = "Header test results:";
pub const VULNERABLE_LINKS_HEADING: &str = "Links vulnerable due to missing headers:";
pub const COMPLETION_LINE: &str = "Crawler completed successfully. JSON report can be exported.";

// URL -> issues, in the order the URLs were crawled
pub type Vulnerabilities = IndexMap<String, Vec<String>>;

// Everything one crawl found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The page the crawl started from
    pub base_url: String,
    /// Raw href values found on the base page, in document order
    pub links: Vec<String>,
    /// Either "All headers are safe." or the base page's issues
    pub header_test_results: Vec<String>,
    /// Links with at least one issue (or that could not be checked)
    pub vulnerabilities: Vulnerabilities,
}

impl Report {
    // True when the base page passed every rule and no link was flagged
    pub fn is_clean(&self) -> bool {
        self.header_test_results.iter().all(|line| line == ALL_HEADERS_SAFE)
            && self.vulnerabilities.is_empty()
    }

    // Renders the report as display lines
    //
    // Example output:
    //   Header test results:
    //   All headers are safe.
    //   Links vulnerable due to missing headers:
    //   http://example.com/about is vulnerable:
    //     - Issue: Expires missing or not set to 0
    //   Crawler completed successfully. JSON report can be exported.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(HEADER_RESULTS_HEADING.to_string());
        lines.extend(self.header_test_results.iter().cloned());

        // Only list vulnerable links when there are any
        if !self.vulnerabilities.is_empty() {
            lines.push(VULNERABLE_LINKS_HEADING.to_string());
            for (url, issues) in &self.vulnerabilities {
                lines.push(format!("{} is vulnerable:", url));
                for issue in issues {
                    lines.push(format!("  - {}", issue));
                }
            }
        }

        lines.push(COMPLETION_LINE.to_string());
        lines
    }

    pub fn to_json_pretty(&self) -> Result<String, CrawlError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // Writes the JSON report to a file, replacing it if it exists
    pub fn export(&self, path: &Path) -> Result<(), CrawlError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| CrawlError::Export {
            path: path.to_path_buf(),
            source,
        })
    }
}
