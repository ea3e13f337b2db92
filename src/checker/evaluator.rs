// src/checker/evaluator.rs
// =============================================================================
// Runs the rule catalogue against one set of response headers.
//
// Everything here is a pure function: headers in, issue texts out.
// =============================================================================

use super::mapping::HeaderMapping;
use super::rules::HEADER_RULES;
use tracing::{info, warn};

/// Line recorded for a base page that passes every rule.
pub const ALL_HEADERS_SAFE: &str = "All headers are safe.";

// Returns the issue text of every rule that fails, in catalogue order
//
// Example:
//   headers = {} (nothing sent)
//   result  = all 11 issues, X-Content-Type-Options first
pub fn evaluate_headers(headers: &HeaderMapping) -> Vec<String> {
    HEADER_RULES
        .iter()
        .filter(|rule| !rule.passes(headers))
        .map(|rule| rule.issue.to_string())
        .collect()
}

/// A header set is safe when no rule fails.
pub fn is_safe(headers: &HeaderMapping) -> bool {
    evaluate_headers(headers).is_empty()
}

// Builds the "header test results" block for the base page
//
// Returns either the single line "All headers are safe." or the issues.
pub fn header_test_results(headers: &HeaderMapping) -> Vec<String> {
    if is_safe(headers) {
        info!("All headers are safe.");
        return vec![ALL_HEADERS_SAFE.to_string()];
    }

    let issues = evaluate_headers(headers);
    warn!(count = issues.len(), "Vulnerable headers found");
    for issue in &issues {
        warn!("- {}", issue);
    }
    issues
}
