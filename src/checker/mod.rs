// src/checker/mod.rs
// =============================================================================
// This module contains the header auditing logic and the link extractor.
//
// Submodules:
// - mapping: Case-insensitive view over response headers
// - rules: The fixed catalogue of security header rules
// - evaluator: Runs the catalogue against one set of headers
// - html: Extracts raw links from HTML pages
//
// Nothing in here touches the network. The crawl module feeds it data.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod evaluator;
mod html;
mod mapping;
mod rules;

// Re-export public items from submodules
// This lets users write `checker::evaluate_headers()` instead of
// `checker::evaluator::evaluate_headers()`
pub use evaluator::{evaluate_headers, header_test_results, is_safe, ALL_HEADERS_SAFE};
pub use html::extract_links;
pub use mapping::HeaderMapping;
pub use rules::HEADER_RULES;
