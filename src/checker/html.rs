// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever (Mozilla's HTML parser)
// - Never fails: broken markup is repaired the same way a browser would
//
// Unlike a link checker we do NOT clean the links up here. Every href is
// returned exactly as written, duplicates and mailto: links included.
// Turning them into fetchable URLs is the crawl engine's job.
//
// Rust concepts:
// - Iterators: For processing collections
// - filter_map: Skip items we don't want while transforming the rest
// =============================================================================

use scraper::{ElementRef, Html};

// Extracts the href of every <a> element, in document order
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//
// Returns: Vec<String> with the raw href values
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='/docs'>Again</a>"
//   result = ["/docs", "/docs"]
pub fn extract_links(html: &str) -> Vec<String> {
    // Parse the HTML into a document
    let document = Html::parse_document(html);

    // Walk every node under <html> and keep the anchors that have an href
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not a CSS selector like "a[href]"?
//    - Selector::parse returns a Result, and handling an error that can
//      never happen for a constant string is just noise
//    - Walking descendants gives the same document-order result
//
// 2. What is ElementRef::wrap?
//    - The DOM tree holds text, comments and elements
//    - wrap() returns Some(element) only for element nodes
//
// 3. Why str::to_string?
//    - attr() borrows from the document, which is dropped when we return
//    - We copy each href into an owned String
// -----------------------------------------------------------------------------
