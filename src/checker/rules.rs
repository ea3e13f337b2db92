// src/checker/rules.rs
// =============================================================================
// The catalogue of security header rules.
//
// Each rule is plain data: a header name, a check function, and the issue
// text to report when the check fails. The evaluator walks this table in
// order, so the order here is the order issues show up in reports.
//
// Rules never fail. A missing header is just a failed check.
//
// Rust concepts:
// - fn pointers: `fn(&HeaderMapping) -> bool` is the type of a plain function
// - static arrays: the table is built at compile time, no allocation
// =============================================================================

use super::mapping::HeaderMapping;

// One security best practice for HTTP response headers
#[derive(Clone, Copy)]
pub struct HeaderRule {
    /// The header this rule looks at
    pub name: &'static str,
    /// Returns true when the header is configured safely
    pub check: fn(&HeaderMapping) -> bool,
    /// Reported when `check` returns false
    pub issue: &'static str,
}

impl HeaderRule {
    pub fn passes(&self, headers: &HeaderMapping) -> bool {
        (self.check)(headers)
    }
}

pub static HEADER_RULES: [HeaderRule; 11] = [
    HeaderRule {
        name: "X-Content-Type-Options",
        check: |h| h.value_or_empty("X-Content-Type-Options").to_lowercase() == "nosniff",
        issue: "Issue: X-Content-Type-Options missing or not set to nosniff",
    },
    HeaderRule {
        name: "Strict-Transport-Security",
        check: |h| !h.value_or_empty("Strict-Transport-Security").is_empty(),
        issue: "Issue: Strict-Transport-Security missing",
    },
    HeaderRule {
        name: "Content-Security-Policy",
        check: |h| h.contains("Content-Security-Policy"),
        issue: "Issue: Content-Security-Policy missing",
    },
    HeaderRule {
        name: "X-Frame-Options",
        check: |h| {
            let value = h.value_or_empty("X-Frame-Options").to_uppercase();
            value == "DENY" || value == "SAMEORIGIN"
        },
        issue: "Issue: X-Frame-Options missing or not set to DENY/SAMEORIGIN",
    },
    HeaderRule {
        name: "Referrer-Policy",
        check: |h| {
            h.value_or_empty("Referrer-Policy").to_lowercase() == "strict-origin-when-cross-origin"
        },
        issue: "Issue: Referrer-Policy missing or not set to strict-origin-when-cross-origin",
    },
    HeaderRule {
        name: "Content-Type",
        check: |h| h.value_or_empty("Content-Type").to_lowercase() == "text/html; charset=utf-8",
        issue: "Issue: Content-Type missing or not set to text/html; charset=UTF-8",
    },
    HeaderRule {
        name: "Permissions-Policy",
        check: |h| h.contains("Permissions-Policy"),
        issue: "Issue: Permissions-Policy missing",
    },
    HeaderRule {
        name: "Cache-Control",
        check: |h| {
            h.contains("Cache-Control")
                && h.value_or_empty("Cache-Control").to_lowercase().contains("no-store")
        },
        issue: "Issue: Cache-Control missing or not set to no-store",
    },
    HeaderRule {
        name: "Expires",
        check: |h| h.value_or_empty("Expires").to_lowercase() == "0",
        issue: "Issue: Expires missing or not set to 0",
    },
    HeaderRule {
        name: "Access-Control-Allow-Origin",
        check: |h| h.value_or_empty("Access-Control-Allow-Origin") == "*",
        issue: "Issue: Access-Control-Allow-Origin missing or not set to *",
    },
    HeaderRule {
        name: "Cross-Origin-Opener-Policy",
        check: |h| h.value_or_empty("Cross-Origin-Opener-Policy").to_lowercase() == "same-origin",
        issue: "Issue: Cross-Origin-Opener-Policy missing or not set to same-origin",
    },
];
