//! Shared text cleaning for extracted markup content

/// Collapse any run of whitespace to a single space and trim the ends.
///
/// Every extractor that reads text content goes through this, so field values
/// are uniformly single-spaced. Idempotent: `clean_text(clean_text(x)) ==
/// clean_text(x)`.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
