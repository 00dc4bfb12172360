//! Parsing contexts for listing and detail extraction

/// Context for parsing the tender listing page.
#[derive(Debug, Clone)]
pub struct ListParseContext {
    /// Base URL for resolving the relative paths found in card onclick
    /// attributes.
    pub base_url: String,
}

impl ListParseContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Context for parsing one tender detail page.
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Detail page URL being parsed.
    pub url: String,

    /// Base URL for resolving relative resources.
    pub base_url: String,
}

impl DetailParseContext {
    pub fn new(url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            base_url: base_url.into(),
        }
    }
}
