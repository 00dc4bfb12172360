//! adm-tenders - tender listing scraper for the ADM public procurement portal
//!
//! Negotiates the portal's stateful pagination postback to obtain an
//! enlarged result page, extracts tender records from its schema-less card
//! markup, deduplicates them by reference, and emits CSV and JSON exports
//! over the union of observed field names.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for the binary and integration tests
pub use application::{ScrapeOutcome, ScrapeSession};
pub use domain::{RejectedRecord, ResultSet, TenderRecord, fields};
pub use infrastructure::config::AppConfig;
