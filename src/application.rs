//! Application layer: scrape session orchestration
//!
//! Wires the fetcher, parsers and aggregation into the use cases the binary
//! exposes.

pub mod session;

pub use session::{ScrapeOutcome, ScrapeSession};
