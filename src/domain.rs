//! Domain layer: tender records and result aggregation
//!
//! Holds the schema-less record type extracted from listing cards and the
//! ordered, deduplicated collection handed to the output writers.

pub mod result_set;
pub mod tender;

pub use result_set::{RejectedRecord, ResultSet};
pub use tender::{TenderRecord, fields};
