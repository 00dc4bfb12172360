//! Output writers for the normalized result set
//!
//! Both writers consume the field-name union computed at emission time.
//! Tabular output renders a field absent from a record as an empty cell;
//! structured output omits it entirely. Downstream consumers rely on that
//! difference.

pub mod csv_writer;
pub mod json_writer;

pub use csv_writer::write_csv;
pub use json_writer::{ExportMetadata, TenderExport, build_export, write_json};
