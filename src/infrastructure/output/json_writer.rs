//! Structured output writer

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{ResultSet, TenderRecord};

/// Metadata block heading the structured export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub total_tenders: usize,
    pub extraction_date: String,
    pub source: String,
}

/// Structured export: metadata plus one field-map per tender. Absent fields
/// are omitted from the maps rather than rendered as empty values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderExport {
    pub metadata: ExportMetadata,
    pub tenders: Vec<TenderRecord>,
}

/// Assemble the export document for the given result set.
pub fn build_export(result: &ResultSet, source: &str) -> TenderExport {
    TenderExport {
        metadata: ExportMetadata {
            total_tenders: result.len(),
            extraction_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: source.to_string(),
        },
        tenders: result.iter().cloned().collect(),
    }
}

/// Write the structured export as pretty-printed JSON. serde_json leaves
/// non-ASCII characters unescaped, so accents are preserved literally.
pub fn write_json(result: &ResultSet, source: &str, path: &Path) -> Result<()> {
    if result.is_empty() {
        warn!("no tenders to write; skipping {}", path.display());
        return Ok(());
    }

    let export = build_export(result, source);
    let rendered = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("wrote {} tenders to {}", result.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;

    fn sample_set() -> ResultSet {
        let mut set = ResultSet::new();
        let mut record = TenderRecord::new();
        record.insert(fields::URL, "https://example.test/a");
        record.insert(fields::REFERENCE, "AOO 1/2025");
        record.insert(fields::ENTITE, "Direction de l'exploitation");
        set.push(record).unwrap();
        set
    }

    #[test]
    fn export_round_trips_through_json() {
        let export = build_export(&sample_set(), "https://example.test/list");
        let rendered = serde_json::to_string(&export).unwrap();
        let reread: TenderExport = serde_json::from_str(&rendered).unwrap();

        assert_eq!(reread.metadata.total_tenders, 1);
        assert_eq!(reread.metadata.source, "https://example.test/list");
        assert_eq!(reread.tenders, export.tenders);
    }

    #[test]
    fn absent_fields_are_omitted_not_emptied() {
        let export = build_export(&sample_set(), "https://example.test/list");
        let rendered = serde_json::to_string(&export).unwrap();
        assert!(!rendered.contains("Estimation"));
    }

    #[test]
    fn accents_are_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenders.json");
        write_json(&sample_set(), "https://example.test/list", &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Référence"));
        assert!(written.contains("l'exploitation"));
        assert!(!written.contains("\\u"));
    }
}
