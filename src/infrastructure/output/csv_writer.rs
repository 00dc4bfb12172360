//! Tabular output writer

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::domain::ResultSet;

/// Write the result set as CSV: union columns with `URL` first, one row per
/// tender, absent fields as empty cells. UTF-8 throughout, so accented
/// field names and values survive unchanged.
pub fn write_csv(result: &ResultSet, path: &Path) -> Result<()> {
    if result.is_empty() {
        warn!("no tenders to write; skipping {}", path.display());
        return Ok(());
    }

    let columns = result.field_name_union();
    info!(
        "writing {} tenders across {} fields to {}",
        result.len(),
        columns.len(),
        path.display()
    );

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(&columns)?;

    for record in result.iter() {
        let row: Vec<&str> = columns
            .iter()
            .map(|column| record.get(column).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TenderRecord, fields};

    fn sample_set() -> ResultSet {
        let mut set = ResultSet::new();
        let mut first = TenderRecord::new();
        first.insert(fields::REFERENCE, "AOO 1/2025");
        first.insert(fields::URL, "https://example.test/a");
        first.insert(fields::OBJET, "Entretien des ouvrages");
        set.push(first).unwrap();

        let mut second = TenderRecord::new();
        second.insert(fields::REFERENCE, "AOO 2/2025");
        second.insert(fields::URL, "https://example.test/b");
        second.insert(fields::ESTIMATION, "1 200 000,00");
        set.push(second).unwrap();
        set
    }

    #[test]
    fn url_leads_and_missing_fields_are_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenders.csv");
        write_csv(&sample_set(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("URL,"));
        assert!(header.contains("Référence"));

        // first record has no estimation: trailing empty cell
        let first = lines.next().unwrap();
        assert!(first.ends_with(','));
        // second record has no objet: empty cell before the estimation
        let second = lines.next().unwrap();
        assert!(second.contains(",,"));
    }

    #[test]
    fn empty_result_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tenders.csv");
        write_csv(&ResultSet::new(), &path).unwrap();
        assert!(!path.exists());
    }
}
