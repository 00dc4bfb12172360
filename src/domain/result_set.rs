//! Ordered tender collection with reference-keyed deduplication

use std::collections::HashSet;

use indexmap::IndexSet;

use super::tender::{TenderRecord, fields};

/// Why a record offered to [`ResultSet::push`] was not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectedRecord {
    /// The reference was already seen; the first occurrence wins.
    DuplicateReference(String),
    /// Neither a reference nor a URL: nothing to accept the record under.
    MissingIdentity,
}

/// Tenders in document order, minus duplicates.
///
/// A record carrying a `Référence` is accepted once per reference. A record
/// without one but with a `URL` is accepted unconditionally (no dedup key
/// exists, so duplicate insertion is possible by design). Records with
/// neither are rejected.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<TenderRecord>,
    seen_references: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record. Returns the rejection reason when it is dropped.
    pub fn push(&mut self, record: TenderRecord) -> Result<(), RejectedRecord> {
        if let Some(reference) = record.reference() {
            if self.seen_references.contains(reference) {
                return Err(RejectedRecord::DuplicateReference(reference.to_string()));
            }
            self.seen_references.insert(reference.to_string());
            self.records.push(record);
            Ok(())
        } else if record.url().is_some() {
            self.records.push(record);
            Ok(())
        } else {
            Err(RejectedRecord::MissingIdentity)
        }
    }

    pub fn records(&self) -> &[TenderRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [TenderRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TenderRecord> {
        self.records.iter()
    }

    /// Union of all field names across the set, in first-seen order (record
    /// order, then field insertion order within a record), with `URL` forced
    /// first. Recomputed on every call; no schema is persisted between runs.
    pub fn field_name_union(&self) -> Vec<String> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for record in &self.records {
            for name in record.field_names() {
                seen.insert(name);
            }
        }

        let mut union = vec![fields::URL.to_string()];
        union.extend(
            seen.into_iter()
                .filter(|name| *name != fields::URL)
                .map(str::to_string),
        );
        union
    }
}

impl IntoIterator for ResultSet {
    type Item = TenderRecord;
    type IntoIter = std::vec::IntoIter<TenderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
