//! Schema-less tender record type
//!
//! A tender card on the portal has no stable schema: field presence, nesting
//! depth and sibling ordering vary per card. Records are therefore an ordered
//! field-name → value mapping rather than a fixed struct.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical field names emitted by the listing extractors.
///
/// Names are emitted verbatim, accents included, so downstream consumers see
/// the portal's own labels.
pub mod fields {
    pub const URL: &str = "URL";
    pub const REFERENCE: &str = "Référence";
    pub const TYPE: &str = "Type";
    pub const TYPE_DESCRIPTION: &str = "Type (Description)";
    pub const OBJET: &str = "Objet";
    pub const ENTITE: &str = "Entité";
    pub const ESTIMATION: &str = "Estimation (en DH)";
    pub const DEADLINE: &str = "Date et heure limite de remise des plis";
    pub const LOCATION: &str = "Lieu d'exécution";
    pub const LOCATION_FULL: &str = "Lieu d'exécution (complet)";
    pub const RESPONSE_TYPE: &str = "Type de réponse électronique";
}

/// One tender as extracted from a single record card.
///
/// Fields keep insertion order. At most one value per field name; a missing
/// field is a valid state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenderRecord {
    fields: IndexMap<String, String>,
}

impl TenderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field value. Re-inserting an existing name replaces the value
    /// without disturbing its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Merge fields from `other`, keeping the existing value when a name is
    /// already present.
    pub fn merge_missing(&mut self, other: TenderRecord) {
        for (name, value) in other.fields {
            self.fields.entry(name).or_insert(value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Identity key used for deduplication.
    pub fn reference(&self) -> Option<&str> {
        self.get(fields::REFERENCE)
    }

    pub fn url(&self) -> Option<&str> {
        self.get(fields::URL)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for TenderRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
