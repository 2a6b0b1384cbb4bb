//! Module: document
//! Responsibility: schema-agnostic document and key types at the engine boundary.
//! Does not own: query semantics, typed views, or store persistence.

use crate::{
    access::OrderSpec,
    value::{FieldValue, Value},
};
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// A keyed document as produced by a paginated scan.
pub type Record = (DocumentKey, Document);

///
/// Document
///
/// Ordered field map. The engine treats documents as opaque beyond the
/// fields named by an access pattern or a mutation view.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, IntoIterator, PartialEq, Serialize,
)]
#[into_iterator(owned, ref)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a field, chain-style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl FieldValue) -> Self {
        self.0.insert(field.into(), value.to_value());
        self
    }

    /// Borrow a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Extract this document's sort-key tuple for an order specification.
    ///
    /// Missing fields extract as [`Value::Null`], which ranks below every
    /// other variant, so partially-populated documents still order totally.
    #[must_use]
    pub fn sort_key(&self, order: &OrderSpec) -> Vec<Value> {
        order
            .fields
            .iter()
            .map(|(field, _)| self.0.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Apply a shallow field patch: every patch field replaces the
    /// corresponding document field, inserting it if absent.
    ///
    /// An explicit [`Value::Null`] in the patch is stored, not treated as a
    /// removal.
    pub fn apply_patch(&mut self, patch: &Self) {
        for (field, value) in &patch.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// DocumentKey
///
/// Non-empty document key. Zero-length keys are rejected at construction so
/// downstream layers never have to re-validate.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KeyError::Empty);
        }

        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// KeyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("document key must be non-empty")]
    Empty,
}

///
/// TESTS
///
