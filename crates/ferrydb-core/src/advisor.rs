//! Module: advisor
//! Responsibility: build/test-time index advice — derive the minimal
//! compound index a pattern needs and compare it against what exists.
//! Does not own: anything on the request path; this never runs per-query.

use crate::{
    access::{AccessPattern, OrderDirection},
    error::EngineError,
    store::{DocumentStore, IndexSpec},
};

///
/// IndexReport
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexReport {
    /// An existing index serves the pattern without a collection scan.
    Covered { index: IndexSpec },
    /// No existing index is compatible; create the suggested one.
    MissingIndex { suggested: IndexSpec },
}

impl IndexReport {
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        matches!(self, Self::Covered { .. })
    }
}

///
/// IndexAdvisor
///

pub struct IndexAdvisor;

impl IndexAdvisor {
    /// Derive the minimal compound index for a pattern: equality fields
    /// first (ascending, declaration order), then the range field, then the
    /// sort fields with their declared directions. First occurrence wins on
    /// duplicates.
    #[must_use]
    pub fn required_index(pattern: &AccessPattern) -> IndexSpec {
        let mut fields: Vec<(String, OrderDirection)> = Vec::new();

        let mut push = |field: &str, direction: OrderDirection| {
            if !fields.iter().any(|(existing, _)| existing == field) {
                fields.push((field.to_string(), direction));
            }
        };

        for (field, _) in pattern.equality() {
            push(field, OrderDirection::Asc);
        }

        if let Some(range) = pattern.range() {
            // The range field leads the sort order (validated at build), so
            // its index direction follows the declared traversal.
            let direction = pattern
                .order()
                .fields
                .iter()
                .find(|(field, _)| *field == range.field)
                .map_or(OrderDirection::Asc, |(_, direction)| *direction);
            push(&range.field, direction);
        }

        for (field, direction) in &pattern.order().fields {
            push(field, *direction);
        }

        IndexSpec::new(fields)
    }

    /// Compare a pattern's required index against the supplied existing
    /// specifications.
    ///
    /// An existing index covers the pattern when the required spec is a
    /// positional prefix of it with exactly matching directions. This is
    /// deliberately conservative: it may suggest an index a cleverer
    /// traversal could avoid, but it never accepts one that scans.
    #[must_use]
    pub fn check(pattern: &AccessPattern, existing: &[IndexSpec]) -> IndexReport {
        let required = Self::required_index(pattern);

        for index in existing {
            if covers(index, &required) {
                return IndexReport::Covered {
                    index: index.clone(),
                };
            }
        }

        IndexReport::MissingIndex { suggested: required }
    }

    /// [`check`](Self::check) against the indexes the store reports.
    pub fn check_store<S: DocumentStore>(
        store: &S,
        pattern: &AccessPattern,
    ) -> Result<IndexReport, EngineError> {
        let existing = store.list_indexes()?;

        Ok(Self::check(pattern, &existing))
    }
}

fn covers(existing: &IndexSpec, required: &IndexSpec) -> bool {
    if existing.fields.len() < required.fields.len() {
        return false;
    }

    required
        .fields
        .iter()
        .zip(existing.fields.iter())
        .all(|(need, have)| need == have)
}

///
/// TESTS
///
