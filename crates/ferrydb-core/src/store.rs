//! Module: store
//! Responsibility: the backing-store collaborator contract — one handle per
//! logical collection, exposing query, bulk write, optimistic conditional
//! write, and index listing primitives.
//! Does not own: retry policy, chunking, or cursor semantics; those live in
//! the engine layers above.

use crate::{
    access::{OrderDirection, OrderSpec, RangeFilter},
    bulk::PendingWrite,
    document::{Document, DocumentKey, Record},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// DocumentVersion
///
/// Monotonic per-document revision used by the conditional-write primitive.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DocumentVersion(u64);

impl DocumentVersion {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self(revision)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

///
/// ScanBoundary
///
/// Synthetic resume bound: results must order strictly after this
/// sort-value tuple in scan order (direction-aware, always exclusive).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanBoundary {
    pub values: Vec<Value>,
}

impl ScanBoundary {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

///
/// StoreQuery
///
/// One bounded query as compiled by the page fetcher: declared filters plus
/// the continuation boundary and a hard limit.
///

#[derive(Clone, Debug)]
pub struct StoreQuery {
    pub equality: Vec<(String, Value)>,
    pub range: Option<RangeFilter>,
    pub boundary: Option<ScanBoundary>,
    pub order: OrderSpec,
    pub limit: u32,
}

///
/// QueryOutcome
///

#[derive(Clone, Debug)]
pub struct QueryOutcome {
    /// Matching records in sort order, at most `limit` of them.
    pub records: Vec<Record>,
    /// Records examined store-side, for diagnostics.
    pub scanned: usize,
}

///
/// StoreWriteResult
///
/// Per-operation outcome of a bulk write. Rejections are data, not errors:
/// the chunk as a whole succeeded and must not be retried.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreWriteResult {
    Applied,
    Rejected { reason: String },
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    /// Network/timeout class failure; the operation may have never reached
    /// the store. Retryable.
    #[error("transient store error: {message}")]
    Transient { message: String },

    /// A conditional write lost the race to a concurrent writer. Retryable
    /// only inside an optimistic read-modify-write cycle.
    #[error("conditional write conflict")]
    Conflict,

    /// The store returned data that violates its own contract. Fatal.
    #[error("store corruption: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    pub(crate) fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Return a stable error kind independent of message text.
    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Transient { .. } => StoreErrorKind::Transient,
            Self::Conflict => StoreErrorKind::Conflict,
            Self::Corrupt { .. } => StoreErrorKind::Corrupt,
        }
    }
}

///
/// StoreErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreErrorKind {
    Transient,
    Conflict,
    Corrupt,
}

impl StoreErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Conflict => "conflict",
            Self::Corrupt => "corrupt",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// IndexSpec
///
/// Compound index specification in declaration order; the `list_indexes`
/// exchange format and the index advisor's vocabulary.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

impl IndexSpec {
    #[must_use]
    pub const fn new(fields: Vec<(String, OrderDirection)>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (idx, (field, direction)) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            let sign = match direction {
                OrderDirection::Asc => "1",
                OrderDirection::Desc => "-1",
            };
            write!(f, "{field}: {sign}")?;
        }
        write!(f, " }}")
    }
}

///
/// DocumentStore
///
/// The external collaborator. One trait object/impl per logical collection,
/// mirroring driver collection handles. Every method is one network
/// round-trip; the engine layers own retries and never hold client-side
/// locks across calls.
///
/// Store-call timeouts are driver configuration; drivers surface elapsed
/// timeouts as [`StoreError::Transient`].
///

pub trait DocumentStore {
    /// Execute one bounded query.
    fn query(&self, query: &StoreQuery) -> Result<QueryOutcome, StoreError>;

    /// Apply one chunk of writes as a single bulk operation.
    ///
    /// `Err` means the chunk failed wholesale (nothing is known about
    /// individual writes); `Ok` must carry exactly one result per
    /// operation, in operation order.
    fn bulk_write(&self, ops: &[PendingWrite]) -> Result<Vec<StoreWriteResult>, StoreError>;

    /// Read a document together with its current revision.
    fn read_versioned(
        &self,
        key: &DocumentKey,
    ) -> Result<Option<(Document, DocumentVersion)>, StoreError>;

    /// Commit `document` only if the stored revision still equals
    /// `expected` (`None` = the document must not exist yet). Returns the
    /// committed revision; fails with [`StoreError::Conflict`] when a
    /// concurrent writer got there first.
    fn write_conditional(
        &self,
        key: &DocumentKey,
        expected: Option<DocumentVersion>,
        document: Document,
    ) -> Result<DocumentVersion, StoreError>;

    /// List the index specifications that exist on this collection.
    fn list_indexes(&self) -> Result<Vec<IndexSpec>, StoreError>;
}

///
/// TESTS
///
