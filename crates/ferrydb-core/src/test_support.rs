//! In-memory document store fixture for engine tests.
//!
//! Implements the collaborator contract faithfully enough to exercise every
//! engine path: canonical-order query evaluation, version-checked
//! conditional writes, per-document bulk rejections, and injectable
//! transient faults.

use crate::{
    access::OrderDirection,
    bulk::PendingWrite,
    cancel::CancelToken,
    document::{Document, DocumentKey, Record},
    store::{
        DocumentStore, DocumentVersion, IndexSpec, QueryOutcome, StoreError, StoreQuery,
        StoreWriteResult,
    },
    value::{Value, canonical_cmp},
};
use parking_lot::Mutex;
use std::{cmp::Ordering, collections::BTreeMap};

///
/// MemoryStore
///

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: BTreeMap<DocumentKey, (Document, DocumentVersion)>,
    indexes: Vec<IndexSpec>,
    query_count: usize,
    bulk_call_count: usize,
    read_count: usize,
    query_faults: u32,
    bulk_faults: u32,
    read_faults: u32,
    conditional_write_conflicts: u32,
    cancel_after_bulk: Option<CancelToken>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing the write path.
    pub(crate) fn seed(&self, key: &str, document: Document) {
        let key = DocumentKey::new(key).expect("seed key should be non-empty");
        self.state
            .lock()
            .documents
            .insert(key, (document, DocumentVersion::FIRST));
    }

    pub(crate) fn document(&self, key: &DocumentKey) -> Option<Document> {
        self.state
            .lock()
            .documents
            .get(key)
            .map(|(document, _)| document.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub(crate) fn set_indexes(&self, indexes: Vec<IndexSpec>) {
        self.state.lock().indexes = indexes;
    }

    pub(crate) fn query_count(&self) -> usize {
        self.state.lock().query_count
    }

    pub(crate) fn bulk_call_count(&self) -> usize {
        self.state.lock().bulk_call_count
    }

    pub(crate) fn read_count(&self) -> usize {
        self.state.lock().read_count
    }

    /// The next `count` queries fail with a transient error.
    pub(crate) fn fail_next_queries(&self, count: u32) {
        self.state.lock().query_faults = count;
    }

    /// The next `count` bulk writes fail wholesale with a transient error.
    pub(crate) fn fail_next_bulk_writes(&self, count: u32) {
        self.state.lock().bulk_faults = count;
    }

    /// The next `count` versioned reads fail with a transient error.
    pub(crate) fn fail_next_reads(&self, count: u32) {
        self.state.lock().read_faults = count;
    }

    /// The next `count` conditional writes fail with a conflict.
    pub(crate) fn fail_next_conditional_writes(&self, count: u32) {
        self.state.lock().conditional_write_conflicts = count;
    }

    /// Cancel `token` as soon as the next bulk write completes, emulating a
    /// caller that pulls the plug mid-submit.
    pub(crate) fn cancel_after_next_bulk_write(&self, token: &CancelToken) {
        self.state.lock().cancel_after_bulk = Some(token.clone());
    }
}

impl DocumentStore for MemoryStore {
    fn query(&self, query: &StoreQuery) -> Result<QueryOutcome, StoreError> {
        let mut state = self.state.lock();
        state.query_count += 1;

        if state.query_faults > 0 {
            state.query_faults -= 1;
            return Err(StoreError::transient("injected query fault"));
        }

        let mut scanned = 0_usize;
        let mut matches: Vec<Record> = Vec::new();

        for (key, (document, _)) in &state.documents {
            scanned += 1;

            if !matches_equality(document, &query.equality) {
                continue;
            }
            if let Some(range) = &query.range {
                let candidate = document.field(&range.field).cloned().unwrap_or(Value::Null);
                if !range.op.admits(canonical_cmp(&candidate, &range.bound)) {
                    continue;
                }
            }
            if let Some(boundary) = &query.boundary {
                let sort_key = document.sort_key(&query.order);
                if scan_cmp(&sort_key, &boundary.values, &query.order) != Ordering::Greater {
                    continue;
                }
            }

            matches.push((key.clone(), document.clone()));
        }

        matches.sort_by(|(left_key, left), (right_key, right)| {
            scan_cmp(
                &left.sort_key(&query.order),
                &right.sort_key(&query.order),
                &query.order,
            )
            .then_with(|| left_key.cmp(right_key))
        });
        matches.truncate(query.limit as usize);

        Ok(QueryOutcome {
            records: matches,
            scanned,
        })
    }

    fn bulk_write(&self, ops: &[PendingWrite]) -> Result<Vec<StoreWriteResult>, StoreError> {
        let mut state = self.state.lock();
        state.bulk_call_count += 1;

        if state.bulk_faults > 0 {
            state.bulk_faults -= 1;
            return Err(StoreError::transient("injected bulk fault"));
        }

        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = match op {
                PendingWrite::Insert { key, document } => {
                    if state.documents.contains_key(key) {
                        StoreWriteResult::Rejected {
                            reason: "duplicate key".to_string(),
                        }
                    } else {
                        state
                            .documents
                            .insert(key.clone(), (document.clone(), DocumentVersion::FIRST));
                        StoreWriteResult::Applied
                    }
                }
                PendingWrite::Update { key, patch } => match state.documents.get_mut(key) {
                    Some((document, version)) => {
                        document.apply_patch(patch);
                        *version = version.next();
                        StoreWriteResult::Applied
                    }
                    None => StoreWriteResult::Rejected {
                        reason: "missing document".to_string(),
                    },
                },
                PendingWrite::Delete { key } => {
                    if state.documents.remove(key).is_some() {
                        StoreWriteResult::Applied
                    } else {
                        StoreWriteResult::Rejected {
                            reason: "missing document".to_string(),
                        }
                    }
                }
            };
            results.push(result);
        }

        if let Some(token) = state.cancel_after_bulk.take() {
            token.cancel();
        }

        Ok(results)
    }

    fn read_versioned(
        &self,
        key: &DocumentKey,
    ) -> Result<Option<(Document, DocumentVersion)>, StoreError> {
        let mut state = self.state.lock();
        state.read_count += 1;

        if state.read_faults > 0 {
            state.read_faults -= 1;
            return Err(StoreError::transient("injected read fault"));
        }

        Ok(state.documents.get(key).cloned())
    }

    fn write_conditional(
        &self,
        key: &DocumentKey,
        expected: Option<DocumentVersion>,
        document: Document,
    ) -> Result<DocumentVersion, StoreError> {
        let mut state = self.state.lock();

        if state.conditional_write_conflicts > 0 {
            state.conditional_write_conflicts -= 1;
            return Err(StoreError::Conflict);
        }

        let current = state.documents.get(key).map(|(_, version)| *version);
        match (expected, current) {
            (None, None) => {
                state
                    .documents
                    .insert(key.clone(), (document, DocumentVersion::FIRST));
                Ok(DocumentVersion::FIRST)
            }
            (Some(expected), Some(current)) if expected == current => {
                let next = current.next();
                state.documents.insert(key.clone(), (document, next));
                Ok(next)
            }
            _ => Err(StoreError::Conflict),
        }
    }

    fn list_indexes(&self) -> Result<Vec<IndexSpec>, StoreError> {
        Ok(self.state.lock().indexes.clone())
    }
}

fn matches_equality(document: &Document, equality: &[(String, Value)]) -> bool {
    equality
        .iter()
        .all(|(field, expected)| document.field(field) == Some(expected))
}

// Direction-aware tuple comparison in scan order.
fn scan_cmp(
    left: &[Value],
    right: &[Value],
    order: &crate::access::OrderSpec,
) -> Ordering {
    for (idx, (_, direction)) in order.fields.iter().enumerate() {
        let (Some(a), Some(b)) = (left.get(idx), right.get(idx)) else {
            break;
        };

        let mut ord = canonical_cmp(a, b);
        if *direction == OrderDirection::Desc {
            ord = ord.reverse();
        }
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}
