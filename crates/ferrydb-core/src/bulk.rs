//! Module: bulk
//! Responsibility: chunked bulk submission — split a pending write set into
//! size-bounded batches, retry wholesale chunk failures, report one outcome
//! per write.
//! Does not own: per-document validation; rejections come back from the
//! store as data.

use crate::{
    cancel::CancelToken,
    config::BulkConfig,
    document::{Document, DocumentKey},
    error::EngineError,
    retry::{self, RetryPolicy},
    store::{DocumentStore, StoreError, StoreWriteResult},
};

///
/// PendingWrite
///
/// One staged mutation. Created by the caller, consumed exactly once by
/// [`BulkWriter::submit`], never reused.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PendingWrite {
    Insert {
        key: DocumentKey,
        document: Document,
    },
    Update {
        key: DocumentKey,
        patch: Document,
    },
    Delete {
        key: DocumentKey,
    },
}

impl PendingWrite {
    #[must_use]
    pub const fn key(&self) -> &DocumentKey {
        match self {
            Self::Insert { key, .. } | Self::Update { key, .. } | Self::Delete { key } => key,
        }
    }
}

///
/// WriteOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    Applied,
    Failed { reason: String },
    /// The submit run was cancelled before this write's chunk was issued.
    Skipped,
}

impl WriteOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

///
/// BulkReport
///
/// One outcome per submitted write, in submission order, plus aggregate
/// counts. Returned by value; the writer retains nothing.
///

#[derive(Clone, Debug)]
pub struct BulkReport {
    outcomes: Vec<WriteOutcome>,
    applied: usize,
    failed: usize,
    skipped: usize,
}

impl BulkReport {
    fn from_outcomes(outcomes: Vec<WriteOutcome>) -> Self {
        let mut applied = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for outcome in &outcomes {
            match outcome {
                WriteOutcome::Applied => applied += 1,
                WriteOutcome::Failed { .. } => failed += 1,
                WriteOutcome::Skipped => skipped += 1,
            }
        }

        Self {
            outcomes,
            applied,
            failed,
            skipped,
        }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[WriteOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn into_outcomes(self) -> Vec<WriteOutcome> {
        self.outcomes
    }
}

///
/// BulkOptions
///

#[derive(Clone, Debug, Default)]
pub struct BulkOptions {
    pub config: BulkConfig,
    pub retry: RetryPolicy,
    pub cancel: CancelToken,
}

///
/// BulkWriter
///
/// Unordered-chunk semantics: chunks are submitted sequentially, but a
/// failure in one chunk never aborts subsequent chunks. Within a chunk the
/// store may reorder writes relative to each other; it never duplicates or
/// drops one.
///

#[derive(Clone, Debug)]
pub struct BulkWriter<'a, S: DocumentStore> {
    store: &'a S,
    options: BulkOptions,
}

impl<'a, S: DocumentStore> BulkWriter<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: BulkOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(store: &'a S, options: BulkOptions) -> Self {
        Self { store, options }
    }

    /// Submit `writes` in chunks of `config.default_chunk_size`.
    pub fn submit_with_defaults(
        &self,
        writes: Vec<PendingWrite>,
    ) -> Result<BulkReport, EngineError> {
        self.submit(writes, self.options.config.default_chunk_size)
    }

    /// Submit `writes` in ordered chunks of at most `chunk_size` entries.
    ///
    /// Every write receives exactly one outcome. Only store corruption
    /// aborts the run with an error; transient chunk failures burn their
    /// retry budget and then fail that chunk's writes individually.
    pub fn submit(
        &self,
        writes: Vec<PendingWrite>,
        chunk_size: u32,
    ) -> Result<BulkReport, EngineError> {
        let max = self.options.config.max_chunk_size;
        if chunk_size == 0 || chunk_size > max {
            return Err(EngineError::invalid_argument(format!(
                "chunk size must be in 1..={max}, got {chunk_size}"
            )));
        }

        if writes.is_empty() {
            return Ok(BulkReport::from_outcomes(Vec::new()));
        }

        let mut outcomes = Vec::with_capacity(writes.len());

        for chunk in writes.chunks(chunk_size as usize) {
            if self.options.cancel.is_cancelled() {
                // Report the un-issued tail rather than discarding it.
                outcomes.extend(chunk.iter().map(|_| WriteOutcome::Skipped));
                continue;
            }

            match self.submit_chunk(chunk) {
                Ok(results) => {
                    outcomes.extend(results.into_iter().map(|result| match result {
                        StoreWriteResult::Applied => WriteOutcome::Applied,
                        StoreWriteResult::Rejected { reason } => WriteOutcome::Failed { reason },
                    }));
                }
                Err(ChunkError::Exhausted { reason }) => {
                    tracing::warn!(
                        chunk_len = chunk.len(),
                        %reason,
                        "bulk chunk failed after exhausting retries; continuing"
                    );
                    outcomes.extend(chunk.iter().map(|_| WriteOutcome::Failed {
                        reason: reason.clone(),
                    }));
                }
                Err(ChunkError::Fatal(err)) => return Err(err),
            }
        }

        debug_assert_eq!(outcomes.len(), writes.len());

        Ok(BulkReport::from_outcomes(outcomes))
    }

    // Submit one chunk, retrying wholesale transient failures. Partial
    // failures come back as per-op rejections and are never retried.
    fn submit_chunk(&self, chunk: &[PendingWrite]) -> Result<Vec<StoreWriteResult>, ChunkError> {
        let mut failed_attempts = 0_u32;

        loop {
            match self.store.bulk_write(chunk) {
                Ok(results) => {
                    if results.len() != chunk.len() {
                        return Err(ChunkError::Fatal(EngineError::corruption(format!(
                            "store returned {} results for {} operations",
                            results.len(),
                            chunk.len()
                        ))));
                    }
                    return Ok(results);
                }
                Err(StoreError::Transient { message }) => {
                    failed_attempts += 1;
                    if !self.options.retry.allows_retry(failed_attempts) {
                        return Err(ChunkError::Exhausted { reason: message });
                    }
                    tracing::warn!(
                        failed_attempts,
                        max_attempts = self.options.retry.max_attempts,
                        error = %message,
                        "transient bulk chunk failure; backing off"
                    );
                    retry::sleep_before_retry(&self.options.retry, failed_attempts);
                }
                Err(err) => return Err(ChunkError::Fatal(err.into())),
            }
        }
    }
}

// Chunk-level failure classification, internal to the writer.
enum ChunkError {
    Exhausted { reason: String },
    Fatal(EngineError),
}

///
/// TESTS
///
