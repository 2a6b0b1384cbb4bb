//! Module: mutate
//! Responsibility: optimistic read-modify-write cycles over the store's
//! conditional-write primitive — bounded, jittered retries; no lost updates.
//! Does not own: client-side locks (there are none) or mutation semantics;
//! callers express those through a typed view.

use crate::{
    document::{Document, DocumentKey},
    error::EngineError,
    retry::{self, RetryPolicy},
    store::{DocumentStore, StoreError},
};
use thiserror::Error as ThisError;

///
/// DocumentView
///
/// Caller-supplied typed projection of a document. Mutations are expressed
/// against the view, not against the raw field map, so each use site owns
/// its own schema expectations.
///

pub trait DocumentView: Sized {
    fn from_document(document: &Document) -> Result<Self, ViewError>;
    fn into_document(self) -> Document;
}

impl DocumentView for Document {
    fn from_document(document: &Self) -> Result<Self, ViewError> {
        Ok(document.clone())
    }

    fn into_document(self) -> Self {
        self
    }
}

///
/// ViewError
/// The stored document does not fit the caller's typed view.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("view error: {message}")]
pub struct ViewError {
    message: String,
}

impl ViewError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ViewError> for EngineError {
    fn from(err: ViewError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

///
/// Mutator
///
/// Safe to invoke concurrently from any number of call sites; correctness
/// rests entirely on the store's conditional-write guarantee. Each call
/// carries its own retry budget.
///

#[derive(Clone, Copy, Debug)]
pub struct Mutator<'a, S: DocumentStore> {
    store: &'a S,
    retry: RetryPolicy,
}

impl<'a, S: DocumentStore> Mutator<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_retry(store: &'a S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Apply a pure mutation to the document at `key` and return the
    /// committed state.
    ///
    /// `op` may run once per optimistic attempt, each time against a fresh
    /// snapshot; it must be side-effect-free and carry no state between
    /// invocations. A missing document fails with `NotFound` — nothing is
    /// created implicitly.
    pub fn apply<V, F>(&self, key: &DocumentKey, op: F) -> Result<Document, EngineError>
    where
        V: DocumentView,
        F: Fn(V) -> V,
    {
        self.run(key, None::<fn() -> V>, &op)
    }

    /// Like [`apply`](Self::apply), but a missing document is seeded from
    /// `seed` and committed with a must-not-exist condition — the explicit
    /// upsert arm. Losing a creation race to a concurrent writer simply
    /// turns the next attempt into a plain update.
    pub fn apply_or_insert<V, D, F>(
        &self,
        key: &DocumentKey,
        seed: D,
        op: F,
    ) -> Result<Document, EngineError>
    where
        V: DocumentView,
        D: Fn() -> V,
        F: Fn(V) -> V,
    {
        self.run(key, Some(seed), &op)
    }

    fn run<V, D, F>(
        &self,
        key: &DocumentKey,
        seed: Option<D>,
        op: &F,
    ) -> Result<Document, EngineError>
    where
        V: DocumentView,
        D: Fn() -> V,
        F: Fn(V) -> V,
    {
        let mut failed_attempts = 0_u32;

        loop {
            match self.attempt(key, seed.as_ref(), op) {
                Ok(document) => return Ok(document),
                Err(AttemptError::Conflict) => {
                    failed_attempts += 1;
                    if !self.retry.allows_retry(failed_attempts) {
                        return Err(EngineError::TransactionAborted {
                            key: key.clone(),
                            attempts: failed_attempts,
                        });
                    }
                    tracing::debug!(
                        key = %key,
                        failed_attempts,
                        "optimistic write conflict; retrying with fresh snapshot"
                    );
                }
                Err(AttemptError::Transient { message }) => {
                    failed_attempts += 1;
                    if !self.retry.allows_retry(failed_attempts) {
                        return Err(EngineError::TransientStore { message });
                    }
                    tracing::warn!(
                        key = %key,
                        failed_attempts,
                        error = %message,
                        "transient store failure inside mutation cycle; backing off"
                    );
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
            }

            retry::sleep_before_retry(&self.retry, failed_attempts);
        }
    }

    // One full read-compute-write cycle.
    fn attempt<V, D, F>(
        &self,
        key: &DocumentKey,
        seed: Option<&D>,
        op: &F,
    ) -> Result<Document, AttemptError>
    where
        V: DocumentView,
        D: Fn() -> V,
        F: Fn(V) -> V,
    {
        let (view, expected) = match self.store.read_versioned(key) {
            Ok(Some((document, version))) => {
                let view = V::from_document(&document)
                    .map_err(|err| AttemptError::Fatal(err.into()))?;
                (view, Some(version))
            }
            Ok(None) => match seed {
                Some(seed) => (seed(), None),
                None => {
                    return Err(AttemptError::Fatal(EngineError::NotFound {
                        key: key.clone(),
                    }));
                }
            },
            Err(StoreError::Transient { message }) => {
                return Err(AttemptError::Transient { message });
            }
            Err(err) => return Err(AttemptError::Fatal(err.into())),
        };

        let next = op(view).into_document();

        match self.store.write_conditional(key, expected, next.clone()) {
            Ok(_) => Ok(next),
            Err(StoreError::Conflict) => Err(AttemptError::Conflict),
            Err(StoreError::Transient { message }) => Err(AttemptError::Transient { message }),
            Err(err) => Err(AttemptError::Fatal(err.into())),
        }
    }
}

// Per-cycle failure classification, internal to the mutator.
enum AttemptError {
    Conflict,
    Transient { message: String },
    Fatal(EngineError),
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{DocumentView, Mutator, ViewError};
    use crate::{
        document::{Document, DocumentKey},
        error::{EngineError, ErrorKind},
        retry::RetryPolicy,
        test_support::MemoryStore,
        value::Value,
    };
    use std::time::Duration;

    struct CounterView {
        count: u64,
    }

    impl CounterView {
        const fn incremented(self) -> Self {
            Self {
                count: self.count + 1,
            }
        }
    }

    impl DocumentView for CounterView {
        fn from_document(document: &Document) -> Result<Self, ViewError> {
            match document.field("count") {
                Some(Value::Uint(count)) => Ok(Self { count: *count }),
                other => Err(ViewError::new(format!("count must be a uint, got {other:?}"))),
            }
        }

        fn into_document(self) -> Document {
            Document::new().with("count", self.count)
        }
    }

    fn key(text: &str) -> DocumentKey {
        DocumentKey::new(text).expect("key should construct")
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: true,
        }
    }

    #[test]
    fn apply_increments_through_a_typed_view() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", 41_u64));
        let mutator = Mutator::new(&store);

        let committed = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect("mutation should commit");

        assert_eq!(committed.field("count"), Some(&Value::Uint(42)));
        assert_eq!(
            store
                .document(&key("counter"))
                .expect("document present")
                .field("count"),
            Some(&Value::Uint(42))
        );
    }

    #[test]
    fn apply_surfaces_not_found_without_creating_anything() {
        let store = MemoryStore::new();
        let mutator = Mutator::new(&store);

        let err = mutator
            .apply(&key("ghost"), CounterView::incremented)
            .expect_err("missing document must not be created");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn apply_or_insert_seeds_a_missing_document_then_updates_it() {
        let store = MemoryStore::new();
        let mutator = Mutator::new(&store);
        let seed = || CounterView { count: 0 };

        let first = mutator
            .apply_or_insert(&key("counter"), seed, CounterView::incremented)
            .expect("upsert should commit");
        assert_eq!(first.field("count"), Some(&Value::Uint(1)));

        let second = mutator
            .apply_or_insert(&key("counter"), seed, CounterView::incremented)
            .expect("second upsert should update");
        assert_eq!(second.field("count"), Some(&Value::Uint(2)));
    }

    #[test]
    fn conflicts_are_retried_with_a_fresh_snapshot() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", 0_u64));
        // Two injected conflicts, then the cycle lands.
        store.fail_next_conditional_writes(2);
        let mutator = Mutator::with_retry(&store, fast_retry(5));

        let committed = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect("mutation should survive conflicts");
        assert_eq!(committed.field("count"), Some(&Value::Uint(1)));
    }

    #[test]
    fn exhausted_conflict_budget_surfaces_transaction_aborted() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", 0_u64));
        store.fail_next_conditional_writes(10);
        let mutator = Mutator::with_retry(&store, fast_retry(3));

        let err = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect_err("persistent conflict must abort");
        assert!(matches!(
            err,
            EngineError::TransactionAborted { attempts: 3, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Aborted);

        // The original value is untouched: no partial write escaped.
        assert_eq!(
            store
                .document(&key("counter"))
                .expect("document present")
                .field("count"),
            Some(&Value::Uint(0))
        );
    }

    #[test]
    fn transient_read_failures_burn_the_same_budget() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", 0_u64));
        store.fail_next_reads(2);
        let mutator = Mutator::with_retry(&store, fast_retry(5));

        let committed = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect("mutation should survive transient reads");
        assert_eq!(committed.field("count"), Some(&Value::Uint(1)));

        store.fail_next_reads(10);
        let err = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect_err("persistent transient failure must surface");
        assert_eq!(err.kind(), ErrorKind::Transient);
        store.fail_next_reads(0);
    }

    #[test]
    fn view_mismatch_is_fatal_and_unretried() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", "not-a-number"));
        let mutator = Mutator::new(&store);

        let err = mutator
            .apply(&key("counter"), CounterView::incremented)
            .expect_err("view mismatch must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.read_count(), 1);
    }

    #[test]
    fn fifty_concurrent_increments_lose_no_update() {
        let store = MemoryStore::new();
        store.seed("counter", Document::new().with("count", 0_u64));

        std::thread::scope(|scope| {
            for _ in 0..50 {
                scope.spawn(|| {
                    let mutator = Mutator::with_retry(&store, fast_retry(64));
                    mutator
                        .apply(&key("counter"), CounterView::incremented)
                        .expect("every caller should eventually commit");
                });
            }
        });

        assert_eq!(
            store
                .document(&key("counter"))
                .expect("document present")
                .field("count"),
            Some(&Value::Uint(50))
        );
    }
}
