//! Property tests for the cross-module pagination and bulk contracts.

use crate::{
    access::AccessPattern,
    bulk::{BulkWriter, PendingWrite},
    cancel::CancelToken,
    cursor::Cursor,
    document::{Document, DocumentKey},
    paginate::{PaginateOptions, Paginator},
    retry::RetryPolicy,
    test_support::MemoryStore,
    value::Value,
};
use proptest::prelude::*;

fn seeded_store(count: u32) -> MemoryStore {
    let store = MemoryStore::new();
    for n in 1..=count {
        store.seed(
            &format!("doc-{n:04}"),
            Document::new()
                .with("category", "books")
                .with("created_at", u64::from(n))
                .with("id", format!("doc-{n:04}")),
        );
    }
    store
}

fn by_created_at() -> AccessPattern {
    AccessPattern::builder()
        .eq("category", "books")
        .sort_asc("created_at")
        .sort_asc("id")
        .build()
        .expect("pattern should build")
}

fn options(page_size: u32) -> PaginateOptions {
    PaginateOptions {
        page_size,
        retry: RetryPolicy::none(),
        cancel: CancelToken::new(),
    }
}

fn created_at(record: &(DocumentKey, Document)) -> u64 {
    match record.1.field("created_at") {
        Some(Value::Uint(n)) => *n,
        other => panic!("unexpected created_at: {other:?}"),
    }
}

proptest! {
    /// Draining a paginator yields exactly N records, each exactly once, in
    /// sort order — for every N (including 0) and page size.
    #[test]
    fn drain_is_complete_for_every_collection_and_page_size(
        count in 0_u32..60,
        page_size in 1_u32..13,
    ) {
        let store = seeded_store(count);
        let mut paginator = Paginator::new(&store, by_created_at(), options(page_size));

        let drained = paginator
            .collect_remaining()
            .expect("drain should succeed");
        let ids: Vec<u64> = drained.iter().map(created_at).collect();

        prop_assert_eq!(ids, (1..=u64::from(count)).collect::<Vec<u64>>());
        prop_assert!(paginator.is_exhausted());
    }

    /// Splitting a scan at any consumed-record count and resuming from the
    /// persisted cursor loses nothing: original remainder plus resumed run
    /// covers the same record set as one uninterrupted drain.
    #[test]
    fn resumed_scans_cover_the_full_record_set(
        count in 1_u32..50,
        page_size in 1_u32..9,
        consumed in 0_u32..50,
    ) {
        let consumed = consumed.min(count);
        let store = seeded_store(count);

        let mut original = Paginator::new(&store, by_created_at(), options(page_size));
        let mut seen = Vec::new();
        for _ in 0..consumed {
            let record = original
                .next()
                .expect("next should succeed")
                .expect("record present while under count");
            seen.push(created_at(&record));
        }

        match original.cursor().map(Cursor::as_str) {
            Some(token) => {
                let mut resumed = Paginator::resume(
                    &store,
                    by_created_at(),
                    options(page_size),
                    Cursor::from_token(token.to_string()),
                );
                let rest = resumed
                    .collect_remaining()
                    .expect("resumed drain should succeed");

                let mut covered: Vec<u64> = seen;
                covered.extend(rest.iter().map(created_at));
                covered.sort_unstable();
                covered.dedup();

                prop_assert_eq!(covered, (1..=u64::from(count)).collect::<Vec<u64>>());
            }
            None => {
                // No checkpoint yet (mid-page or finished): the original
                // run itself must still account for every record.
                let rest = original
                    .collect_remaining()
                    .expect("original drain should succeed");
                let mut covered: Vec<u64> = seen;
                covered.extend(rest.iter().map(created_at));

                prop_assert_eq!(covered, (1..=u64::from(count)).collect::<Vec<u64>>());
            }
        }
    }

    /// K pending writes always produce exactly K outcomes, whatever the
    /// chunk size.
    #[test]
    fn every_pending_write_gets_exactly_one_outcome(
        count in 0_u32..40,
        chunk_size in 1_u32..17,
    ) {
        let store = MemoryStore::new();
        let writer = BulkWriter::new(&store);

        let writes: Vec<PendingWrite> = (1..=count)
            .map(|n| PendingWrite::Insert {
                key: DocumentKey::new(format!("doc-{n:04}"))
                    .expect("key should construct"),
                document: Document::new().with("n", u64::from(n)),
            })
            .collect();

        let report = writer
            .submit(writes, chunk_size)
            .expect("submit should succeed");

        prop_assert_eq!(report.len(), count as usize);
        prop_assert_eq!(report.applied(), count as usize);
        prop_assert_eq!(store.len(), count as usize);
    }
}
