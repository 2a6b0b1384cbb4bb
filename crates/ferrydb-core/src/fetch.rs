//! Module: fetch
//! Responsibility: one bounded page query — compile pattern + cursor into a
//! store query, mint the next continuation cursor.
//! Does not own: retry policy or scan-state threading (see `paginate`).

use crate::{
    access::AccessPattern,
    cursor::Cursor,
    document::Record,
    error::EngineError,
    store::{DocumentStore, ScanBoundary, StoreQuery},
};

///
/// Page
///
/// One ordered slice of a scan plus the optional continuation cursor
/// (absent ⇒ end of stream) and the store-side examined-record count.
///

#[derive(Clone, Debug)]
pub struct Page {
    records: Vec<Record>,
    next_cursor: Option<Cursor>,
    scanned: usize,
}

impl Page {
    pub(crate) const fn new(
        records: Vec<Record>,
        next_cursor: Option<Cursor>,
        scanned: usize,
    ) -> Self {
        Self {
            records,
            next_cursor,
            scanned,
        }
    }

    /// Borrow the page rows (insertion order = sort order).
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Borrow the continuation cursor, if the stream continues.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    /// Records examined store-side while producing this page.
    #[must_use]
    pub const fn scanned(&self) -> usize {
        self.scanned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume this page and return `(records, next_cursor, scanned)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Record>, Option<Cursor>, usize) {
        (self.records, self.next_cursor, self.scanned)
    }
}

///
/// PageFetcher
///
/// Stateless single-page executor. Transient store errors pass through
/// un-retried; retry policy belongs to the paginator driving this.
///

#[derive(Clone, Copy, Debug)]
pub struct PageFetcher<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> PageFetcher<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetch one page of at most `page_size` records, resuming after
    /// `cursor` when present.
    pub fn fetch(
        &self,
        pattern: &AccessPattern,
        cursor: Option<&Cursor>,
        page_size: u32,
    ) -> Result<Page, EngineError> {
        if page_size == 0 {
            return Err(EngineError::invalid_argument("page size must be >= 1"));
        }

        // Malformed/mismatched cursors fail fast, before any store call.
        let boundary = cursor
            .map(|cursor| cursor.decode_for(pattern))
            .transpose()?;

        let query = StoreQuery {
            equality: pattern.equality().to_vec(),
            range: pattern.range().cloned(),
            boundary: boundary.map(ScanBoundary::new),
            order: pattern.order().clone(),
            limit: page_size,
        };

        let outcome = self.store.query(&query)?;
        if outcome.records.len() > page_size as usize {
            return Err(EngineError::corruption(format!(
                "store returned {} records for limit {page_size}",
                outcome.records.len()
            )));
        }

        // A full page may have more behind it; a short page is the end of
        // the stream by construction.
        let next_cursor = if outcome.records.len() == page_size as usize {
            match outcome.records.last() {
                Some((_, document)) => Some(Cursor::encode(
                    pattern,
                    document.sort_key(pattern.order()),
                )?),
                None => None,
            }
        } else {
            None
        };

        Ok(Page::new(outcome.records, next_cursor, outcome.scanned))
    }
}

///
/// TESTS
///
