//! Module: paginate
//! Responsibility: lazy, restartable scan state — drive the page fetcher,
//! thread continuation cursors, retry transient fetches, observe
//! cancellation.
//! Does not own: store query compilation (see `fetch`).

use crate::{
    access::AccessPattern,
    cancel::CancelToken,
    cursor::Cursor,
    document::Record,
    error::EngineError,
    fetch::{Page, PageFetcher},
    retry::{self, RetryPolicy},
    store::DocumentStore,
};
use std::collections::VecDeque;

/// Default page size for scans that don't specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

///
/// PaginateOptions
///

#[derive(Clone, Debug)]
pub struct PaginateOptions {
    pub page_size: u32,
    pub retry: RetryPolicy,
    pub cancel: CancelToken,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            cancel: CancelToken::new(),
        }
    }
}

impl PaginateOptions {
    #[must_use]
    pub fn page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

///
/// Paginator
///
/// One logical scan over a pattern. Emits each matching record exactly once
/// in sort order (stable sort key assumed; inserts behind the cursor are
/// invisible to the current run). Holds at most one page of records.
///
/// One paginator per scan: concurrent use of a single instance is a caller
/// contract violation, enforced by the `&mut self` receivers.
///

pub struct Paginator<'a, S: DocumentStore> {
    fetcher: PageFetcher<'a, S>,
    pattern: AccessPattern,
    options: PaginateOptions,
    buffer: VecDeque<Record>,
    /// Cursor for the next fetch.
    resume_cursor: Option<Cursor>,
    /// Persistable resume point: no unconsumed record precedes it.
    checkpoint: Option<Cursor>,
    /// Promoted into `checkpoint` once the current buffer drains.
    pending_checkpoint: Option<Cursor>,
    exhausted: bool,
}

impl<'a, S: DocumentStore> Paginator<'a, S> {
    /// Start a fresh scan.
    #[must_use]
    pub fn new(store: &'a S, pattern: AccessPattern, options: PaginateOptions) -> Self {
        Self {
            fetcher: PageFetcher::new(store),
            pattern,
            options,
            buffer: VecDeque::new(),
            resume_cursor: None,
            checkpoint: None,
            pending_checkpoint: None,
            exhausted: false,
        }
    }

    /// Resume a prior scan from a persisted cursor. The cursor is validated
    /// against `pattern` on the first fetch.
    #[must_use]
    pub fn resume(
        store: &'a S,
        pattern: AccessPattern,
        options: PaginateOptions,
        cursor: Cursor,
    ) -> Self {
        let mut paginator = Self::new(store, pattern, options);
        paginator.resume_cursor = Some(cursor.clone());
        paginator.checkpoint = Some(cursor);
        paginator
    }

    /// Fetch the next page, retrying transient failures within the retry
    /// budget. `Ok(None)` once the stream ends or cancellation is observed.
    pub fn next_page(&mut self) -> Result<Option<Page>, EngineError> {
        if self.exhausted || self.options.cancel.is_cancelled() {
            return Ok(None);
        }

        let page = self.fetch_with_retry()?;
        self.resume_cursor = page.next_cursor().cloned();
        self.checkpoint = page.next_cursor().cloned();
        if page.next_cursor().is_none() {
            self.exhausted = true;
        }

        Ok(Some(page))
    }

    /// Yield the next record, fetching a page when the buffer runs dry.
    /// `Ok(None)` at end of stream or once cancellation is observed with an
    /// empty buffer; buffered records are always delivered first.
    pub fn next(&mut self) -> Result<Option<Record>, EngineError> {
        while self.buffer.is_empty() {
            if self.exhausted || self.options.cancel.is_cancelled() {
                return Ok(None);
            }

            let page = self.fetch_with_retry()?;
            self.resume_cursor = page.next_cursor().cloned();
            self.pending_checkpoint = page.next_cursor().cloned();
            if page.next_cursor().is_none() {
                self.exhausted = true;
            }

            let (records, _, _) = page.into_parts();
            self.buffer.extend(records);

            if self.buffer.is_empty() && self.exhausted {
                self.checkpoint = None;
                return Ok(None);
            }
        }

        let record = self.buffer.pop_front();
        if self.buffer.is_empty() {
            // Everything fetched so far has been consumed; the resume point
            // may advance past it.
            self.checkpoint = if self.exhausted {
                None
            } else {
                self.pending_checkpoint.take()
            };
        }

        Ok(record)
    }

    /// The resume token to persist: re-running from it re-delivers no
    /// record this paginator already yielded and loses none still pending.
    /// `None` before the first page and after a fully-consumed stream.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.checkpoint.as_ref()
    }

    /// Drain the remainder of the scan into memory.
    ///
    /// Unbounded by design; prefer `next`/`next_page` for collections that
    /// may not fit.
    pub fn collect_remaining(&mut self) -> Result<Vec<Record>, EngineError> {
        let mut records = Vec::new();
        while let Some(record) = self.next()? {
            records.push(record);
        }

        Ok(records)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    fn fetch_with_retry(&mut self) -> Result<Page, EngineError> {
        let mut failed_attempts = 0_u32;

        loop {
            match self.fetcher.fetch(
                &self.pattern,
                self.resume_cursor.as_ref(),
                self.options.page_size,
            ) {
                Ok(page) => return Ok(page),
                Err(err) if err.is_transient() && self.options.retry.allows_retry(failed_attempts + 1) => {
                    failed_attempts += 1;
                    tracing::warn!(
                        failed_attempts,
                        max_attempts = self.options.retry.max_attempts,
                        error = %err,
                        "transient page fetch failure; backing off"
                    );
                    retry::sleep_before_retry(&self.options.retry, failed_attempts);
                }
                // Fatal, or budget exhausted. The checkpoint cursor is
                // untouched and remains valid for resumption.
                Err(err) => return Err(err),
            }
        }
    }
}

///
/// TESTS
///
