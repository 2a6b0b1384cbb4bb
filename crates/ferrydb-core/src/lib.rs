//! Core runtime for FerryDB: access patterns, cursor-paged scans, chunked
//! bulk writes, optimistic mutations, and index advice over a
//! caller-supplied document-store driver.
//!
//! The engine owns correctness policy (cursor validation, retry budgets,
//! chunking, conflict handling); the store collaborator owns I/O.

// public exports are one module level down
pub mod access;
pub mod advisor;
pub mod bulk;
pub mod cancel;
pub mod config;
pub mod cursor;
pub mod document;
pub mod error;
pub mod fetch;
pub mod mutate;
pub mod paginate;
pub mod retry;
pub mod serialize;
pub mod store;
pub mod value;

// test
#[cfg(test)]
mod properties;
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// The runtime surface application code touches: declare a pattern, scan,
/// stage writes, mutate, check indexes.
///

pub mod prelude {
    pub use crate::{
        access::{AccessPattern, OrderDirection, OrderSpec, RangeOp},
        advisor::{IndexAdvisor, IndexReport},
        bulk::{BulkReport, BulkWriter, PendingWrite, WriteOutcome},
        cancel::CancelToken,
        config::EngineConfig,
        cursor::Cursor,
        document::{Document, DocumentKey, Record},
        error::{EngineError, ErrorKind},
        fetch::{Page, PageFetcher},
        mutate::{DocumentView, Mutator},
        paginate::{PaginateOptions, Paginator},
        retry::RetryPolicy,
        store::{DocumentStore, IndexSpec},
        value::{FieldValue, Value},
    };
}
