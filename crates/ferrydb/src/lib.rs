//! ## Crate layout
//! - `core`: the engine runtime — access patterns, cursors, paged scans,
//!   chunked bulk writes, optimistic mutations, and index advice.
//!
//! The `prelude` module mirrors the runtime surface used by application
//! code; bring it into scope and declare a pattern, scan, stage writes,
//! mutate, check indexes.

pub use ferrydb_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use ferrydb_core::error::EngineError as Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
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
        value::{FieldValue as _, Value},
    };
}
