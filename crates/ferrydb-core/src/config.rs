//! Engine configuration with documented, conservative defaults.
//!
//! Everything here deserializes from the caller's config layer; nothing is
//! hard-coded at call sites.

use crate::{
    bulk::BulkOptions,
    cancel::CancelToken,
    paginate::PaginateOptions,
    retry::RetryPolicy,
};
use serde::{Deserialize, Serialize};

///
/// BulkConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Chunk size used by `submit_with_defaults`. Conservative relative to
    /// common per-request operation-count limits.
    pub default_chunk_size: u32,
    /// Hard ceiling for caller-supplied chunk sizes. Exceeding it is an
    /// `InvalidArgument`, never a silent clamp.
    pub max_chunk_size: u32,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: 500,
            max_chunk_size: 1_000,
        }
    }
}

///
/// EngineConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bulk: BulkConfig,
    /// Retry budget for transient store failures: page fetches (driven by
    /// the paginator) and wholesale bulk-chunk failures.
    pub transient_retry: RetryPolicy,
    /// Retry budget for optimistic read-modify-write cycles; raise it for
    /// counters under heavy write contention.
    pub mutation_retry: RetryPolicy,
}

impl EngineConfig {
    #[must_use]
    pub fn conservative() -> Self {
        Self::default()
    }

    /// Paginator options backed by this configuration.
    #[must_use]
    pub fn paginate_options(&self, page_size: u32, cancel: CancelToken) -> PaginateOptions {
        PaginateOptions {
            page_size,
            retry: self.transient_retry,
            cancel,
        }
    }

    /// Bulk-writer options backed by this configuration.
    #[must_use]
    pub fn bulk_options(&self, cancel: CancelToken) -> BulkOptions {
        BulkOptions {
            config: self.bulk,
            retry: self.transient_retry,
            cancel,
        }
    }
}

///
/// TESTS
///
