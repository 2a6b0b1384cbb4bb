use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

///
/// CancelToken
///
/// Cooperative cancellation flag shared between a caller and a long-running
/// engine call (full scan drain, large bulk submit). Cancellation is
/// observed between pages and between chunks: in-flight store calls run to
/// completion, nothing new is started, and partial results are returned.
///

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; clones observe it immediately.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

///
/// TESTS
///
