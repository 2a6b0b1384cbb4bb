use crate::{
    access::PatternError,
    cursor::CursorError,
    document::{DocumentKey, KeyError},
    store::StoreError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
///
/// Engine-boundary error surfaced to application code. Whether a failure is
/// retryable is a static property of its [`ErrorKind`], never inferred from
/// message text.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EngineError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// Local retry budgets were already spent before this surfaces; the
    /// caller may re-issue the whole operation.
    #[error("transient store failure: {message}")]
    TransientStore { message: String },

    #[error("document not found: {key}")]
    NotFound { key: DocumentKey },

    #[error("transaction aborted for '{key}' after {attempts} attempts")]
    TransactionAborted { key: DocumentKey, attempts: u32 },

    #[error("store corruption: {message}")]
    Corruption { message: String },
}

impl EngineError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidCursor(_) => ErrorKind::InvalidCursor,
            Self::TransientStore { .. } => ErrorKind::Transient,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TransactionAborted { .. } => ErrorKind::Aborted,
            Self::Corruption { .. } => ErrorKind::Corruption,
        }
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transient { message } => Self::TransientStore { message },
            // A conflict escaping an optimistic cycle means the store raced
            // on a plain operation; classify as transient so callers can
            // re-issue.
            StoreError::Conflict => Self::TransientStore {
                message: "conditional write conflict".to_string(),
            },
            StoreError::Corrupt { message } => Self::Corruption { message },
        }
    }
}

impl From<PatternError> for EngineError {
    fn from(err: PatternError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<KeyError> for EngineError {
    fn from(err: KeyError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

///
/// ErrorKind
///
/// Stable engine error taxonomy. `is_transient` is the single source of
/// truth for retryability.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidCursor,
    Transient,
    NotFound,
    Aborted,
    Corruption,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidCursor => "invalid_cursor",
            Self::Transient => "transient",
            Self::NotFound => "not_found",
            Self::Aborted => "aborted",
            Self::Corruption => "corruption",
        }
    }

    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///
