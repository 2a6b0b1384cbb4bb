//! Module: cursor
//! Responsibility: the opaque continuation token protocol — minting a resume
//! token from a sort boundary and validating it against an access pattern.
//! Does not own: page fetching or scan-state threading (see `paginate`).

pub(crate) mod codec;
mod token;

pub use codec::TokenFormatError;

use crate::{access::AccessPattern, value::Value};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use token::CursorToken;

///
/// Cursor
///
/// Opaque, printable resume token. Safe to persist in a session, a
/// "next page" URL parameter, or a batch-job checkpoint record; all
/// validation happens when the token is decoded against a pattern.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a previously persisted token without validating it.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the printable token for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mint a cursor for a pattern from the sort-value boundary of the last
    /// emitted record. Deterministic: same boundary + same pattern → same
    /// token.
    pub(crate) fn encode(
        pattern: &AccessPattern,
        boundary: Vec<Value>,
    ) -> Result<Self, CursorError> {
        let token = CursorToken::new(pattern.signature(), boundary);
        let bytes = token.encode()?;

        Ok(Self(codec::encode_token(&bytes)))
    }

    /// Decode and validate this cursor against a pattern, returning the
    /// boundary sort values to resume after.
    pub(crate) fn decode_for(&self, pattern: &AccessPattern) -> Result<Vec<Value>, CursorError> {
        let bytes = codec::decode_token(&self.0)?;
        let token = CursorToken::decode(&bytes)?;

        if token.signature() != pattern.signature() {
            return Err(CursorError::PatternMismatch);
        }

        let expected = pattern.order().arity();
        let found = token.boundary().len();
        if found != expected {
            return Err(CursorError::BoundaryArityMismatch { expected, found });
        }

        Ok(token.into_boundary())
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// CursorError
///
/// Cursor decode/validation failures. All fatal: the caller restarts
/// pagination from the beginning rather than resuming with wrong data.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorError {
    #[error("malformed cursor token: {0}")]
    Format(#[from] TokenFormatError),

    #[error("failed to encode cursor token: {0}")]
    Encode(String),

    #[error("failed to decode cursor token: {0}")]
    Decode(String),

    #[error("unsupported cursor token version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("cursor was produced for a different access pattern")]
    PatternMismatch,

    #[error("cursor boundary arity mismatch: expected {expected}, found {found}")]
    BoundaryArityMismatch { expected: usize, found: usize },
}

///
/// TESTS
///
