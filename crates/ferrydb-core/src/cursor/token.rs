use crate::{
    access::PatternSignature,
    cursor::CursorError,
    serialize::{deserialize_bounded, serialize},
    value::Value,
};
use serde::{Deserialize, Serialize};

const MAX_CURSOR_TOKEN_BYTES: usize = 8 * 1024;

///
/// CursorToken
///
/// Decoded continuation payload: the pattern signature it was minted for and
/// the sort-value tuple of the last emitted record. Carries nothing else —
/// a cursor is a resume capability, not a data payload.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CursorToken {
    signature: PatternSignature,
    boundary: Vec<Value>,
}

impl CursorToken {
    pub(crate) const fn new(signature: PatternSignature, boundary: Vec<Value>) -> Self {
        Self { signature, boundary }
    }

    pub(crate) const fn signature(&self) -> PatternSignature {
        self.signature
    }

    pub(crate) fn boundary(&self) -> &[Value] {
        self.boundary.as_slice()
    }

    pub(crate) fn into_boundary(self) -> Vec<Value> {
        self.boundary
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, CursorError> {
        let wire = CursorTokenWire {
            version: CursorTokenVersion::V1.encode(),
            signature: self.signature.into_bytes(),
            boundary: self.boundary.clone(),
        };

        serialize(&wire).map_err(|err| CursorError::Encode(err.to_string()))
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, CursorError> {
        let wire: CursorTokenWire = deserialize_bounded(bytes, MAX_CURSOR_TOKEN_BYTES)
            .map_err(|err| CursorError::Decode(err.to_string()))?;

        // Decode the version first so compatibility behavior stays centralized.
        CursorTokenVersion::decode(wire.version)?;

        Ok(Self {
            signature: PatternSignature::from_bytes(wire.signature),
            boundary: wire.boundary,
        })
    }

    #[cfg(test)]
    pub(crate) fn encode_with_version_for_test(&self, version: u8) -> Result<Vec<u8>, CursorError> {
        let wire = CursorTokenWire {
            version,
            signature: self.signature.into_bytes(),
            boundary: self.boundary.clone(),
        };

        serialize(&wire).map_err(|err| CursorError::Encode(err.to_string()))
    }
}

///
/// CursorTokenVersion
///
/// Wire-level token version owned by the cursor protocol boundary.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CursorTokenVersion {
    V1,
}

impl CursorTokenVersion {
    const V1_TAG: u8 = 1;

    const fn decode(raw: u8) -> Result<Self, CursorError> {
        match raw {
            Self::V1_TAG => Ok(Self::V1),
            version => Err(CursorError::UnsupportedVersion { version }),
        }
    }

    const fn encode(self) -> u8 {
        match self {
            Self::V1 => Self::V1_TAG,
        }
    }
}

///
/// CursorTokenWire
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct CursorTokenWire {
    version: u8,
    signature: [u8; 32],
    boundary: Vec<Value>,
}

///
/// TESTS
///
