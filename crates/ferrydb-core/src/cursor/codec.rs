///
/// Token codec helpers.
///
/// This module owns the printable form of continuation tokens: raw token
/// bytes in, lowercase hex out. It contains no cursor semantics.
///

// Defensive decode bound for untrusted token input.
const MAX_TOKEN_HEX_LEN: usize = 8 * 1024;

///
/// TokenFormatError
///

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TokenFormatError {
    #[error("token is empty")]
    Empty,

    #[error("token exceeds max length: {len} hex chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("token must have an even number of hex characters")]
    OddLength,

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },
}

/// Encode raw token bytes as a lowercase hex string.
#[must_use]
pub(crate) fn encode_token(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decode a hex token (either case) into raw bytes.
///
/// Surrounding whitespace is trimmed; tokens travel through URLs and
/// checkpoint records where that happens.
pub(crate) fn decode_token(token: &str) -> Result<Vec<u8>, TokenFormatError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(TokenFormatError::Empty);
    }

    if token.len() > MAX_TOKEN_HEX_LEN {
        return Err(TokenFormatError::TooLong {
            len: token.len(),
            max: MAX_TOKEN_HEX_LEN,
        });
    }

    if !token.len().is_multiple_of(2) {
        return Err(TokenFormatError::OddLength);
    }

    token
        .as_bytes()
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| {
            let hi = hex_nibble(pair[0]).ok_or(TokenFormatError::InvalidHex {
                position: idx * 2 + 1,
            })?;
            let lo = hex_nibble(pair[1]).ok_or(TokenFormatError::InvalidHex {
                position: idx * 2 + 2,
            })?;

            Ok((hi << 4) | lo)
        })
        .collect()
}

const fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

///
/// TESTS
///
