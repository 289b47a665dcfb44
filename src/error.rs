//! Error taxonomy for the codec.
//!
//! Every fallible operation in this crate returns one of these kinds. Parse
//! errors carry the byte offset inside the source where the failure was
//! detected plus a short hex excerpt of the offending octets, so a caller
//! debugging a malformed smart-card response does not have to re-dump the
//! whole buffer.

use thiserror::Error;

/// Maximum number of octets shown in an error excerpt.
const EXCERPT_LEN: usize = 16;

/// Renders up to [`EXCERPT_LEN`] octets of `data` as a hex string.
pub fn hex_excerpt(data: &[u8]) -> String {
    hex::encode(&data[..data.len().min(EXCERPT_LEN)])
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed tag at offset {offset}: {excerpt}")]
    MalformedTag { offset: usize, excerpt: String },

    #[error("tag exceeds {max} octets at offset {offset}: {excerpt}")]
    TagTooLong {
        offset: usize,
        excerpt: String,
        max: usize,
    },

    #[error("malformed length at offset {offset}: {excerpt}")]
    MalformedLength { offset: usize, excerpt: String },

    #[error("length overflow at offset {offset}: {excerpt}")]
    LengthOverflow { offset: usize, excerpt: String },

    #[error("source truncated at offset {offset}: needed {needed} more octet(s)")]
    TruncatedSource { offset: usize, needed: usize },

    #[error("cannot construct typed value: {reason}")]
    TypedConstructionError { reason: String },

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Offset into the source at which this error was detected, if known.
    pub fn source_offset(&self) -> Option<usize> {
        match self {
            Error::MalformedTag { offset, .. }
            | Error::TagTooLong { offset, .. }
            | Error::MalformedLength { offset, .. }
            | Error::LengthOverflow { offset, .. }
            | Error::TruncatedSource { offset, .. } => Some(*offset),
            Error::TypedConstructionError { .. } | Error::ShapeMismatch { .. } => None,
        }
    }

    /// True for the transient "not enough data yet" condition that callers
    /// feeding a streaming/random-access source may want to retry after
    /// appending more octets.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::TruncatedSource { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_input() {
        let data: Vec<u8> = (0u8..32).collect();
        assert_eq!(hex_excerpt(&data).len(), EXCERPT_LEN * 2);
    }

    #[test]
    fn truncated_is_recognized() {
        let e = Error::TruncatedSource {
            offset: 4,
            needed: 2,
        };
        assert!(e.is_truncated());
        assert_eq!(e.source_offset(), Some(4));
    }
}
