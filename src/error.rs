//! Error types for RAR and SRR block parsing.
//!
//! This module provides the [`RarError`] type which covers every way a block
//! decode can fail, together with a [`Result`] alias.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Layout | [`Truncated`] | Buffer ends before a field it declares |
//! | Structure | [`MalformedHeader`], [`UnexpectedBlockType`] | Container is corrupt or mixes domains |
//! | Format | [`UnsupportedFormat`] | RAR5 signature detected |
//! | I/O | [`Io`] | Loading a file into memory failed |
//!
//! The block walkers never return these errors directly: a failure ends the
//! walk and is reported through [`WalkStop::Failed`] together with the offset
//! of the block that could not be decoded.
//!
//! ## Example
//!
//! ```rust
//! use rar_srr::{RarError, BlockHeader};
//!
//! let buffer = [0x00, 0x00, 0x74, 0x00, 0x00, 0x05, 0x00];
//! match BlockHeader::parse(&buffer, 0) {
//!     Err(RarError::MalformedHeader { offset, .. }) => assert_eq!(offset, 0),
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```
//!
//! [`Truncated`]: RarError::Truncated
//! [`MalformedHeader`]: RarError::MalformedHeader
//! [`UnexpectedBlockType`]: RarError::UnexpectedBlockType
//! [`UnsupportedFormat`]: RarError::UnsupportedFormat
//! [`Io`]: RarError::Io
//! [`WalkStop::Failed`]: crate::WalkStop::Failed

use std::io;
use thiserror::Error;

/// Error type for block decoding.
#[derive(Debug, Error)]
pub enum RarError {
    /// The buffer is shorter than a field demands.
    ///
    /// `offset` is the start of the block whose header or payload could not
    /// be completed, not the position of the missing byte.
    #[error("truncated block at offset {offset}: need {needed} bytes, have {have}")]
    Truncated {
        /// Offset of the block being decoded.
        offset: u64,
        /// Number of bytes the field run needs from the block start.
        needed: usize,
        /// Number of bytes available from the block start.
        have: usize,
    },

    /// A header is structurally invalid.
    ///
    /// Raised for a declared header size below 7, for a block span that does
    /// not move the walk forward, and for a span that runs past the buffer.
    #[error("malformed header at offset {offset}: {reason}")]
    MalformedHeader {
        /// Offset of the offending block.
        offset: u64,
        /// Short description of the violated invariant.
        reason: &'static str,
    },

    /// A block type appeared in a container domain where it is not valid,
    /// e.g. a RAR tag in the outer chain of an SRR file.
    #[error("unexpected block type 0x{block_type:02x} at offset {offset}")]
    UnexpectedBlockType {
        /// Offset of the offending block.
        offset: u64,
        /// The type byte that was found.
        block_type: u8,
    },

    /// The data uses a container format this crate only detects.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(&'static str),

    /// An I/O error occurred while loading input.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RarError {
    /// Offset of the block the error refers to, when it has one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Truncated { offset, .. }
            | Self::MalformedHeader { offset, .. }
            | Self::UnexpectedBlockType { offset, .. } => Some(*offset),
            Self::UnsupportedFormat(_) | Self::Io(_) => None,
        }
    }

    pub(crate) fn truncated(offset: u64, needed: usize, have: usize) -> Self {
        Self::Truncated {
            offset,
            needed,
            have,
        }
    }

    pub(crate) fn malformed(offset: u64, reason: &'static str) -> Self {
        Self::MalformedHeader { offset, reason }
    }
}

pub type Result<T> = std::result::Result<T, RarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offset() {
        let err = RarError::truncated(42, 11, 9);
        assert_eq!(
            err.to_string(),
            "truncated block at offset 42: need 11 bytes, have 9"
        );
        assert_eq!(err.offset(), Some(42));
    }

    #[test]
    fn test_unexpected_type_hex() {
        let err = RarError::UnexpectedBlockType {
            offset: 0,
            block_type: 0x74,
        };
        assert!(err.to_string().contains("0x74"));
    }

    #[test]
    fn test_io_has_no_offset() {
        let err = RarError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.offset().is_none());
        assert!(std::error::Error::source(&err).is_some());
    }
}
