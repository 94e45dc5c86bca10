//! RAR 1.5-4.x and SRR block-chain parser.
//!
//! Decodes the header chain of RAR archives (pre-RAR5) and of SRR files,
//! which keep a byte-accurate copy of a release's RAR headers without the
//! packed data. For SRR files the original volume sizes are reconstructed
//! from the stripped headers.
//!
//! ## Features
//! - `async` - Async file loading with tokio
//!
//! ## Example
//!
//! ```rust
//! use rar_srr::{Block, ParseContext, RarArchive, WalkStop};
//!
//! let data = b"Rar!\x1a\x07\x00";
//! let archive = RarArchive::parse(data, &ParseContext::default());
//! assert!(matches!(archive.blocks()[0], Block::Marker(_)));
//! assert!(matches!(archive.stop(), WalkStop::Exhausted));
//! ```
//!
//! Payload bytes are never decompressed; compressed archive comments are
//! handed to a [`CommentExtractor`] supplied by the caller.

pub mod archive;
pub mod block;
pub mod comment;
mod crc32;
pub mod error;
mod file_media;
pub mod formats;
pub mod layout;
pub mod parsing;
pub mod srr;
pub mod walker;

pub use archive::RarArchive;
pub use block::{ArchiveEntry, Block, Container};
pub use comment::{ArchiveComment, CommentExtractor, CommentSource, ParseContext};
pub use crc32::{crc32, header_crc16};
pub use error::{RarError, Result};
pub use file_media::LocalFileMedia;
pub use formats::{EmbeddedVersion, Signature};
pub use parsing::unicode_name::{decode as decode_unicode_name, encode as encode_unicode_name};
pub use parsing::{BlockHeader, BlockType, TextEncoding, TypeSet};
pub use srr::{ArchiveSummary, SrrFile};
pub use walker::{BlockWalker, PayloadLayout, WalkOptions, WalkStop};
