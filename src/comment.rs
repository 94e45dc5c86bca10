//! Archive comments and the extraction seam.
//!
//! RAR 3.x stores the archive comment in a `CMT` service block. A stored
//! (method `0x30`) comment is plain text and is decoded here; anything
//! else is compressed and handed to a caller-supplied
//! [`CommentExtractor`], typically a wrapper around an external archiver.
//!
//! ```rust
//! use rar_srr::{CommentSource, ParseContext};
//!
//! let extractor = |source: CommentSource<'_>| match source {
//!     CommentSource::Bytes(bytes) => Ok(format!("{} bytes", bytes.len())),
//!     CommentSource::Path(path) => Err(format!("no archiver for {}", path.display())),
//! };
//! let ctx = ParseContext {
//!     source_path: None,
//!     extractor: Some(&extractor),
//! };
//! assert!(ctx.extractor.is_some());
//! ```

use std::path::Path;

use log::warn;

use crate::block::Container;
use crate::parsing::text::decode_text;
use crate::parsing::{CompressionMethod, HostOs, SubBlock, TextEncoding};

/// What the extractor gets to work from.
#[derive(Debug, Clone, Copy)]
pub enum CommentSource<'a> {
    /// The archive on disk.
    Path(&'a Path),
    /// Archive bytes from its marker through the end of the comment block.
    Bytes(&'a [u8]),
}

/// Recovers the plaintext of a compressed archive comment.
pub trait CommentExtractor {
    fn extract(&self, source: CommentSource<'_>) -> Result<String, String>;
}

impl<F> CommentExtractor for F
where
    F: Fn(CommentSource<'_>) -> Result<String, String>,
{
    fn extract(&self, source: CommentSource<'_>) -> Result<String, String> {
        self(source)
    }
}

/// Per-parse context, passed explicitly to the drivers.
#[derive(Clone, Copy, Default)]
pub struct ParseContext<'a> {
    /// Path the buffer was loaded from, if any.
    pub source_path: Option<&'a Path>,
    pub extractor: Option<&'a dyn CommentExtractor>,
}

impl<'a> ParseContext<'a> {
    pub fn with_path(path: &'a Path) -> Self {
        Self {
            source_path: Some(path),
            extractor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveComment {
    pub method: CompressionMethod,
    /// Offset of the `CMT` block.
    pub offset: u64,
    /// Host OS and DOS time of the `CMT` record; packers differ in what
    /// they write here, which matters when rebuilding the block.
    pub host_os: HostOs,
    pub dos_time: u32,
    /// Size of the comment once decompressed.
    pub unpacked_size: u64,
    /// Payload exactly as stored, compressed unless `method` is Store.
    /// `None` when the payload is not in the buffer.
    pub data: Option<Vec<u8>>,
    pub text: Option<String>,
    /// Strategy that decoded a stored comment.
    pub encoding: Option<TextEncoding>,
    /// Why `text` is missing, or how it was obtained.
    pub note: Option<String>,
}

impl ArchiveComment {
    /// Some packers zero the time field of the comment record.
    pub fn has_zeroed_time(&self) -> bool {
        self.dos_time == 0
    }
}

/// Resolve the first `CMT` service block of `container`.
///
/// The extractor receives the source path when `use_path` is set and a path
/// is known, otherwise the buffer from the container start through the end
/// of the comment payload.
pub(crate) fn resolve(
    container: &Container,
    data: &[u8],
    ctx: &ParseContext<'_>,
    use_path: bool,
) -> Option<ArchiveComment> {
    let cmt = container.services().find(|sub| sub.is_comment())?;
    Some(resolve_block(cmt, container.start_offset, data, ctx, use_path))
}

fn resolve_block(
    cmt: &SubBlock,
    start: u64,
    data: &[u8],
    ctx: &ParseContext<'_>,
    use_path: bool,
) -> ArchiveComment {
    let header = cmt.header();
    let mut comment = ArchiveComment {
        method: cmt.record.method,
        offset: header.offset,
        host_os: cmt.record.host_os,
        dos_time: cmt.record.dos_time,
        unpacked_size: cmt.record.unpacked_size,
        data: None,
        text: None,
        encoding: None,
        note: None,
    };

    let payload_start = header.header_end() as usize;
    let payload_end = header.offset.saturating_add(header.full_size()) as usize;
    let Some(payload) = data.get(payload_start..payload_end) else {
        comment.note = Some("comment payload is not present".to_string());
        return comment;
    };
    comment.data = Some(payload.to_vec());

    if cmt.record.method == CompressionMethod::Store {
        let decoded = decode_text(payload);
        comment.text = Some(decoded.text);
        comment.encoding = Some(decoded.encoding);
        return comment;
    }

    let Some(extractor) = ctx.extractor else {
        comment.note = Some(format!(
            "comment is compressed ({}) and no extractor is configured",
            cmt.record.method
        ));
        return comment;
    };

    let source = match ctx.source_path {
        Some(path) if use_path => CommentSource::Path(path),
        _ => CommentSource::Bytes(&data[(start as usize).min(payload_end)..payload_end]),
    };
    match extractor.extract(source) {
        Ok(text) => {
            comment.text = Some(text);
            comment.note = Some("extracted".to_string());
        }
        Err(err) => {
            warn!("comment extraction failed at offset {}: {err}", header.offset);
            comment.note = Some(format!("comment extraction failed: {err}"));
        }
    }
    comment
}
