//! RAR 1.5-4.x archive driver.
//!
//! Walks a complete volume held in memory and resolves its comment. The
//! signature check is advisory: a buffer without a marker is still walked,
//! only a RAR 5.0 signature is refused.

use std::path::Path;

use log::{debug, warn};

use crate::block::{ArchiveEntry, Block, Container};
use crate::comment::{self, ArchiveComment, CommentExtractor, ParseContext};
use crate::error::{RarError, Result};
use crate::file_media::LocalFileMedia;
use crate::formats::Signature;
use crate::walker::{BlockWalker, WalkOptions, WalkStop};

#[derive(Debug)]
pub struct RarArchive {
    /// Signature found at offset 0, if any.
    pub signature: Option<Signature>,
    pub container: Container,
}

impl RarArchive {
    pub fn parse(data: &[u8], ctx: &ParseContext<'_>) -> Self {
        let signature = Signature::from_bytes(data);
        match signature {
            Some(Signature::Rar50) => {
                debug!("RAR 5.0 signature, not walking");
                return Self {
                    signature,
                    container: Container {
                        start_offset: 0,
                        blocks: Vec::new(),
                        stop: WalkStop::Failed(RarError::UnsupportedFormat(
                            "RAR 5.0 archives are detected but not parsed",
                        )),
                        end_offset: 0,
                        on_disk_size: 0,
                        crc_mismatches: 0,
                        comment: None,
                    },
                };
            }
            Some(Signature::Rar15) => {}
            None => warn!("no RAR signature at offset 0, walking anyway"),
        }

        let mut container = BlockWalker::new(data, 0, WalkOptions::rar()).finish();
        container.comment = comment::resolve(&container, data, ctx, true);
        Self {
            signature,
            container,
        }
    }

    /// Load and parse a volume from disk.
    pub fn open_path(
        path: impl AsRef<Path>,
        extractor: Option<&dyn CommentExtractor>,
    ) -> Result<Self> {
        let media = LocalFileMedia::new(path)?;
        let data = media.read_all()?;
        let ctx = ParseContext {
            source_path: Some(media.path()),
            extractor,
        };
        Ok(Self::parse(&data, &ctx))
    }

    /// Async variant of [`open_path`](Self::open_path).
    #[cfg(feature = "async")]
    #[cfg_attr(docsrs, doc(cfg(feature = "async")))]
    pub async fn open(
        path: impl AsRef<Path>,
        extractor: Option<&dyn CommentExtractor>,
    ) -> Result<Self> {
        let media = LocalFileMedia::new(path)?;
        let data = media.read_all_async().await?;
        let ctx = ParseContext {
            source_path: Some(media.path()),
            extractor,
        };
        Ok(Self::parse(&data, &ctx))
    }

    /// Set when the buffer is a format this crate does not walk.
    pub fn format_error(&self) -> Option<&RarError> {
        match &self.container.stop {
            WalkStop::Failed(err @ RarError::UnsupportedFormat(_)) => Some(err),
            _ => None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.container.blocks
    }

    pub fn stop(&self) -> &WalkStop {
        &self.container.stop
    }

    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.container.entries()
    }

    pub fn comment(&self) -> Option<&ArchiveComment> {
        self.container.comment.as_ref()
    }

    pub fn crc_mismatches(&self) -> usize {
        self.container.crc_mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rar5_is_reported_not_walked() {
        let data = b"Rar!\x1a\x07\x01\x00\x33\x92\xb5\xe5\x0a\x01\x05\x06\x00";
        let archive = RarArchive::parse(data, &ParseContext::default());
        assert_eq!(archive.signature, Some(Signature::Rar50));
        assert!(archive.blocks().is_empty());
        assert!(matches!(
            archive.format_error(),
            Some(RarError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_marker_only() {
        let archive = RarArchive::parse(b"Rar!\x1a\x07\x00", &ParseContext::default());
        assert_eq!(archive.signature, Some(Signature::Rar15));
        assert_eq!(archive.blocks().len(), 1);
        assert!(archive.format_error().is_none());
        assert!(matches!(archive.stop(), WalkStop::Exhausted));
        assert!(archive.entries().is_empty());
    }

    #[test]
    fn test_missing_signature_still_walks() {
        let data = [0x00, 0x00, 0x73, 0x00, 0x00, 0x0D, 0x00, 0, 0, 0, 0, 0, 0];
        let archive = RarArchive::parse(&data, &ParseContext::default());
        assert_eq!(archive.signature, None);
        assert_eq!(archive.blocks().len(), 1);
        assert!(matches!(archive.blocks()[0], Block::Archive(_)));
    }

    #[test]
    fn test_open_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rar");
        std::fs::write(&path, b"Rar!\x1a\x07\x00").unwrap();
        let archive = RarArchive::open_path(&path, None).unwrap();
        assert_eq!(archive.blocks().len(), 1);
        assert!(RarArchive::open_path(dir.path().join("b.rar"), None).is_err());
    }
}
