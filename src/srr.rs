//! SRR file decoder.
//!
//! The outer chain only holds SRR block types. Each stored-RAR-file block
//! is followed by the stripped headers of one RAR volume, which are walked
//! with [`WalkOptions::srr_embedded`] until the next SRR block.
//!
//! ```text
//! 0x69 header
//! 0x6A stored file  (.nfo / .sfv bytes follow)
//! 0x71 stored RAR   -> 0x72 marker, 0x73 archive, 0x74 file, ..., 0x7B end
//! 0x71 stored RAR   -> ...
//! 0x6B OSO hash
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, warn};

use crate::block::{ArchiveEntry, Block, Container};
use crate::comment::{self, ArchiveComment, CommentExtractor, ParseContext};
use crate::error::{RarError, Result};
use crate::file_media::LocalFileMedia;
use crate::formats::{find_markers, EmbeddedVersion, Signature};
use crate::parsing::{
    BlockHeader, CompressionMethod, HostOs, SrrOsoHashBlock, SrrRarFileBlock,
    SrrRarPaddingBlock, SrrStoredFileBlock, TypeSet,
};
use crate::walker::{BlockWalker, WalkOptions, WalkStop};

/// Archive properties taken from the first archive and file headers seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub is_volume: Option<bool>,
    pub is_solid: Option<bool>,
    pub has_recovery: Option<bool>,
    pub has_new_volume_naming: Option<bool>,
    pub has_first_volume_flag: Option<bool>,
    pub has_encrypted_headers: Option<bool>,
    pub compression_method: Option<CompressionMethod>,
    /// Dictionary size in KiB.
    pub dictionary_size_kb: Option<u32>,
    pub unpack_version: Option<u8>,
    pub has_large_files: Option<bool>,
    pub has_unicode_names: Option<bool>,
    pub has_extended_time: Option<bool>,
    pub host_os: Option<HostOs>,
    pub attributes: Option<u32>,
}

#[derive(Debug)]
pub struct SrrFile {
    /// Outer blocks; stored-RAR-file blocks own their embedded chains.
    pub blocks: Vec<Block>,
    /// Why the outer walk ended.
    pub stop: WalkStop,
    /// Offset the outer walk stopped at.
    pub end_offset: u64,
}

impl SrrFile {
    /// Decode an SRR file held in memory.
    ///
    /// Never fails: a structural problem ends the walk and is reported
    /// through [`SrrFile::stop`], keeping everything decoded before it.
    pub fn parse(data: &[u8], ctx: &ParseContext<'_>) -> Self {
        let len = data.len() as u64;
        let mut blocks = Vec::new();
        let mut offset = 0u64;

        let stop = loop {
            if offset >= len {
                break WalkStop::Exhausted;
            }

            let header = match BlockHeader::parse(data, offset) {
                Ok(header) => header,
                Err(err) => break WalkStop::Failed(err),
            };
            if !TypeSet::SRR.contains(header.block_type) {
                break WalkStop::Failed(RarError::UnexpectedBlockType {
                    offset,
                    block_type: header.block_type,
                });
            }
            let block = match Block::decode(data, header) {
                Ok(block) => block,
                Err(err) => break WalkStop::Failed(err),
            };
            debug!(
                "{} at offset {}: header {} bytes",
                header.name(),
                offset,
                header.header_size
            );

            let next = match block {
                Block::SrrRarFile(mut rar) => {
                    let start = rar.embedded_start();
                    if start > len {
                        blocks.push(Block::SrrRarFile(rar));
                        break WalkStop::Failed(RarError::malformed(
                            offset,
                            "block extends past end of buffer",
                        ));
                    }
                    let embedded = walk_embedded(data, start, ctx);
                    let resume = embedded.end_offset;
                    debug!(
                        "{}: {} embedded blocks, volume size {}",
                        rar.name,
                        embedded.blocks.len(),
                        embedded.on_disk_size
                    );
                    rar.embedded = Some(embedded);
                    blocks.push(Block::SrrRarFile(rar));
                    resume
                }
                other => {
                    blocks.push(other);
                    offset.saturating_add(header.full_size())
                }
            };

            if next <= offset {
                break WalkStop::Failed(RarError::malformed(offset, "block does not advance"));
            }
            if next > len {
                break WalkStop::Failed(RarError::malformed(
                    offset,
                    "block extends past end of buffer",
                ));
            }
            offset = next;
        };

        if let WalkStop::Failed(err) = &stop {
            warn!("SRR walk stopped at offset {offset}: {err}");
        }

        Self {
            blocks,
            stop,
            end_offset: offset,
        }
    }

    /// Load and decode an SRR file from disk.
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

    pub fn stop(&self) -> &WalkStop {
        &self.stop
    }

    pub fn app_name(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::SrrHeader(header) => header.app_name.as_deref(),
            _ => None,
        })
    }

    pub fn stored_files(&self) -> impl Iterator<Item = &SrrStoredFileBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::SrrStoredFile(stored) => Some(stored),
            _ => None,
        })
    }

    pub fn oso_hashes(&self) -> impl Iterator<Item = &SrrOsoHashBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::SrrOsoHash(oso) => Some(oso),
            _ => None,
        })
    }

    pub fn paddings(&self) -> impl Iterator<Item = &SrrRarPaddingBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::SrrRarPadding(padding) => Some(padding),
            _ => None,
        })
    }

    pub fn rar_volumes(&self) -> impl Iterator<Item = &SrrRarFileBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::SrrRarFile(rar) => Some(rar),
            _ => None,
        })
    }

    fn embedded(&self) -> impl Iterator<Item = &Container> {
        self.rar_volumes().filter_map(|rar| rar.embedded.as_ref())
    }

    /// Files and directories across all volumes, first occurrence kept.
    ///
    /// Names compare case-insensitively with `\` and `/` treated alike.
    /// Files and directories are deduplicated separately, so a file and a
    /// directory of the same name are both listed.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        let mut files = HashSet::new();
        let mut directories = HashSet::new();
        self.embedded()
            .flat_map(|container| container.files())
            .map(ArchiveEntry::from)
            .filter(|entry| {
                let key = entry.name.replace('\\', "/").to_lowercase();
                if entry.is_directory {
                    directories.insert(key)
                } else {
                    files.insert(key)
                }
            })
            .collect()
    }

    /// Reconstructed size of each volume with a non-empty chain.
    pub fn volume_sizes(&self) -> Vec<u64> {
        self.embedded()
            .map(|container| container.on_disk_size)
            .filter(|&size| size > 0)
            .collect()
    }

    /// The most frequent volume size; ties go to the larger size.
    pub fn common_volume_size(&self) -> Option<u64> {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for size in self.volume_sizes() {
            *counts.entry(size).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by_key(|&(size, count)| (count, size))
            .map(|(size, _)| size)
    }

    /// Header CRC mismatches across all embedded chains.
    pub fn crc_mismatches(&self) -> usize {
        self.embedded().map(|container| container.crc_mismatches).sum()
    }

    /// First archive comment found in any volume.
    pub fn comment(&self) -> Option<&ArchiveComment> {
        self.embedded().find_map(|container| container.comment.as_ref())
    }

    pub fn summary(&self) -> ArchiveSummary {
        let mut summary = ArchiveSummary::default();
        for container in self.embedded() {
            if let Some(archive) = container.archive_header() {
                summary.is_volume.get_or_insert(archive.is_volume);
                summary.is_solid.get_or_insert(archive.is_solid);
                summary.has_recovery.get_or_insert(archive.has_recovery);
                summary
                    .has_new_volume_naming
                    .get_or_insert(archive.is_new_name_scheme);
                summary
                    .has_first_volume_flag
                    .get_or_insert(archive.is_first_volume);
                summary
                    .has_encrypted_headers
                    .get_or_insert(archive.is_block_encoded);
            }
            if let Some(file) = container.files().next() {
                if summary.compression_method.is_none() {
                    summary.compression_method = Some(file.method);
                    summary.dictionary_size_kb = file.dictionary_size().map(|size| size / 1024);
                    summary.unpack_version = Some(file.version);
                    summary.has_large_files = Some(file.has_large_size);
                    summary.has_unicode_names = Some(file.has_unicode_name);
                    summary.has_extended_time = Some(file.has_extended_time);
                    summary.host_os = Some(file.host_os);
                    summary.attributes = Some(file.attributes);
                }
            }
        }
        summary
    }

    /// Which RAR generation the embedded headers belong to.
    ///
    /// Needs the original buffer since it scans for raw marker bytes.
    pub fn embedded_version(&self, data: &[u8]) -> EmbeddedVersion {
        let rar4 = find_markers(data, Signature::Rar15).len();
        let rar5 = find_markers(data, Signature::Rar50).len();
        EmbeddedVersion::classify(rar4, rar5, self.rar_volumes().next().is_some())
    }
}

fn walk_embedded(data: &[u8], start: u64, ctx: &ParseContext<'_>) -> Container {
    let mut container = BlockWalker::new(data, start, WalkOptions::srr_embedded()).finish();
    container.comment = comment::resolve(&container, data, ctx, false);
    container
}
