//! Decoded blocks and block containers.
//!
//! [`Block`] is the typed result of decoding one header: every variant
//! carries its [`BlockHeader`], so callers can always get at offsets and
//! sizes regardless of the kind. A [`Container`] is the ordered result of
//! one walk.

use crate::comment::ArchiveComment;
use crate::error::Result;
use crate::parsing::{
    ArchiveHeader, ArchiveHeaderParser, BlockHeader, BlockType, EndHeader, EndHeaderParser,
    FileHeader, FileHeaderParser, MarkerHeader, MarkerHeaderParser, SrrHeaderBlock,
    SrrOsoHashBlock, SrrRarFileBlock, SrrRarPaddingBlock, SrrStoredFileBlock, SubBlock,
    SubBlockParser,
};
use crate::walker::WalkStop;

/// One decoded block.
#[derive(Debug)]
pub enum Block {
    Marker(MarkerHeader),
    Archive(ArchiveHeader),
    File(FileHeader),
    Service(SubBlock),
    End(EndHeader),
    SrrHeader(SrrHeaderBlock),
    SrrStoredFile(SrrStoredFileBlock),
    SrrOsoHash(SrrOsoHashBlock),
    SrrRarPadding(SrrRarPaddingBlock),
    SrrRarFile(SrrRarFileBlock),
    /// Unrecognised type, or a legacy type whose payload is not decoded.
    Unknown(BlockHeader),
}

impl Block {
    /// Decode the payload of the block whose base header is `header`.
    pub fn decode(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let block = match header.kind() {
            Some(BlockType::Marker) => Self::Marker(MarkerHeaderParser::parse(buffer, header)),
            Some(BlockType::ArchiveHeader) => {
                Self::Archive(ArchiveHeaderParser::parse(buffer, header)?)
            }
            Some(BlockType::FileHeader) => Self::File(FileHeaderParser::parse(buffer, header)?),
            Some(BlockType::SubBlock) => Self::Service(SubBlockParser::parse(buffer, header)?),
            Some(BlockType::ArchiveEnd) => Self::End(EndHeaderParser::parse(buffer, header)?),
            Some(BlockType::SrrHeader) => Self::SrrHeader(SrrHeaderBlock::parse(buffer, header)?),
            Some(BlockType::SrrStoredFile) => {
                Self::SrrStoredFile(SrrStoredFileBlock::parse(buffer, header)?)
            }
            Some(BlockType::SrrOsoHash) => {
                Self::SrrOsoHash(SrrOsoHashBlock::parse(buffer, header)?)
            }
            Some(BlockType::SrrRarPadding) => {
                Self::SrrRarPadding(SrrRarPaddingBlock::parse(buffer, header)?)
            }
            Some(BlockType::SrrRarFile) => {
                Self::SrrRarFile(SrrRarFileBlock::parse(buffer, header)?)
            }
            Some(
                BlockType::OldComment
                | BlockType::OldAuthInfo
                | BlockType::OldSubBlock
                | BlockType::OldRecovery
                | BlockType::OldAuthInfo2,
            )
            | None => Self::Unknown(header),
        };
        Ok(block)
    }

    pub fn header(&self) -> &BlockHeader {
        match self {
            Self::Marker(b) => &b.header,
            Self::Archive(b) => &b.header,
            Self::File(b) => &b.header,
            Self::Service(b) => b.header(),
            Self::End(b) => &b.header,
            Self::SrrHeader(b) => &b.header,
            Self::SrrStoredFile(b) => &b.header,
            Self::SrrOsoHash(b) => &b.header,
            Self::SrrRarPadding(b) => &b.header,
            Self::SrrRarFile(b) => &b.header,
            Self::Unknown(h) => h,
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.header().offset
    }

    pub fn name(&self) -> &'static str {
        self.header().name()
    }

    pub fn as_file(&self) -> Option<&FileHeader> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&SubBlock> {
        match self {
            Self::Service(sub) => Some(sub),
            _ => None,
        }
    }
}

/// A file listed in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveEntry {
    pub name: String,
    /// Set from the dictionary-size bits only; attributes are not consulted.
    pub is_directory: bool,
    pub packed_size: u64,
    pub unpacked_size: u64,
}

impl From<&FileHeader> for ArchiveEntry {
    fn from(file: &FileHeader) -> Self {
        Self {
            name: file.name.clone(),
            is_directory: file.is_directory,
            packed_size: file.packed_size,
            unpacked_size: file.unpacked_size,
        }
    }
}

/// Entries for every file header in `blocks`, in order.
pub fn entries<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Vec<ArchiveEntry> {
    blocks
        .into_iter()
        .filter_map(Block::as_file)
        .map(ArchiveEntry::from)
        .collect()
}

/// The ordered result of one walk.
#[derive(Debug)]
pub struct Container {
    /// Offset the walk started at.
    pub start_offset: u64,
    pub blocks: Vec<Block>,
    /// Why the walk ended.
    pub stop: WalkStop,
    /// Resume offset reported by the walker.
    pub end_offset: u64,
    /// Reconstructed on-disk size of everything walked.
    pub on_disk_size: u64,
    /// Blocks whose stored header CRC did not match.
    pub crc_mismatches: usize,
    pub comment: Option<ArchiveComment>,
}

impl Container {
    pub fn archive_header(&self) -> Option<&ArchiveHeader> {
        self.blocks.iter().find_map(|block| match block {
            Block::Archive(archive) => Some(archive),
            _ => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = &FileHeader> {
        self.blocks.iter().filter_map(Block::as_file)
    }

    pub fn services(&self) -> impl Iterator<Item = &SubBlock> {
        self.blocks.iter().filter_map(Block::as_service)
    }

    pub fn end_header(&self) -> Option<&EndHeader> {
        self.blocks.iter().rev().find_map(|block| match block {
            Block::End(end) => Some(end),
            _ => None,
        })
    }

    pub fn entries(&self) -> Vec<ArchiveEntry> {
        entries(&self.blocks)
    }
}
