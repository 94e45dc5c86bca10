//! Base block header shared by RAR 1.5-4.x and SRR.
//!
//! Every block starts with seven little-endian bytes:
//!
//! ```text
//! +--------+------+-------+-------------+
//! | crc:u16| type | flags | header_size |
//! +--------+------+-------+-------------+
//! ```
//!
//! followed by a `u32` extended size when the long-block flag is set or the
//! block type always carries one (file header, service block, SRR stored file).

use crate::crc32::header_crc16;
use crate::error::{RarError, Result};

/// Long-block flag: a 4-byte extended size follows the base header.
pub const FLAG_LONG_BLOCK: u16 = 0x8000;
/// Old versions skip blocks with this flag if they don't know the type.
pub const FLAG_SKIP_IF_UNKNOWN: u16 = 0x4000;

/// Known block type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    SrrHeader = 0x69,
    SrrStoredFile = 0x6A,
    SrrOsoHash = 0x6B,
    SrrRarPadding = 0x6C,
    SrrRarFile = 0x71,
    Marker = 0x72,
    ArchiveHeader = 0x73,
    FileHeader = 0x74,
    OldComment = 0x75,
    OldAuthInfo = 0x76,
    OldSubBlock = 0x77,
    OldRecovery = 0x78,
    OldAuthInfo2 = 0x79,
    SubBlock = 0x7A,
    ArchiveEnd = 0x7B,
}

impl TryFrom<u8> for BlockType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        let ty = match value {
            0x69 => Self::SrrHeader,
            0x6A => Self::SrrStoredFile,
            0x6B => Self::SrrOsoHash,
            0x6C => Self::SrrRarPadding,
            0x71 => Self::SrrRarFile,
            0x72 => Self::Marker,
            0x73 => Self::ArchiveHeader,
            0x74 => Self::FileHeader,
            0x75 => Self::OldComment,
            0x76 => Self::OldAuthInfo,
            0x77 => Self::OldSubBlock,
            0x78 => Self::OldRecovery,
            0x79 => Self::OldAuthInfo2,
            0x7A => Self::SubBlock,
            0x7B => Self::ArchiveEnd,
            _ => return Err(value),
        };
        Ok(ty)
    }
}

impl BlockType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SrrHeader => "srr_header",
            Self::SrrStoredFile => "srr_stored_file",
            Self::SrrOsoHash => "srr_oso_hash",
            Self::SrrRarPadding => "srr_rar_padding",
            Self::SrrRarFile => "srr_rar_file",
            Self::Marker => "rar_marker",
            Self::ArchiveHeader => "rar_archive_header",
            Self::FileHeader => "rar_file_header",
            Self::OldComment => "rar_old_comment",
            Self::OldAuthInfo => "rar_old_auth",
            Self::OldSubBlock => "rar_old_sub",
            Self::OldRecovery => "rar_old_recovery",
            Self::OldAuthInfo2 => "rar_old_auth2",
            Self::SubBlock => "rar_sub_block",
            Self::ArchiveEnd => "rar_archive_end",
        }
    }

    pub fn is_srr(&self) -> bool {
        TypeSet::SRR.contains(*self as u8)
    }

    /// Types whose header always carries the 4-byte extended size.
    pub fn requires_extended_size(tag: u8) -> bool {
        matches!(tag, 0x74 | 0x7A | 0x6A)
    }
}

/// A set of block type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeSet([u64; 4]);

impl TypeSet {
    pub const EMPTY: Self = Self([0; 4]);

    /// The outer SRR domain.
    pub const SRR: Self = Self::EMPTY
        .with(BlockType::SrrHeader as u8)
        .with(BlockType::SrrStoredFile as u8)
        .with(BlockType::SrrOsoHash as u8)
        .with(BlockType::SrrRarPadding as u8)
        .with(BlockType::SrrRarFile as u8);

    pub const fn with(mut self, tag: u8) -> Self {
        self.0[(tag >> 6) as usize] |= 1 << (tag & 63);
        self
    }

    pub const fn contains(&self, tag: u8) -> bool {
        self.0[(tag >> 6) as usize] & (1 << (tag & 63)) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0[0] | self.0[1] | self.0[2] | self.0[3] == 0
    }
}

/// Decoded base header of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Absolute offset of the block in the parsed buffer.
    pub offset: u64,
    pub crc: u16,
    pub block_type: u8,
    pub flags: u16,
    pub header_size: u16,
    /// 0 when the header carries no extended size field.
    pub extended_size: u64,
    /// Whether the extended size field was present.
    pub has_extended_size: bool,
    /// Stored CRC check for RAR-domain headers (`0x73..=0x7B`).
    ///
    /// `None` for the marker, SRR blocks and headers that run past the
    /// buffer.
    pub crc_matches: Option<bool>,
}

impl BlockHeader {
    pub const BASE_SIZE: usize = 7;
    pub const EXTENDED_SIZE: usize = 11;

    /// Decode the header starting at `offset`.
    pub fn parse(buffer: &[u8], offset: u64) -> Result<Self> {
        let start = usize::try_from(offset)
            .map_err(|_| RarError::truncated(offset, Self::BASE_SIZE, 0))?;
        let have = buffer.len().saturating_sub(start);
        if have < Self::BASE_SIZE {
            return Err(RarError::truncated(offset, Self::BASE_SIZE, have));
        }
        let b = &buffer[start..];

        let crc = u16::from_le_bytes([b[0], b[1]]);
        let block_type = b[2];
        let flags = u16::from_le_bytes([b[3], b[4]]);
        let header_size = u16::from_le_bytes([b[5], b[6]]);

        if (header_size as usize) < Self::BASE_SIZE {
            return Err(RarError::malformed(offset, "header size below 7"));
        }

        let has_extended_size =
            flags & FLAG_LONG_BLOCK != 0 || BlockType::requires_extended_size(block_type);
        let extended_size = if has_extended_size {
            if have < Self::EXTENDED_SIZE {
                return Err(RarError::truncated(offset, Self::EXTENDED_SIZE, have));
            }
            u32::from_le_bytes([b[7], b[8], b[9], b[10]]) as u64
        } else {
            0
        };

        let mut header = Self {
            offset,
            crc,
            block_type,
            flags,
            header_size,
            extended_size,
            has_extended_size,
            crc_matches: None,
        };
        if header.is_crc_checked() {
            header.crc_matches = header.verify_crc(buffer);
        }
        Ok(header)
    }

    /// Only RAR-domain headers from the archive header on carry a CRC over
    /// their own bytes.
    #[inline]
    pub fn is_crc_checked(&self) -> bool {
        (BlockType::ArchiveHeader as u8..=BlockType::ArchiveEnd as u8).contains(&self.block_type)
    }

    pub fn kind(&self) -> Option<BlockType> {
        BlockType::try_from(self.block_type).ok()
    }

    pub fn name(&self) -> &'static str {
        self.kind().map(|k| k.name()).unwrap_or("unknown")
    }

    #[inline]
    pub fn is_long_block(&self) -> bool {
        self.flags & FLAG_LONG_BLOCK != 0
    }

    #[inline]
    pub fn skip_if_unknown(&self) -> bool {
        self.flags & FLAG_SKIP_IF_UNKNOWN != 0
    }

    /// `header_size + extended_size`.
    #[inline]
    pub fn full_size(&self) -> u64 {
        self.header_size as u64 + self.extended_size
    }

    /// Absolute offset where the header's own bytes end.
    #[inline]
    pub fn header_end(&self) -> u64 {
        self.offset + self.header_size as u64
    }

    /// Offset just past the fields this codec consumed (7 or 11).
    #[inline]
    pub(crate) fn fields_start(&self) -> usize {
        let base = if self.has_extended_size {
            Self::EXTENDED_SIZE
        } else {
            Self::BASE_SIZE
        };
        self.offset as usize + base
    }

    /// The header's bytes, when they are fully inside `buffer`.
    pub fn bytes<'a>(&self, buffer: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        buffer.get(start..start.checked_add(self.header_size as usize)?)
    }

    /// Compare the stored checksum against the header bytes.
    ///
    /// `None` when the header does not fit in `buffer`.
    pub fn verify_crc(&self, buffer: &[u8]) -> Option<bool> {
        self.bytes(buffer).map(|h| header_crc16(h) == self.crc)
    }
}
