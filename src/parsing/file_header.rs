//! File header parser.
//!
//! Each file in a RAR archive has a file header that describes
//! the file's name, size, compression method, etc. Service sub-blocks
//! (`0x7A`) share the exact same layout.
//!
//! ```text
//! base(7) packed:u32 unpacked:u32 host_os:u8 file_crc:u32 dos_time:u32
//!         version:u8 method:u8 name_len:u16 attributes:u32
//!         [high_packed:u32 high_unpacked:u32]   flags & 0x0100
//!         name[name_len]
//!         [salt:8]                              flags & 0x0400
//!         [extended time]                       flags & 0x1000
//! ```
//!
//! The low packed size doubles as the block's extended size field.

use std::fmt;

use super::block_header::BlockHeader;
use super::reader::FieldReader;
use super::text::TextEncoding;
use super::time::{DosDateTime, ExtendedTime};
use super::unicode_name::decode_name;
use crate::error::Result;

/// File header type constant.
pub const FILE_HEADER_TYPE: u8 = 0x74; // 116

pub const FLAG_SPLIT_BEFORE: u16 = 0x0001;
pub const FLAG_SPLIT_AFTER: u16 = 0x0002;
pub const FLAG_ENCRYPTED: u16 = 0x0004;
pub const FLAG_COMMENT: u16 = 0x0008;
pub const FLAG_SOLID: u16 = 0x0010;
pub const DICTIONARY_MASK: u16 = 0x00E0;
pub const FLAG_LARGE: u16 = 0x0100;
pub const FLAG_UNICODE: u16 = 0x0200;
pub const FLAG_SALT: u16 = 0x0400;
pub const FLAG_OLD_VERSION: u16 = 0x0800;
pub const FLAG_EXT_TIME: u16 = 0x1000;

/// Operating system the archive entry was packed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    MsDos,
    Os2,
    Windows,
    Unix,
    MacOs,
    BeOs,
    Unknown(u8),
}

impl From<u8> for HostOs {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::MsDos,
            1 => Self::Os2,
            2 => Self::Windows,
            3 => Self::Unix,
            4 => Self::MacOs,
            5 => Self::BeOs,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MsDos => f.write_str("MS-DOS"),
            Self::Os2 => f.write_str("OS/2"),
            Self::Windows => f.write_str("Windows"),
            Self::Unix => f.write_str("Unix"),
            Self::MacOs => f.write_str("Mac OS"),
            Self::BeOs => f.write_str("BeOS"),
            Self::Unknown(v) => write!(f, "Unknown ({v})"),
        }
    }
}

/// RAR 2.9 compression level byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    Store,
    Fastest,
    Fast,
    Normal,
    Good,
    Best,
    Unknown(u8),
}

impl CompressionMethod {
    pub const STORE: u8 = 0x30;

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Store => 0x30,
            Self::Fastest => 0x31,
            Self::Fast => 0x32,
            Self::Normal => 0x33,
            Self::Good => 0x34,
            Self::Best => 0x35,
            Self::Unknown(v) => *v,
        }
    }
}

impl From<u8> for CompressionMethod {
    fn from(value: u8) -> Self {
        match value {
            0x30 => Self::Store,
            0x31 => Self::Fastest,
            0x32 => Self::Fast,
            0x33 => Self::Normal,
            0x34 => Self::Good,
            0x35 => Self::Best,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => f.write_str("Store"),
            Self::Fastest => f.write_str("Fastest"),
            Self::Fast => f.write_str("Fast"),
            Self::Normal => f.write_str("Normal"),
            Self::Good => f.write_str("Good"),
            Self::Best => f.write_str("Best"),
            Self::Unknown(v) => write!(f, "Unknown (0x{v:02x})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub header: BlockHeader,
    /// Full 64-bit packed size (low word plus high word when large).
    pub packed_size: u64,
    pub unpacked_size: u64,
    pub host_os: HostOs,
    pub file_crc: u32,
    pub dos_time: u32,
    pub version: u8,
    pub method: CompressionMethod,
    pub name_size: u16,
    pub attributes: u32,
    pub high_packed_size: Option<u32>,
    pub high_unpacked_size: Option<u32>,
    pub name: String,
    /// Which decoding strategy produced `name`.
    pub name_encoding: TextEncoding,
    /// Name field exactly as stored.
    pub name_bytes: Vec<u8>,
    /// 8-byte encryption salt (if has_salt is true)
    pub salt: Option<[u8; 8]>,
    pub ext_time: Option<ExtendedTime>,
    // Parsed flags
    pub continues_from_previous: bool,
    pub continues_in_next: bool,
    pub is_encrypted: bool,
    pub has_comment: bool,
    pub is_solid: bool,
    pub is_directory: bool,
    pub has_large_size: bool,
    pub has_unicode_name: bool,
    pub has_salt: bool,
    pub is_old_version: bool,
    pub has_extended_time: bool,
}

impl FileHeader {
    /// Raw dictionary bits (`flags & 0x00E0) >> 5`).
    pub fn dictionary_bits(&self) -> u8 {
        ((self.header.flags & DICTIONARY_MASK) >> 5) as u8
    }

    /// Dictionary size in bytes; `None` for the directory sentinel.
    pub fn dictionary_size(&self) -> Option<u32> {
        if self.is_directory {
            None
        } else {
            Some((64 * 1024) << self.dictionary_bits())
        }
    }

    /// Unpack version as `major.minor`.
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version / 10, self.version % 10)
    }

    pub fn modified(&self) -> DosDateTime {
        DosDateTime::from_packed(self.dos_time)
    }
}

pub struct FileHeaderParser;

impl FileHeaderParser {
    /// Minimum fixed header size before filename.
    pub const MIN_HEADER_SIZE: usize = 32;

    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<FileHeader> {
        let flags = header.flags;
        let start = header.offset as usize;
        let mut reader = FieldReader::new(
            buffer,
            start,
            header.header_size as usize,
            start + BlockHeader::BASE_SIZE,
        );

        reader.require(Self::MIN_HEADER_SIZE - BlockHeader::BASE_SIZE)?;
        let mut packed_size = reader.u32()? as u64;
        let mut unpacked_size = reader.u32()? as u64;
        let host_os = HostOs::from(reader.u8()?);
        let file_crc = reader.u32()?;
        let dos_time = reader.u32()?;
        let version = reader.u8()?;
        let method = CompressionMethod::from(reader.u8()?);
        let name_size = reader.u16()?;
        let attributes = reader.u32()?;

        let has_large_size = flags & FLAG_LARGE != 0;
        let (high_packed_size, high_unpacked_size) = if has_large_size {
            let high_packed = reader.u32()?;
            let high_unpacked = reader.u32()?;
            packed_size |= (high_packed as u64) << 32;
            unpacked_size |= (high_unpacked as u64) << 32;
            (Some(high_packed), Some(high_unpacked))
        } else {
            (None, None)
        };

        let has_unicode_name = flags & FLAG_UNICODE != 0;
        let name_bytes = reader.bytes(name_size as usize)?.to_vec();
        let decoded = decode_name(&name_bytes, has_unicode_name);

        let has_salt = flags & FLAG_SALT != 0;
        let salt = if has_salt && reader.has(8) {
            Some(reader.array8()?)
        } else {
            None
        };

        let has_extended_time = flags & FLAG_EXT_TIME != 0;
        let ext_time = if has_extended_time {
            ExtendedTime::parse(&mut reader, dos_time)
        } else {
            None
        };

        Ok(FileHeader {
            header,
            packed_size,
            unpacked_size,
            host_os,
            file_crc,
            dos_time,
            version,
            method,
            name_size,
            attributes,
            high_packed_size,
            high_unpacked_size,
            name: decoded.text,
            name_encoding: decoded.encoding,
            name_bytes,
            salt,
            ext_time,
            continues_from_previous: flags & FLAG_SPLIT_BEFORE != 0,
            continues_in_next: flags & FLAG_SPLIT_AFTER != 0,
            is_encrypted: flags & FLAG_ENCRYPTED != 0,
            has_comment: flags & FLAG_COMMENT != 0,
            is_solid: flags & FLAG_SOLID != 0,
            is_directory: flags & DICTIONARY_MASK == DICTIONARY_MASK,
            has_large_size,
            has_unicode_name,
            has_salt,
            is_old_version: flags & FLAG_OLD_VERSION != 0,
            has_extended_time,
        })
    }
}
