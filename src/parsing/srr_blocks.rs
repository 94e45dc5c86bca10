//! SRR block parsers.
//!
//! An SRR file is a chain of its own block types, sharing the RAR base
//! header, interleaved with the headers of the RAR volumes it describes.
//!
//! | Tag  | Block              | Payload after the base header               |
//! |------|--------------------|---------------------------------------------|
//! | 0x69 | header             | `[u16 len, app name]` if flag 0x0001        |
//! | 0x6A | stored file        | `u32 size, u16 len, name`, then file data   |
//! | 0x6B | OSO hash           | `u64 size, u64 hash, [u16 len, name]`       |
//! | 0x6C | RAR padding        | `u32 size`, `[u16 len, volume name]`        |
//! | 0x71 | stored RAR volume  | `u16 len, name`, then the volume's headers  |

use super::block_header::BlockHeader;
use super::reader::FieldReader;
use crate::block::Container;
use crate::error::Result;

/// SRR header flag: an application name follows.
pub const FLAG_APP_NAME: u16 = 0x0001;
/// Stored RAR volume flag: the stored name carries a path.
pub const FLAG_PATH_SEPARATOR: u16 = 0x0001;

fn reader_for<'a>(buffer: &'a [u8], header: &BlockHeader) -> FieldReader<'a> {
    FieldReader::new(
        buffer,
        header.offset as usize,
        header.header_size as usize,
        header.fields_start(),
    )
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrrHeaderBlock {
    pub header: BlockHeader,
    /// Name of the tool that created the SRR file.
    pub app_name: Option<String>,
}

impl SrrHeaderBlock {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let app_name = if header.flags & FLAG_APP_NAME != 0 {
            reader_for(buffer, &header).try_prefixed().map(utf8)
        } else {
            None
        };
        Ok(Self { header, app_name })
    }
}

/// A file (usually `.nfo` or `.sfv`) stored verbatim inside the SRR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrrStoredFileBlock {
    pub header: BlockHeader,
    pub name: String,
    /// Absolute offset of the stored bytes.
    pub data_offset: u64,
    pub data_len: u64,
}

impl SrrStoredFileBlock {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let name = utf8(reader_for(buffer, &header).prefixed()?);
        Ok(Self {
            header,
            name,
            data_offset: header.header_end(),
            data_len: header.extended_size,
        })
    }

    /// The stored bytes, when they are inside `buffer`.
    pub fn data<'a>(&self, buffer: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.data_offset).ok()?;
        let len = usize::try_from(self.data_len).ok()?;
        buffer.get(start..start.checked_add(len)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrrOsoHashBlock {
    pub header: BlockHeader,
    pub file_size: u64,
    pub hash: u64,
    pub name: Option<String>,
}

impl SrrOsoHashBlock {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let mut reader = reader_for(buffer, &header);
        let file_size = reader.u64()?;
        let hash = reader.u64()?;
        let name = reader.try_prefixed().map(utf8);
        Ok(Self {
            header,
            file_size,
            hash,
            name,
        })
    }
}

/// Junk bytes found after the end of a RAR volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrrRarPaddingBlock {
    pub header: BlockHeader,
    pub padding_size: u64,
    /// Volume the padding belongs to.
    pub rar_name: Option<String>,
}

impl SrrRarPaddingBlock {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let rar_name = reader_for(buffer, &header).try_prefixed().map(utf8);
        Ok(Self {
            header,
            padding_size: header.extended_size,
            rar_name,
        })
    }
}

/// Marks the start of one RAR volume's stripped headers.
#[derive(Debug)]
pub struct SrrRarFileBlock {
    pub header: BlockHeader,
    pub name: String,
    pub has_path_separator: bool,
    /// The volume's header chain, filled in by the SRR decoder.
    pub embedded: Option<Container>,
}

impl SrrRarFileBlock {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<Self> {
        let name = utf8(reader_for(buffer, &header).prefixed()?);
        Ok(Self {
            header,
            name,
            has_path_separator: header.flags & FLAG_PATH_SEPARATOR != 0,
            embedded: None,
        })
    }

    /// Where the embedded RAR chain begins.
    #[inline]
    pub fn embedded_start(&self) -> u64 {
        self.header.offset + self.header.full_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RarError;

    fn block(tag: u8, flags: u16, ext: Option<u32>, body: &[u8]) -> Vec<u8> {
        let size = 7 + ext.map_or(0, |_| 4) + body.len();
        let mut buffer = vec![0x00, 0x00, tag];
        buffer.extend_from_slice(&flags.to_le_bytes());
        buffer.extend_from_slice(&(size as u16).to_le_bytes());
        if let Some(ext) = ext {
            buffer.extend_from_slice(&ext.to_le_bytes());
        }
        buffer.extend_from_slice(body);
        buffer
    }

    fn prefixed(name: &str) -> Vec<u8> {
        let mut v = (name.len() as u16).to_le_bytes().to_vec();
        v.extend_from_slice(name.as_bytes());
        v
    }

    #[test]
    fn test_header_app_name() {
        let buffer = block(0x69, FLAG_APP_NAME, None, &prefixed("pyReScene 0.7"));
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let srr = SrrHeaderBlock::parse(&buffer, header).unwrap();
        assert_eq!(srr.app_name.as_deref(), Some("pyReScene 0.7"));

        let buffer = block(0x69, 0, None, &[]);
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        assert_eq!(SrrHeaderBlock::parse(&buffer, header).unwrap().app_name, None);
    }

    #[test]
    fn test_stored_file() {
        let mut buffer = block(0x6A, 0, Some(5), &prefixed("release.nfo"));
        buffer.extend_from_slice(b"hello");
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let stored = SrrStoredFileBlock::parse(&buffer, header).unwrap();
        assert_eq!(stored.name, "release.nfo");
        assert_eq!(stored.data_offset, 24);
        assert_eq!(stored.data_len, 5);
        assert_eq!(stored.data(&buffer), Some(&b"hello"[..]));
    }

    #[test]
    fn test_stored_file_name_past_header() {
        let mut buffer = block(0x6A, 0, Some(0), &prefixed("x.nfo"));
        buffer[5] = 14;
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        assert!(matches!(
            SrrStoredFileBlock::parse(&buffer, header),
            Err(RarError::Truncated { .. })
        ));
    }

    #[test]
    fn test_oso_hash() {
        let mut body = 700_000_000u64.to_le_bytes().to_vec();
        body.extend_from_slice(&0x0123_4567_89AB_CDEFu64.to_le_bytes());
        body.extend(prefixed("movie.mkv"));
        let buffer = block(0x6B, 0, None, &body);
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let oso = SrrOsoHashBlock::parse(&buffer, header).unwrap();
        assert_eq!(oso.file_size, 700_000_000);
        assert_eq!(oso.hash, 0x0123_4567_89AB_CDEF);
        assert_eq!(oso.name.as_deref(), Some("movie.mkv"));
    }

    #[test]
    fn test_padding() {
        let buffer = block(0x6C, 0x8000, Some(300), &prefixed("a.r00"));
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let padding = SrrRarPaddingBlock::parse(&buffer, header).unwrap();
        assert_eq!(padding.padding_size, 300);
        assert_eq!(padding.rar_name.as_deref(), Some("a.r00"));
    }

    #[test]
    fn test_rar_file() {
        let buffer = block(0x71, FLAG_PATH_SEPARATOR, None, &prefixed("CD1/a.rar"));
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let rar = SrrRarFileBlock::parse(&buffer, header).unwrap();
        assert_eq!(rar.name, "CD1/a.rar");
        assert!(rar.has_path_separator);
        assert_eq!(rar.embedded_start(), buffer.len() as u64);
        assert!(rar.embedded.is_none());
    }
}
