//! Archive header parser.
//!
//! The archive header follows the marker header and contains
//! archive-level flags and metadata.

use super::block_header::BlockHeader;
use super::reader::FieldReader;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub header: BlockHeader,
    pub reserved1: Option<u16>,
    pub reserved2: Option<u32>,
    /// Encryption salt when headers are encrypted and room remains.
    pub salt: Option<[u8; 8]>,
    // Parsed flags
    pub is_volume: bool,
    pub has_comment: bool,
    pub is_locked: bool,
    pub is_solid: bool,
    pub is_new_name_scheme: bool,
    pub has_auth_info: bool,
    pub has_recovery: bool,
    pub is_block_encoded: bool,
    pub is_first_volume: bool,
}

pub struct ArchiveHeaderParser;

impl ArchiveHeaderParser {
    /// Reserved fields are read only while they fit inside the header, the
    /// way old archivers wrote shorter archive headers.
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<ArchiveHeader> {
        let flags = header.flags;
        let mut reader = FieldReader::new(
            buffer,
            header.offset as usize,
            header.header_size as usize,
            header.fields_start(),
        );

        let reserved1 = if reader.has(2) { Some(reader.u16()?) } else { None };
        let reserved2 = if reader.has(4) { Some(reader.u32()?) } else { None };

        let is_block_encoded = (flags & 0x0080) != 0;
        let salt = if is_block_encoded && reader.has(8) {
            Some(reader.array8()?)
        } else {
            None
        };

        Ok(ArchiveHeader {
            header,
            reserved1,
            reserved2,
            salt,
            is_volume: (flags & 0x0001) != 0,
            has_comment: (flags & 0x0002) != 0,
            is_locked: (flags & 0x0004) != 0,
            is_solid: (flags & 0x0008) != 0,
            is_new_name_scheme: (flags & 0x0010) != 0,
            has_auth_info: (flags & 0x0020) != 0,
            has_recovery: (flags & 0x0040) != 0,
            is_block_encoded,
            is_first_volume: (flags & 0x0100) != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_archive_header() {
        let buffer = [
            0x00, 0x00, // crc
            0x73, // type (ARCHIVE_HEADER = 0x73)
            0x01, 0x01, // flags (volume, first volume)
            0x0D, 0x00, // size = 13
            0x34, 0x12, // reserved1
            0x00, 0x00, 0x00, 0x00, // reserved2
        ];
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let archive = ArchiveHeaderParser::parse(&buffer, header).unwrap();
        assert!(archive.is_volume);
        assert!(archive.is_first_volume);
        assert!(!archive.has_comment);
        assert_eq!(archive.reserved1, Some(0x1234));
        assert_eq!(archive.reserved2, Some(0));
        assert_eq!(archive.salt, None);
    }

    #[test]
    fn test_encrypted_archive_salt() {
        let mut buffer = vec![0x00, 0x00, 0x73, 0x80, 0x00, 21, 0x00];
        buffer.extend_from_slice(&[0; 6]);
        buffer.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let archive = ArchiveHeaderParser::parse(&buffer, header).unwrap();
        assert!(archive.is_block_encoded);
        assert_eq!(archive.salt, Some([1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_short_archive_header() {
        let buffer = [0x00, 0x00, 0x73, 0x00, 0x00, 0x07, 0x00];
        let header = BlockHeader::parse(&buffer, 0).unwrap();
        let archive = ArchiveHeaderParser::parse(&buffer, header).unwrap();
        assert_eq!(archive.reserved1, None);
        assert_eq!(archive.reserved2, None);
    }
}
