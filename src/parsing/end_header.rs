//! Archive end header parser.
//!
//! The end header marks the end of a RAR archive. Volumes written by RAR 3
//! and later carry the archive data CRC and the volume number. Both are
//! read only when they fit before the header end: some packers set the CRC
//! flag on a bare 7-byte block.

use super::block_header::BlockHeader;
use super::reader::FieldReader;
use crate::error::Result;

pub const FLAG_NEXT_VOLUME: u16 = 0x0001;
pub const FLAG_DATA_CRC: u16 = 0x0002;
pub const FLAG_REV_SPACE: u16 = 0x0004;
pub const FLAG_VOLUME_NUMBER: u16 = 0x0008;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndHeader {
    pub header: BlockHeader,
    pub data_crc: Option<u32>,
    /// Zero-based volume number, when room remains after the CRC.
    pub volume_number: Option<u16>,
    // Parsed flags
    pub has_next_volume: bool,
    pub has_data_crc: bool,
    pub has_rev_space: bool,
    pub has_volume_number: bool,
}

pub struct EndHeaderParser;

impl EndHeaderParser {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<EndHeader> {
        let flags = header.flags;
        let mut reader = FieldReader::new(
            buffer,
            header.offset as usize,
            header.header_size as usize,
            header.fields_start(),
        );

        let has_data_crc = flags & FLAG_DATA_CRC != 0;
        let data_crc = if has_data_crc && reader.has(4) {
            Some(reader.u32()?)
        } else {
            None
        };
        let volume_number = if reader.has(2) {
            Some(reader.u16()?)
        } else {
            None
        };

        Ok(EndHeader {
            header,
            data_crc,
            volume_number,
            has_next_volume: flags & FLAG_NEXT_VOLUME != 0,
            has_data_crc,
            has_rev_space: flags & FLAG_REV_SPACE != 0,
            has_volume_number: flags & FLAG_VOLUME_NUMBER != 0,
        })
    }
}
