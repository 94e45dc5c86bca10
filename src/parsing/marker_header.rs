//! Marker block - the RAR signature read as a block.
//!
//! The 7 signature bytes decode as a base header:
//! RAR4: 0x52 0x61 0x72 0x21 0x1A 0x07 0x00
//! crc = 0x6152, type = 0x72, flags = 0x1A21, size = 7.

use super::block_header::BlockHeader;
use crate::formats::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHeader {
    pub header: BlockHeader,
    /// Which signature the bytes at the block offset match, if any.
    pub signature: Option<Signature>,
}

pub struct MarkerHeaderParser;

impl MarkerHeaderParser {
    pub const HEADER_SIZE: usize = 7;

    /// A marker always spans its 7 signature bytes, whatever the header
    /// claims, so this never fails once the base header decoded.
    pub fn parse(buffer: &[u8], header: BlockHeader) -> MarkerHeader {
        let signature = buffer
            .get(header.offset as usize..)
            .and_then(Signature::from_bytes);
        MarkerHeader { header, signature }
    }
}
