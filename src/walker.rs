//! Lazy block-chain walker.
//!
//! [`BlockWalker`] decodes one block per [`Iterator::next`] call starting at
//! a given offset. It never returns an error from `next`: a failure ends the
//! iteration and is reported through [`BlockWalker::stop`], together with
//! the offset the walk stopped at.
//!
//! ```rust
//! use rar_srr::{BlockWalker, WalkOptions, WalkStop};
//!
//! let data = b"Rar!\x1a\x07\x00";
//! let mut walker = BlockWalker::new(data, 0, WalkOptions::default());
//! assert_eq!(walker.by_ref().count(), 1);
//! assert!(matches!(walker.stop(), Some(WalkStop::Exhausted)));
//! assert_eq!(walker.offset(), 7);
//! ```

use log::{debug, warn};

use crate::block::{Block, Container};
use crate::error::RarError;
use crate::layout;
use crate::parsing::{BlockHeader, MarkerHeaderParser, TypeSet};

/// Whether packed data follows file and service headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadLayout {
    /// A real RAR volume: payloads are in the buffer.
    #[default]
    Present,
    /// An SRR-embedded chain: file data and recovery records are absent.
    Stripped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkOptions {
    /// Block types that end the walk before being consumed.
    pub boundary: TypeSet,
    pub payload: PayloadLayout,
}

impl WalkOptions {
    /// Options for a RAR volume loaded in full.
    pub fn rar() -> Self {
        Self::default()
    }

    /// Options for the RAR headers embedded in an SRR file.
    pub fn srr_embedded() -> Self {
        Self {
            boundary: TypeSet::SRR,
            payload: PayloadLayout::Stripped,
        }
    }
}

/// Why a walk ended.
#[derive(Debug)]
pub enum WalkStop {
    /// The offset reached the end of the buffer.
    Exhausted,
    /// A block of a boundary type starts at the resume offset.
    Boundary { block_type: u8 },
    /// An archive end block was yielded.
    ArchiveEnd,
    /// A block could not be decoded or its span is invalid.
    Failed(RarError),
}

impl WalkStop {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&RarError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

pub struct BlockWalker<'a> {
    data: &'a [u8],
    start: u64,
    offset: u64,
    options: WalkOptions,
    stop: Option<WalkStop>,
    on_disk_size: u64,
    crc_mismatches: usize,
}

impl<'a> BlockWalker<'a> {
    pub fn new(data: &'a [u8], start: u64, options: WalkOptions) -> Self {
        Self {
            data,
            start,
            offset: start,
            options,
            stop: None,
            on_disk_size: 0,
            crc_mismatches: 0,
        }
    }

    /// Offset of the next block, or where the walk stopped.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// `None` while the walk is still running.
    pub fn stop(&self) -> Option<&WalkStop> {
        self.stop.as_ref()
    }

    /// Sum of [`layout::on_disk_size`] over the blocks yielded so far.
    #[inline]
    pub fn on_disk_size(&self) -> u64 {
        self.on_disk_size
    }

    #[inline]
    pub fn crc_mismatches(&self) -> usize {
        self.crc_mismatches
    }

    /// Drain the walk into a [`Container`].
    pub fn finish(mut self) -> Container {
        let blocks: Vec<Block> = self.by_ref().collect();
        let stop = self.stop.take().unwrap_or(WalkStop::Exhausted);
        Container {
            start_offset: self.start,
            blocks,
            stop,
            end_offset: self.offset,
            on_disk_size: self.on_disk_size,
            crc_mismatches: self.crc_mismatches,
            comment: None,
        }
    }

    fn end(&mut self, stop: WalkStop) {
        match &stop {
            WalkStop::Failed(err) => warn!("block walk stopped at offset {}: {err}", self.offset),
            other => debug!("block walk ended at offset {}: {other:?}", self.offset),
        }
        self.stop = Some(stop);
    }

    /// Bytes to the next block.
    ///
    /// A stripped chain advances by [`layout::total_size`]. With payloads
    /// present, file and service records skip their decoded 64-bit packed
    /// size ([`layout::record_span`]).
    fn span(&self, block: &Block) -> u64 {
        let header = block.header();
        match (block, self.options.payload) {
            (Block::Marker(_), _) => MarkerHeaderParser::HEADER_SIZE as u64,
            (_, PayloadLayout::Stripped) => layout::total_size(block),
            (Block::File(_) | Block::Service(_), PayloadLayout::Present) => {
                layout::record_span(block).unwrap_or_else(|| header.full_size())
            }
            (Block::SrrStoredFile(_), _) => header.full_size(),
            _ if header.is_long_block() => header.full_size(),
            _ => header.header_size as u64,
        }
    }

    fn check_crc(&mut self, header: &BlockHeader) {
        if header.crc_matches == Some(false) {
            self.crc_mismatches += 1;
            warn!(
                "{} at offset {}: header CRC mismatch (stored 0x{:04x})",
                header.name(),
                header.offset,
                header.crc
            );
        }
    }
}

impl Iterator for BlockWalker<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.stop.is_some() {
            return None;
        }

        let len = self.data.len() as u64;
        if self.offset >= len {
            self.end(WalkStop::Exhausted);
            return None;
        }

        let header = match BlockHeader::parse(self.data, self.offset) {
            Ok(header) => header,
            Err(err) => {
                self.end(WalkStop::Failed(err));
                return None;
            }
        };

        if self.options.boundary.contains(header.block_type) {
            self.end(WalkStop::Boundary {
                block_type: header.block_type,
            });
            return None;
        }

        let block = match Block::decode(self.data, header) {
            Ok(block) => block,
            Err(err) => {
                self.end(WalkStop::Failed(err));
                return None;
            }
        };

        self.check_crc(&header);
        let span = self.span(&block);
        self.on_disk_size += layout::on_disk_size(&block);
        debug!(
            "{} at offset {}: header {} bytes, span {}",
            header.name(),
            header.offset,
            header.header_size,
            span
        );

        let next = self.offset.saturating_add(span);
        if next <= self.offset {
            self.end(WalkStop::Failed(RarError::malformed(
                self.offset,
                "block does not advance",
            )));
        } else if next > len {
            self.end(WalkStop::Failed(RarError::malformed(
                self.offset,
                "block extends past end of buffer",
            )));
        } else {
            self.offset = next;
            if matches!(block, Block::End(_)) {
                self.end(WalkStop::ArchiveEnd);
            }
        }

        Some(block)
    }
}
