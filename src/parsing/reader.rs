//! Bounded little-endian field cursor over one block header.

use crate::error::{RarError, Result};

/// Cursor over the bytes of a single block header.
///
/// Reads never go past the declared header end or the buffer end, whichever
/// comes first; a read that would is reported as [`RarError::Truncated`]
/// against the block's own offset.
pub(crate) struct FieldReader<'a> {
    data: &'a [u8],
    block_start: usize,
    pos: usize,
    limit: usize,
}

impl<'a> FieldReader<'a> {
    /// Position the cursor at `pos` inside the block spanning
    /// `[block_start, block_start + header_size)`.
    pub fn new(data: &'a [u8], block_start: usize, header_size: usize, pos: usize) -> Self {
        let limit = block_start.saturating_add(header_size).min(data.len());
        Self {
            data,
            block_start,
            pos,
            limit,
        }
    }

    /// Bytes left before the header end.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.pos)
    }

    /// Whether `count` more bytes fit before the header end.
    #[inline]
    pub fn has(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Fail unless `count` more bytes fit.
    pub fn require(&self, count: usize) -> Result<()> {
        if self.has(count) {
            Ok(())
        } else {
            Err(RarError::truncated(
                self.block_start as u64,
                self.pos - self.block_start + count,
                self.limit.saturating_sub(self.block_start),
            ))
        }
    }

    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.require(count)?;
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64(&mut self) -> Result<u64> {
        let b = self.bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_le_bytes(raw))
    }

    pub fn array8(&mut self) -> Result<[u8; 8]> {
        let b = self.bytes(8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(b);
        Ok(out)
    }

    /// `u16` length prefix followed by that many bytes.
    pub fn prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.u16()? as usize;
        self.bytes(len)
    }

    /// Like [`prefixed`](Self::prefixed) but `None` when either part does not fit.
    pub fn try_prefixed(&mut self) -> Option<&'a [u8]> {
        if !self.has(2) {
            return None;
        }
        let len = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]) as usize;
        if !self.has(2 + len) {
            return None;
        }
        self.pos += 2;
        self.bytes(len).ok()
    }
}
