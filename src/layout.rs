//! On-disk layout sizes.
//!
//! An SRR file keeps every RAR header but drops the packed file data and
//! recovery records. Two sizes are tracked per block:
//!
//! - [`total_size`]: bytes the block occupies in the stripped chain.
//! - [`on_disk_size`]: bytes it occupied in the original volume.
//!
//! Summing [`on_disk_size`] over one embedded chain reconstructs the
//! volume size.

use crate::block::Block;
use crate::parsing::BlockType;

/// Recovery records: a service block named exactly `RR`, or the legacy
/// `0x78` block.
pub fn is_recovery_record(block: &Block) -> bool {
    match block {
        Block::Service(sub) => sub.is_recovery_record(),
        other => other.header().block_type == BlockType::OldRecovery as u8,
    }
}

/// Size of the block as stored in the stripped chain.
pub fn total_size(block: &Block) -> u64 {
    let header = block.header();
    if matches!(block, Block::File(_)) || is_recovery_record(block) {
        header.header_size as u64
    } else {
        header.full_size()
    }
}

/// Header plus packed payload of a file or service record.
///
/// Uses the decoded 64-bit packed size, so it only differs from
/// `header_size + extended_size` when the large flag carries a high word.
pub fn record_span(block: &Block) -> Option<u64> {
    let packed = match block {
        Block::File(file) => file.packed_size,
        Block::Service(sub) => sub.record.packed_size,
        _ => return None,
    };
    Some((block.header().header_size as u64).saturating_add(packed))
}

/// Size of the block in the original volume, payload included.
pub fn on_disk_size(block: &Block) -> u64 {
    if let Some(span) = record_span(block) {
        return span;
    }
    let header = block.header();
    if header.block_type == BlockType::OldRecovery as u8 || header.is_long_block() {
        header.full_size()
    } else {
        header.header_size as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::BlockHeader;

    fn decode(buffer: &[u8]) -> Block {
        let header = BlockHeader::parse(buffer, 0).unwrap();
        Block::decode(buffer, header).unwrap()
    }

    fn record(tag: u8, flags: u16, name: &[u8], packed: u32, high: Option<u32>) -> Vec<u8> {
        let size = 32 + name.len() + if high.is_some() { 8 } else { 0 };
        let mut buffer = vec![0x00, 0x00, tag];
        buffer.extend_from_slice(&flags.to_le_bytes());
        buffer.extend_from_slice(&(size as u16).to_le_bytes());
        buffer.extend_from_slice(&packed.to_le_bytes());
        buffer.extend_from_slice(&[0; 4]);
        buffer.push(2);
        buffer.extend_from_slice(&[0; 8]);
        buffer.push(29);
        buffer.push(0x30);
        buffer.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buffer.extend_from_slice(&[0; 4]);
        if let Some(high) = high {
            buffer.extend_from_slice(&high.to_le_bytes());
            buffer.extend_from_slice(&[0; 4]);
        }
        buffer.extend_from_slice(name);
        buffer
    }

    #[test]
    fn test_file_header_sizes() {
        let block = decode(&record(0x74, 0, b"a.mkv", 5000, None));
        assert_eq!(total_size(&block), 37);
        assert_eq!(on_disk_size(&block), 37 + 5000);
    }

    #[test]
    fn test_large_file_uses_decoded_packed_size() {
        let block = decode(&record(0x74, 0x0100, b"a.mkv", 16, Some(1)));
        let header = block.header();
        assert_eq!(header.extended_size, 16);
        assert_eq!(on_disk_size(&block), 45 + (1u64 << 32) + 16);
        assert_ne!(on_disk_size(&block), header.full_size());
    }

    #[test]
    fn test_large_service_uses_decoded_packed_size() {
        let block = decode(&record(0x7A, 0x0100, b"RR", 8, Some(2)));
        assert_eq!(total_size(&block), 42);
        assert_eq!(on_disk_size(&block), 42 + (2u64 << 32) + 8);
        assert_eq!(record_span(&block), Some(on_disk_size(&block)));
    }

    #[test]
    fn test_recovery_record_sizes() {
        let block = decode(&record(0x7A, 0, b"RR", 9000, None));
        assert!(is_recovery_record(&block));
        assert_eq!(total_size(&block), 34);
        assert_eq!(on_disk_size(&block), 34 + 9000);
    }

    #[test]
    fn test_comment_service_keeps_payload() {
        let block = decode(&record(0x7A, 0, b"CMT", 20, None));
        assert!(!is_recovery_record(&block));
        assert_eq!(total_size(&block), 35 + 20);
        assert_eq!(on_disk_size(&block), 35 + 20);
    }

    #[test]
    fn test_legacy_recovery() {
        let mut buffer = vec![0x00, 0x00, 0x78, 0x00, 0x80, 0x0B, 0x00];
        buffer.extend_from_slice(&700u32.to_le_bytes());
        let block = decode(&buffer);
        assert!(is_recovery_record(&block));
        assert_eq!(total_size(&block), 11);
        assert_eq!(on_disk_size(&block), 711);
    }

    #[test]
    fn test_plain_and_long_blocks() {
        let block = decode(&[0x00, 0x00, 0x73, 0x00, 0x00, 0x0D, 0x00, 0, 0, 0, 0, 0, 0]);
        assert_eq!(total_size(&block), 13);
        assert_eq!(on_disk_size(&block), 13);

        let mut buffer = vec![0x00, 0x00, 0x77, 0x00, 0x80, 0x0B, 0x00];
        buffer.extend_from_slice(&50u32.to_le_bytes());
        let block = decode(&buffer);
        assert_eq!(total_size(&block), 61);
        assert_eq!(on_disk_size(&block), 61);
    }
}
