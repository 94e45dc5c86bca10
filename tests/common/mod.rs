//! Shared test utilities for integration tests.
//!
//! Builders for synthetic RAR 4.x volumes and SRR files. Every RAR-domain
//! header gets a valid CRC so the walkers count no mismatches.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use rar_srr::header_crc16;

pub const MARKER: &[u8] = b"Rar!\x1a\x07\x00";

pub const FLAG_LONG: u16 = 0x8000;
pub const FLAG_SKIP: u16 = 0x4000;
pub const FLAG_LARGE: u16 = 0x0100;
pub const FLAG_UNICODE: u16 = 0x0200;
pub const FLAG_DIRECTORY: u16 = 0x00E0;

/// A block with `body` after the 7-byte base header and a valid CRC.
pub fn block(tag: u8, flags: u16, body: &[u8]) -> Vec<u8> {
    let size = 7 + body.len();
    let mut out = vec![0x00, 0x00, tag];
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&(size as u16).to_le_bytes());
    out.extend_from_slice(body);
    let crc = header_crc16(&out);
    out[..2].copy_from_slice(&crc.to_le_bytes());
    out
}

pub fn archive_header(flags: u16) -> Vec<u8> {
    block(0x73, flags, &[0; 6])
}

pub fn end_block() -> Vec<u8> {
    block(0x7B, FLAG_SKIP, &[])
}

/// File-header shaped record (`0x74` file or `0x7A` service block).
///
/// The large flag is added automatically when `packed` needs 64 bits.
pub fn record(tag: u8, flags: u16, name: &[u8], packed: u64, method: u8) -> Vec<u8> {
    let large = packed > u32::MAX as u64 || flags & FLAG_LARGE != 0;
    let flags = if large { flags | FLAG_LARGE } else { flags };
    let mut body = Vec::new();
    body.extend_from_slice(&(packed as u32).to_le_bytes());
    body.extend_from_slice(&(packed as u32).to_le_bytes()); // unpacked
    body.push(2); // Windows
    body.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    body.extend_from_slice(&0x4A21_2B00u32.to_le_bytes());
    body.push(29);
    body.push(method);
    body.extend_from_slice(&(name.len() as u16).to_le_bytes());
    body.extend_from_slice(&0x20u32.to_le_bytes());
    if large {
        body.extend_from_slice(&((packed >> 32) as u32).to_le_bytes());
        body.extend_from_slice(&((packed >> 32) as u32).to_le_bytes());
    }
    body.extend_from_slice(name);
    block(tag, flags, &body)
}

pub fn file_header(name: &str, packed: u64) -> Vec<u8> {
    record(0x74, 0, name.as_bytes(), packed, 0x33)
}

pub fn directory_header(name: &str) -> Vec<u8> {
    record(0x74, FLAG_DIRECTORY, name.as_bytes(), 0, 0x30)
}

pub fn service(name: &str, packed: u64, method: u8) -> Vec<u8> {
    record(0x7A, 0, name.as_bytes(), packed, method)
}

fn prefixed(name: &str) -> Vec<u8> {
    let mut out = (name.len() as u16).to_le_bytes().to_vec();
    out.extend_from_slice(name.as_bytes());
    out
}

pub fn srr_header(app: &str) -> Vec<u8> {
    block(0x69, 0x0001, &prefixed(app))
}

pub fn srr_stored_file(name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = (data.len() as u32).to_le_bytes().to_vec();
    body.extend(prefixed(name));
    let mut out = block(0x6A, 0, &body);
    out.extend_from_slice(data);
    out
}

pub fn srr_rar_file(name: &str) -> Vec<u8> {
    block(0x71, 0, &prefixed(name))
}

pub fn srr_oso_hash(name: &str, size: u64, hash: u64) -> Vec<u8> {
    let mut body = size.to_le_bytes().to_vec();
    body.extend_from_slice(&hash.to_le_bytes());
    body.extend(prefixed(name));
    block(0x6B, 0, &body)
}

/// One volume's stripped header chain: marker, archive header, the given
/// blocks, end block.
pub fn stripped_volume(blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = MARKER.to_vec();
    out.extend(archive_header(0x0001));
    for b in blocks {
        out.extend_from_slice(b);
    }
    out.extend(end_block());
    out
}
