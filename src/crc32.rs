//! CRC32 and RAR 4.x header checksums.
//!
//! A RAR 4.x block stores the low 16 bits of the CRC-32 of its header,
//! computed from the type byte (offset 2) to the end of the header.

/// CRC32 lookup table (polynomial 0xEDB88320)
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Feed `data` into a running (non-inverted) CRC state.
fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    crc
}

/// Standard CRC32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    update(0xFFFFFFFF, data) ^ 0xFFFFFFFF
}

/// Checksum a RAR 4.x block header would carry.
///
/// `header` is the complete header including the stored checksum field;
/// anything shorter than 3 bytes yields 0.
pub fn header_crc16(header: &[u8]) -> u16 {
    if header.len() < 3 {
        return 0;
    }
    (crc32(&header[2..]) & 0xFFFF) as u16
}
