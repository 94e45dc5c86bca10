//! RAR 1.5-4.x compressed Unicode file names.
//!
//! When a file header has the Unicode flag, its name field holds the OEM
//! ("standard") name, a NUL, then an encoded byte run that rebuilds the
//! UTF-16 name from the standard one:
//!
//! ```text
//! encoded := high_byte { flag_byte op op op op }
//! op 00   := lo                  -> (lo, 0)
//! op 01   := lo                  -> (lo, high_byte)
//! op 10   := lo hi               -> (lo, hi)
//! op 11   := n                   -> n+2 chars (std[pos], 0)
//!          | n|0x80 correction   -> (n&0x7F)+2 chars (std[pos]+correction, high_byte)
//! ```
//!
//! Each flag byte carries four 2-bit opcodes, most significant pair first.
//! The standard-name cursor advances for opcodes `00`, `01` and `11`; the
//! explicit pair `10` leaves it where it is. unrar advances it for `10` as
//! well, so a name where an explicit pair is followed by a copy run decodes
//! differently from WinRAR's listing. [`encode`] follows the same rule as
//! [`decode`], so names written by this crate round-trip.

use super::text::{decode_legacy, DecodedText, TextEncoding};

/// Longest run a single `11` opcode can express.
const MAX_RUN: usize = 0x7F + 2;

/// Rebuild the full name from the standard name and the encoded run.
///
/// An empty encoded run falls back to legacy single-byte decoding. A run that
/// ends in the middle of an opcode stops decoding at that point.
pub fn decode(standard: &[u8], encoded: &[u8]) -> String {
    let Some((&high, mut rest)) = encoded.split_first() else {
        return decode_legacy(standard);
    };
    let high = (high as u16) << 8;

    let mut out: Vec<u16> = Vec::with_capacity(standard.len());
    let mut pos = 0usize;
    let mut flags = 0u8;
    let mut flag_bits = 0u32;

    while !rest.is_empty() {
        if flag_bits == 0 {
            flags = next(&mut rest).unwrap_or(0);
            flag_bits = 8;
        }
        flag_bits -= 2;

        match (flags >> flag_bits) & 0x03 {
            0 => {
                let Some(lo) = next(&mut rest) else { break };
                out.push(lo as u16);
                pos += 1;
            }
            1 => {
                let Some(lo) = next(&mut rest) else { break };
                out.push(high | lo as u16);
                pos += 1;
            }
            2 => {
                let Some(lo) = next(&mut rest) else { break };
                let hi = next(&mut rest).unwrap_or(0);
                out.push(((hi as u16) << 8) | lo as u16);
            }
            _ => {
                let Some(n) = next(&mut rest) else { break };
                if n & 0x80 != 0 {
                    let Some(correction) = next(&mut rest) else { break };
                    for _ in 0..(n & 0x7F) as usize + 2 {
                        let lo = standard
                            .get(pos)
                            .map_or(correction, |b| b.wrapping_add(correction));
                        out.push(high | lo as u16);
                        pos += 1;
                    }
                } else {
                    for _ in 0..n as usize + 2 {
                        out.push(standard.get(pos).copied().unwrap_or(0) as u16);
                        pos += 1;
                    }
                }
            }
        }
    }

    String::from_utf16_lossy(&out)
}

/// Produce an encoded run that [`decode`] turns back into `name`.
///
/// Characters that match the standard name are emitted as copy runs, others
/// as single or paired bytes. The high byte is the most frequent non-zero
/// high byte of the name.
pub fn encode(standard: &[u8], name: &str) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let high = most_common_high_byte(&units);

    let mut ops: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut i = 0usize;
    let mut pos = 0usize;

    while i < units.len() {
        let plain = run_length(&units[i..], standard.get(pos..).unwrap_or(&[]), |s| s as u16);
        if plain >= 2 {
            ops.push((3, vec![(plain - 2) as u8]));
            i += plain;
            pos += plain;
            continue;
        }

        let unit = units[i];
        let (lo, hi) = (unit as u8, (unit >> 8) as u8);

        if high != 0 && hi == high {
            if let Some(&s) = standard.get(pos) {
                let correction = lo.wrapping_sub(s);
                let corrected = run_length(&units[i..], &standard[pos..], |s| {
                    ((high as u16) << 8) | s.wrapping_add(correction) as u16
                });
                if corrected >= 2 {
                    ops.push((3, vec![0x80 | (corrected - 2) as u8, correction]));
                    i += corrected;
                    pos += corrected;
                    continue;
                }
            }
        }

        if hi == 0 {
            ops.push((0, vec![lo]));
            pos += 1;
        } else if hi == high {
            ops.push((1, vec![lo]));
            pos += 1;
        } else {
            ops.push((2, vec![lo, hi]));
        }
        i += 1;
    }

    let mut out = vec![high];
    for group in ops.chunks(4) {
        let flags = group
            .iter()
            .enumerate()
            .fold(0u8, |acc, (k, (mode, _))| acc | (*mode << (6 - 2 * k)));
        out.push(flags);
        for (_, data) in group {
            out.extend_from_slice(data);
        }
    }
    out
}

fn next<'a>(rest: &mut &'a [u8]) -> Option<u8> {
    let (&b, tail) = rest.split_first()?;
    *rest = tail;
    Some(b)
}

/// How many leading units equal `map(standard[j])`, capped at one opcode.
fn run_length(units: &[u16], standard: &[u8], map: impl Fn(u8) -> u16) -> usize {
    units
        .iter()
        .zip(standard)
        .take(MAX_RUN)
        .take_while(|&(&u, &s)| u == map(s))
        .count()
}

fn most_common_high_byte(units: &[u16]) -> u8 {
    let mut counts = [0usize; 256];
    for &u in units {
        counts[(u >> 8) as usize] += 1;
    }
    (1..256)
        .max_by_key(|&h| (counts[h], std::cmp::Reverse(h)))
        .filter(|&h| counts[h] > 0)
        .map_or(0, |h| h as u8)
}

/// Decode a raw header name field.
///
/// Strategy order:
/// 1. Unicode flag and a NUL separator: RAR Unicode decoding of the bytes
///    after the NUL (or legacy decoding of the standard name when nothing
///    follows the NUL).
/// 2. Unicode flag without NUL: UTF-8 if valid, else legacy.
/// 3. No Unicode flag: legacy single-byte.
pub fn decode_name(raw: &[u8], unicode: bool) -> DecodedText {
    if !unicode {
        return DecodedText {
            text: decode_legacy(raw),
            encoding: TextEncoding::Cp437,
        };
    }

    match raw.iter().position(|&b| b == 0) {
        Some(nul) => {
            let (standard, encoded) = (&raw[..nul], &raw[nul + 1..]);
            if encoded.is_empty() {
                DecodedText {
                    text: decode_legacy(standard),
                    encoding: TextEncoding::Cp437,
                }
            } else {
                DecodedText {
                    text: decode(standard, encoded),
                    encoding: TextEncoding::RarUnicode,
                }
            }
        }
        None => super::text::decode_text(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_encoded_falls_back() {
        assert_eq!(decode(b"readme.txt", &[]), "readme.txt");
    }

    #[test]
    fn test_plain_copy_run() {
        // high byte 0, flags 11 00 00 00, run of 4+2 chars from the standard name
        let encoded = [0x00, 0b1100_0000, 0x04];
        assert_eq!(decode(b"abcdef", &encoded), "abcdef");
    }

    #[test]
    fn test_high_byte_ops() {
        // high byte 0x04 (Cyrillic), ops: 01 01 00 10
        let encoded = [0x04, 0b0101_0010, 0x1F, 0x40, b'!', 0xAC, 0x20];
        assert_eq!(decode(b"", &encoded), "Пр!€");
    }

    #[test]
    fn test_corrected_run() {
        // high byte 0x04, one op 11 with correction: 3 chars std+0x10
        let encoded = [0x04, 0b1100_0000, 0x81, 0x10];
        assert_eq!(decode(&[0x00, 0x01, 0x02], &encoded), "АБВ");
    }

    #[test]
    fn test_corrected_run_past_standard_name() {
        let encoded = [0x04, 0b1100_0000, 0x80, 0x10];
        assert_eq!(decode(&[0x00], &encoded), "АА");
    }

    #[test]
    fn test_uncorrected_run_past_standard_name_pads_zero() {
        let encoded = [0x00, 0b1100_0000, 0x00];
        assert_eq!(decode(b"a", &encoded), "a\0");
    }

    #[test]
    fn test_pair_does_not_advance_cursor() {
        // ops: 10 (pair U+4E2D), 11 copy 2 chars starting at std[0]
        let encoded = [0x00, 0b1011_0000, 0x2D, 0x4E, 0x00];
        assert_eq!(decode(b"ab", &encoded), "中ab");
    }

    #[test]
    fn test_truncated_op_stops() {
        let encoded = [0x00, 0b1000_0000, 0x41];
        assert_eq!(decode(b"", &encoded), "A");
        let encoded = [0x00, 0b1100_0000];
        assert_eq!(decode(b"xyz", &encoded), "");
    }

    #[test]
    fn test_round_trip_mixed_name() {
        let name = "Фильм.2011/中文字幕/aaaaaaaa.Привет.€.mkv";
        let standard: Vec<u8> = name
            .chars()
            .flat_map(|c| {
                let n = c.len_utf16();
                std::iter::repeat(if c.is_ascii() { c as u8 } else { b'_' }).take(n)
            })
            .collect();
        let encoded = encode(&standard, name);
        assert_eq!(decode(&standard, &encoded), name);
    }

    #[test]
    fn test_round_trip_uses_corrected_runs() {
        let name = "АБВГД";
        let standard = [0x80, 0x81, 0x82, 0x83, 0x84];
        let encoded = encode(&standard, name);
        // high byte, one flag byte, one corrected run
        assert_eq!(encoded.len(), 4);
        assert_eq!(decode(&standard, &encoded), name);
    }

    #[test]
    fn test_decode_name_strategies() {
        let legacy = decode_name(&[b'a', 0x84], false);
        assert_eq!(legacy.text, "aä");
        assert_eq!(legacy.encoding, TextEncoding::Cp437);

        let utf8 = decode_name("naïve.txt".as_bytes(), true);
        assert_eq!(utf8.encoding, TextEncoding::Utf8);
        assert_eq!(utf8.text, "naïve.txt");

        let no_tail = decode_name(b"plain.txt\0", true);
        assert_eq!(no_tail.text, "plain.txt");
        assert_eq!(no_tail.encoding, TextEncoding::Cp437);

        let mut raw = b"__.txt\0".to_vec();
        raw.extend(encode(b"__.txt", "Яя.txt"));
        let unicode = decode_name(&raw, true);
        assert_eq!(unicode.encoding, TextEncoding::RarUnicode);
        assert_eq!(unicode.text, "Яя.txt");
    }
}
