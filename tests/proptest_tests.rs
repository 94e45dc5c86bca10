//! Property-based tests using proptest.
//!
//! These tests check the Unicode name codec and the walkers against
//! randomly generated inputs.

mod common;

use common::*;
use proptest::prelude::*;
use rar_srr::{
    decode_unicode_name, encode_unicode_name, BlockWalker, ParseContext, RarArchive, SrrFile,
    WalkOptions,
};

/// The OEM name a packer would store next to `name`: one byte per UTF-16
/// unit, ASCII kept and everything else replaced with `_`.
fn standard_name(name: &str) -> Vec<u8> {
    name.encode_utf16()
        .map(|u| if u < 0x80 { u as u8 } else { b'_' })
        .collect()
}

/// Mostly ASCII with a sprinkle of one non-Latin script, like real names.
fn release_name_strategy() -> impl Strategy<Value = String> {
    let ascii = proptest::char::range('!', '~');
    let cyrillic = proptest::char::range('\u{0410}', '\u{044F}');
    proptest::collection::vec(prop_oneof![4 => ascii, 1 => cyrillic], 1..200)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    /// Encoding then decoding against the same standard name is lossless.
    #[test]
    fn unicode_name_round_trips(name in "\\PC{1,80}") {
        let standard = standard_name(&name);
        let encoded = encode_unicode_name(&standard, &name);
        prop_assert_eq!(decode_unicode_name(&standard, &encoded), name);
    }

    /// Runs longer than one copy opcode are split correctly.
    #[test]
    fn long_release_names_round_trip(name in release_name_strategy()) {
        let standard = standard_name(&name);
        let encoded = encode_unicode_name(&standard, &name);
        prop_assert_eq!(decode_unicode_name(&standard, &encoded), name);
    }

    /// Arbitrary encoded runs decode without panicking.
    #[test]
    fn unicode_decode_never_panics(
        standard in proptest::collection::vec(any::<u8>(), 0..64),
        encoded in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let _ = decode_unicode_name(&standard, &encoded);
    }

    /// Block offsets strictly increase and never pass the buffer end.
    #[test]
    fn walker_offsets_increase(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut walker = BlockWalker::new(&data, 0, WalkOptions::rar());
        let mut last = None;
        for block in walker.by_ref() {
            let offset = block.offset();
            prop_assert!(offset < data.len() as u64);
            if let Some(prev) = last {
                prop_assert!(offset > prev);
            }
            last = Some(offset);
        }
        prop_assert!(walker.stop().is_some());
        prop_assert!(walker.offset() <= data.len() as u64);
    }

    /// Garbage after a valid marker is handled without panicking.
    #[test]
    fn archive_parse_never_panics(tail in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut data = MARKER.to_vec();
        data.extend(tail);
        let archive = RarArchive::parse(&data, &ParseContext::default());
        prop_assert!(!archive.blocks().is_empty());
    }

    /// SRR decoding never panics and keeps its end offset in bounds.
    #[test]
    fn srr_parse_never_panics(tail in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut data = srr_header("ReScene .NET 1.0");
        data.extend(srr_rar_file("a.rar"));
        data.extend(tail);
        let srr = SrrFile::parse(&data, &ParseContext::default());
        prop_assert!(srr.end_offset <= data.len() as u64);
        prop_assert!(srr.app_name().is_some());
    }

    /// The packed sizes of stripped files add up to the reconstructed size.
    #[test]
    fn volume_size_is_headers_plus_packed(sizes in proptest::collection::vec(0u64..1 << 40, 1..8)) {
        let files: Vec<Vec<u8>> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| file_header(&format!("file{i}.bin"), size))
            .collect();
        let headers: u64 = files.iter().map(|f| f.len() as u64).sum();

        let mut data = srr_header("ReScene .NET 1.0");
        data.extend(srr_rar_file("a.rar"));
        data.extend(stripped_volume(&files));

        let srr = SrrFile::parse(&data, &ParseContext::default());
        let expected = 7 + 13 + headers + sizes.iter().sum::<u64>() + 7;
        prop_assert_eq!(srr.volume_sizes(), vec![expected]);
    }
}
