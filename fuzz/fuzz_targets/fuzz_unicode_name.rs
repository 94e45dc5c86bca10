#![no_main]
use libfuzzer_sys::fuzz_target;
use rar_srr::decode_unicode_name;

fuzz_target!(|data: &[u8]| {
    // First byte picks the split between standard name and encoded run
    if let Some((&split, rest)) = data.split_first() {
        let split = (split as usize).min(rest.len());
        let (standard, encoded) = rest.split_at(split);
        let _ = decode_unicode_name(standard, encoded);
    }
});
