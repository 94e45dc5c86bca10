#![no_main]
use libfuzzer_sys::fuzz_target;
use rar_srr::{ParseContext, SrrFile};

fuzz_target!(|data: &[u8]| {
    let srr = SrrFile::parse(data, &ParseContext::default());
    let _ = srr.entries();
    let _ = srr.common_volume_size();
    let _ = srr.summary();
    let _ = srr.embedded_version(data);
});
