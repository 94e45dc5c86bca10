#![no_main]
use libfuzzer_sys::fuzz_target;
use rar_srr::{BlockWalker, ParseContext, RarArchive, WalkOptions};

fuzz_target!(|data: &[u8]| {
    // Both payload layouts over the same bytes
    let _ = BlockWalker::new(data, 0, WalkOptions::rar()).finish();
    let _ = BlockWalker::new(data, 0, WalkOptions::srr_embedded()).finish();

    let archive = RarArchive::parse(data, &ParseContext::default());
    let _ = archive.entries();
});
