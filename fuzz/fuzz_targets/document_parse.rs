//! Fuzz target for annotation document parsing, resolution and merging.
//!
//! Run with:
//!   cargo +nightly fuzz run document_parse

#![no_main]

use cocomerge::coco::io_json::from_json_slice;
use cocomerge::coco::CocoDocument;
use cocomerge::merge::{merge_documents, MergeOptions};
use cocomerge::resolve::{resolve_document, ResolveOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for a single-image annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(document) = from_json_slice::<CocoDocument>(data) else {
        return;
    };

    // Lenient resolution and merging never fail on parsed input.
    let resolved = resolve_document(&document, &ResolveOptions::default())
        .expect("lenient resolve cannot fail");
    merge_documents([resolved.document], &MergeOptions::default())
        .expect("lenient merge cannot fail");
});
