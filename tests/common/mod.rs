#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const FIXTURE_DIR: &str = "tests/fixtures/labeled";

/// Copies the labeled fixture files into a fresh directory under `root`.
pub fn stage_fixtures(root: &Path) -> PathBuf {
    let dir = root.join("labeled");
    fs::create_dir_all(&dir).expect("create staging dir");

    for entry in fs::read_dir(FIXTURE_DIR).expect("read fixture dir") {
        let entry = entry.expect("fixture entry");
        fs::copy(entry.path(), dir.join(entry.file_name())).expect("copy fixture");
    }
    dir
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read output");
    serde_json::from_str(&text).expect("output is valid JSON")
}
