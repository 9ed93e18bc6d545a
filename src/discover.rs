//! Finding input files in a directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CocoMergeError;

/// Lists the regular files directly inside `dir` whose extension is
/// exactly `extension`, sorted by path.
///
/// Subdirectories are not searched. Sorting keeps merge order, and with
/// it every assigned id, reproducible between runs.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CocoMergeError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| CocoMergeError::Discover {
            path: dir.to_path_buf(),
            message: source.to_string(),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::debug!(
        "found {} '.{}' file(s) in {}",
        files.len(),
        extension,
        dir.display()
    );
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}
