//! Reading and writing annotation documents as JSON files.
//!
//! Resolved per-image documents are written pretty-printed with a
//! four-space indent so they stay readable next to the raw files; the
//! merged dataset is written compactly because it is usually large and
//! only consumed by training code.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::CocoMergeError;

/// Output layout for [`write_document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonLayout {
    /// Four-space indent, one field per line.
    Pretty,
    /// No whitespace between tokens.
    Compact,
}

/// Reads a document from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or does not parse as the
/// expected document shape.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, CocoMergeError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CocoMergeError::DocumentParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document to a JSON file, creating parent directories first.
///
/// # Errors
/// Returns an error if the directories or the file cannot be created, or
/// serialization fails.
pub fn write_document<T: Serialize>(
    path: &Path,
    document: &T,
    layout: JsonLayout,
) -> Result<(), CocoMergeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);

    write_with_layout(&mut writer, document, layout).map_err(|source| {
        CocoMergeError::DocumentWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    writer.flush().map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> CocoMergeError {
    CocoMergeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_with_layout<W: Write, T: Serialize>(
    writer: W,
    document: &T,
    layout: JsonLayout,
) -> Result<(), serde_json::Error> {
    match layout {
        JsonLayout::Pretty => {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
            document.serialize(&mut serializer)
        }
        JsonLayout::Compact => serde_json::to_writer(writer, document),
    }
}

/// Parses a document from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a document from raw bytes.
///
/// Used by the fuzz target and benchmarks.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a document to a JSON string with the given layout.
pub fn to_json_string<T: Serialize>(
    document: &T,
    layout: JsonLayout,
) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    write_with_layout(&mut buf, document, layout)?;
    String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
}
