use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cocomerge operations.
#[derive(Debug, Error)]
pub enum CocoMergeError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse annotation document from {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write annotation document to {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to discover input files under {path}: {message}")]
    Discover { path: PathBuf, message: String },

    #[error("{stage}: annotation {annotation} has unresolved {reference}")]
    UnresolvedReference {
        stage: &'static str,
        annotation: u64,
        reference: String,
    },
}
