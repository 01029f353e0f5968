//! Error types for compendium-core

use crate::model::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in compendium-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoder input is not well-formed XML
    #[error("malformed XML document near byte {position}: {message}")]
    MalformedDocument { position: u64, message: String },

    /// Adding an entry would collide with an existing name in its category
    #[error("an entry named '{name}' already exists in {category}")]
    DuplicateName { name: String, category: Category },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
