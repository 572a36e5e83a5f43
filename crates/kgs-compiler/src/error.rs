//! Error types for schema loading.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when loading a field schema.
///
/// Only I/O and JSON syntax surface here. Structurally odd entries inside valid JSON are
/// skipped with a warning instead.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read a schema file.
    #[error("failed to read schema file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The schema is not valid JSON.
    #[error("failed to parse schema JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
}
