//! Error types for notebook decoding and file processing.

use std::io;

/// The document could not be understood as a notebook.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The file is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("notebook root must be a JSON object")]
    NotAnObject,

    /// The `cells` field is absent.
    #[error("missing `cells` field")]
    MissingCells,

    /// The `cells` field is present but is not a list.
    #[error("`cells` must be a list")]
    CellsNotAList,

    /// One cell failed to decode (missing `cell_type`/`source`, unknown type, ...).
    #[error("cell {index}: {source}")]
    Cell {
        /// Zero-based position of the cell in the original document.
        index: usize,
        /// The underlying decode error.
        source: serde_json::Error,
    },
}

/// Errors produced while processing a notebook file.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// The file contents are not a valid notebook.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl NotebookError {
    /// Returns `true` for format (as opposed to I/O) failures.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

/// Result alias for notebook operations.
pub type Result<T> = std::result::Result<T, NotebookError>;
