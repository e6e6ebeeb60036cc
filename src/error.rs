//! Error types for the mdbatch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MdBatchError`]: **Fatal**, the request cannot proceed at all
//!   (folder path missing, uploads could not be staged, archive could not be
//!   written). Returned as `Err(MdBatchError)` and nothing is converted.
//!
//! * [`FileError`]: **Non-fatal**, a single file failed to convert but the
//!   rest of the batch is fine. Stored inside [`crate::output::FileResult`]
//!   so one unreadable document never costs the user the whole archive.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mdbatch library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum MdBatchError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The folder path given by the user does not exist.
    #[error("Folder not found: '{path}'\nCheck the path exists on the machine running the server.")]
    DirectoryNotFound { path: PathBuf },

    /// The folder path exists but points at a file.
    #[error("Not a folder: '{path}'")]
    NotADirectory { path: PathBuf },

    /// The folder exists but cannot be listed.
    #[error("Cannot read folder '{path}': {detail}")]
    DirectoryUnreadable { path: PathBuf, detail: String },

    /// An uploaded file could not be written to the staging directory.
    #[error("Failed to stage upload '{name}': {source}")]
    UploadStagingFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The zip archive could not be assembled.
    #[error("Failed to build archive: {0}")]
    ArchiveFailed(String),

    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MdBatchError {
    /// True for errors caused by what the user typed or uploaded.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MdBatchError::DirectoryNotFound { .. }
                | MdBatchError::NotADirectory { .. }
                | MdBatchError::DirectoryUnreadable { .. }
        )
    }
}

/// A non-fatal error for a single file.
///
/// Stored in [`crate::output::FileResult`]. The batch always continues.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The converter program is not installed or not on `PATH`.
    #[error("converter '{program}' not found; install it or pass --converter")]
    ConverterNotFound { program: String },

    /// The converter could not be started for another reason.
    #[error("failed to start converter: {detail}")]
    ConverterLaunchFailed { detail: String },

    /// The converter ran but exited unsuccessfully.
    #[error("converter exited with {status}: {stderr}")]
    ConverterFailed { status: String, stderr: String },

    /// The converter printed something that is not UTF-8 text.
    #[error("converter output is not valid UTF-8")]
    InvalidUtf8,

    /// The Markdown was produced but could not be saved.
    #[error("failed to write '{path}': {detail}")]
    OutputWriteFailed { path: String, detail: String },

    /// Anything else that went wrong for this file only.
    #[error("{0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_not_found_display() {
        let e = MdBatchError::DirectoryNotFound {
            path: PathBuf::from("/nope/docs"),
        };
        assert!(e.to_string().contains("/nope/docs"), "got: {e}");
        assert!(e.is_input_error());
    }

    #[test]
    fn archive_error_is_not_input_error() {
        let e = MdBatchError::ArchiveFailed("disk full".into());
        assert!(!e.is_input_error());
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn converter_failed_display() {
        let e = FileError::ConverterFailed {
            status: "exit status: 1".into(),
            stderr: "UnsupportedFormatException".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 1"), "got: {msg}");
        assert!(msg.contains("UnsupportedFormatException"), "got: {msg}");
    }

    #[test]
    fn converter_not_found_names_program() {
        let e = FileError::ConverterNotFound {
            program: "markitdown".into(),
        };
        assert!(e.to_string().contains("markitdown"));
    }

    #[test]
    fn output_write_failure_is_per_file() {
        let e = FileError::OutputWriteFailed {
            path: "out/b.md".into(),
            detail: "Is a directory".into(),
        };
        assert_eq!(e.to_string(), "failed to write 'out/b.md': Is a directory");
    }

    #[test]
    fn file_error_serialises() {
        let json = serde_json::to_string(&FileError::InvalidUtf8).unwrap();
        assert_eq!(json, "\"InvalidUtf8\"");
    }
}
