//! Result types produced by a batch conversion.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of converting one input file.
///
/// Exactly one is produced per input, in input order. On failure
/// `markdown` is empty and `error` says why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Upload file name, or the final component of a scanned path.
    pub name: String,
    /// Where the converter read the file from.
    pub source: PathBuf,
    pub markdown: String,
    pub error: Option<FileError>,
    pub duration_ms: u64,
    /// Where the Markdown was written, for folder-to-folder conversions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub converted_files: usize,
    pub failed_files: usize,
    pub total_duration_ms: u64,
}

/// Everything a batch conversion produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    pub results: Vec<FileResult>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// True when there was nothing to convert.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}
