//! # mdbatch
//!
//! Batch-convert documents to Markdown through an external converter and
//! hand the results back as one zip archive.
//!
//! The conversion itself is delegated: every file is passed to a
//! [`DocumentConverter`], by default [`CommandConverter`] running the
//! `markitdown` command-line tool. mdbatch supplies everything around it:
//! collecting inputs (browser uploads or a server-side folder), a sequential
//! loop that isolates per-file failures, zip packaging, and a small local
//! web UI.
//!
//! ## Flow
//!
//! ```text
//! uploads / folder path
//!  │
//!  ├─ 1. Input    stage uploads in a temp dir, scan the folder
//!  ├─ 2. Convert  one converter call per file, failures recorded not fatal
//!  ├─ 3. Archive  <stem>.md per success + conversion_errors.txt
//!  └─ 4. Deliver  zip download (web) or .md files in a folder (CLI)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdbatch::{convert_directory, build_archive, CommandConverter, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let converter = CommandConverter::from_config(&config);
//!     let output = convert_directory("docs/", &converter, &config).await?;
//!     eprintln!("{}/{} converted", output.stats.converted_files, output.stats.total_files);
//!     if let Some(zip) = build_archive(&output.results)? {
//!         std::fs::write("markitdown_converted.zip", zip)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdbatch` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::{build_archive, markdown_entry_name, ARCHIVE_FILE_NAME, ERRORS_ENTRY_NAME};
pub use config::{ConversionConfig, ConversionConfigBuilder, ExtensionFilter, ServerConfig};
pub use convert::{convert_batch, convert_directory, convert_directory_to_dir};
pub use converter::{CommandConverter, DocumentConverter};
pub use error::{FileError, MdBatchError};
pub use input::{collect_inputs, scan_directory, stage_uploads, InputItem, StagedUploads, Upload};
pub use output::{BatchOutput, BatchStats, FileResult};
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, ProgressCallback, TracingProgressCallback,
};
pub use web::AppState;
