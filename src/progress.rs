//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch loop processes each file. The CLI drives a terminal
//! progress bar from these events; the web server logs them.
//!
//! # Example
//!
//! ```rust
//! use mdbatch::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, name: &str, markdown_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} bytes)", index, total, name, markdown_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called by the batch loop as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before the converter is invoked for a file.
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file converted successfully.
    ///
    /// `markdown_len` is the byte length of the produced Markdown.
    fn on_file_complete(&self, index: usize, total: usize, name: &str, markdown_len: usize) {
        let _ = (index, total, name, markdown_len);
    }

    /// Called when a file failed. The batch continues afterwards.
    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Forwards every event to `tracing`. Used by the web server, where there is
/// no terminal to draw on.
pub struct TracingProgressCallback;

impl ConversionProgressCallback for TracingProgressCallback {
    fn on_batch_start(&self, total: usize) {
        info!("Converting {} file(s)", total);
    }

    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        debug!("Converting {}/{}: {}", index, total, name);
    }

    fn on_file_complete(&self, index: usize, total: usize, name: &str, markdown_len: usize) {
        debug!("Converted {}/{}: {} ({} bytes)", index, total, name, markdown_len);
    }

    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        warn!("Failed {}/{}: {}: {}", index, total, name, error);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        info!("Conversion finished: {}/{} succeeded", success_count, total);
    }
}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
