//! Batch conversion entry points.
//!
//! Files are converted strictly one after another. A failure is recorded in
//! that file's [`FileResult`] and the loop moves on; only problems with the
//! request as a whole (bad folder path, unwritable output directory) surface
//! as [`MdBatchError`].

use crate::archive::{markdown_entry_name, unique_name};
use crate::config::ConversionConfig;
use crate::converter::DocumentConverter;
use crate::error::{FileError, MdBatchError};
use crate::input::{scan_directory, InputItem};
use crate::output::{BatchOutput, BatchStats, FileResult};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every item with `converter`, in order.
///
/// Never fails: per-file errors live in the returned results. An empty
/// `items` list produces an empty [`BatchOutput`] without touching the
/// converter.
pub async fn convert_batch(
    items: &[InputItem],
    converter: &dyn DocumentConverter,
    config: &ConversionConfig,
) -> BatchOutput {
    let batch_start = Instant::now();
    let total = items.len();

    if total == 0 {
        info!("Nothing to convert");
        return BatchOutput::default();
    }

    info!("Starting batch of {} file(s) with '{}'", total, converter.name());
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut results = Vec::with_capacity(total);
    for (i, item) in items.iter().enumerate() {
        let index = i + 1;
        let name = item.display_name();
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &name);
        }

        let start = Instant::now();
        let outcome = converter.convert(item.path()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(markdown) => {
                debug!("Converted {} in {}ms", name, duration_ms);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(index, total, &name, markdown.len());
                }
                FileResult {
                    name,
                    source: item.path().to_path_buf(),
                    markdown,
                    error: None,
                    duration_ms,
                    output_path: None,
                }
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", name, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(index, total, &name, &e.to_string());
                }
                FileResult {
                    name,
                    source: item.path().to_path_buf(),
                    markdown: String::new(),
                    error: Some(e),
                    duration_ms,
                    output_path: None,
                }
            }
        };
        results.push(result);
    }

    let converted = results.iter().filter(|r| r.is_success()).count();
    let stats = BatchStats {
        total_files: total,
        converted_files: converted,
        failed_files: total - converted,
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} converted, {}ms total",
        converted, total, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, converted);
    }

    BatchOutput { results, stats }
}

/// Scan `input_dir` (honouring `config.recursive` and `config.extensions`)
/// and convert every file found.
pub async fn convert_directory(
    input_dir: impl AsRef<Path>,
    converter: &dyn DocumentConverter,
    config: &ConversionConfig,
) -> Result<BatchOutput, MdBatchError> {
    let files = scan_directory(input_dir.as_ref(), config.recursive, &config.extensions)?;
    let items: Vec<InputItem> = files.into_iter().map(InputItem::Path).collect();
    Ok(convert_batch(&items, converter, config).await)
}

/// Convert a folder and write one `<stem>.md` per success into `output_dir`.
///
/// Files are written via temp file + rename so a reader never sees a partial
/// document. Two inputs with the same stem get `-2`, `-3`... suffixes, the
/// same rule the archive uses. Each written file gets its `output_path` set.
///
/// A file whose Markdown cannot be saved becomes a failure
/// ([`FileError::OutputWriteFailed`]) and the remaining files are still
/// written. Only an output directory that cannot be created is fatal.
pub async fn convert_directory_to_dir(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    converter: &dyn DocumentConverter,
    config: &ConversionConfig,
) -> Result<BatchOutput, MdBatchError> {
    let output_dir = output_dir.as_ref();
    let mut output = convert_directory(input_dir, converter, config).await?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| MdBatchError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let mut used: HashSet<String> = HashSet::new();
    for result in output.results.iter_mut().filter(|r| r.is_success()) {
        let file_name = unique_name(&mut used, markdown_entry_name(&result.name));
        let path = output_dir.join(&file_name);
        match write_atomic(&path, &result.markdown).await {
            Ok(()) => {
                debug!("Wrote {} -> {}", result.source.display(), path.display());
                result.output_path = Some(path);
            }
            Err(e) => {
                warn!("Failed to write {}: {}", path.display(), e);
                result.error = Some(FileError::OutputWriteFailed {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                });
                result.markdown.clear();
            }
        }
    }

    let converted = output.successes().count();
    output.stats.converted_files = converted;
    output.stats.failed_files = output.stats.total_files - converted;

    Ok(output)
}

async fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}
