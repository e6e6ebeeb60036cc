//! Zip packaging of batch results.
//!
//! Layout of the archive:
//!
//! ```text
//! markitdown_converted.zip
//!  ├─ report.md              one entry per successful file
//!  ├─ report-2.md            same stem seen twice
//!  └─ conversion_errors.txt  only when something failed
//! ```
//!
//! The failure log is not a `.md` file, so the number of
//! Markdown entries always equals the number of successful conversions.

use crate::error::MdBatchError;
use crate::output::FileResult;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name offered to the browser for download.
pub const ARCHIVE_FILE_NAME: &str = "markitdown_converted.zip";

/// Entry listing the files that failed and why.
pub const ERRORS_ENTRY_NAME: &str = "conversion_errors.txt";

/// `"dir/Report.final.pdf"` → `"Report.final.md"`.
pub fn markdown_entry_name(display_name: &str) -> String {
    let last = display_name.rsplit(['/', '\\']).next().unwrap_or(display_name);
    let stem = Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}.md")
}

/// Return `candidate`, or `<stem>-N.<ext>` for the first N ≥ 2 not in `used`.
pub fn unique_name(used: &mut HashSet<String>, candidate: String) -> String {
    if used.insert(candidate.clone()) {
        return candidate;
    }
    let (stem, ext) = match candidate.rsplit_once('.') {
        Some((s, e)) => (s.to_string(), format!(".{e}")),
        None => (candidate.clone(), String::new()),
    };
    let mut n = 2;
    loop {
        let name = format!("{stem}-{n}{ext}");
        if used.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

/// Build the download archive in memory.
///
/// Returns `Ok(None)` when `results` is empty: there is nothing to offer.
pub fn build_archive(results: &[FileResult]) -> Result<Option<Vec<u8>>, MdBatchError> {
    if results.is_empty() {
        return Ok(None);
    }

    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used: HashSet<String> = HashSet::new();
    // Reserve the log name so a document called "conversion_errors" can't collide with it.
    used.insert(ERRORS_ENTRY_NAME.to_string());

    for result in results.iter().filter(|r| r.is_success()) {
        let entry = unique_name(&mut used, markdown_entry_name(&result.name));
        zip.start_file(entry.as_str(), options)
            .map_err(|e| MdBatchError::ArchiveFailed(e.to_string()))?;
        zip.write_all(result.markdown.as_bytes())
            .map_err(|e| MdBatchError::ArchiveFailed(e.to_string()))?;
    }

    let failure_log = render_failure_log(results);
    if !failure_log.is_empty() {
        zip.start_file(ERRORS_ENTRY_NAME, options)
            .map_err(|e| MdBatchError::ArchiveFailed(e.to_string()))?;
        zip.write_all(failure_log.as_bytes())
            .map_err(|e| MdBatchError::ArchiveFailed(e.to_string()))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| MdBatchError::ArchiveFailed(e.to_string()))?;
    Ok(Some(cursor.into_inner()))
}

/// One `name: error` line per failed file; empty when all succeeded.
pub fn render_failure_log(results: &[FileResult]) -> String {
    let mut log = String::new();
    for r in results {
        if let Some(ref e) = r.error {
            log.push_str(&format!("{}: {}\n", r.name, e));
        }
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use std::io::Read;
    use std::path::PathBuf;

    fn ok(name: &str, md: &str) -> FileResult {
        FileResult {
            name: name.into(),
            source: PathBuf::from(name),
            markdown: md.into(),
            error: None,
            duration_ms: 1,
            output_path: None,
        }
    }

    fn failed(name: &str) -> FileResult {
        FileResult {
            name: name.into(),
            source: PathBuf::from(name),
            markdown: String::new(),
            error: Some(FileError::InvalidUtf8),
            duration_ms: 1,
            output_path: None,
        }
    }

    fn entries(bytes: Vec<u8>) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn entry_names() {
        assert_eq!(markdown_entry_name("report.pdf"), "report.md");
        assert_eq!(markdown_entry_name("a/b/Report.final.docx"), "Report.final.md");
        assert_eq!(markdown_entry_name("C:\\x\\slides.pptx"), "slides.md");
        assert_eq!(markdown_entry_name("README"), "README.md");
        assert_eq!(markdown_entry_name(""), "document.md");
    }

    #[test]
    fn unique_name_appends_counter() {
        let mut used = HashSet::new();
        assert_eq!(unique_name(&mut used, "a.md".into()), "a.md");
        assert_eq!(unique_name(&mut used, "a.md".into()), "a-2.md");
        assert_eq!(unique_name(&mut used, "a.md".into()), "a-3.md");
        assert_eq!(unique_name(&mut used, "noext".into()), "noext");
        assert_eq!(unique_name(&mut used, "noext".into()), "noext-2");
    }

    #[test]
    fn empty_results_produce_no_archive() {
        assert!(build_archive(&[]).unwrap().is_none());
    }

    #[test]
    fn successes_survive_failures() {
        let results = vec![ok("a.pdf", "# A"), failed("broken.xlsx"), ok("b.docx", "# B")];
        let bytes = build_archive(&results).unwrap().unwrap();
        assert_eq!(
            entries(bytes.clone()),
            vec!["a.md", "b.md", ERRORS_ENTRY_NAME]
        );

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut body = String::new();
        archive.by_name("a.md").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "# A");

        let mut log = String::new();
        archive
            .by_name(ERRORS_ENTRY_NAME)
            .unwrap()
            .read_to_string(&mut log)
            .unwrap();
        assert!(log.starts_with("broken.xlsx: "), "log: {log}");
    }

    #[test]
    fn no_error_log_when_all_succeed() {
        let bytes = build_archive(&[ok("x.pdf", "x"), ok("x.docx", "y")]).unwrap().unwrap();
        assert_eq!(entries(bytes), vec!["x-2.md", "x.md"]);
    }

    #[test]
    fn all_failed_still_yields_archive_with_log() {
        let bytes = build_archive(&[failed("a.pdf")]).unwrap().unwrap();
        assert_eq!(entries(bytes), vec![ERRORS_ENTRY_NAME]);
    }
}
