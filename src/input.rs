//! Input collection: uploaded files and server-side folder scans.
//!
//! The converter only understands file paths, so uploads are written into a
//! per-request [`TempDir`] first. The directory lives as long as
//! [`StagedUploads`] and is removed when it is dropped, even if the request
//! handler bails out early.

use crate::config::{ConversionConfig, ExtensionFilter};
use crate::error::MdBatchError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    /// A file sent by the browser, already staged on disk.
    Uploaded { name: String, path: PathBuf },
    /// A file found by scanning a folder path.
    Path(PathBuf),
}

impl InputItem {
    /// Name shown to the user and used for the archive entry.
    pub fn display_name(&self) -> String {
        match self {
            InputItem::Uploaded { name, .. } => name.clone(),
            InputItem::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
        }
    }

    /// File the converter should read.
    pub fn path(&self) -> &Path {
        match self {
            InputItem::Uploaded { path, .. } => path,
            InputItem::Path(p) => p,
        }
    }
}

/// A file received from the browser, not yet on disk.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Uploads written to a temporary directory.
#[derive(Debug)]
pub struct StagedUploads {
    items: Vec<InputItem>,
    _temp_dir: Option<TempDir>,
}

impl StagedUploads {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            _temp_dir: None,
        }
    }

    pub fn items(&self) -> &[InputItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reduce a client-supplied file name to its final path component.
///
/// Browsers may send `C:\Users\me\doc.pdf` or `../../etc/passwd`; only the
/// last segment is kept so nothing is written outside the staging dir.
pub fn sanitize_upload_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}

/// Write uploads to a fresh temp dir, one file each.
///
/// Upload `i` lands at `<tmp>/<i>/<name>`, so two uploads with the same name
/// never collide and both keep their original file name.
pub async fn stage_uploads(uploads: Vec<Upload>) -> Result<StagedUploads, MdBatchError> {
    if uploads.is_empty() {
        return Ok(StagedUploads::empty());
    }

    let temp_dir = TempDir::new().map_err(|e| MdBatchError::UploadStagingFailed {
        name: "<staging directory>".into(),
        source: e,
    })?;

    let mut items = Vec::with_capacity(uploads.len());
    for (i, upload) in uploads.into_iter().enumerate() {
        let name = sanitize_upload_name(&upload.name).unwrap_or_else(|| format!("upload-{}", i + 1));
        let staging_error = |e| MdBatchError::UploadStagingFailed {
            name: name.clone(),
            source: e,
        };

        let dir = temp_dir.path().join(i.to_string());
        tokio::fs::create_dir(&dir).await.map_err(staging_error)?;
        let path = dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(staging_error)?;

        debug!("Staged upload {} ({} bytes)", name, upload.bytes.len());
        items.push(InputItem::Uploaded { name, path });
    }

    Ok(StagedUploads {
        items,
        _temp_dir: Some(temp_dir),
    })
}

/// List the files under `dir`, sorted by path.
///
/// Fails if `dir` is missing, not a directory, or cannot be listed.
pub fn scan_directory(
    dir: &Path,
    recursive: bool,
    filter: &ExtensionFilter,
) -> Result<Vec<PathBuf>, MdBatchError> {
    let meta = match std::fs::metadata(dir) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MdBatchError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(MdBatchError::DirectoryUnreadable {
                path: dir.to_path_buf(),
                detail: e.to_string(),
            })
        }
    };
    if !meta.is_dir() {
        return Err(MdBatchError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            // The root itself failing to open is fatal; a nested entry is skipped.
            Err(e) if e.depth() == 0 => {
                return Err(MdBatchError::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    detail: e.to_string(),
                })
            }
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && filter.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    info!("Found {} file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Combine staged uploads and an optional folder path into one input list.
///
/// Uploads come first, in upload order, then folder files. A bad folder path
/// fails the whole collection so nothing is converted.
pub fn collect_inputs(
    staged: &StagedUploads,
    folder: Option<&Path>,
    config: &ConversionConfig,
) -> Result<Vec<InputItem>, MdBatchError> {
    let mut items: Vec<InputItem> = staged.items().to_vec();
    if let Some(dir) = folder {
        let files = scan_directory(dir, config.recursive, &config.extensions)?;
        items.extend(files.into_iter().map(InputItem::Path));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, rel: &str) {
        let p = dir.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, rel).unwrap();
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_upload_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_upload_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(
            sanitize_upload_name("C:\\Users\\me\\notes.docx").as_deref(),
            Some("notes.docx")
        );
        assert_eq!(sanitize_upload_name(""), None);
        assert_eq!(sanitize_upload_name("dir/.."), None);
    }

    #[test]
    fn scan_recursive_and_flat() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.pdf");
        touch(dir.path(), "b.docx");
        touch(dir.path(), "sub/c.pdf");

        let all = scan_directory(dir.path(), true, &ExtensionFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let flat = scan_directory(dir.path(), false, &ExtensionFilter::default()).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat.iter().all(|p| p.parent() == Some(dir.path())));
    }

    #[test]
    fn scan_applies_filter_and_sorts() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "z.pdf");
        touch(dir.path(), "a.PDF");
        touch(dir.path(), "m.txt");

        let filter = ExtensionFilter::new(&["pdf"]).unwrap();
        let files = scan_directory(dir.path(), true, &filter).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "z.pdf"]);
    }

    #[test]
    fn scan_missing_dir_is_input_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan_directory(&missing, true, &ExtensionFilter::default()).unwrap_err();
        assert!(matches!(err, MdBatchError::DirectoryNotFound { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn scan_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "file.txt");
        let err = scan_directory(&dir.path().join("file.txt"), true, &ExtensionFilter::default())
            .unwrap_err();
        assert!(matches!(err, MdBatchError::NotADirectory { .. }));
    }

    #[tokio::test]
    async fn stage_uploads_writes_files_and_keeps_duplicates() {
        let staged = stage_uploads(vec![
            Upload { name: "doc.txt".into(), bytes: b"one".to_vec() },
            Upload { name: "../doc.txt".into(), bytes: b"two".to_vec() },
            Upload { name: "".into(), bytes: b"three".to_vec() },
        ])
        .await
        .unwrap();

        assert_eq!(staged.len(), 3);
        let items = staged.items();
        assert_eq!(items[0].display_name(), "doc.txt");
        assert_eq!(items[1].display_name(), "doc.txt");
        assert_eq!(items[2].display_name(), "upload-3");
        assert_ne!(items[0].path(), items[1].path());
        assert_eq!(fs::read(items[0].path()).unwrap(), b"one");
        assert_eq!(fs::read(items[1].path()).unwrap(), b"two");
    }

    #[tokio::test]
    async fn upload_names_cannot_collide_with_staging_dirs() {
        let staged = stage_uploads(vec![
            Upload { name: "0".into(), bytes: b"zero".to_vec() },
            Upload { name: "dup-3".into(), bytes: b"dup".to_vec() },
            Upload { name: "a.txt".into(), bytes: b"first".to_vec() },
            Upload { name: "a.txt".into(), bytes: b"second".to_vec() },
        ])
        .await
        .unwrap();

        let names: Vec<String> = staged.items().iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["0", "dup-3", "a.txt", "a.txt"]);
        assert_eq!(fs::read(staged.items()[0].path()).unwrap(), b"zero");
        assert_eq!(fs::read(staged.items()[2].path()).unwrap(), b"first");
        assert_eq!(fs::read(staged.items()[3].path()).unwrap(), b"second");
    }

    #[tokio::test]
    async fn staged_dir_is_removed_on_drop() {
        let staged = stage_uploads(vec![Upload {
            name: "a.txt".into(),
            bytes: b"x".to_vec(),
        }])
        .await
        .unwrap();
        let path = staged.items()[0].path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn collect_inputs_puts_uploads_first_and_fails_on_bad_folder() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x.pdf");
        let config = ConversionConfig::default();

        let staged = StagedUploads {
            items: vec![InputItem::Uploaded {
                name: "up.pdf".into(),
                path: PathBuf::from("/tmp/up.pdf"),
            }],
            _temp_dir: None,
        };
        let items = collect_inputs(&staged, Some(dir.path()), &config).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display_name(), "up.pdf");
        assert_eq!(items[1].display_name(), "x.pdf");

        let err = collect_inputs(&staged, Some(&dir.path().join("missing")), &config).unwrap_err();
        assert!(err.is_input_error());
    }
}
