//! Configuration types for batch conversion and the web server.
//!
//! Conversion behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Server-level knobs (bind address, body
//! limit) live in the separate [`ServerConfig`] so the batch loop can be used
//! from the CLI without any HTTP concerns.

use crate::error::MdBatchError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

/// Default converter program. Prints Markdown for one file on stdout.
pub const DEFAULT_CONVERTER: &str = "markitdown";

/// Default port of the web UI.
pub const DEFAULT_PORT: u16 = 8501;

/// Default request body limit for uploads: 256 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mdbatch::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .converter_program("markitdown")
///     .recursive(false)
///     .extensions(["pdf", ".DOCX"])
///     .build()
///     .unwrap();
/// assert!(config.extensions.matches(std::path::Path::new("a.docx")));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Program invoked once per file. Default: `markitdown`.
    pub converter_program: String,

    /// Extra arguments placed before the file path. Default: none.
    pub converter_args: Vec<String>,

    /// Descend into subfolders when scanning a folder path. Default: true.
    pub recursive: bool,

    /// Which files a folder scan picks up. Default: every file.
    ///
    /// Uploaded files are never filtered; the user chose them explicitly.
    pub extensions: ExtensionFilter,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            converter_program: DEFAULT_CONVERTER.to_string(),
            converter_args: Vec::new(),
            recursive: true,
            extensions: ExtensionFilter::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("converter_program", &self.converter_program)
            .field("converter_args", &self.converter_args)
            .field("recursive", &self.recursive)
            .field("extensions", &self.extensions)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            raw_extensions: Vec::new(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    raw_extensions: Vec<String>,
}

impl ConversionConfigBuilder {
    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn converter_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.converter_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn recursive(mut self, v: bool) -> Self {
        self.config.recursive = v;
        self
    }

    /// Restrict folder scans to these extensions (`"pdf"` and `".PDF"` are equivalent).
    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConversionConfig, MdBatchError> {
        if self.config.converter_program.trim().is_empty() {
            return Err(MdBatchError::InvalidConfig(
                "converter program must not be empty".into(),
            ));
        }
        self.config.extensions = ExtensionFilter::new(&self.raw_extensions)?;
        Ok(self.config)
    }
}

/// Case-insensitive file-extension allow-list.
///
/// An empty filter accepts every file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Normalise each entry to lowercase with a leading dot.
    pub fn new<S: AsRef<str>>(raw: &[S]) -> Result<Self, MdBatchError> {
        let mut extensions = Vec::with_capacity(raw.len());
        for e in raw {
            let e = e.as_ref().trim().to_lowercase();
            let bare = e.trim_start_matches('.');
            if bare.is_empty() {
                return Err(MdBatchError::InvalidConfig(format!(
                    "invalid extension filter entry '{}'",
                    e
                )));
            }
            let dotted = format!(".{bare}");
            if !extensions.contains(&dotted) {
                extensions.push(dotted);
            }
        }
        Ok(Self { extensions })
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.extensions
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let dotted = format!(".{}", ext.to_lowercase());
                self.extensions.iter().any(|e| *e == dotted)
            }
            None => false,
        }
    }
}

/// Bind address and limits for the web UI.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Maximum accepted request body (all uploads of one form submit together).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
