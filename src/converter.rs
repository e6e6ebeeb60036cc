//! The seam to the external document converter.
//!
//! mdbatch does no format parsing of its own. Each file is handed to a
//! [`DocumentConverter`]; the production implementation,
//! [`CommandConverter`], runs a command-line tool (by default `markitdown`)
//! that prints the Markdown for one file on stdout.

use crate::config::ConversionConfig;
use crate::error::FileError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt kept in a [`FileError::ConverterFailed`].
const MAX_STDERR_CHARS: usize = 2000;

/// Turns one document into Markdown text.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert the file at `path`. Errors are per-file and never abort a batch.
    async fn convert(&self, path: &Path) -> Result<String, FileError>;

    /// Short label for logs and the health endpoint.
    fn name(&self) -> &str;
}

/// Runs `program [args..] <path>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.converter_program.clone()).with_args(config.converter_args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(&self, path: &Path) -> Result<String, FileError> {
        debug!("Running {} {:?} {}", self.program, self.args, path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FileError::ConverterNotFound {
                        program: self.program.clone(),
                    }
                } else {
                    FileError::ConverterLaunchFailed {
                        detail: e.to_string(),
                    }
                }
            })?;

        if !output.status.success() {
            return Err(FileError::ConverterFailed {
                status: output.status.to_string(),
                stderr: truncate_chars(String::from_utf8_lossy(&output.stderr).trim(), MAX_STDERR_CHARS),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| FileError::InvalidUtf8)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Keep at most `max` chars, marking a cut with an ellipsis.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}
