//! Document loading and saving.
//!
//! Saving is atomic by default: the document is written to a temp file next
//! to the target and renamed into place, so a crash mid-write never leaves a
//! truncated output. The heavy lopdf work runs on a blocking task.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsuite::io::DocumentWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = DocumentWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tokio::task;

use crate::error::{PdfSuiteError, Result, ensure_file};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress stream objects before writing.
    pub compress: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            buffer_size: 8192,
        }
    }
}

/// PDF writer with configurable behavior.
pub struct DocumentWriter {
    options: WriteOptions,
}

impl DocumentWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
        }
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save a PDF document to a file.
    ///
    /// Returns the size of the written file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or the write fails.
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<u64> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        // lopdf save is synchronous, clone into a blocking task.
        let mut doc = doc.clone();

        let size = task::spawn_blocking(move || {
            if options.compress {
                doc.compress();
            }

            let write_path = if options.atomic {
                path_buf.with_extension("tmp")
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PdfSuiteError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

            doc.save_to(&mut writer)
                .map_err(|e| PdfSuiteError::FailedToWrite {
                    path: write_path.clone(),
                    source: std::io::Error::other(e),
                })?;

            writer.flush().map_err(|e| PdfSuiteError::FailedToWrite {
                path: write_path.clone(),
                source: e,
            })?;

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    PdfSuiteError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            let size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok::<_, PdfSuiteError>(size)
        })
        .await
        .map_err(|e| PdfSuiteError::other(format!("Write task failed: {e}")))??;

        Ok(size)
    }
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a PDF document from a file.
///
/// The path is checked before lopdf touches it so a missing file surfaces
/// as `FileNotFound` rather than a parse error.
pub fn load_document(path: &Path) -> Result<Document> {
    ensure_file(path)?;
    Document::load(path).map_err(|e| PdfSuiteError::failed_to_load_pdf(path, e.to_string()))
}

/// Create parent directories for an output path if they are missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| PdfSuiteError::FailedToCreateOutput {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Size of a file in bytes, zero if it cannot be read.
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// A derived output path: `<stem>_<suffix>.<ext>` next to the input.
pub(crate) fn derive_sibling(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = if extension.is_empty() {
        format!("{stem}_{suffix}")
    } else {
        format!("{stem}_{suffix}.{extension}")
    };
    path.with_file_name(name)
}
