//! Error types for pdfsuite.
//!
//! This module defines all error types that can occur during PDF operations.
//! Errors are designed to be informative and actionable, providing clear
//! context about what went wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **Not-found errors**: a named input path does not exist. Checked eagerly
//!   where a whole batch must abort (merge), per-item where the batch is
//!   allowed to continue (pdf-to-image).
//! - **Processing errors**: decode/encode failures, corrupt documents,
//!   external tool faults.
//! - **Validation errors**: empty input lists, invalid option combinations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for pdfsuite operations.
pub type Result<T> = std::result::Result<T, PdfSuiteError>;

/// Main error type for pdfsuite operations.
#[derive(Debug, Error)]
pub enum PdfSuiteError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// One or more batch inputs were not found.
    ///
    /// Raised by batch-fatal operations (merge) that check every input
    /// up front, before any processing happens.
    #[error("Input file(s) not found: {}", format_paths(.paths))]
    MissingInputs {
        /// All missing paths, in input order.
        paths: Vec<PathBuf>,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// No input files were provided for a batch operation.
    #[error("No input files specified")]
    NoInputFiles,

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to decode a raster image file.
    #[error("Failed to decode image: {}\n  Reason: {reason}", .path.display())]
    FailedToDecodeImage {
        /// Path to the image file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to create an output file or directory.
    #[error("Failed to create output: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to an output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A document or image could not be processed.
    #[error("Processing failed: {reason}")]
    ProcessingFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid request options.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfSuiteError {
    fn from(err: lopdf::Error) -> Self {
        Self::processing_failed(err.to_string())
    }
}

impl PdfSuiteError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FailedToDecodeImage error.
    pub fn failed_to_decode_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToDecodeImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ProcessingFailed error.
    pub fn processing_failed(reason: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidRequest error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error.
    ///
    /// Returns the appropriate process exit code based on error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::MissingInputs { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::NoInputFiles => 1,
            Self::FailedToLoadPdf { .. } => 3,
            Self::FailedToDecodeImage { .. } => 3,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::ProcessingFailed { .. } => 6,
            Self::InvalidRequest { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that a path exists and is a regular file.
pub(crate) fn ensure_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PdfSuiteError::file_not_found(path));
    }
    if !path.is_file() {
        return Err(PdfSuiteError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_file_not_found_display() {
        let err = PdfSuiteError::file_not_found("/tmp/missing.pdf");
        let msg = format!("{err}");
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.pdf"));
    }

    #[test]
    fn test_missing_inputs_display() {
        let err = PdfSuiteError::MissingInputs {
            paths: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        };
        let msg = format!("{err}");
        assert!(msg.contains("a.pdf"));
        assert!(msg.contains("b.pdf"));
    }

    #[test]
    fn test_failed_to_load_pdf_display() {
        let err = PdfSuiteError::failed_to_load_pdf("bad.pdf", "Invalid PDF header");
        let msg = format!("{err}");
        assert!(msg.contains("Failed to load PDF"));
        assert!(msg.contains("bad.pdf"));
        assert!(msg.contains("Invalid PDF header"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PdfSuiteError::file_not_found("x").exit_code(), 2);
        assert_eq!(
            PdfSuiteError::failed_to_load_pdf("x", "error").exit_code(),
            3
        );
        assert_eq!(PdfSuiteError::NoInputFiles.exit_code(), 1);
        assert_eq!(PdfSuiteError::processing_failed("x").exit_code(), 6);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: PdfSuiteError = io_err.into();
        assert!(matches!(err, PdfSuiteError::Io { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_ensure_file() {
        assert!(matches!(
            ensure_file(Path::new("/nonexistent/input.pdf")),
            Err(PdfSuiteError::FileNotFound { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_file(dir.path()),
            Err(PdfSuiteError::NotAFile { .. })
        ));

        let file = dir.path().join("present.pdf");
        std::fs::File::create(&file).unwrap();
        assert!(ensure_file(&file).is_ok());
    }
}
