//! pdfsuite - Merge, compress, and convert PDF files.
//!
//! This library provides the engines behind the `pdfsuite` CLI:
//!
//! - Merging PDFs with optional page size normalization
//! - Compression through an external Ghostscript process
//! - Assembling raster images into a PDF, one page per image
//! - Rendering PDF pages out to image files via pdfium
//!
//! Every engine takes a [`request::ConversionRequest`] and a
//! [`progress::ProgressSink`], and returns a typed summary. Engines never
//! print; rendering is the caller's job.
//!
//! # Examples
//!
//! ## Merging with page size normalization
//!
//! ```no_run
//! use pdfsuite::merge;
//! use pdfsuite::progress::NoopProgress;
//! use pdfsuite::request::{ConversionRequest, PageSize};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = ConversionRequest::new(vec![
//!     PathBuf::from("a.pdf"),
//!     PathBuf::from("b.pdf"),
//! ])
//! .with_output("merged.pdf")
//! .with_page_size(PageSize::A4);
//!
//! let summary = merge::merge(&request, &mut NoopProgress).await?;
//! println!("Created {} page document", summary.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Compressing
//!
//! ```no_run
//! use pdfsuite::compress;
//! use pdfsuite::progress::NoopProgress;
//! use pdfsuite::request::{ConversionRequest, Quality};
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let request = ConversionRequest::new(vec![PathBuf::from("big.pdf")])
//!     .with_quality(Quality::Ebook);
//!
//! let outcome = compress::compress(&request, &mut NoopProgress).await;
//! println!("{}", outcome.message);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod compress;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod progress;
pub mod request;

// Re-export commonly used types
pub use error::{PdfSuiteError, Result};
pub use request::{ConversionRequest, RotationSpec};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
