//! Request and result types shared by the conversion engines.
//!
//! Every engine takes a [`ConversionRequest`] describing the inputs, the
//! output location, and operation-specific options, and returns a summary
//! type describing what was produced.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdfSuiteError;

/// Target page size for merge normalization, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4 portrait, 595.276 x 841.89 points.
    A4,
    /// US Letter portrait, 612 x 792 points.
    Letter,
    /// Custom size in points (width, height).
    Custom(f32, f32),
}

impl PageSize {
    /// Page dimensions in points as (width, height).
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            Self::A4 => (595.276, 841.89),
            Self::Letter => (612.0, 792.0),
            Self::Custom(w, h) => (*w, *h),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

impl FromStr for PageSize {
    type Err = PdfSuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            other => {
                // Accept "WxH" in points for custom sizes.
                if let Some((w, h)) = other.split_once('x') {
                    let w: f32 = w.trim().parse().map_err(|_| {
                        PdfSuiteError::invalid_request(format!("Invalid page size: {s}"))
                    })?;
                    let h: f32 = h.trim().parse().map_err(|_| {
                        PdfSuiteError::invalid_request(format!("Invalid page size: {s}"))
                    })?;
                    if w <= 0.0 || h <= 0.0 {
                        return Err(PdfSuiteError::invalid_request(format!(
                            "Page size must be positive: {s}"
                        )));
                    }
                    Ok(Self::Custom(w, h))
                } else {
                    Err(PdfSuiteError::invalid_request(format!(
                        "Unknown page size: {s} (expected 'a4', 'letter', or 'WxH')"
                    )))
                }
            }
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => write!(f, "a4"),
            Self::Letter => write!(f, "letter"),
            Self::Custom(w, h) => write!(f, "{w}x{h}"),
        }
    }
}

/// Compression quality preset, mapped to a Ghostscript `-dPDFSETTINGS` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Quality {
    /// 300 dpi images, print-oriented. The default.
    #[default]
    Printer,
    /// 150 dpi images, good for on-screen reading.
    Ebook,
    /// 72 dpi images, smallest output.
    Screen,
    /// Highest quality, color-preserving.
    Prepress,
}

impl Quality {
    /// The Ghostscript `-dPDFSETTINGS` token for this preset.
    pub fn gs_setting(&self) -> &'static str {
        match self {
            Self::Printer => "/printer",
            Self::Ebook => "/ebook",
            Self::Screen => "/screen",
            Self::Prepress => "/prepress",
        }
    }
}

impl FromStr for Quality {
    type Err = PdfSuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "printer" => Ok(Self::Printer),
            "ebook" => Ok(Self::Ebook),
            "screen" => Ok(Self::Screen),
            "prepress" => Ok(Self::Prepress),
            _ => Err(PdfSuiteError::invalid_request(format!(
                "Unknown quality: {s} (expected printer, ebook, screen, or prepress)"
            ))),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Printer => write!(f, "printer"),
            Self::Ebook => write!(f, "ebook"),
            Self::Screen => write!(f, "screen"),
            Self::Prepress => write!(f, "prepress"),
        }
    }
}

/// Raster format for PDF page rendering output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageOutputFormat {
    /// Portable Network Graphics. The default.
    #[default]
    Png,
    /// JPEG.
    Jpeg,
    /// Windows bitmap.
    Bmp,
    /// Tagged Image File Format.
    Tiff,
    /// WebP.
    Webp,
}

impl ImageOutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }
}

impl FromStr for ImageOutputFormat {
    type Err = PdfSuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "tiff" | "tif" => Ok(Self::Tiff),
            "webp" => Ok(Self::Webp),
            _ => Err(PdfSuiteError::invalid_request(format!(
                "Unknown image format: {s} (expected png, jpeg, bmp, tiff, or webp)"
            ))),
        }
    }
}

impl fmt::Display for ImageOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Per-image rotation assignments for image-to-PDF conversion.
///
/// Maps zero-based input indices to counterclockwise rotation angles in
/// degrees. Indices not present rotate by the default angle (zero).
/// Assigning the same index twice keeps the last assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationSpec {
    angles: BTreeMap<usize, f32>,
}

impl RotationSpec {
    /// Create an empty rotation spec (no image is rotated).
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a counterclockwise rotation angle to an input index.
    pub fn set(&mut self, index: usize, degrees: f32) {
        self.angles.insert(index, degrees);
    }

    /// The rotation angle for an input index, in degrees counterclockwise.
    pub fn angle_for(&self, index: usize) -> f32 {
        self.angles.get(&index).copied().unwrap_or(0.0)
    }

    /// True if no rotation has been assigned.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Assigned (index, degrees) pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.angles.iter().map(|(&i, &d)| (i, d))
    }
}

impl FromStr for RotationSpec {
    type Err = PdfSuiteError;

    /// Parse `IDX,DEG[;IDX,DEG...]`, e.g. `0,90;2,180`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = Self::new();
        for part in s.split(';').filter(|p| !p.trim().is_empty()) {
            let (idx, deg) = part.split_once(',').ok_or_else(|| {
                PdfSuiteError::invalid_request(format!(
                    "Invalid rotation '{part}' (expected INDEX,DEGREES)"
                ))
            })?;
            let idx: usize = idx.trim().parse().map_err(|_| {
                PdfSuiteError::invalid_request(format!("Invalid rotation index: {idx}"))
            })?;
            let deg: f32 = deg.trim().parse().map_err(|_| {
                PdfSuiteError::invalid_request(format!("Invalid rotation angle: {deg}"))
            })?;
            spec.set(idx, deg);
        }
        Ok(spec)
    }
}

/// A request for one conversion operation.
///
/// Collects inputs, the output location, and the options every engine may
/// consult. Engines ignore options that do not apply to them.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Input files, in processing order.
    pub inputs: Vec<PathBuf>,
    /// Output file or directory, depending on the operation.
    pub output: Option<PathBuf>,
    /// Target page size for merge normalization. None leaves pages as-is.
    pub page_size: Option<PageSize>,
    /// Compression quality preset.
    pub quality: Quality,
    /// Raster output format for PDF rendering.
    pub image_format: ImageOutputFormat,
    /// Rendering resolution in dots per inch.
    pub dpi: u32,
    /// Per-image rotations for image-to-PDF.
    pub rotations: RotationSpec,
}

impl ConversionRequest {
    /// Create a request over the given inputs with default options.
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            dpi: 200,
            ..Self::default()
        }
    }

    /// Set the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the target page size for merge normalization.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set the compression quality preset.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the raster output format.
    pub fn with_image_format(mut self, format: ImageOutputFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Set the rendering resolution in dots per inch.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the per-image rotations.
    pub fn with_rotations(mut self, rotations: RotationSpec) -> Self {
        self.rotations = rotations;
        self
    }
}

/// Result summary of a merge operation.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    /// Path the merged document was written to.
    pub output: PathBuf,
    /// Number of input documents merged.
    pub files_merged: usize,
    /// Total pages in the merged document.
    pub total_pages: usize,
    /// Size of the output file in bytes.
    pub output_size: u64,
}

/// Outcome of a compression run.
///
/// Compression reports failure through this type rather than an error so
/// callers can inspect the tool's message and the partial state uniformly.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionOutcome {
    /// True if Ghostscript exited successfully and produced output.
    pub success: bool,
    /// Percentage size reduction in `0..=100`, clamped to zero when the
    /// output grew. Exactly zero when the run failed.
    pub ratio: f64,
    /// Human-readable status line, including tool diagnostics on failure.
    pub message: String,
    /// The output path, present only on success.
    pub output: Option<PathBuf>,
    /// Input size in bytes.
    pub input_size: u64,
    /// Output size in bytes, present only on success.
    pub output_size: Option<u64>,
}

/// Result summary of an image-to-PDF conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ImageToPdfSummary {
    /// Path the assembled document was written to.
    pub output: Option<PathBuf>,
    /// Number of pages (one per input image).
    pub pages: usize,
}

/// Result summary of a PDF-to-image rendering run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfToImageSummary {
    /// Rendered image paths per input document, in page order.
    ///
    /// An input that could not be opened or rendered maps to an empty list.
    pub outputs: BTreeMap<PathBuf, Vec<PathBuf>>,
    /// Total pages rendered across all inputs.
    pub pages_rendered: usize,
    /// Number of inputs that failed and were skipped.
    pub files_failed: usize,
}
