//! CLI argument parsing for pdfsuite.
//!
//! This module defines the command-line interface structure using `clap`.
//! Each subcommand converts into a [`ConversionRequest`] for the matching
//! engine.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::discovery;
use crate::error::Result;
use crate::request::{ConversionRequest, ImageOutputFormat, PageSize, Quality, RotationSpec};

/// Swiss-army knife for PDF files.
///
/// pdfsuite merges PDFs with optional page size normalization, compresses
/// them through Ghostscript, assembles images into PDFs, and renders PDF
/// pages back out as images.
#[derive(Parser, Debug)]
#[command(name = "pdfsuite")]
#[command(version)]
#[command(about = "Merge, compress, and convert PDF files", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - show detailed information per file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print the result summary as JSON on stdout
    ///
    /// Implies --quiet for status messages; errors still go to stderr.
    #[arg(long, global = true)]
    pub json: bool,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge PDF files into a single document
    Merge(MergeArgs),

    /// Compress a PDF with Ghostscript
    Compress(CompressArgs),

    /// Assemble images into a PDF, one page per image
    #[command(name = "image-to-pdf")]
    ImageToPdf(ImageToPdfArgs),

    /// Render PDF pages to image files
    #[command(name = "pdf-to-image")]
    PdfToImage(PdfToImageArgs),
}

/// Arguments for the merge subcommand.
#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Input PDF files to merge (in order)
    ///
    /// Files are merged in the order provided. Arguments containing glob
    /// characters ('*', '?', '[') expand to the sorted list of matches.
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Normalize every page to this size before merging
    ///
    /// Accepts 'a4', 'letter', or a custom 'WIDTHxHEIGHT' in points.
    /// Without this flag, pages keep their original dimensions.
    #[arg(long, value_name = "SIZE")]
    pub page_size: Option<String>,
}

impl MergeArgs {
    /// Convert the arguments into a conversion request.
    ///
    /// Glob arguments expand here; plain paths pass through untouched so
    /// a missing literal path is still reported by name.
    pub fn to_request(&self) -> Result<ConversionRequest> {
        let mut inputs = Vec::new();
        for input in &self.inputs {
            match input.to_str() {
                Some(text) if text.contains(['*', '?', '[']) => {
                    inputs.extend(discovery::collect_paths_for_patterns([text])?);
                }
                _ => inputs.push(input.clone()),
            }
        }

        let mut request = ConversionRequest::new(inputs).with_output(self.output.clone());
        if let Some(size) = &self.page_size {
            request = request.with_page_size(PageSize::from_str(size)?);
        }
        Ok(request)
    }
}

/// Arguments for the compress subcommand.
#[derive(clap::Args, Debug)]
pub struct CompressArgs {
    /// PDF file to compress
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path
    ///
    /// Defaults to '<input>_compressed.pdf' next to the input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compression quality preset
    ///
    /// Maps to the Ghostscript -dPDFSETTINGS value:
    /// printer (300 dpi), ebook (150 dpi), screen (72 dpi), prepress.
    #[arg(long, value_name = "PRESET", default_value = "printer")]
    pub quality: String,
}

impl CompressArgs {
    /// Convert the arguments into a conversion request.
    pub fn to_request(&self) -> Result<ConversionRequest> {
        let mut request = ConversionRequest::new(vec![self.input.clone()])
            .with_quality(Quality::from_str(&self.quality)?);
        if let Some(output) = &self.output {
            request = request.with_output(output.clone());
        }
        Ok(request)
    }
}

/// Arguments for the image-to-pdf subcommand.
#[derive(clap::Args, Debug)]
pub struct ImageToPdfArgs {
    /// Input image files, in page order
    #[arg(required = true, value_name = "IMAGE")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Rotate an input counterclockwise: INDEX,DEGREES
    ///
    /// INDEX is the zero-based position of the image on the command
    /// line. May be given multiple times; the last assignment for an
    /// index wins.
    ///
    /// Example: --rotate 0,90 --rotate 2,180
    #[arg(long = "rotate", value_name = "INDEX,DEGREES")]
    pub rotations: Vec<String>,
}

impl ImageToPdfArgs {
    /// Convert the arguments into a conversion request.
    pub fn to_request(&self) -> Result<ConversionRequest> {
        let mut rotations = RotationSpec::new();
        for spec in &self.rotations {
            // Merge occurrences, later flags override earlier ones.
            for (index, degrees) in RotationSpec::from_str(spec)?.entries() {
                rotations.set(index, degrees);
            }
        }
        Ok(ConversionRequest::new(self.inputs.clone())
            .with_output(self.output.clone())
            .with_rotations(rotations))
    }
}

/// Arguments for the pdf-to-image subcommand.
#[derive(clap::Args, Debug)]
pub struct PdfToImageArgs {
    /// Input PDF files or directories
    ///
    /// Directories are searched recursively for PDF files.
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Base folder for the per-document image folders
    ///
    /// Each document renders into '<FOLDER>/<name>_images/'. Without
    /// this flag the image folder is created next to each source PDF.
    #[arg(short, long, value_name = "FOLDER")]
    pub output: Option<PathBuf>,

    /// Image format for rendered pages
    #[arg(long, value_name = "FORMAT", default_value = "png")]
    pub format: String,

    /// Rendering resolution in dots per inch
    #[arg(long, value_name = "DPI", default_value_t = 200)]
    pub dpi: u32,
}

impl PdfToImageArgs {
    /// Convert the arguments into a conversion request.
    ///
    /// Directory inputs are expanded to the PDF files they contain;
    /// everything else passes through untouched so missing paths are
    /// still reported per file by the engine.
    pub fn to_request(&self) -> Result<ConversionRequest> {
        let mut inputs = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                inputs.extend(discovery::discover_pdfs(input)?);
            } else {
                inputs.push(input.clone());
            }
        }

        let mut request = ConversionRequest::new(inputs)
            .with_image_format(ImageOutputFormat::from_str(&self.format)?)
            .with_dpi(self.dpi);
        if let Some(output) = &self.output {
            request = request.with_output(output.clone());
        }
        Ok(request)
    }
}
