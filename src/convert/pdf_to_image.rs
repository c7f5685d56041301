//! PDF page rendering to image files.
//!
//! Renders every page of each input PDF through pdfium and writes the
//! results as `page_<n>.<ext>` files, one folder per source document.
//! Unlike merging, this batch is per-file isolated: a missing, corrupt,
//! or unrenderable source is recorded in the summary and the remaining
//! sources are still processed.
//!
//! The pdfium library is bound lazily, only once a readable input is
//! reached, so input validation never requires libpdfium to be present.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;

use crate::error::{PdfSuiteError, Result};
use crate::io::derive_sibling;
use crate::progress::ProgressSink;
use crate::request::{ConversionRequest, ImageOutputFormat, PdfToImageSummary};

/// Bind to the pdfium dynamic library.
///
/// Searches the executable's directory first, then the system library
/// paths.
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| {
            PdfSuiteError::processing_failed(format!(
                "Failed to load the pdfium library (install libpdfium or place it next to the binary): {e}"
            ))
        })?;
    Ok(Pdfium::new(bindings))
}

/// Destination folder for one source document's rendered pages.
///
/// `<stem>_images` inside `base` when an output folder was requested,
/// otherwise beside the source.
pub fn images_folder_for(source: &Path, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) => {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            base.join(format!("{stem}_images"))
        }
        None => derive_sibling(source, "images", ""),
    }
}

/// Render every page of the request's input PDFs to image files.
///
/// `request.output`, when set, is the base folder that receives the
/// per-document `<stem>_images` folders. `request.dpi` and
/// `request.image_format` control the rendering. Duplicate input paths
/// are processed once. Progress is one unit per rendered page.
///
/// # Errors
///
/// Returns an error only when the input list is empty or pdfium itself
/// cannot be bound. Per-file failures land in the summary instead.
pub async fn pdf_to_images(
    request: &ConversionRequest,
    progress: &mut dyn ProgressSink,
) -> Result<PdfToImageSummary> {
    if request.inputs.is_empty() {
        return Err(PdfSuiteError::NoInputFiles);
    }

    let mut summary = PdfToImageSummary::default();

    // Repeated paths render once; the summary keys on unique sources.
    let mut seen = BTreeSet::new();
    let mut readable: Vec<&PathBuf> = Vec::new();
    for input in &request.inputs {
        if !seen.insert(input) {
            continue;
        }
        if input.is_file() {
            readable.push(input);
        } else {
            summary.outputs.insert(input.clone(), Vec::new());
            summary.files_failed += 1;
        }
    }

    if readable.is_empty() {
        progress.start(0, "Rendering pages");
        progress.close();
        return Ok(summary);
    }

    // Only bound once at least one input is readable.
    let pdfium = create_pdfium()?;

    // Open everything up front so the progress total covers all pages.
    let mut total_pages = 0u64;
    let mut documents = Vec::new();
    for input in readable {
        match pdfium.load_pdf_from_file(input, None) {
            Ok(doc) => {
                total_pages += doc.pages().len() as u64;
                documents.push((input, Some(doc)));
            }
            Err(_) => documents.push((input, None)),
        }
    }

    progress.start(total_pages, "Rendering pages");

    for (input, doc) in documents {
        let Some(doc) = doc else {
            summary.outputs.insert(input.clone(), Vec::new());
            summary.files_failed += 1;
            continue;
        };

        let folder = images_folder_for(input, request.output.as_deref());
        match render_document(&doc, &folder, request.dpi, request.image_format, progress) {
            Ok(pages) => {
                summary.pages_rendered += pages.len();
                summary.outputs.insert(input.clone(), pages);
            }
            Err(_) => {
                summary.outputs.insert(input.clone(), Vec::new());
                summary.files_failed += 1;
            }
        }
    }

    progress.close();
    Ok(summary)
}

/// Render one document's pages into `folder`.
fn render_document(
    doc: &PdfDocument<'_>,
    folder: &Path,
    dpi: u32,
    format: ImageOutputFormat,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(folder).map_err(|e| PdfSuiteError::FailedToCreateOutput {
        path: folder.to_path_buf(),
        source: e,
    })?;

    let pixels_per_point = dpi as f32 / 72.0;
    let mut pages = Vec::new();

    for (index, page) in doc.pages().iter().enumerate() {
        let width = (page.width().value * pixels_per_point).ceil() as i32;
        let height = (page.height().value * pixels_per_point).ceil() as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = page.render_with_config(&config).map_err(|e| {
            PdfSuiteError::processing_failed(format!("Failed to render page {}: {e}", index + 1))
        })?;
        let image = bitmap.as_image();

        let path = folder.join(format!("page_{}.{}", index + 1, format.extension()));
        let saved = match format {
            // JPEG has no alpha channel.
            ImageOutputFormat::Jpeg => image.to_rgb8().save(&path),
            _ => image.save(&path),
        };
        saved.map_err(|e| PdfSuiteError::FailedToWrite {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;

        pages.push(path);
        progress.advance(1);
    }

    Ok(pages)
}
