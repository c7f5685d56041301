//! PDF merging with optional page size normalization.
//!
//! Combines multiple PDF documents into one. When a target [`PageSize`] is
//! requested, every page is scaled to the target dimensions before merging:
//! the page content is wrapped in a scaling transform and the MediaBox is
//! rewritten, so mixed A4/Letter/odd-sized inputs come out uniform.
//!
//! Merging is batch-fatal: all inputs are checked before any processing, and
//! a document that fails to load aborts the whole merge.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::Path;

use crate::error::{PdfSuiteError, Result, ensure_file};
use crate::io::{DocumentWriter, load_document};
use crate::progress::ProgressSink;
use crate::request::{ConversionRequest, MergeSummary, PageSize};

/// Merge the request's input documents into a single PDF.
///
/// Inputs are appended in request order. `request.output` must be set.
/// Progress is one unit per input document.
///
/// # Errors
///
/// Returns `MissingInputs` listing every absent input before any document
/// is opened, `NoInputFiles` for an empty input list, and load or write
/// errors for the first document that fails.
pub async fn merge(
    request: &ConversionRequest,
    progress: &mut dyn ProgressSink,
) -> Result<MergeSummary> {
    if request.inputs.is_empty() {
        return Err(PdfSuiteError::NoInputFiles);
    }
    let output = request
        .output
        .as_deref()
        .ok_or_else(|| PdfSuiteError::invalid_request("Merge requires an output path"))?;

    check_inputs(&request.inputs)?;

    progress.start(request.inputs.len() as u64, "Merging");

    let mut merged: Option<Document> = None;
    for input in &request.inputs {
        let mut doc = load_document(input)?;

        if let Some(size) = request.page_size {
            scale_document_pages(&mut doc, size)?;
        }

        merged = Some(match merged.take() {
            None => doc,
            Some(mut base) => {
                append_document(&mut base, doc)?;
                base
            }
        });

        progress.advance(1);
    }

    // Non-empty inputs guarantee a document here.
    let mut document = merged.ok_or(PdfSuiteError::NoInputFiles)?;
    document.renumber_objects();

    let total_pages = document.get_pages().len();
    let output_size = DocumentWriter::new().save(&document, output).await?;

    progress.close();

    Ok(MergeSummary {
        output: output.to_path_buf(),
        files_merged: request.inputs.len(),
        total_pages,
        output_size,
    })
}

/// Verify every input exists and is a regular file before touching any.
fn check_inputs(inputs: &[std::path::PathBuf]) -> Result<()> {
    let mut missing = Vec::new();
    for input in inputs {
        match ensure_file(input) {
            Ok(()) => {}
            // A present-but-wrong path is not "missing"; report it as is.
            Err(err @ PdfSuiteError::NotAFile { .. }) => return Err(err),
            Err(_) => missing.push(input.clone()),
        }
    }
    if !missing.is_empty() {
        if missing.len() == 1 && inputs.len() == 1 {
            return Err(PdfSuiteError::file_not_found(&missing[0]));
        }
        return Err(PdfSuiteError::MissingInputs { paths: missing });
    }
    Ok(())
}

/// Append all pages of `doc` to `base`.
fn append_document(base: &mut Document, mut doc: Document) -> Result<()> {
    // Renumber to avoid object ID collisions with the base document.
    doc.renumber_objects_with(base.max_id + 1);
    base.max_id = doc.max_id;

    let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    base.objects.extend(doc.objects);

    add_pages_to_tree(base, &doc_pages)
}

/// Add page references to the base document's page tree.
fn add_pages_to_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let catalog = merged
        .catalog_mut()
        .map_err(|e| PdfSuiteError::processing_failed(format!("Failed to get catalog: {e}")))?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| {
            PdfSuiteError::processing_failed(format!("Failed to get pages reference: {e}"))
        })?;

    let pages_dict = merged.get_object_mut(pages_id).map_err(|e| {
        PdfSuiteError::processing_failed(format!("Failed to get pages object: {e}"))
    })?;

    if let Object::Dictionary(dict) = pages_dict {
        let kids = dict.get_mut(b"Kids").map_err(|_| {
            PdfSuiteError::processing_failed("Pages dictionary missing Kids array")
        })?;

        if let Object::Array(kids_array) = kids {
            for &page_id in page_ids {
                kids_array.push(Object::Reference(page_id));
            }
        } else {
            return Err(PdfSuiteError::processing_failed("Kids is not an array"));
        }

        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
        dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));
    } else {
        return Err(PdfSuiteError::processing_failed(
            "Pages object is not a dictionary",
        ));
    }

    // Appended pages still point at their old tree node.
    for &page_id in page_ids {
        if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}

/// Scale every page of a document to the target size.
pub(crate) fn scale_document_pages(doc: &mut Document, size: PageSize) -> Result<()> {
    let (target_w, target_h) = size.dimensions();
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let (x0, y0, x1, y1) = page_media_box(doc, page_id)?;
        let width = x1 - x0;
        let height = y1 - y0;
        if width <= 0.0 || height <= 0.0 {
            return Err(PdfSuiteError::processing_failed(format!(
                "Page has degenerate MediaBox: {width}x{height}"
            )));
        }

        let sx = target_w / width;
        let sy = target_h / height;

        // Identity transforms still get the wrap so origin offsets cancel.
        wrap_page_content(doc, page_id, sx, sy, -x0, -y0)?;

        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set(
                "MediaBox",
                vec![
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(target_w),
                    Object::Real(target_h),
                ],
            );
            // A stale CropBox would clip the scaled content.
            page.remove(b"CropBox");
        }
    }

    Ok(())
}

/// Wrap a page's content stream in `q <scale+translate> cm ... Q`.
fn wrap_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
) -> Result<()> {
    let content = doc.get_page_content(page_id)?;

    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(sx),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(sy),
                Object::Real(sx * tx),
                Object::Real(sy * ty),
            ],
        ),
    ];
    ops.extend(Content::decode(&content)?.operations);
    ops.push(Operation::new("Q", vec![]));

    let encoded = Content { operations: ops }.encode()?;
    doc.change_page_content(page_id, encoded)?;
    Ok(())
}

/// Resolve a page's MediaBox, following Parent inheritance.
fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<(f32, f32, f32, f32)> {
    let mut current = page_id;
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..32 {
        let dict = doc
            .get_object(current)
            .and_then(Object::as_dict)
            .map_err(|e| {
                PdfSuiteError::processing_failed(format!("Invalid page object: {e}"))
            })?;

        if let Ok(Object::Array(values)) = dict.get(b"MediaBox").map(|o| resolve(doc, o)) {
            let nums: Vec<f32> = values.iter().filter_map(object_as_f32).collect();
            if nums.len() == 4 {
                return Ok((nums[0], nums[1], nums[2], nums[3]));
            }
            return Err(PdfSuiteError::processing_failed("Malformed MediaBox"));
        }

        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Err(PdfSuiteError::processing_failed("Page has no MediaBox"))
}

fn resolve(doc: &Document, obj: &Object) -> Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).cloned().unwrap_or(Object::Null),
        other => other.clone(),
    }
}

fn object_as_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Build a minimal single-page document, used by unit tests and fixtures.
#[doc(hidden)]
pub fn basic_document(width: f32, height: f32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(lopdf::Stream::new(
        dictionary! {},
        content.encode().unwrap_or_default(),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(width),
            Object::Real(height),
        ],
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Save a fixture document to disk, for tests.
#[doc(hidden)]
pub fn save_basic_document(path: &Path, width: f32, height: f32) -> Result<()> {
    let mut doc = basic_document(width, height);
    doc.save(path)
        .map_err(|e| PdfSuiteError::FailedToWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
    Ok(())
}
