//! Raster image to PDF assembly.
//!
//! Each input image becomes one PDF page at one point per pixel, so a
//! 1240x1754 scan yields a 1240x1754 pt page. Images are JPEG-encoded and
//! embedded as DCTDecode XObjects, which keeps the output close to the
//! input size for photographic content.
//!
//! Rotation is counterclockwise in degrees. Right angles rotate exactly;
//! any other angle rotates on an expanded canvas sized to hold the rotated
//! bounds, with the uncovered corners filled black.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::{PdfSuiteError, Result, ensure_file};
use crate::io::DocumentWriter;
use crate::progress::ProgressSink;
use crate::request::{ConversionRequest, ImageToPdfSummary};

/// JPEG quality for embedded page images.
const JPEG_QUALITY: u8 = 90;

/// Assemble the request's input images into a single PDF.
///
/// Inputs become pages in request order. Rotations come from
/// `request.rotations`, keyed by input index. An empty input list succeeds
/// with no output file.
///
/// The whole batch is fatal: a missing or undecodable image aborts the
/// call and nothing is written.
pub async fn image_to_pdf(
    request: &ConversionRequest,
    progress: &mut dyn ProgressSink,
) -> Result<ImageToPdfSummary> {
    if request.inputs.is_empty() {
        return Ok(ImageToPdfSummary {
            output: None,
            pages: 0,
        });
    }
    let output = request
        .output
        .as_deref()
        .ok_or_else(|| PdfSuiteError::invalid_request("Image conversion requires an output path"))?;

    progress.start(request.inputs.len() as u64, "Converting images");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::with_capacity(request.inputs.len());

    for (index, input) in request.inputs.iter().enumerate() {
        ensure_file(input)?;
        let image = image::open(input)
            .map_err(|e| PdfSuiteError::failed_to_decode_image(input, e.to_string()))?;

        let mut rgb = image.to_rgb8();
        let angle = request.rotations.angle_for(index);
        if angle != 0.0 {
            rgb = rotate_ccw(&rgb, angle);
        }

        let page_id = add_image_page(&mut doc, pages_id, &rgb)?;
        page_ids.push(page_id);
        progress.advance(1);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|&id| id.into()).collect::<Vec<Object>>(),
        "Count" => page_ids.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    DocumentWriter::new().save(&doc, output).await?;
    progress.close();

    Ok(ImageToPdfSummary {
        output: Some(output.to_path_buf()),
        pages: page_ids.len(),
    })
}

/// Embed one image as a full-bleed page at one point per pixel.
fn add_image_page(
    doc: &mut Document,
    pages_id: lopdf::ObjectId,
    image: &RgbImage,
) -> Result<lopdf::ObjectId> {
    let (width, height) = image.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| PdfSuiteError::processing_failed(format!("JPEG encoding failed: {e}")))?;

    let xobject = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    )
    .with_compression(false);
    let image_id = doc.add_object(xobject);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width as f32),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(height as f32),
                    Object::Real(0.0),
                    Object::Real(0.0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(width as f32),
            Object::Real(height as f32),
        ],
    });

    Ok(page_id)
}

/// Rotate an image counterclockwise by `degrees`.
pub(crate) fn rotate_ccw(image: &RgbImage, degrees: f32) -> RgbImage {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        return image.clone();
    }

    // image's rotate functions turn clockwise.
    match normalized {
        90.0 => return image::imageops::rotate270(image),
        180.0 => return image::imageops::rotate180(image),
        270.0 => return image::imageops::rotate90(image),
        _ => {}
    }

    let (w, h) = image.dimensions();
    let theta = normalized.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let new_w = (w as f32 * cos + h as f32 * sin).ceil() as u32;
    let new_h = (w as f32 * sin + h as f32 * cos).ceil() as u32;

    // Shallow angles on extreme aspect ratios shrink one rotated bound
    // below the source size, so the working canvas must hold both.
    let canvas_w = new_w.max(w);
    let canvas_h = new_h.max(h);

    // Paste onto a canvas large enough for source and rotated bounds,
    // then rotate about the canvas center so nothing is clipped.
    let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, Rgb([0, 0, 0]));
    image::imageops::overlay(
        &mut canvas,
        image,
        ((canvas_w - w) / 2) as i64,
        ((canvas_h - h) / 2) as i64,
    );

    // rotate_about_center turns clockwise for positive theta.
    let rotated = rotate_about_center(&canvas, -theta, Interpolation::Bilinear, Rgb([0, 0, 0]));

    image::imageops::crop_imm(
        &rotated,
        (canvas_w - new_w) / 2,
        (canvas_h - new_h) / 2,
        new_w,
        new_h,
    )
    .to_image()
}
