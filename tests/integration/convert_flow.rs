//! Integration tests for image conversion flows.

use lopdf::Document;
use pdfsuite::convert::{image_to_pdf, pdf_to_images};
use pdfsuite::progress::NoopProgress;
use pdfsuite::request::{ConversionRequest, RotationSpec};

use crate::common::{pdf_fixture, png_fixture, scratch_dir};

#[tokio::test]
async fn images_become_one_page_each() {
    let dir = scratch_dir();
    let inputs = vec![
        png_fixture(dir.path(), "scan1.png", 200, 300),
        png_fixture(dir.path(), "scan2.png", 300, 200),
        png_fixture(dir.path(), "scan3.png", 128, 128),
    ];
    let output = dir.path().join("scans.pdf");

    let request = ConversionRequest::new(inputs).with_output(&output);
    let summary = image_to_pdf(&request, &mut NoopProgress).await.unwrap();

    assert_eq!(summary.pages, 3);
    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn rotated_image_swaps_its_page_orientation() {
    let dir = scratch_dir();
    let inputs = vec![
        png_fixture(dir.path(), "landscape.png", 300, 100),
        png_fixture(dir.path(), "untouched.png", 300, 100),
    ];
    let output = dir.path().join("out.pdf");

    let rotations: RotationSpec = "0,90".parse().unwrap();
    let request = ConversionRequest::new(inputs)
        .with_output(&output)
        .with_rotations(rotations);
    image_to_pdf(&request, &mut NoopProgress).await.unwrap();

    let doc = Document::load(&output).unwrap();
    let mut sizes: Vec<(i64, i64)> = doc
        .get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let val = |i: usize| match media_box[i] {
                lopdf::Object::Real(r) => r as i64,
                lopdf::Object::Integer(n) => n,
                _ => panic!("non-numeric MediaBox entry"),
            };
            (val(2), val(3))
        })
        .collect();
    sizes.sort();

    assert_eq!(sizes, vec![(100, 300), (300, 100)]);
}

#[tokio::test]
async fn image_round_trips_through_pdf_and_back() {
    // Full round trip needs libpdfium for the render half; the forward
    // half plus lopdf inspection covers the rest on bare machines.
    let dir = scratch_dir();
    let input = png_fixture(dir.path(), "photo.png", 240, 180);
    let output = dir.path().join("photo.pdf");

    let request = ConversionRequest::new(vec![input]).with_output(&output);
    image_to_pdf(&request, &mut NoopProgress).await.unwrap();

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn missing_pdf_sources_are_isolated() {
    let dir = scratch_dir();
    let missing_a = dir.path().join("gone_a.pdf");
    let missing_b = dir.path().join("gone_b.pdf");

    let request = ConversionRequest::new(vec![missing_a.clone(), missing_b.clone()]);
    let summary = pdf_to_images(&request, &mut NoopProgress).await.unwrap();

    assert_eq!(summary.files_failed, 2);
    assert_eq!(summary.pages_rendered, 0);
    assert!(summary.outputs[&missing_a].is_empty());
    assert!(summary.outputs[&missing_b].is_empty());
}

#[tokio::test]
#[ignore = "requires libpdfium"]
async fn renders_each_pdf_into_its_own_folder() {
    let dir = scratch_dir();
    let doc_a = pdf_fixture(dir.path(), "report.pdf", 612.0, 792.0);
    let doc_b = pdf_fixture(dir.path(), "memo.pdf", 595.0, 842.0);

    let request = ConversionRequest::new(vec![doc_a.clone(), doc_b.clone()]).with_dpi(72);
    let summary = pdf_to_images(&request, &mut NoopProgress).await.unwrap();

    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.pages_rendered, 2);
    assert!(summary.outputs[&doc_a][0].starts_with(dir.path().join("report_images")));
    assert!(summary.outputs[&doc_b][0].starts_with(dir.path().join("memo_images")));
}
