//! Integration tests for the merge flow.

use lopdf::{Document, Object};
use pdfsuite::merge::merge;
use pdfsuite::progress::{NoopProgress, RecordingProgress};
use pdfsuite::request::{ConversionRequest, PageSize};

use crate::common::{pdf_fixture, scratch_dir};

fn page_sizes(doc: &Document) -> Vec<(f32, f32)> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let val = |i: usize| match media_box[i] {
                Object::Real(r) => r,
                Object::Integer(n) => n as f32,
                _ => panic!("non-numeric MediaBox entry"),
            };
            (val(2) - val(0), val(3) - val(1))
        })
        .collect()
}

#[tokio::test]
async fn merges_three_documents_in_order() {
    let dir = scratch_dir();
    let inputs = vec![
        pdf_fixture(dir.path(), "first.pdf", 612.0, 792.0),
        pdf_fixture(dir.path(), "second.pdf", 612.0, 792.0),
        pdf_fixture(dir.path(), "third.pdf", 612.0, 792.0),
    ];
    let output = dir.path().join("merged.pdf");

    let request = ConversionRequest::new(inputs).with_output(&output);
    let summary = merge(&request, &mut NoopProgress).await.unwrap();

    assert_eq!(summary.files_merged, 3);
    assert_eq!(summary.total_pages, 3);
    assert!(output.exists());

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn normalizes_mixed_page_sizes_to_a4() {
    let dir = scratch_dir();
    let inputs = vec![
        pdf_fixture(dir.path(), "letter.pdf", 612.0, 792.0),
        pdf_fixture(dir.path(), "square.pdf", 400.0, 400.0),
        pdf_fixture(dir.path(), "tiny.pdf", 100.0, 30.0),
    ];
    let output = dir.path().join("merged.pdf");

    let request = ConversionRequest::new(inputs)
        .with_output(&output)
        .with_page_size(PageSize::A4);
    merge(&request, &mut NoopProgress).await.unwrap();

    let doc = Document::load(&output).unwrap();
    for (w, h) in page_sizes(&doc) {
        assert!((w - 595.276).abs() < 0.01, "width {w}");
        assert!((h - 841.89).abs() < 0.01, "height {h}");
    }
}

#[tokio::test]
async fn preserves_page_sizes_without_normalization() {
    let dir = scratch_dir();
    let inputs = vec![
        pdf_fixture(dir.path(), "letter.pdf", 612.0, 792.0),
        pdf_fixture(dir.path(), "square.pdf", 400.0, 400.0),
    ];
    let output = dir.path().join("merged.pdf");

    let request = ConversionRequest::new(inputs).with_output(&output);
    merge(&request, &mut NoopProgress).await.unwrap();

    let doc = Document::load(&output).unwrap();
    let sizes = page_sizes(&doc);
    assert!(sizes.contains(&(612.0, 792.0)));
    assert!(sizes.contains(&(400.0, 400.0)));
}

#[tokio::test]
async fn reports_monotonic_progress_per_file() {
    let dir = scratch_dir();
    let inputs = vec![
        pdf_fixture(dir.path(), "a.pdf", 612.0, 792.0),
        pdf_fixture(dir.path(), "b.pdf", 612.0, 792.0),
    ];
    let output = dir.path().join("merged.pdf");

    let mut recorder = RecordingProgress::new();
    let request = ConversionRequest::new(inputs).with_output(&output);
    merge(&request, &mut recorder).await.unwrap();

    assert!(recorder.is_monotonic());
    assert_eq!(recorder.final_position(), 2);
}

#[tokio::test]
async fn merged_output_is_itself_mergeable() {
    let dir = scratch_dir();
    let a = pdf_fixture(dir.path(), "a.pdf", 612.0, 792.0);
    let b = pdf_fixture(dir.path(), "b.pdf", 612.0, 792.0);
    let first = dir.path().join("first_merge.pdf");
    let second = dir.path().join("second_merge.pdf");

    let request = ConversionRequest::new(vec![a.clone(), b]).with_output(&first);
    merge(&request, &mut NoopProgress).await.unwrap();

    let request = ConversionRequest::new(vec![first, a]).with_output(&second);
    let summary = merge(&request, &mut NoopProgress).await.unwrap();

    assert_eq!(summary.total_pages, 3);
}
