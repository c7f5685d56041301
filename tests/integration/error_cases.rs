//! Integration tests for error handling across the engines.

use std::path::PathBuf;

use pdfsuite::compress::compress;
use pdfsuite::convert::image_to_pdf;
use pdfsuite::error::PdfSuiteError;
use pdfsuite::merge::merge;
use pdfsuite::progress::NoopProgress;
use pdfsuite::request::ConversionRequest;

use crate::common::{pdf_fixture, png_fixture, scratch_dir};

#[tokio::test]
async fn merge_lists_every_missing_input() {
    let dir = scratch_dir();
    let present = pdf_fixture(dir.path(), "present.pdf", 612.0, 792.0);
    let gone_a = dir.path().join("gone_a.pdf");
    let gone_b = dir.path().join("gone_b.pdf");
    let output = dir.path().join("out.pdf");

    let request = ConversionRequest::new(vec![present, gone_a.clone(), gone_b.clone()])
        .with_output(&output);
    let err = merge(&request, &mut NoopProgress).await.unwrap_err();

    match err {
        PdfSuiteError::MissingInputs { paths } => {
            assert_eq!(paths, vec![gone_a, gone_b]);
        }
        other => panic!("expected MissingInputs, got {other:?}"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn merge_exit_codes_differ_by_failure_kind() {
    let dir = scratch_dir();
    let output = dir.path().join("out.pdf");

    let empty = ConversionRequest::new(vec![]).with_output(&output);
    let err = merge(&empty, &mut NoopProgress).await.unwrap_err();
    assert_eq!(err.exit_code(), 1);

    let missing = ConversionRequest::new(vec![PathBuf::from("/nonexistent/a.pdf")])
        .with_output(&output);
    let err = merge(&missing, &mut NoopProgress).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);

    let corrupt_path = dir.path().join("corrupt.pdf");
    std::fs::write(&corrupt_path, b"%PDF-garbage").unwrap();
    let corrupt = ConversionRequest::new(vec![corrupt_path]).with_output(&output);
    let err = merge(&corrupt, &mut NoopProgress).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn image_batch_aborts_without_partial_output() {
    let dir = scratch_dir();
    let good = png_fixture(dir.path(), "good.png", 50, 50);
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"definitely not a png").unwrap();
    let output = dir.path().join("out.pdf");

    let request = ConversionRequest::new(vec![good, bad]).with_output(&output);
    let err = image_to_pdf(&request, &mut NoopProgress).await.unwrap_err();

    assert!(matches!(err, PdfSuiteError::FailedToDecodeImage { .. }));
    assert!(!output.exists(), "failed batch must not leave output behind");
}

#[tokio::test]
async fn compress_failure_is_an_outcome_not_an_error() {
    let request = ConversionRequest::new(vec![PathBuf::from("/nonexistent/in.pdf")]);
    let outcome = compress(&request, &mut NoopProgress).await;

    assert!(!outcome.success);
    assert!(outcome.output.is_none());
    assert!(!outcome.message.is_empty());
}
