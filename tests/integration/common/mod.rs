//! Integration tests for pdfsuite.
//!
//! Fixtures are generated on the fly into a temp directory, so no binary
//! files live in the repository.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// Create a scratch directory for one test.
pub fn scratch_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Write a minimal one-page PDF fixture with the given page size in points.
pub fn pdf_fixture(dir: &Path, name: &str, width: f32, height: f32) -> PathBuf {
    let path = dir.join(name);
    pdfsuite::merge::save_basic_document(&path, width, height)
        .expect("Failed to write PDF fixture");
    path
}

/// Write a solid-color PNG fixture with the given pixel dimensions.
pub fn png_fixture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    img.save(&path).expect("Failed to write PNG fixture");
    path
}
