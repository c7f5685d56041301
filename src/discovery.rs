//! Input file discovery.
//!
//! Expands glob patterns and walks directories to collect input files for
//! the batch operations. Results are deduplicated and sorted so batch
//! ordering does not depend on filesystem iteration order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PdfSuiteError, Result};

/// Extensions recognized as PDF documents.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Extensions recognized as raster images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "gif", "webp"];

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened, sorted, deduplicated list of resolved paths.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = BTreeSet::new();

    for pattern in patterns.into_iter() {
        let paths = glob::glob(pattern.as_ref()).map_err(|err| PdfSuiteError::Other {
            message: err.to_string(),
        })?;
        for entry in paths {
            let path = entry.map_err(|err| PdfSuiteError::Other {
                message: err.to_string(),
            })?;
            resolved.insert(path);
        }
    }

    Ok(resolved.into_iter().collect())
}

/// Collect files with one of the given extensions under a directory.
///
/// Walks `dir` recursively. Extension matching is case-insensitive. The
/// result is sorted by path.
pub fn discover_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(PdfSuiteError::file_not_found(dir));
    }
    if !dir.is_dir() {
        return Err(PdfSuiteError::invalid_request(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|err| PdfSuiteError::Other {
            message: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), extensions) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Collect PDF files under a directory.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    discover_files(dir, PDF_EXTENSIONS)
}

/// Collect raster image files under a directory.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    discover_files(dir, IMAGE_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|want| *want == ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_discover_pdfs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("c.txt"));
        touch(&dir.path().join("D.PDF"));

        let found = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["D.PDF", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_discover_recurses_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested/inner.pdf"));
        touch(&dir.path().join("top.pdf"));

        let found = discover_pdfs(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_discover_images() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("photo.JPG"));
        touch(&dir.path().join("scan.tiff"));
        touch(&dir.path().join("doc.pdf"));

        let found = discover_images(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_pdfs(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, PdfSuiteError::FileNotFound { .. }));
    }

    #[test]
    fn test_discover_on_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.pdf");
        touch(&file);
        let err = discover_pdfs(&file).unwrap_err();
        assert!(matches!(err, PdfSuiteError::InvalidRequest { .. }));
    }

    #[test]
    fn test_collect_paths_for_patterns() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("one.pdf"));
        touch(&dir.path().join("two.pdf"));

        let pattern = format!("{}/*.pdf", dir.path().display());
        let found = collect_paths_for_patterns([pattern.as_str()]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0] < found[1]);
    }

    #[test]
    fn test_collect_paths_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("one.pdf"));

        let pattern = format!("{}/*.pdf", dir.path().display());
        let found = collect_paths_for_patterns([pattern.as_str(), pattern.as_str()]).unwrap();
        assert_eq!(found.len(), 1);
    }
}
