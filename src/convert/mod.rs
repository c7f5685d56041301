//! Conversions between PDF documents and raster images.
//!
//! [`image_to_pdf`] assembles raster images into a one-page-per-image PDF,
//! with optional per-image rotation. [`pdf_to_images`] renders PDF pages to
//! image files through pdfium.

pub mod image_to_pdf;
pub mod pdf_to_image;

pub use image_to_pdf::image_to_pdf;
pub use pdf_to_image::pdf_to_images;
