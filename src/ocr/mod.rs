// src/ocr/mod.rs
//! Digit-recognition capability.
//!
//! The cell decoder only needs one narrow operation: read whatever digits a
//! recognition engine sees in a cell raster. Keeping the trait this small
//! makes the decode policy unit-testable with canned recognizers and leaves
//! the concrete engine (Tesseract via `leptess`, behind the `tesseract`
//! feature) swappable.

#[cfg(feature = "tesseract")]
pub mod tesseract;

use image::GrayImage;

use crate::utils::error::OcrError;

/// Digit-constrained recognition over a single cell raster.
///
/// Implementations return the raw recognized text; they do not interpret
/// it. Blank cells legitimately recognize to an empty string, which the
/// decoder resolves to quantity 0.
pub trait DigitRecognizer: Send + Sync {
    fn recognize_digits(&self, cell: &GrayImage) -> Result<String, OcrError>;
}
