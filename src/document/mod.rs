// src/document/mod.rs
//! Document capability consumed by the extraction pipeline.
//!
//! The pipeline never talks to a concrete parsing backend; it only needs
//! per-page text, the detected text table, page dimensions, and a crop
//! operation that yields a grayscale raster. Any backend implementing
//! [`Document`]/[`Page`] can drive it. The shipped backend
//! ([`bundle::BundleDocument`]) reads a pre-rasterized page bundle.

pub mod bundle;

use image::GrayImage;

use crate::utils::error::DocumentError;

/// One detected table row: ordered cells, each possibly absent.
pub type TableRow = Vec<Option<String>>;

/// Absolute pixel rectangle on a page raster. Top-origin: `y0` is the
/// visual top edge, `y0 < y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// A single page of a paginated source document.
pub trait Page {
    /// Extracted plain text of the page (may be empty).
    fn text(&self) -> &str;

    /// Detected text table, top-to-bottom. Empty when no table was found.
    fn table(&self) -> &[TableRow];

    /// Raster width in pixels.
    fn width(&self) -> u32;

    /// Raster height in pixels.
    fn height(&self) -> u32;

    /// Rasterizes a sub-region of the page.
    fn crop(&self, region: &Region) -> Result<GrayImage, DocumentError>;
}

/// A paginated source document, pages in document order.
pub trait Document {
    type Page: Page;

    fn pages(&self) -> &[Self::Page];
}
