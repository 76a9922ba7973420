// src/document/bundle.rs
//! Page-bundle backend: a directory holding `manifest.json` plus one PNG
//! raster per page. The manifest carries the text and detected table that
//! the upstream rasterizer extracted alongside each page image.
//!
//! Manifest shape:
//! ```json
//! {
//!   "source": "DI_02.pdf",
//!   "pages": [
//!     {"image": "page1.png", "text": "...", "table": [[ "cell", null ]]}
//!   ]
//! }
//! ```

use image::{GrayImage, ImageReader};
use image::imageops;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{Document, Page, Region, TableRow};
use crate::utils::error::DocumentError;

pub const MANIFEST_NAME: &str = "manifest.json";

/// Serde model of the bundle manifest.
#[derive(Debug, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub source: Option<String>,
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PageEntry {
    /// Raster filename, relative to the bundle directory.
    pub image: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub table: Vec<TableRow>,
}

pub struct BundlePage {
    text: String,
    table: Vec<TableRow>,
    raster: GrayImage,
}

impl Page for BundlePage {
    fn text(&self) -> &str {
        &self.text
    }

    fn table(&self) -> &[TableRow] {
        &self.table
    }

    fn width(&self) -> u32 {
        self.raster.width()
    }

    fn height(&self) -> u32 {
        self.raster.height()
    }

    fn crop(&self, region: &Region) -> Result<GrayImage, DocumentError> {
        if region.is_empty() || region.x1 > self.width() || region.y1 > self.height() {
            return Err(DocumentError::CropOutOfBounds {
                x0: region.x0,
                y0: region.y0,
                x1: region.x1,
                y1: region.y1,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(imageops::crop_imm(
            &self.raster,
            region.x0,
            region.y0,
            region.width(),
            region.height(),
        )
        .to_image())
    }
}

pub struct BundleDocument {
    source: Option<String>,
    pages: Vec<BundlePage>,
}

impl BundleDocument {
    /// Opens a bundle directory, loading the manifest and decoding every
    /// page raster eagerly. An unreadable manifest or raster is fatal.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, DocumentError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_NAME);
        let raw = std::fs::read_to_string(&manifest_path)?;
        let manifest: BundleManifest = serde_json::from_str(&raw)
            .map_err(|e| DocumentError::Manifest(format!("{}: {e}", manifest_path.display())))?;

        if manifest.pages.is_empty() {
            return Err(DocumentError::Empty);
        }

        let mut pages = Vec::with_capacity(manifest.pages.len());
        for entry in manifest.pages {
            let image_path: PathBuf = dir.join(&entry.image);
            let raster = ImageReader::open(&image_path)?
                .decode()?
                .into_luma8();
            tracing::debug!(
                "Loaded page raster {} ({}x{})",
                image_path.display(),
                raster.width(),
                raster.height()
            );
            pages.push(BundlePage {
                text: entry.text,
                table: entry.table,
                raster,
            });
        }

        tracing::info!(
            "Opened bundle {} ({} pages, source {:?})",
            dir.display(),
            pages.len(),
            manifest.source
        );
        Ok(Self {
            source: manifest.source,
            pages,
        })
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Document for BundleDocument {
    type Page = BundlePage;

    fn pages(&self) -> &[BundlePage] {
        &self.pages
    }
}
