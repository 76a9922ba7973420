// src/extractors/pipeline.rs
//! Single-pass composition of the extraction stages over a document.
//!
//! Pages are processed in document order; the header is parsed once from
//! page one and shared read-only with every later stage. Degradations
//! (skipped slots, low-confidence cells, truncations) are counted in the
//! [`ExtractionSummary`] instead of aborting: only an unreadable document
//! or a missing firm-period window stops a run.

use serde::Serialize;
use std::path::PathBuf;

use super::cells::OcrPool;
use super::grid;
use super::header::{parse_header, Header};
use super::parts::{extract_parts, PartRow};
use super::records::{expand_records, firm_date_range, QuantityRecord};
use crate::config::{CustomerRegistry, TemplateConfig};
use crate::document::{Document, Page};
use crate::utils::error::{AppError, DocumentError};

/// Warning and progress counters for one extraction run. Warnings are
/// counted here rather than logged-and-lost; the summary lands next to
/// the record set in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub pages_processed: usize,
    pub parts_extracted: usize,
    pub records_emitted: usize,
    /// Row/firm slots skipped because offsets collapsed them.
    pub geometry_skips: usize,
    /// Cells that decoded to 0 without usable digits.
    pub low_confidence_cells: usize,
    /// Cells whose OCR call hit the per-cell deadline.
    pub ocr_timeouts: usize,
    /// Parts whose quantity vector outran the firm window.
    pub truncated_vectors: usize,
    /// Detected parts beyond the template's grid capacity.
    pub grid_overflow_rows: usize,
    /// Template column count diverging from the firm-period day count.
    pub grid_mismatch_warnings: usize,
}

impl ExtractionSummary {
    pub fn warning_total(&self) -> usize {
        self.geometry_skips
            + self.low_confidence_cells
            + self.ocr_timeouts
            + self.truncated_vectors
            + self.grid_overflow_rows
            + self.grid_mismatch_warnings
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Retain intermediate row/firm/cell rasters under this directory.
    /// Purely a debugging aid; never required for correctness.
    pub keep_images: Option<PathBuf>,
}

/// The complete result of one extraction run.
#[derive(Debug)]
pub struct Extraction {
    pub header: Header,
    pub records: Vec<QuantityRecord>,
    pub summary: ExtractionSummary,
}

/// Runs the full pipeline over a document.
pub async fn extract_document<D: Document>(
    doc: &D,
    template: &TemplateConfig,
    registry: &CustomerRegistry,
    ocr: &OcrPool,
    options: &PipelineOptions,
) -> Result<Extraction, AppError> {
    let pages = doc.pages();
    if pages.is_empty() {
        return Err(DocumentError::Empty.into());
    }

    let mut summary = ExtractionSummary::default();

    // Header comes from page one only and is read-only from here on.
    let header = parse_header(pages[0].text(), registry);
    tracing::info!(
        "Header: schedule {:?}, customer {:?}, firm {:?}..{:?}",
        header.schedule_no,
        header.customer_code,
        header.firm_start,
        header.firm_end
    );

    let mut pairs: Vec<(PartRow, Vec<u32>)> = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_no = (idx + 1) as u32;
        tracing::info!("Processing page {}", page_no);

        let candidates = extract_parts(page.table(), page_no);
        summary.parts_extracted += candidates.len();
        if candidates.is_empty() {
            tracing::warn!("Page {}: no part rows detected, skipping", page_no);
            continue;
        }

        let region = grid::crop_region(&template.crop, page.width(), page.height());
        let cropped = match page.crop(&region) {
            Ok(img) => img,
            Err(e) => {
                // A miscalibrated crop spoils this page, not the document.
                tracing::error!("Page {}: quantity-matrix crop failed: {}", page_no, e);
                summary.geometry_skips += 1;
                continue;
            }
        };

        for (i, candidate) in candidates.iter().enumerate() {
            if i >= template.expected_rows {
                tracing::warn!(
                    "Page {}: part {} exceeds the {}-row grid, dropping",
                    page_no,
                    candidate.part_number,
                    template.expected_rows
                );
                summary.grid_overflow_rows += 1;
                continue;
            }

            let band = match grid::row_band(template, cropped.height(), i) {
                Ok(band) => band,
                Err(e) => {
                    tracing::warn!("Page {}: {}", page_no, e);
                    summary.geometry_skips += 1;
                    continue;
                }
            };
            let row_img = grid::row_image(&cropped, &band);

            let firm_img = match grid::firm_image(template, &row_img, band.slot) {
                Ok(img) => img,
                Err(e) => {
                    tracing::warn!("Page {}: {}", page_no, e);
                    summary.geometry_skips += 1;
                    continue;
                }
            };

            if let Some(dir) = &options.keep_images {
                save_debug_image(dir, &format!("page{page_no}_row{}.png", band.slot), &row_img);
                save_debug_image(
                    dir,
                    &format!("page{page_no}_row{}_firm.png", band.slot),
                    &firm_img,
                );
            }

            let cells = grid::column_cells(template, &firm_img);
            if let Some(dir) = &options.keep_images {
                for (col, cell) in cells.iter().enumerate() {
                    save_debug_image(
                        dir,
                        &format!("page{page_no}_row{}_col{col}.png", band.slot),
                        cell,
                    );
                }
            }

            let outcomes = ocr.decode_cells(cells).await;
            summary.low_confidence_cells += outcomes.iter().filter(|o| o.low_confidence).count();
            summary.ocr_timeouts += outcomes.iter().filter(|o| o.timed_out).count();
            let quantities: Vec<u32> = outcomes.iter().map(|o| o.quantity).collect();

            tracing::debug!(
                "Page {} slot {} ({}): {:?}",
                page_no,
                band.slot,
                candidate.part_number,
                quantities
            );

            pairs.push((
                PartRow {
                    page: page_no,
                    template_row: band.slot,
                    description: candidate.description.clone(),
                    part_number: candidate.part_number.clone(),
                },
                quantities,
            ));
        }

        summary.pages_processed += 1;
    }

    // The column count is a template constant; flag divergence from the
    // actual firm window before the truncate/pad policy papers over it.
    if let Ok((start, end)) = header.firm_window() {
        let days = firm_date_range(start, end).len();
        if days != template.num_cols {
            tracing::warn!(
                "Template has {} columns but the firm window spans {} day(s)",
                template.num_cols,
                days
            );
            summary.grid_mismatch_warnings += 1;
        }
    }

    let records = expand_records(&header, &pairs, &mut summary)?;
    tracing::info!(
        "Extraction complete: {} records from {} parts, {} warning(s)",
        records.len(),
        pairs.len(),
        summary.warning_total()
    );

    Ok(Extraction {
        header,
        records,
        summary,
    })
}

fn save_debug_image(dir: &PathBuf, name: &str, img: &image::GrayImage) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Cannot create debug image dir {}: {}", dir.display(), e);
        return;
    }
    let path = dir.join(name);
    if let Err(e) = img.save(&path) {
        tracing::warn!("Failed to save debug image {}: {}", path.display(), e);
    }
}
