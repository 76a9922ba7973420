// src/extractors/grid.rs
//! Template-grid geometry: region cropping, bottom-anchored row slots,
//! firm-band splitting, and padded column slots.
//!
//! Everything in here is a pure function of the template constants and the
//! raster dimensions; no stage below this sees the document backend.

use image::imageops;
use image::GrayImage;

use crate::config::{PctBBox, TemplateConfig};
use crate::document::Region;
use crate::utils::error::GeometryError;

/// Converts the template's percentage bounding box into an absolute pixel
/// region of a page. Vertical percentages are measured from the BOTTOM of
/// the page, so a `top_pct` of 0.75 lands a quarter of the way down.
pub fn crop_region(bbox: &PctBBox, page_width: u32, page_height: u32) -> Region {
    let w = page_width as f32;
    let h = page_height as f32;
    let x0 = (w * bbox.x0_pct).round() as u32;
    let x1 = (w * bbox.x1_pct).round() as u32;
    let y0 = (h * (1.0 - bbox.top_pct)).round() as u32;
    let y1 = (h * (1.0 - bbox.bottom_pct)).round() as u32;
    Region {
        x0,
        y0,
        x1: x1.min(page_width),
        y1: y1.min(page_height),
    }
}

/// Grid slot for the i-th detected part (0-indexed, top-to-bottom
/// detection order). Slots are indexed from the bottom of the grid, and
/// the physical form is filled from the top, so part 0 takes the highest
/// slot index; with fewer parts than slots the low indices go unused.
pub fn grid_slot(expected_rows: usize, part_idx: usize) -> usize {
    debug_assert!(part_idx < expected_rows);
    expected_rows - part_idx - 1
}

/// Vertical bounds of one row slot within the cropped region, after the
/// template's row offsets and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    pub slot: usize,
    pub y_top: u32,
    pub y_bottom: u32,
}

impl RowBand {
    pub fn height(&self) -> u32 {
        self.y_bottom - self.y_top
    }
}

/// Computes the adjusted pixel band of the grid slot assigned to
/// `part_idx`. A band that collapses after the offsets is a
/// [`GeometryError`]; the caller skips the slot and continues.
pub fn row_band(
    template: &TemplateConfig,
    crop_height: u32,
    part_idx: usize,
) -> Result<RowBand, GeometryError> {
    let slot = grid_slot(template.expected_rows, part_idx);
    let row_height = crop_height as f32 / template.expected_rows as f32;

    // Slot k occupies the band k rows up from the grid bottom.
    let raw_top = crop_height as f32 - (slot as f32 + 1.0) * row_height;
    let raw_bottom = crop_height as f32 - slot as f32 * row_height;

    let top = (raw_top + template.row_top_offset).max(0.0);
    let bottom = (raw_bottom + template.row_bottom_offset).min(crop_height as f32);

    if top >= bottom {
        return Err(GeometryError::EmptyRowSlot { slot, top, bottom });
    }

    Ok(RowBand {
        slot,
        y_top: top.round() as u32,
        y_bottom: (bottom.round() as u32).min(crop_height),
    })
}

/// Cuts one row band out of the cropped region raster.
pub fn row_image(cropped: &GrayImage, band: &RowBand) -> GrayImage {
    imageops::crop_imm(cropped, 0, band.y_top, cropped.width(), band.height()).to_image()
}

/// Cuts the upper firm sub-block out of a row raster: the top
/// `firm_ratio` share of the row, trimmed by the firm offsets.
pub fn firm_image(
    template: &TemplateConfig,
    row: &GrayImage,
    slot: usize,
) -> Result<GrayImage, GeometryError> {
    let firm_height = (row.height() as f32 * template.firm_ratio) as i64;
    // Clamp both bounds to the row before the emptiness check, so trims
    // larger than the row collapse the band instead of inverting it.
    let y0 = (template.firm_top_offset.max(0) as i64).min(row.height() as i64);
    let y1 = (firm_height - template.firm_bottom_offset as i64).clamp(0, row.height() as i64);

    if y1 <= y0 {
        return Err(GeometryError::EmptyFirmBand { slot });
    }

    let y0 = y0 as u32;
    let y1 = y1 as u32;
    Ok(imageops::crop_imm(row, 0, y0, row.width(), y1 - y0).to_image())
}

/// Splits the firm band into `num_cols` equal-width cells, each widened by
/// `col_pad` on both sides and clamped to the image bounds so digit glyphs
/// straddling a ruled line are not clipped. Column 0 is the leftmost slot.
pub fn column_cells(template: &TemplateConfig, firm: &GrayImage) -> Vec<GrayImage> {
    let width = firm.width();
    let cell_width = width / template.num_cols as u32;
    let mut cells = Vec::with_capacity(template.num_cols);

    for col in 0..template.num_cols as u32 {
        let x0 = (col * cell_width).saturating_sub(template.col_pad);
        let x1 = ((col + 1) * cell_width + template.col_pad).min(width);
        cells.push(imageops::crop_imm(firm, x0, 0, x1 - x0, firm.height()).to_image());
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn template() -> TemplateConfig {
        TemplateConfig::default()
    }

    #[test]
    fn crop_region_uses_bottom_origin_percentages() {
        // 1000x1300 page with the legacy bbox (0.285, 0.75, 0.81, 0.25):
        // the region starts a quarter down the page and ends at 75%.
        let region = crop_region(&template().crop, 1000, 1300);
        assert_eq!(region.x0, 285);
        assert_eq!(region.x1, 810);
        assert_eq!(region.y0, 325);
        assert_eq!(region.y1, 975);
        assert_eq!(region.height(), 650);
    }

    #[test]
    fn parts_anchor_to_the_grid_tail() {
        // 13 slots, 5 detected parts: slots 12 down to 8 are used,
        // slots 0-7 stay empty.
        let slots: Vec<usize> = (0..5).map(|i| grid_slot(13, i)).collect();
        assert_eq!(slots, vec![12, 11, 10, 9, 8]);
    }

    #[test]
    fn row_bands_walk_down_from_the_crop_top() {
        let t = template();
        // 650px crop / 13 slots = 50px bands; offsets shave 2px each side.
        let first = row_band(&t, 650, 0).unwrap();
        assert_eq!(first.slot, 12);
        assert_eq!(first.y_top, 2);
        assert_eq!(first.y_bottom, 48);

        let third = row_band(&t, 650, 2).unwrap();
        assert_eq!(third.slot, 10);
        assert_eq!(third.y_top, 102);
        assert_eq!(third.y_bottom, 148);

        let last = row_band(&t, 650, 12).unwrap();
        assert_eq!(last.slot, 0);
        assert_eq!(last.y_bottom, 648);
    }

    #[test]
    fn collapsed_row_slot_is_a_geometry_error() {
        let mut t = template();
        t.row_top_offset = 100.0;
        t.row_bottom_offset = -100.0;
        // 650/13 = 50px bands; +/-100px offsets cross over.
        let err = row_band(&t, 650, 0).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyRowSlot { slot: 12, .. }));
    }

    #[test]
    fn firm_image_takes_the_upper_half_by_default() {
        let t = template();
        let row = GrayImage::from_pixel(525, 46, Luma([255u8]));
        let firm = firm_image(&t, &row, 5).unwrap();
        assert_eq!(firm.width(), 525);
        assert_eq!(firm.height(), 23);
    }

    #[test]
    fn firm_trim_offsets_apply_and_can_collapse_the_band() {
        let mut t = template();
        t.firm_top_offset = 3;
        t.firm_bottom_offset = 4;
        let row = GrayImage::from_pixel(100, 40, Luma([255u8]));
        // half = 20, trimmed to rows 3..16
        let firm = firm_image(&t, &row, 1).unwrap();
        assert_eq!(firm.height(), 13);

        t.firm_top_offset = 15;
        t.firm_bottom_offset = 10;
        let err = firm_image(&t, &row, 1).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyFirmBand { slot: 1 }));
    }

    #[test]
    fn firm_trims_larger_than_the_row_collapse_the_band() {
        // A top trim past the row end combined with a negative bottom trim
        // pushes the raw bounds outside the row; both must clamp before
        // the emptiness check so this stays a skippable error.
        let mut t = template();
        t.firm_top_offset = 50;
        t.firm_bottom_offset = -40;
        let row = GrayImage::from_pixel(100, 40, Luma([255u8]));
        let err = firm_image(&t, &row, 3).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyFirmBand { slot: 3 }));

        // Same with a bottom trim that drags y1 below zero.
        let mut t = template();
        t.firm_bottom_offset = 1000;
        let err = firm_image(&t, &row, 4).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyFirmBand { slot: 4 }));
    }

    #[test]
    fn column_cells_are_padded_and_clamped() {
        let t = template(); // 16 cols, pad 3
        let firm = GrayImage::from_pixel(525, 23, Luma([255u8]));
        let cells = column_cells(&t, &firm);
        assert_eq!(cells.len(), 16);

        // cell width = 525/16 = 32; interior cells get 32 + 2*3 px.
        assert_eq!(cells[1].width(), 38);
        // First cell clamps at the left edge: 0..32+3.
        assert_eq!(cells[0].width(), 35);
        // Last cell: 15*32-3 .. 16*32+3; the integer-division remainder
        // past 512px stays unused, as calibrated.
        assert_eq!(cells[15].width(), 38);
        for cell in &cells {
            assert_eq!(cell.height(), 23);
        }
    }
}
