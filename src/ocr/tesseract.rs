// src/ocr/tesseract.rs
//! Tesseract-backed digit recognizer (enabled by the `tesseract` feature).
//!
//! Mirrors the calibration the form was tuned with: single-line page
//! segmentation and a 0-9 character whitelist.

use image::GrayImage;
use leptess::{LepTess, Variable};
use std::io::Cursor;

use super::DigitRecognizer;
use crate::utils::error::OcrError;

const DIGIT_WHITELIST: &str = "0123456789";
/// Tesseract PSM 7: treat the image as a single text line.
const PSM_SINGLE_LINE: &str = "7";

pub struct TesseractRecognizer {
    datapath: Option<String>,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(datapath: Option<String>, language: Option<String>) -> Self {
        Self {
            datapath,
            language: language.unwrap_or_else(|| "eng".to_string()),
        }
    }
}

impl DigitRecognizer for TesseractRecognizer {
    fn recognize_digits(&self, cell: &GrayImage) -> Result<String, OcrError> {
        // LepTess handles are not Sync; build one per call. Cell rasters are
        // tiny, so the init cost is dwarfed by recognition itself.
        let mut engine = LepTess::new(self.datapath.as_deref(), &self.language)
            .map_err(|e| OcrError::Engine(format!("tesseract init: {e}")))?;
        engine
            .set_variable(Variable::TesseditCharWhitelist, DIGIT_WHITELIST)
            .map_err(|e| OcrError::Engine(format!("set whitelist: {e}")))?;
        engine
            .set_variable(Variable::TesseditPagesegMode, PSM_SINGLE_LINE)
            .map_err(|e| OcrError::Engine(format!("set psm: {e}")))?;

        let mut png = Vec::new();
        image::DynamicImage::ImageLuma8(cell.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::Engine(format!("encode cell: {e}")))?;
        engine
            .set_image_from_mem(&png)
            .map_err(|e| OcrError::Engine(format!("set image: {e}")))?;

        let text = engine
            .get_utf8_text()
            .map_err(|e| OcrError::Engine(format!("recognize: {e}")))?;
        Ok(text)
    }
}
