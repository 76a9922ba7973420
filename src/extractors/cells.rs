// src/extractors/cells.rs
//! Cell-level quantity decoding.
//!
//! The decode policy is deliberately total: a cell NEVER fails, it decodes
//! to 0 in the worst case with the degradation counted. Blank recognition
//! and digit-free recognition both resolve to 0 and are flagged
//! low-confidence; engine failures and timeouts do the same with their own
//! counters. OCR latency dominates the pipeline, so calls run on the
//! blocking pool behind a semaphore with a per-call deadline.

use image::GrayImage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task;
use tokio::time::timeout;

use crate::ocr::DigitRecognizer;
use crate::utils::error::OcrError;

/// Decoded quantity for one column cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOutcome {
    pub quantity: u32,
    /// Recognition produced no usable digits (or overflowed).
    pub low_confidence: bool,
    /// The OCR call hit the per-cell deadline.
    pub timed_out: bool,
}

impl CellOutcome {
    fn zero(low_confidence: bool, timed_out: bool) -> Self {
        Self {
            quantity: 0,
            low_confidence,
            timed_out,
        }
    }
}

/// Strips non-digit characters and parses the remainder.
///
/// Returns `(quantity, low_confidence)`. Empty input and input with no
/// digits both decode to 0 flagged low-confidence; this is the one
/// zero-fallback rule used everywhere.
pub fn decode_digits(raw: &str) -> (u32, bool) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (0, true);
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return (0, true);
    }
    match digits.parse::<u32>() {
        Ok(quantity) => (quantity, false),
        Err(_) => {
            tracing::warn!("Digit string '{}' does not fit a u32, decoding as 0", digits);
            (0, true)
        }
    }
}

/// Bounded OCR worker pool shared by the whole extraction run.
pub struct OcrPool {
    recognizer: Arc<dyn DigitRecognizer>,
    workers: Arc<Semaphore>,
    cell_timeout: Duration,
}

impl OcrPool {
    pub fn new(
        recognizer: Arc<dyn DigitRecognizer>,
        workers: usize,
        cell_timeout: Duration,
    ) -> Self {
        Self {
            recognizer,
            workers: Arc::new(Semaphore::new(workers.max(1))),
            cell_timeout,
        }
    }

    /// Decodes every cell of one row. Cells are dispatched concurrently
    /// (bounded by the pool) but the outcomes are joined in submission
    /// order, so the returned vector is positionally stable and repeated
    /// runs over the same rasters are deterministic.
    pub async fn decode_cells(&self, cells: Vec<GrayImage>) -> Vec<CellOutcome> {
        let mut handles = Vec::with_capacity(cells.len());
        for cell in cells {
            let recognizer = Arc::clone(&self.recognizer);
            let workers = Arc::clone(&self.workers);
            let deadline = self.cell_timeout;
            handles.push(tokio::spawn(async move {
                recognize_one(recognizer, workers, deadline, cell).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("OCR task panicked: {}", e);
                    outcomes.push(CellOutcome::zero(true, false));
                }
            }
        }
        outcomes
    }
}

async fn recognize_one(
    recognizer: Arc<dyn DigitRecognizer>,
    workers: Arc<Semaphore>,
    deadline: Duration,
    cell: GrayImage,
) -> CellOutcome {
    let _permit = match workers.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            // Semaphore closed: only possible during shutdown.
            return CellOutcome::zero(true, false);
        }
    };

    let call = task::spawn_blocking(move || recognizer.recognize_digits(&cell));
    match timeout(deadline, call).await {
        Ok(Ok(Ok(text))) => {
            let (quantity, low_confidence) = decode_digits(&text);
            CellOutcome {
                quantity,
                low_confidence,
                timed_out: false,
            }
        }
        Ok(Ok(Err(e))) => {
            tracing::warn!("OCR engine error, decoding cell as 0: {}", e);
            CellOutcome::zero(true, false)
        }
        Ok(Err(join_err)) => {
            tracing::error!("OCR worker failed: {}", OcrError::Worker(join_err.to_string()));
            CellOutcome::zero(true, false)
        }
        Err(_) => {
            tracing::warn!(
                "{}, decoding cell as 0",
                OcrError::Timeout(deadline.as_millis() as u64)
            );
            CellOutcome::zero(true, true)
        }
    }
}
