// src/main.rs
mod config;
mod document;
mod extractors;
mod ocr;
mod storage;
mod utils;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::ExtractorConfig;
use document::bundle::BundleDocument;
use extractors::cells::OcrPool;
use extractors::pipeline::{extract_document, PipelineOptions};
use ocr::DigitRecognizer;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the purchase-schedule quantity extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page-bundle directory (manifest.json plus page rasters)
    bundle: PathBuf,

    /// JSON config file with templates and the customer registry
    /// (built-in defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template id selecting the grid calibration
    #[arg(short, long, default_value = config::DEFAULT_TEMPLATE_ID)]
    template: String,

    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Retain intermediate row/firm/cell images for debugging
    #[arg(long)]
    keep_images: bool,

    /// Maximum concurrent OCR calls
    #[arg(long, default_value = "4")]
    ocr_workers: usize,

    /// Per-cell OCR deadline in milliseconds; a timed-out cell decodes to 0
    #[arg(long, default_value = "5000")]
    ocr_timeout_ms: u64,

    /// Tesseract data path (tesseract builds only)
    #[arg(long)]
    tessdata: Option<String>,

    /// Tesseract language (tesseract builds only)
    #[arg(long)]
    lang: Option<String>,
}

#[cfg(feature = "tesseract")]
fn build_recognizer(args: &Args) -> Result<Arc<dyn DigitRecognizer>, AppError> {
    Ok(Arc::new(ocr::tesseract::TesseractRecognizer::new(
        args.tessdata.clone(),
        args.lang.clone(),
    )))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_args: &Args) -> Result<Arc<dyn DigitRecognizer>, AppError> {
    Err(utils::error::ConfigError::Invalid(
        "this binary was built without an OCR engine; rebuild with --features tesseract".to_string(),
    )
    .into())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Load configuration (file or built-in defaults)
    let extractor_config = match &args.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => {
            tracing::info!("No config file given, using built-in defaults");
            ExtractorConfig::default()
        }
    };
    let template = extractor_config.template(&args.template)?;
    tracing::info!(
        "Using template '{}' v{} ({} rows x {} cols)",
        args.template,
        template.version,
        template.expected_rows,
        template.num_cols
    );

    // 4. Initialize storage and the OCR pool
    let storage = StorageManager::new(&args.output_dir)?;
    let recognizer = build_recognizer(&args)?;
    let ocr_pool = OcrPool::new(
        recognizer,
        args.ocr_workers,
        Duration::from_millis(args.ocr_timeout_ms),
    );

    // 5. Open the document
    let doc = BundleDocument::open(&args.bundle)?;
    tracing::info!(
        "Opened bundle {} ({} pages)",
        args.bundle.display(),
        document::Document::pages(&doc).len()
    );

    let options = PipelineOptions {
        keep_images: args
            .keep_images
            .then(|| args.output_dir.join("debug_images")),
    };

    // 6. Run the pipeline
    let extraction = extract_document(
        &doc,
        template,
        &extractor_config.customers,
        &ocr_pool,
        &options,
    )
    .await?;

    if extraction.records.is_empty() {
        return Err(AppError::Processing(
            "extraction produced no records".to_string(),
        ));
    }

    // 7. Persist records and the run summary
    let stem = extraction
        .header
        .schedule_no
        .clone()
        .unwrap_or_else(|| "schedule".to_string());
    match storage.save_records(&stem, &extraction.records) {
        Ok((json_path, csv_path)) => tracing::info!(
            "Saved records to {} and {}",
            json_path.display(),
            csv_path.display()
        ),
        Err(e) => {
            tracing::error!("Failed to save records: {}", e);
            return Err(e.into());
        }
    }
    match storage.save_summary(&stem, &extraction.header, &extraction.summary) {
        Ok(path) => tracing::info!("Saved extraction metadata to {}", path.display()),
        Err(e) => tracing::error!("Failed to save extraction metadata: {}", e),
    }

    let summary = &extraction.summary;
    tracing::info!(
        "Extraction finished: {} records, {} pages, {} warning(s)",
        summary.records_emitted,
        summary.pages_processed,
        summary.warning_total()
    );
    if summary.warning_total() > 0 {
        tracing::warn!(
            "Degradations: {} geometry skips, {} low-confidence cells, {} OCR timeouts, \
             {} truncated vectors, {} grid overflows, {} grid mismatches",
            summary.geometry_skips,
            summary.low_confidence_cells,
            summary.ocr_timeouts,
            summary.truncated_vectors,
            summary.grid_overflow_rows,
            summary.grid_mismatch_warnings
        );
    }

    Ok(())
}
