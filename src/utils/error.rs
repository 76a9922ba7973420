// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode page raster: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed bundle manifest: {0}")]
    Manifest(String),

    #[error("Document contains no pages")]
    Empty,

    #[error("Crop region ({x0},{y0})-({x1},{y1}) is empty or outside page bounds {width}x{height}")]
    CropOutOfBounds {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Header has no firm-period window; cannot expand records")]
    MissingFirmPeriod,

    #[error("Malformed firm period: {0}")]
    MalformedFirmPeriod(String),
}

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Row slot {slot} collapsed after offsets (top {top:.1} >= bottom {bottom:.1})")]
    EmptyRowSlot { slot: usize, top: f32, bottom: f32 },

    #[error("Firm band of row slot {slot} is empty after trim")]
    EmptyFirmBand { slot: usize },
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine failure: {0}")]
    Engine(String),

    #[error("OCR call exceeded {0} ms")]
    Timeout(u64),

    #[error("OCR worker panicked or was cancelled: {0}")]
    Worker(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error while reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown template id: {0}")]
    UnknownTemplate(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document read failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Header parsing failed: {0}")]
    Header(#[from] HeaderError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
