// src/extractors/mod.rs
pub mod cells;
pub mod grid;
pub mod header;
pub mod parts;
pub mod pipeline;
pub mod records;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use cells::{CellOutcome, OcrPool};
#[allow(unused_imports)]
pub use header::Header;
#[allow(unused_imports)]
pub use parts::PartRow;
#[allow(unused_imports)]
pub use pipeline::{extract_document, Extraction, ExtractionSummary, PipelineOptions};
#[allow(unused_imports)]
pub use records::QuantityRecord;
