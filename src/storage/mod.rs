// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::header::Header;
use crate::extractors::pipeline::ExtractionSummary;
use crate::extractors::records::QuantityRecord;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self {
            base_dir: base_path,
        })
    }

    /// Saves the record set as both JSON and CSV under
    /// `<base>/<stem>/records.{json,csv}`. The CSV mirrors the legacy
    /// flat export the downstream loader consumes.
    pub fn save_records(
        &self,
        stem: &str,
        records: &[QuantityRecord],
    ) -> Result<(PathBuf, PathBuf), StorageError> {
        let target_dir = self.base_dir.join(stem);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let json_path = target_dir.join("records.json");
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&json_path, json).map_err(StorageError::IoError)?;

        let csv_path = target_dir.join("records.csv");
        let mut writer = csv::Writer::from_path(&csv_path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!(
            "Saved {} records to {} and {}",
            records.len(),
            json_path.display(),
            csv_path.display()
        );
        Ok((json_path, csv_path))
    }

    /// Saves the run's header and warning counters as JSON metadata next
    /// to the records.
    pub fn save_summary(
        &self,
        stem: &str,
        header: &Header,
        summary: &ExtractionSummary,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(stem);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join("extraction_meta.json");
        let metadata = serde_json::json!({
            "header": header,
            "summary": summary,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved extraction metadata to {}", file_path.display());
        Ok(file_path)
    }
}
