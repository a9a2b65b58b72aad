//! JSON documents: rides, distribution caches and metric records.

use crate::ride::types::{DistributionCache, MetricDocument, Ride};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Document storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid document: {0}")]
    SerdeError(String),
}

/// Result type for document storage.
pub type StorageResult<T> = Result<T, StorageError>;

/// Read a JSON document.
pub fn load_json<T: DeserializeOwned, R: Read>(reader: R) -> StorageResult<T> {
    serde_json::from_reader(reader).map_err(|e| StorageError::SerdeError(e.to_string()))
}

/// Write a JSON document.
pub fn save_json<T: Serialize, W: Write>(value: &T, writer: W) -> StorageResult<()> {
    serde_json::to_writer_pretty(writer, value).map_err(|e| StorageError::SerdeError(e.to_string()))
}

fn load_file<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let file = File::open(path).map_err(|e| StorageError::IoError(format!("{}: {}", path.display(), e)))?;
    load_json(BufReader::new(file))
}

/// Save any document to `path`, creating parent directories.
pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::IoError(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| StorageError::IoError(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    save_json(value, &mut writer)?;
    writer.flush().map_err(|e| StorageError::IoError(e.to_string()))
}

/// Load a ride document.
pub fn load_ride(path: &Path) -> StorageResult<Ride> {
    let ride: Ride = load_file(path)?;
    tracing::info!(path = %path.display(), samples = ride.samples.len(), "Loaded ride");
    Ok(ride)
}

/// Load a distribution cache document.
pub fn load_cache(path: &Path) -> StorageResult<DistributionCache> {
    let mut cache: DistributionCache = load_file(path)?;
    if cache.name.is_empty() {
        cache.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    tracing::info!(path = %path.display(), name = %cache.name, "Loaded distribution cache");
    Ok(cache)
}

/// Load a metric document.
pub fn load_metrics(path: &Path) -> StorageResult<MetricDocument> {
    let doc: MetricDocument = load_file(path)?;
    tracing::info!(path = %path.display(), records = doc.records.len(), "Loaded metric records");
    Ok(doc)
}
