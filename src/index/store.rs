//! On-disk formats for the paired vector/metadata stores.
//!
//! The two artifacts are opaque to the rest of the system; only the vector
//! index reads or writes them. Consistency between them is defined purely by
//! matching record counts, so any disagreement (or unreadable content) is
//! surfaced as a persistence error instead of being repaired silently.

use crate::error::{AppError, Result};
use crate::index::EmbeddingRecord;
use ndarray::Array2;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Vector store format version. Increment when the layout changes.
const STORE_VERSION: u32 = 1;

/// Magic bytes identifying a conjure vector store.
const STORE_MAGIC: &[u8; 8] = b"CONJVECS";

/// Save the vector matrix to the binary store.
///
/// File layout:
/// - 8 bytes: magic "CONJVECS"
/// - 4 bytes: version (u32 LE)
/// - 8 bytes: record count (u64 LE)
/// - 8 bytes: dimension (u64 LE)
/// - N bytes: vector data (f32 LE, row-major)
pub fn save_vectors(path: &Path, vectors: &Array2<f32>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Persistence(format!("Failed to create store directory: {}", e))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::Persistence(format!("Failed to create vector store: {}", e)))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(STORE_MAGIC)
        .map_err(|e| AppError::Persistence(format!("Failed to write store magic: {}", e)))?;
    writer
        .write_all(&STORE_VERSION.to_le_bytes())
        .map_err(|e| AppError::Persistence(format!("Failed to write store version: {}", e)))?;
    writer
        .write_all(&(vectors.nrows() as u64).to_le_bytes())
        .map_err(|e| AppError::Persistence(format!("Failed to write record count: {}", e)))?;
    writer
        .write_all(&(vectors.ncols() as u64).to_le_bytes())
        .map_err(|e| AppError::Persistence(format!("Failed to write dimension: {}", e)))?;

    let data = vectors
        .as_slice()
        .ok_or_else(|| AppError::Persistence("Vector matrix not contiguous".to_string()))?;

    for &val in data {
        writer
            .write_all(&val.to_le_bytes())
            .map_err(|e| AppError::Persistence(format!("Failed to write vector data: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::Persistence(format!("Failed to flush vector store: {}", e)))?;

    tracing::debug!(
        path = %path.display(),
        count = vectors.nrows(),
        dim = vectors.ncols(),
        "Vector store saved"
    );

    Ok(())
}

/// Load the vector matrix from the binary store.
///
/// Unlike a best-effort cache, a store that exists but cannot be read back
/// is corrupted state: every failure here is a persistence error.
pub fn load_vectors(path: &Path) -> Result<Array2<f32>> {
    let file = File::open(path)
        .map_err(|e| AppError::Persistence(format!("Failed to open vector store: {}", e)))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|e| AppError::Persistence(format!("Failed to read store magic: {}", e)))?;
    if &magic != STORE_MAGIC {
        return Err(AppError::Persistence(format!(
            "Invalid vector store magic in {}",
            path.display()
        )));
    }

    let mut version_bytes = [0u8; 4];
    reader
        .read_exact(&mut version_bytes)
        .map_err(|e| AppError::Persistence(format!("Failed to read store version: {}", e)))?;
    let version = u32::from_le_bytes(version_bytes);
    if version != STORE_VERSION {
        return Err(AppError::Persistence(format!(
            "Vector store version {} in {}, expected {}",
            version,
            path.display(),
            STORE_VERSION
        )));
    }

    let mut count_bytes = [0u8; 8];
    reader
        .read_exact(&mut count_bytes)
        .map_err(|e| AppError::Persistence(format!("Failed to read record count: {}", e)))?;
    let count = u64::from_le_bytes(count_bytes) as usize;

    let mut dim_bytes = [0u8; 8];
    reader
        .read_exact(&mut dim_bytes)
        .map_err(|e| AppError::Persistence(format!("Failed to read dimension: {}", e)))?;
    let dim = u64::from_le_bytes(dim_bytes) as usize;

    let total_floats = count * dim;
    let mut data = vec![0f32; total_floats];
    for val in &mut data {
        let mut bytes = [0u8; 4];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| AppError::Persistence(format!("Failed to read vector data: {}", e)))?;
        *val = f32::from_le_bytes(bytes);
    }

    let vectors = Array2::from_shape_vec((count, dim), data)
        .map_err(|e| AppError::Persistence(format!("Failed to reshape vector data: {}", e)))?;

    tracing::debug!(path = %path.display(), count, dim, "Vector store loaded");

    Ok(vectors)
}

/// Save the metadata records paired with the vector store.
pub fn save_records(path: &Path, records: &[EmbeddingRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Persistence(format!("Failed to create store directory: {}", e))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::Persistence(format!("Failed to create record store: {}", e)))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer(writer, records)
        .map_err(|e| AppError::Persistence(format!("Failed to write record store: {}", e)))?;

    tracing::debug!(path = %path.display(), count = records.len(), "Record store saved");

    Ok(())
}

/// Load the metadata records paired with the vector store.
pub fn load_records(path: &Path) -> Result<Vec<EmbeddingRecord>> {
    let file = File::open(path)
        .map_err(|e| AppError::Persistence(format!("Failed to open record store: {}", e)))?;
    let reader = BufReader::new(file);

    let records: Vec<EmbeddingRecord> = serde_json::from_reader(reader)
        .map_err(|e| AppError::Persistence(format!("Failed to parse record store: {}", e)))?;

    tracing::debug!(path = %path.display(), count = records.len(), "Record store loaded");

    Ok(records)
}
