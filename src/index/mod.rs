//! Embedding-backed similarity index over the action catalog.
//!
//! Holds one metadata record plus one vector per indexed action, aligned by
//! position, and supports append and exact nearest-neighbor search. State is
//! persisted to a paired vector store and record store; the pair is loaded
//! together at startup and rewritten together after every mutation.

pub mod store;

use crate::embedding::TextEmbedder;
use crate::error::{AppError, Result};
use crate::registry::{ActionRegistry, ParameterSchema};
use indexmap::IndexMap;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Metadata snapshot for one indexed action. The paired vector lives in the
/// search matrix at the same position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub name: String,
    pub description: String,
    /// Parameter schema at indexing time.
    pub parameters: IndexMap<String, crate::registry::ParameterSpec>,
    /// The exact text that was embedded.
    pub source_text: String,
}

/// Fixed template for the text handed to the embedding provider.
pub fn compose_document(name: &str, description: &str, parameters: &ParameterSchema) -> String {
    // Parameter schemas hold only string keys and JSON values; serialization
    // cannot fail on them.
    let schema = serde_json::to_string(parameters).unwrap_or_else(|_| "{}".to_string());
    format!("Function: {name}\nDescription: {description}\nParameters: {schema}")
}

pub struct VectorIndex {
    embedder: Arc<dyn TextEmbedder>,
    vectors: Array2<f32>,
    records: Vec<EmbeddingRecord>,
    vector_path: PathBuf,
    record_path: PathBuf,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("vectors", &self.vectors)
            .field("records", &self.records)
            .field("vector_path", &self.vector_path)
            .field("record_path", &self.record_path)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    /// Load the persisted index, or build it from the registry when no
    /// persisted state exists yet.
    ///
    /// Both store files present: load them verbatim and verify they agree
    /// with each other and with the live provider's dimensionality. Neither
    /// present: embed every registry entry in merged order, then persist.
    /// One file without its pair, mismatched counts, or unreadable content
    /// is corrupted state and fails initialization outright; rebuilding over
    /// possibly-valid data would silently diverge from disk.
    pub fn open(
        embedder: Arc<dyn TextEmbedder>,
        vector_path: PathBuf,
        record_path: PathBuf,
        registry: &ActionRegistry,
    ) -> Result<Self> {
        let have_vectors = vector_path.exists();
        let have_records = record_path.exists();

        match (have_vectors, have_records) {
            (true, true) => {
                Self::load(embedder, vector_path, record_path)
            }
            (false, false) => {
                let mut index = Self {
                    vectors: Array2::zeros((0, embedder.dim())),
                    records: Vec::new(),
                    embedder,
                    vector_path,
                    record_path,
                };
                index.rebuild(registry)?;
                Ok(index)
            }
            (true, false) => Err(AppError::Persistence(format!(
                "Store pair incomplete: {} exists but {} is missing",
                vector_path.display(),
                record_path.display()
            ))),
            (false, true) => Err(AppError::Persistence(format!(
                "Store pair incomplete: {} exists but {} is missing",
                record_path.display(),
                vector_path.display()
            ))),
        }
    }

    fn load(
        embedder: Arc<dyn TextEmbedder>,
        vector_path: PathBuf,
        record_path: PathBuf,
    ) -> Result<Self> {
        let vectors = store::load_vectors(&vector_path)?;
        let records = store::load_records(&record_path)?;

        if vectors.nrows() != records.len() {
            return Err(AppError::Persistence(format!(
                "Store pair disagrees: {} vectors but {} records",
                vectors.nrows(),
                records.len()
            )));
        }
        if vectors.ncols() != embedder.dim() {
            return Err(AppError::Persistence(format!(
                "Persisted index is {}-dimensional but the embedding provider produces {}",
                vectors.ncols(),
                embedder.dim()
            )));
        }

        tracing::info!(
            count = records.len(),
            dim = vectors.ncols(),
            "Vector index loaded from persisted stores"
        );

        Ok(Self {
            embedder,
            vectors,
            records,
            vector_path,
            record_path,
        })
    }

    /// Embed every entry of the registry's merged view, then persist.
    fn rebuild(&mut self, registry: &ActionRegistry) -> Result<()> {
        for descriptor in registry.merged() {
            self.append(
                &descriptor.name,
                &descriptor.description,
                &descriptor.parameters,
            )?;
        }
        self.persist()?;

        tracing::info!(count = self.records.len(), "Vector index rebuilt from registry");
        Ok(())
    }

    /// Embed one action and append it to the index, then persist both stores.
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        parameters: &ParameterSchema,
    ) -> Result<()> {
        self.append(name, description, parameters)?;
        self.persist()
    }

    fn append(
        &mut self,
        name: &str,
        description: &str,
        parameters: &ParameterSchema,
    ) -> Result<()> {
        let source_text = compose_document(name, description, parameters);
        let vector = self.embedder.embed(&source_text)?;

        if vector.len() != self.vectors.ncols() {
            return Err(AppError::Model(format!(
                "Embedding provider returned {} dimensions, expected {}",
                vector.len(),
                self.vectors.ncols()
            )));
        }

        self.vectors
            .push_row(ArrayView1::from(&vector))
            .map_err(|e| AppError::Model(format!("Failed to append vector: {}", e)))?;
        self.records.push(EmbeddingRecord {
            name: name.to_string(),
            description: description.to_string(),
            parameters: parameters.clone(),
            source_text,
        });

        Ok(())
    }

    /// Rewrite both stores. Vectors are written before records, so a crash
    /// between the writes surfaces as a count mismatch on the next load.
    fn persist(&self) -> Result<()> {
        store::save_vectors(&self.vector_path, &self.vectors)?;
        store::save_records(&self.record_path, &self.records)
    }

    /// Exact nearest-neighbor search: squared-L2 distance over every stored
    /// vector, ascending. Returns at most `min(k, len)` positions. Equal
    /// distances fall back to ascending insertion position; the tie-break is
    /// stable but carries no semantic meaning.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .outer_iter()
            .enumerate()
            .map(|(pos, row)| {
                let distance = row
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>();
                (pos, distance)
            })
            .collect();

        // Stable sort keeps insertion order on ties.
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }

    /// Embed a free-text query with the index's own provider.
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text)
    }

    /// Record at `position`, if the position is within range.
    pub fn record(&self, position: usize) -> Option<&EmbeddingRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of vectors currently held by the search structure. Always
    /// equal to `len()`; exposed so callers can assert the invariant.
    pub fn vector_count(&self) -> usize {
        self.vectors.nrows()
    }
}
