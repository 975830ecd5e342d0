//! Ranks registry entries against a free-text query via the vector index.

use crate::error::Result;
use crate::index::VectorIndex;
use crate::registry::ParameterSchema;
use serde::Serialize;

/// One ranked candidate. Lower distance means more relevant. The descriptor
/// fields are the snapshot taken at indexing time; callers resolving the
/// action for synthesis should go back to the live registry by name.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    pub distance: f32,
    pub source_text: String,
}

/// Embed `query_text` and return up to `k` candidates, most relevant first.
///
/// An empty index yields an empty list, which callers treat as "no match"
/// rather than an error. Search positions outside the valid record range
/// (some search structures report a sentinel for "no match") are dropped.
pub fn retrieve(index: &VectorIndex, query_text: &str, k: usize) -> Result<Vec<RetrievalResult>> {
    if index.is_empty() {
        return Ok(Vec::new());
    }

    let query = index.embed_query(query_text)?;
    let hits = index.search(&query, k);

    let mut results = Vec::with_capacity(hits.len());
    for (position, distance) in hits {
        let Some(record) = index.record(position) else {
            tracing::warn!(position, "Dropping out-of-range search position");
            continue;
        };
        results.push(RetrievalResult {
            name: record.name.clone(),
            description: record.description.clone(),
            parameters: record.parameters.clone(),
            distance,
            source_text: record.source_text.clone(),
        });
    }

    Ok(results)
}
