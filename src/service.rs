//! Process-scoped service object tying the registry, index, and synthesizer
//! together behind one mutation boundary.
//!
//! All shared mutable state lives here; the HTTP layer wraps the service in
//! a single-writer `RwLock` so no two registrations interleave and no read
//! observes the index mid-append.

use crate::embedding::TextEmbedder;
use crate::error::{AppError, Result};
use crate::index::VectorIndex;
use crate::registry::{ActionRegistry, Capability, ParameterSchema};
use crate::retriever::{self, RetrievalResult};
use crate::synthesis;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

pub struct ActionService {
    registry: ActionRegistry,
    index: VectorIndex,
}

impl ActionService {
    /// Construct the service: seed the registry and load or build the index.
    ///
    /// Blocking: a cold start embeds every catalog entry, so expect latency
    /// proportional to embedding inference time, not sub-millisecond.
    pub fn initialize(
        embedder: Arc<dyn TextEmbedder>,
        registry: ActionRegistry,
        vector_path: PathBuf,
        record_path: PathBuf,
    ) -> Result<Self> {
        let index = VectorIndex::open(embedder, vector_path, record_path, &registry)?;
        Ok(Self { registry, index })
    }

    /// Register a capability and append it to the similarity index.
    pub fn register(
        &mut self,
        capability: Capability,
        name: Option<String>,
        description: Option<String>,
        schema: Option<ParameterSchema>,
    ) -> Result<String> {
        let canonical = self.registry.register(capability, name, description, schema);

        // The entry was just inserted, so the lookup cannot miss.
        let descriptor = self
            .registry
            .get(&canonical)
            .cloned()
            .ok_or_else(|| AppError::NotFound(canonical.clone()))?;
        self.index.add(
            &descriptor.name,
            &descriptor.description,
            &descriptor.parameters,
        )?;

        tracing::info!(action = %canonical, "Action registered and indexed");
        Ok(canonical)
    }

    /// Rank catalog entries against a free-text query.
    pub fn retrieve(&self, query_text: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        retriever::retrieve(&self.index, query_text, k)
    }

    /// Synthesize source text invoking the named action. The lookup goes
    /// through the live merged registry, so a custom action that overrode a
    /// built-in name is the one referenced.
    pub fn generate(&self, action_name: &str, overrides: &Map<String, Value>) -> Result<String> {
        let descriptor = self
            .registry
            .get(action_name)
            .ok_or_else(|| AppError::NotFound(format!("action '{}'", action_name)))?;
        synthesis::generate(descriptor, overrides)
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
