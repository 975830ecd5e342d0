use crate::config::Config;
use crate::embedding::{TextEmbedder, TextEncoder};
use crate::error::Result;
use crate::registry::ActionRegistry;
use crate::service::ActionService;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};

/// One prompt handled within a session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub prompt: String,
    pub action: String,
    /// ISO-8601 timestamp of the request.
    pub timestamp: String,
    pub parameters: Map<String, Value>,
}

impl HistoryEntry {
    pub fn new(prompt: String, action: String, parameters: Map<String, Value>) -> Self {
        Self {
            prompt,
            action,
            timestamp: Utc::now().to_rfc3339(),
            parameters,
        }
    }
}

/// Per-session bookkeeping, keyed by an opaque id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub history: Vec<HistoryEntry>,
}

/// Application state shared across all request handlers.
///
/// The service holds the registry and index behind a single-writer RwLock:
/// `register` takes the write guard, `retrieve`/`generate` take read guards
/// and may run concurrently with each other but never overlap a mutation.
pub struct AppState {
    pub service: Arc<RwLock<ActionService>>,
    pub sessions: Mutex<HashMap<String, SessionState>>,
    /// Bounds concurrent embedding inference to the encoder pool size.
    pub semaphore: Arc<Semaphore>,
    /// Flag indicating the service is ready (index loaded or rebuilt).
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Initialize application state with the production ONNX encoder.
    ///
    /// Blocking: loads the model pool and, on a cold start, embeds the whole
    /// built-in catalog before returning.
    pub fn new(config: Config) -> Result<Self> {
        let num_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let pool_size = config.pool_size.unwrap_or(num_cores);

        tracing::info!(pool_size, "Loading encoder session pool");

        let encoder = TextEncoder::load_pool(
            &config.model_path,
            &config.tokenizer_path,
            config.max_sequence_length,
            config.embedding_dim,
            pool_size,
        )?;

        Self::with_embedder(config, Arc::new(encoder), pool_size)
    }

    /// Initialize with an externally supplied embedding provider.
    ///
    /// `permits` bounds concurrent embedding calls; with the production
    /// encoder it matches the session pool size.
    pub fn with_embedder(
        config: Config,
        embedder: Arc<dyn TextEmbedder>,
        permits: usize,
    ) -> Result<Self> {
        let registry = ActionRegistry::with_builtins();
        let service = ActionService::initialize(
            embedder,
            registry,
            config.vector_store_path(),
            config.record_store_path(),
        )?;

        let state = Self {
            service: Arc::new(RwLock::new(service)),
            sessions: Mutex::new(HashMap::new()),
            semaphore: Arc::new(Semaphore::new(permits)),
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        };

        state.ready.store(true, Ordering::SeqCst);
        Ok(state)
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
