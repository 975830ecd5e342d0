//! Conjure - Semantic action dispatch and code synthesis microservice
//!
//! Maps free-text instructions to cataloged actions via embedding-backed
//! similarity search and synthesizes standalone source code invoking the
//! selected action. This library exposes the core components for the
//! service, enabling integration tests and embedding in other applications.

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod registry;
pub mod retriever;
pub mod service;
pub mod state;
pub mod synthesis;

// Re-export key types for convenience
pub use config::Config;
pub use embedding::{TextEmbedder, TextEncoder};
pub use error::{AppError, Result};
pub use handlers::{
    execute_handler, generate_handler, health_handler, ready_handler, register_handler,
    retrieve_handler, session_handler,
};
pub use index::VectorIndex;
pub use registry::{ActionDescriptor, ActionRegistry, Capability, ParameterSpec};
pub use retriever::RetrievalResult;
pub use service::ActionService;
pub use state::AppState;
