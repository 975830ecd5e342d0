//! Embedding provider boundary.
//!
//! The rest of the system consumes embeddings through the [`TextEmbedder`]
//! trait and never touches the model runtime directly. The production
//! implementation is [`TextEncoder`], an ONNX bi-encoder; tests substitute a
//! deterministic stand-in through the same seam.

pub mod encoder;

pub use encoder::TextEncoder;

use crate::error::Result;

/// Deterministic text -> fixed-length vector function.
///
/// Implementations must return the same vector for identical input text and
/// keep `dim()` fixed for the process lifetime; the vector index fails
/// initialization when a persisted store disagrees with the live provider's
/// dimensionality.
pub trait TextEmbedder: Send + Sync {
    /// Output dimensionality, fixed for the process lifetime.
    fn dim(&self) -> usize;

    /// Embed one text. Blocking; callers on an async runtime should wrap
    /// this in `spawn_blocking`.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
