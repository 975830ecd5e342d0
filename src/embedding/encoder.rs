//! ONNX bi-encoder text embedding provider.
//!
//! Produces L2-normalized sentence embeddings by mean-pooling the encoder's
//! last hidden state over the attention mask. MiniLM-class models emit
//! 384-dimensional vectors; the dimension is configured, then verified
//! against the model output on every call.

use crate::embedding::TextEmbedder;
use crate::error::{AppError, Result};
use crossbeam::queue::ArrayQueue;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use std::cell::UnsafeCell;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

/// A pool of ONNX Runtime sessions for parallel embedding inference.
///
/// # Design Rationale
/// ONNX `Session::run` requires `&mut self`, but registrations and queries
/// embed concurrently. Instead of a Mutex (which serializes all requests),
/// we create N independent Session instances and hand out exclusive access
/// through a lock-free queue of indices.
///
/// # Safety
/// The ArrayQueue guarantees each session index is held by at most one
/// thread between `acquire_session` and `release_session`, which makes the
/// UnsafeCell access sound.
pub struct TextEncoder {
    sessions: Vec<UnsafeCell<Session>>,
    available: Arc<ArrayQueue<usize>>,
    tokenizer: Tokenizer,
    max_length: usize,
    dim: usize,
}

impl TextEncoder {
    /// Load a pool of sessions plus the shared tokenizer.
    ///
    /// Each session runs with a single intra-op thread; parallelism comes
    /// from the pool, not from threads inside a session.
    pub fn load_pool(
        model_path: &Path,
        tokenizer_path: &Path,
        max_length: usize,
        dim: usize,
        pool_size: usize,
    ) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| AppError::Model(format!("Failed to load tokenizer: {}", e)))?;

        let model_bytes = std::fs::read(model_path)
            .map_err(|e| AppError::Model(format!("Failed to read model file: {}", e)))?;

        let mut sessions = Vec::with_capacity(pool_size);
        let available = Arc::new(ArrayQueue::new(pool_size));

        for i in 0..pool_size {
            let session = Session::builder()
                .map_err(|e| AppError::Model(e.to_string()))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| AppError::Model(e.to_string()))?
                .with_intra_threads(1)
                .map_err(|e| AppError::Model(e.to_string()))?
                .commit_from_memory(&model_bytes)
                .map_err(|e: ort::Error| AppError::Model(e.to_string()))?;

            sessions.push(UnsafeCell::new(session));
            available
                .push(i)
                .map_err(|_| AppError::Model("Failed to initialize session pool".into()))?;
        }

        tracing::info!(
            model = %model_path.display(),
            tokenizer = %tokenizer_path.display(),
            pool_size,
            max_length,
            dim,
            "Encoder session pool loaded"
        );

        Ok(Self {
            sessions,
            available,
            tokenizer,
            max_length,
            dim,
        })
    }

    fn acquire_session(&self) -> Result<usize> {
        self.available
            .pop()
            .ok_or_else(|| AppError::Resource("No available encoder sessions in pool".into()))
    }

    fn release_session(&self, index: usize) {
        // Only indices we acquired are released, so the push cannot fail.
        let _ = self.available.push(index);
    }

    fn encode_on_session(&self, session_idx: usize, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| AppError::Model(format!("Tokenization failed: {}", e)))?;

        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();
        let seq_len = ids.len().min(self.max_length).max(1);

        let mut input_ids = vec![0i64; seq_len];
        let mut attention_mask = vec![0i64; seq_len];
        let token_type_ids = vec![0i64; seq_len];

        for j in 0..seq_len.min(ids.len()) {
            input_ids[j] = ids[j] as i64;
            attention_mask[j] = mask[j] as i64;
        }

        let shape = [1usize, seq_len];
        let input_ids_tensor =
            Tensor::from_array((shape, input_ids)).map_err(|e| AppError::Model(e.to_string()))?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
            .map_err(|e| AppError::Model(e.to_string()))?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
            .map_err(|e| AppError::Model(e.to_string()))?;

        // SAFETY: ArrayQueue guarantees exclusive access to this index
        // between acquire_session() and release_session().
        let session = unsafe { &mut *self.sessions[session_idx].get() };

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            ])
            .map_err(|e| AppError::Model(format!("Encoder inference failed: {}", e)))?;

        let hidden_state = outputs
            .get("last_hidden_state")
            .ok_or_else(|| AppError::Model("No 'last_hidden_state' output found".to_string()))?;

        let (shape_info, data) = hidden_state
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Model(e.to_string()))?;

        let hidden_size = shape_info[2] as usize;
        if hidden_size != self.dim {
            return Err(AppError::Model(format!(
                "Encoder produced {}-dimensional output, expected {}",
                hidden_size, self.dim
            )));
        }

        // Mean pooling over non-padding tokens.
        let mut embedding = vec![0.0f32; hidden_size];
        let mut count = 0.0f32;
        for j in 0..seq_len {
            if attention_mask[j] == 1 {
                let base_idx = j * hidden_size;
                for (k, slot) in embedding.iter_mut().enumerate() {
                    *slot += data[base_idx + k];
                }
                count += 1.0;
            }
        }
        if count > 0.0 {
            for slot in embedding.iter_mut() {
                *slot /= count;
            }
        }

        // L2 normalize so squared-L2 distance orders like cosine similarity.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for slot in embedding.iter_mut() {
                *slot /= norm;
            }
        }

        Ok(embedding)
    }
}

impl TextEmbedder for TextEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let session_idx = self.acquire_session()?;
        let result = self.encode_on_session(session_idx, text);
        self.release_session(session_idx);
        result
    }
}

// SAFETY: TextEncoder is Send + Sync because the ArrayQueue hands each
// session index to at most one caller at a time; between pop and push only
// one thread can reach each UnsafeCell<Session>. The tokenizer is only read.
unsafe impl Send for TextEncoder {}
unsafe impl Sync for TextEncoder {}
