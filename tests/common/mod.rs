#![allow(dead_code)]

//! Shared helpers for integration tests.
//!
//! Tests exercise the core through the `TextEmbedder` seam with a
//! deterministic stand-in provider, so no model files are required.

use conjure::error::Result;
use conjure::{Config, TextEmbedder};
use std::path::Path;

pub const TEST_DIM: usize = 384;

/// Deterministic embedding provider: hashes character trigrams of the
/// lowercased text into a fixed-size bag and L2-normalizes. Texts sharing
/// wording land near each other, which is enough signal for ranking tests.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dim: TEST_DIM }
    }
}

impl TextEmbedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect();
        for word in normalized.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() < 3 {
                vector[fnv1a(word) as usize % self.dim] += 1.0;
                continue;
            }
            for gram in chars.windows(3) {
                let gram: String = gram.iter().collect();
                vector[fnv1a(&gram) as usize % self.dim] += 1.0;
            }
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for slot in vector.iter_mut() {
                *slot /= norm;
            }
        }
        Ok(vector)
    }
}

fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Config pointing all persisted state into `data_dir`.
pub fn test_config(data_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: "./models/model_int8.onnx".into(),
        tokenizer_path: "./models/tokenizer.json".into(),
        max_sequence_length: 512,
        embedding_dim: TEST_DIM,
        data_dir: data_dir.to_path_buf(),
        default_top_k: 3,
        pool_size: None,
        shutdown_timeout_secs: 1,
    }
}
