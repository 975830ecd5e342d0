use std::env;
use std::path::PathBuf;

pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path to the bi-encoder ONNX model used for embeddings.
    pub model_path: PathBuf,
    /// Path to the bi-encoder tokenizer JSON.
    pub tokenizer_path: PathBuf,
    pub max_sequence_length: usize,
    /// Output dimensionality of the embedding provider (384 for MiniLM-class models).
    pub embedding_dim: usize,
    /// Directory holding the paired vector/record stores.
    pub data_dir: PathBuf,
    /// Number of candidates returned by /execute retrieval.
    pub default_top_k: usize,
    /// Optional override for encoder session pool size. If None, uses physical cores.
    pub pool_size: Option<usize>,
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            model_path: PathBuf::from(
                env::var("MODEL_PATH").unwrap_or_else(|_| "./models/model_int8.onnx".to_string()),
            ),
            tokenizer_path: PathBuf::from(
                env::var("TOKENIZER_PATH")
                    .unwrap_or_else(|_| "./models/tokenizer.json".to_string()),
            ),
            max_sequence_length: env::var("MAX_SEQ_LENGTH")
                .unwrap_or_else(|_| "512".to_string())
                .parse()?,
            embedding_dim: env::var("EMBEDDING_DIM")
                .unwrap_or_else(|_| "384".to_string())
                .parse()?,
            data_dir: PathBuf::from(
                env::var("DATA_DIR").unwrap_or_else(|_| ".conjure".to_string()),
            ),
            default_top_k: env::var("DEFAULT_TOP_K")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            pool_size: env::var("POOL_SIZE").ok().and_then(|s| s.parse().ok()),
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }

    /// Location of the binary vector store.
    pub fn vector_store_path(&self) -> PathBuf {
        self.data_dir.join("vectors.bin")
    }

    /// Location of the JSON metadata store paired with the vector store.
    pub fn record_store_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }
}
