use std::env;
use std::path::PathBuf;

/// Which text embedder backs the Embedding Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// ONNX bi-encoder loaded from `EMBEDDING_MODEL_PATH`.
    Onnx,
    /// Deterministic feature-hashing embedder. Needs no model files.
    Hashing,
}

impl EmbeddingBackend {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "onnx" | "bi-encoder" | "model" => Ok(Self::Onnx),
            "hashing" | "hash" | "offline" => Ok(Self::Hashing),
            other => Err(anyhow::anyhow!("Unknown EMBEDDING_BACKEND '{}'", other)),
        }
    }
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Catalog file, `.csv` or `.json`.
    pub catalog_path: PathBuf,
    pub embedding_backend: EmbeddingBackend,
    /// Path to bi-encoder ONNX model.
    pub model_path: PathBuf,
    /// Path to bi-encoder tokenizer.
    pub tokenizer_path: PathBuf,
    pub max_sequence_length: usize,
    /// Optional override for session pool size. If None, uses available parallelism.
    pub pool_size: Option<usize>,
    /// Number of threads per ONNX session for intra-op parallelism.
    pub intra_threads: usize,
    /// Descriptions per embedding batch while building the index.
    pub batch_size: usize,
    /// Vector length produced by the hashing backend.
    pub hashing_dim: usize,
    /// Optional embeddings cache file. Skips re-encoding the catalog on restart.
    pub embeddings_cache_path: Option<PathBuf>,
    /// `top_k` used by `/recommend` when the caller omits it.
    pub default_top_k: usize,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            catalog_path: PathBuf::from(
                env::var("CATALOG_PATH").unwrap_or_else(|_| "./data/ai_tools.csv".to_string()),
            ),
            embedding_backend: EmbeddingBackend::parse(
                &env::var("EMBEDDING_BACKEND").unwrap_or_else(|_| "onnx".to_string()),
            )?,
            model_path: PathBuf::from(
                env::var("EMBEDDING_MODEL_PATH")
                    .unwrap_or_else(|_| "./models/all-MiniLM-L6-v2/model.onnx".to_string()),
            ),
            tokenizer_path: PathBuf::from(
                env::var("EMBEDDING_TOKENIZER_PATH")
                    .unwrap_or_else(|_| "./models/all-MiniLM-L6-v2/tokenizer.json".to_string()),
            ),
            max_sequence_length: env::var("MAX_SEQ_LENGTH")
                .unwrap_or_else(|_| "256".to_string())
                .parse()?,
            pool_size: env::var("POOL_SIZE").ok().and_then(|s| s.parse().ok()),
            intra_threads: env::var("INTRA_THREADS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            batch_size: env::var("BATCH_SIZE")
                .unwrap_or_else(|_| "32".to_string())
                .parse()?,
            hashing_dim: env::var("HASHING_DIM")
                .unwrap_or_else(|_| "384".to_string())
                .parse()?,
            embeddings_cache_path: env::var("EMBEDDINGS_CACHE_PATH").ok().map(PathBuf::from),
            default_top_k: env::var("DEFAULT_TOP_K")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
        })
    }

    /// Number of ONNX sessions (and embedding permits) to create.
    pub fn effective_pool_size(&self) -> usize {
        self.pool_size
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
    }
}
