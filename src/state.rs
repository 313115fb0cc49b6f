use crate::catalog::Catalog;
use crate::config::{Config, EmbeddingBackend};
use crate::error::{AppError, Result};
use crate::inference::{HashingEmbedder, OnnxEmbedder, TextEmbedder};
use crate::intelligence::ToolIntelligence;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Application state shared across all request handlers.
pub struct AppState {
    pub intelligence: Arc<ToolIntelligence>,
    /// Bounds concurrent query embeddings to the number of model sessions.
    pub semaphore: Arc<Semaphore>,
    /// Set once the index is warmed up and the listener is bound
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load the catalog, the embedder and the embedding index.
    ///
    /// Any failure here aborts startup: `DataLoadError` for the catalog,
    /// `EmbeddingInitError` for the model or the index.
    pub fn new(config: Config) -> Result<Self> {
        let start = std::time::Instant::now();
        let catalog = Catalog::load(&config.catalog_path)?;
        tracing::info!(
            records = catalog.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog ready"
        );

        let embedder = load_embedder(&config)?;

        let intelligence = ToolIntelligence::build(
            catalog,
            embedder,
            config.batch_size,
            config.embeddings_cache_path.as_deref(),
        )?;

        Self::with_intelligence(config, intelligence)
    }

    /// Wrap an already-built intelligence layer (used by tests with fixtures).
    ///
    /// The state starts not ready; call `mark_ready` once the server can take
    /// traffic.
    pub fn with_intelligence(config: Config, intelligence: ToolIntelligence) -> Result<Self> {
        let permits = config.effective_pool_size();

        let state = Self {
            intelligence: Arc::new(intelligence),
            semaphore: Arc::new(Semaphore::new(permits)),
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        };

        state.warmup()?;

        Ok(state)
    }

    /// Run one query embedding so the first real request skips lazy model setup.
    fn warmup(&self) -> Result<()> {
        tracing::info!("Running embedding warmup...");

        self.intelligence
            .index()
            .embed("warmup query")
            .map_err(|e| AppError::EmbeddingInitError(format!("Warmup failed: {}", e)))?;

        tracing::info!("Embedding warmup completed successfully");
        Ok(())
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Service marked ready");
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

fn load_embedder(config: &Config) -> Result<Arc<dyn TextEmbedder>> {
    match config.embedding_backend {
        EmbeddingBackend::Onnx => {
            let embedder = OnnxEmbedder::load(
                &config.model_path,
                &config.tokenizer_path,
                config.max_sequence_length,
                config.effective_pool_size(),
                config.intra_threads,
            )
            .map_err(|e| AppError::EmbeddingInitError(e.to_string()))?;
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Hashing => {
            tracing::info!(dimension = config.hashing_dim, "Using hashing embedder");
            Ok(Arc::new(HashingEmbedder::new(config.hashing_dim)))
        }
    }
}
