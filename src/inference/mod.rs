pub mod bi_encoder;
pub mod hashing;
pub mod pool;
pub mod tokenize;

pub use bi_encoder::OnnxEmbedder;
pub use hashing::HashingEmbedder;
pub use pool::SessionPool;
pub use tokenize::TokenizerWrapper;

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Turns text into fixed-length embedding vectors.
///
/// Implementations must be deterministic: the same text always maps to the
/// same vector, and empty text is valid input.
pub trait TextEmbedder: Send + Sync {
    /// Stable identifier of the model behind this embedder.
    /// Part of the embeddings cache key.
    fn model_id(&self) -> &str;

    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Encode a batch of texts.
    ///
    /// # Returns
    /// Array2<f32> of shape (texts.len(), dimension)
    fn embed_batch(&self, texts: &[String]) -> Result<Array2<f32>>;

    /// Encode a single text.
    fn embed(&self, text: &str) -> Result<Array1<f32>> {
        let batch = self.embed_batch(&[text.to_string()])?;
        Ok(batch.row(0).to_owned())
    }
}
