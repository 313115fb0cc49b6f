//! Bi-encoder model for semantic tool recommendation.
//!
//! Defaults to sentence-transformers/all-MiniLM-L6-v2 exported to ONNX, which
//! produces 384-dimensional embeddings. Query and catalog descriptions are
//! encoded independently, so catalog vectors are computed once at startup.

use crate::error::{AppError, Result};
use crate::inference::pool::SessionPool;
use crate::inference::tokenize::TokenizerWrapper;
use crate::inference::TextEmbedder;
use ndarray::Array2;
use ort::value::Tensor;
use std::path::Path;

/// ONNX bi-encoder: mean pooling over token states, then L2 normalisation.
pub struct OnnxEmbedder {
    pool: SessionPool,
    tokenizer: TokenizerWrapper,
    model_id: String,
    embedding_dim: usize,
}

impl OnnxEmbedder {
    /// Load the session pool and tokenizer, then probe the embedding dimension.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the tokenizer JSON file
    /// * `max_length` - Maximum sequence length (256 for MiniLM)
    /// * `pool_size` - Number of ONNX sessions
    /// * `intra_threads` - Intra-op threads per session
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        max_length: usize,
        pool_size: usize,
        intra_threads: usize,
    ) -> Result<Self> {
        let tokenizer = TokenizerWrapper::load(tokenizer_path, max_length)?;
        let pool = SessionPool::load(model_path, pool_size, intra_threads)?;

        let model_id = model_path
            .parent()
            .and_then(|p| p.file_name())
            .or_else(|| model_path.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx-bi-encoder".to_string());

        let mut embedder = Self {
            pool,
            tokenizer,
            model_id,
            embedding_dim: 0,
        };

        // The hidden size is only known after a forward pass.
        let probe = embedder.encode(&["dimension probe".to_string()])?;
        embedder.embedding_dim = probe.ncols();

        tracing::info!(
            model = %model_path.display(),
            tokenizer = %tokenizer_path.display(),
            model_id = %embedder.model_id,
            embedding_dim = embedder.embedding_dim,
            pool_size = embedder.pool.size(),
            "Bi-encoder model loaded"
        );

        Ok(embedder)
    }

    fn encode(&self, texts: &[String]) -> Result<Array2<f32>> {
        if texts.is_empty() {
            return Ok(Array2::zeros((0, self.embedding_dim)));
        }

        let (input_ids, attention_mask, token_type_ids) = self.tokenizer.tokenize_batch(texts)?;
        let (batch_size, max_len) = input_ids.dim();
        let mask: Vec<i64> = attention_mask.iter().copied().collect();

        let shape = [batch_size, max_len];
        let input_ids_tensor = Tensor::from_array((shape, input_ids.iter().copied().collect::<Vec<i64>>()))
            .map_err(|e| AppError::ModelError(e.to_string()))?;
        let attention_mask_tensor = Tensor::from_array((shape, mask.clone()))
            .map_err(|e| AppError::ModelError(e.to_string()))?;
        let token_type_ids_tensor =
            Tensor::from_array((shape, token_type_ids.iter().copied().collect::<Vec<i64>>()))
                .map_err(|e| AppError::ModelError(e.to_string()))?;

        self.pool.with_session(|session| {
            let outputs = session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor,
                ])
                .map_err(|e| AppError::ModelError(format!("Bi-encoder inference failed: {}", e)))?;

            // last_hidden_state: (batch, seq_len, hidden_size)
            let hidden_state = outputs.get("last_hidden_state").ok_or_else(|| {
                AppError::ModelError("No 'last_hidden_state' output found".to_string())
            })?;

            let (shape_info, data) = hidden_state
                .try_extract_tensor::<f32>()
                .map_err(|e| AppError::ModelError(e.to_string()))?;
            let hidden_size = shape_info[2] as usize;

            Ok(mean_pool(data, &mask, batch_size, max_len, hidden_size))
        })
    }
}

/// Mean-pool token states under the attention mask and L2-normalise each row.
fn mean_pool(
    data: &[f32],
    mask: &[i64],
    batch_size: usize,
    seq_len: usize,
    hidden_size: usize,
) -> Array2<f32> {
    let mut embeddings = Array2::zeros((batch_size, hidden_size));

    for i in 0..batch_size {
        let mut sum = vec![0.0f32; hidden_size];
        let mut count = 0.0f32;

        for j in 0..seq_len {
            if mask[i * seq_len + j] == 1 {
                let base_idx = i * seq_len * hidden_size + j * hidden_size;
                for (k, sum_val) in sum.iter_mut().enumerate() {
                    *sum_val += data[base_idx + k];
                }
                count += 1.0;
            }
        }

        if count > 0.0 {
            for (k, sum_val) in sum.iter().enumerate() {
                embeddings[[i, k]] = sum_val / count;
            }
        }

        let norm: f32 = embeddings.row(i).iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embeddings.row_mut(i).mapv_inplace(|v| v / norm);
        }
    }

    embeddings
}

impl TextEmbedder for OnnxEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.embedding_dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Array2<f32>> {
        self.encode(texts)
    }
}
