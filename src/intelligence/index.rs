//! Embedding Index: one cached vector per catalog description.
//!
//! Row `i` of the matrix belongs to catalog record `i`. Built once at startup
//! and read-only afterwards.

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::inference::TextEmbedder;
use crate::persistence::{save_embeddings_cache, try_load_embeddings_cache};
use ndarray::{Array1, Array2, ArrayView1};
use std::path::Path;
use std::sync::Arc;

pub struct EmbeddingIndex {
    embedder: Arc<dyn TextEmbedder>,
    embeddings: Array2<f32>,
}

impl EmbeddingIndex {
    /// Encode every catalog description, or reuse a matching on-disk cache.
    ///
    /// # Errors
    /// Any embedding failure is fatal and surfaces as `EmbeddingInitError`.
    pub fn build(
        catalog: &Catalog,
        embedder: Arc<dyn TextEmbedder>,
        batch_size: usize,
        cache_path: Option<&Path>,
    ) -> Result<Self> {
        let start = std::time::Instant::now();
        let records = catalog.all();
        let dimension = embedder.dimension();

        if let Some(path) = cache_path {
            if let Some(embeddings) =
                try_load_embeddings_cache(path, embedder.model_id(), dimension, records)
            {
                return Ok(Self {
                    embedder,
                    embeddings,
                });
            }
        }

        let descriptions: Vec<String> = records.iter().map(|r| r.description.clone()).collect();
        let mut embeddings = Array2::<f32>::zeros((descriptions.len(), dimension));

        for (chunk_idx, chunk) in descriptions.chunks(batch_size.max(1)).enumerate() {
            let batch = embedder.embed_batch(chunk).map_err(|e| {
                tracing::error!(chunk = chunk_idx, error = %e, "Failed to embed catalog descriptions");
                AppError::EmbeddingInitError(e.to_string())
            })?;

            if batch.dim() != (chunk.len(), dimension) {
                return Err(AppError::EmbeddingInitError(format!(
                    "Embedder returned shape {:?}, expected ({}, {})",
                    batch.dim(),
                    chunk.len(),
                    dimension
                )));
            }

            let offset = chunk_idx * batch_size.max(1);
            for (row, vector) in batch.outer_iter().enumerate() {
                embeddings.row_mut(offset + row).assign(&vector);
            }
        }

        tracing::info!(
            model_id = embedder.model_id(),
            num_records = records.len(),
            embedding_dim = dimension,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Embedding index built"
        );

        if let Some(path) = cache_path {
            save_embeddings_cache(path, embedder.model_id(), records, &embeddings);
        }

        Ok(Self {
            embedder,
            embeddings,
        })
    }

    /// Embed free text with the same model used for the catalog.
    pub fn embed(&self, text: &str) -> Result<Array1<f32>> {
        self.embedder.embed(text)
    }

    pub fn len(&self) -> usize {
        self.embeddings.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.nrows() == 0
    }

    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn vector(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.len()).then(|| self.embeddings.row(index))
    }

    /// Cosine similarity of `query` against every record, in catalog order.
    pub fn similarities(&self, query: &Array1<f32>) -> Result<Vec<f32>> {
        if query.len() != self.dimension() {
            return Err(AppError::ModelError(format!(
                "Query vector has {} dimensions, index has {}",
                query.len(),
                self.dimension()
            )));
        }

        Ok(self
            .embeddings
            .outer_iter()
            .map(|row| cosine_similarity(query.view(), row))
            .collect())
    }
}

/// `dot(a, b) / (|a| * |b|)`, clamped to [-1, 1]. Zero-norm input scores 0.
///
/// Both views must have the same length.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolRecord;
    use crate::inference::HashingEmbedder;
    use ndarray::array;
    use tempfile::tempdir;

    fn record(name: &str, description: &str) -> ToolRecord {
        ToolRecord {
            name: name.to_string(),
            description: description.to_string(),
            main_category: String::new(),
            sub_category: String::new(),
            who_should_use: String::new(),
            pricing: String::new(),
            ratings_raw: String::new(),
            key_features: String::new(),
            pros: String::new(),
            cons: String::new(),
            compatibility_integration: String::new(),
        }
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let a = array![1.0f32, 0.0];
        let b = array![0.0f32, 1.0];
        let c = array![-2.0f32, 0.0];

        assert!((cosine_similarity(a.view(), a.view()) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(a.view(), b.view()).abs() < 1e-6);
        assert!((cosine_similarity(a.view(), c.view()) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let zero = array![0.0f32, 0.0];
        let a = array![3.0f32, 4.0];
        assert_eq!(cosine_similarity(zero.view(), a.view()), 0.0);
        assert_eq!(cosine_similarity(zero.view(), zero.view()), 0.0);
    }

    #[test]
    fn test_build_one_row_per_record() {
        let catalog = Catalog::new(vec![
            record("a", "alpha beta"),
            record("b", "gamma"),
            record("c", "delta epsilon"),
        ]);
        let index = EmbeddingIndex::build(&catalog, Arc::new(HashingEmbedder::new(32)), 2, None)
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 32);
        assert!(index.vector(2).is_some());
        assert!(index.vector(3).is_none());
    }

    #[test]
    fn test_build_empty_catalog() {
        let index =
            EmbeddingIndex::build(&Catalog::default(), Arc::new(HashingEmbedder::new(8)), 4, None)
                .unwrap();
        assert!(index.is_empty());
        assert!(index.similarities(&Array1::zeros(8)).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let catalog = Catalog::new(vec![record("a", "alpha")]);
        let index =
            EmbeddingIndex::build(&catalog, Arc::new(HashingEmbedder::new(8)), 4, None).unwrap();
        assert!(index.similarities(&Array1::zeros(4)).is_err());
    }

    #[test]
    fn test_build_uses_cache_on_second_run() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.bin");
        let catalog = Catalog::new(vec![record("a", "alpha"), record("b", "beta")]);

        let first = EmbeddingIndex::build(
            &catalog,
            Arc::new(HashingEmbedder::new(16)),
            8,
            Some(&cache_path),
        )
        .unwrap();
        assert!(cache_path.exists());

        let second = EmbeddingIndex::build(
            &catalog,
            Arc::new(HashingEmbedder::new(16)),
            8,
            Some(&cache_path),
        )
        .unwrap();
        assert_eq!(first.embeddings, second.embeddings);
    }
}
