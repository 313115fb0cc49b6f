//! Feature-hashing bag-of-words embedder.
//!
//! Each lowercase word is hashed with SHA-256 into one of `dimension` buckets
//! and the bucket counts are L2-normalised. No model files, fully
//! deterministic, and texts sharing vocabulary score a positive cosine.

use crate::error::Result;
use crate::inference::TextEmbedder;
use ndarray::{Array1, Array2};
use sha2::{Digest, Sha256};

/// Words too common to carry meaning in tool descriptions.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it",
    "its", "of", "on", "or", "that", "the", "their", "this", "to", "with", "you", "your",
];

pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_id: format!("hashing-bow-{}", dimension),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.dimension as u64) as usize
    }

    fn encode_one(&self, text: &str) -> Array1<f32> {
        let mut vector = Array1::<f32>::zeros(self.dimension);

        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }

        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector.mapv_inplace(|v| v / norm);
        }
        vector
    }
}

/// Lowercase alphanumeric words, stopwords removed.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
}

impl TextEmbedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Array2<f32>> {
        let mut embeddings = Array2::zeros((texts.len(), self.dimension));
        for (i, text) in texts.iter().enumerate() {
            embeddings.row_mut(i).assign(&self.encode_one(text));
        }
        Ok(embeddings)
    }
}
