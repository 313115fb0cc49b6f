//! Tool intelligence: recommendations, SWOT insight and feature comparison
//! over the tool catalog.
//!
//! `ToolIntelligence` owns the two startup-built structures (catalog and
//! embedding index). Every query is a read-only pass over them, so one
//! instance is shared across all requests without locking.

pub mod analyst;
pub mod comparison;
pub mod index;
pub mod recommender;

pub use analyst::SwotResult;
pub use comparison::{ComparisonResult, ToolComparison, ToolDetails, FEATURE_TAXONOMY};
pub use index::{cosine_similarity, EmbeddingIndex};
pub use recommender::Recommendation;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::inference::TextEmbedder;
use std::path::Path;
use std::sync::Arc;

pub struct ToolIntelligence {
    catalog: Catalog,
    index: EmbeddingIndex,
}

impl ToolIntelligence {
    /// Build the embedding index for `catalog`.
    ///
    /// This is the single initialisation barrier: no query can run before it
    /// returns, and a failure here is fatal.
    pub fn build(
        catalog: Catalog,
        embedder: Arc<dyn TextEmbedder>,
        batch_size: usize,
        cache_path: Option<&Path>,
    ) -> Result<Self> {
        let index = EmbeddingIndex::build(&catalog, embedder, batch_size, cache_path)?;
        Ok(Self { catalog, index })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn recommend(&self, query: &str, top_k: usize) -> Result<Vec<Recommendation>> {
        recommender::recommend(&self.catalog, &self.index, query, top_k)
    }

    pub fn analyze(&self, role_query: &str) -> SwotResult {
        analyst::analyze(&self.catalog, role_query)
    }

    pub fn get_tool_details(&self, name: &str) -> Option<ToolDetails<'_>> {
        comparison::get_tool_details(&self.catalog, name)
    }

    pub fn compare(&self, name1: &str, name2: &str) -> Result<ComparisonResult> {
        comparison::compare(&self.catalog, name1, name2)
    }

    pub fn compare_many<S: AsRef<str>>(&self, names: &[S]) -> Result<ComparisonResult> {
        comparison::compare_many(&self.catalog, names)
    }
}
