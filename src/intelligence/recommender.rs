//! Semantic tool recommendation for a free-text need.

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::intelligence::index::EmbeddingIndex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub tool_name: String,
    /// Cosine similarity in [-1, 1], higher is more relevant
    pub similarity_score: f32,
    pub description: String,
}

/// Rank every catalog record against `query` and return the best `top_k`.
///
/// Full sort over all records; ties keep catalog order. A `top_k` above the
/// catalog size returns the whole catalog ranked. Empty queries are embedded
/// like any other text.
///
/// # Errors
/// `ValidationError` for `top_k == 0`; embedding failures surface as
/// `RecommendationError`.
pub fn recommend(
    catalog: &Catalog,
    index: &EmbeddingIndex,
    query: &str,
    top_k: usize,
) -> Result<Vec<Recommendation>> {
    if top_k == 0 {
        return Err(AppError::ValidationError(
            "top_k must be at least 1".to_string(),
        ));
    }

    let query_embedding = index.embed(query).map_err(|e| {
        tracing::error!(query, stage = "embed_query", error = %e, "Recommendation failed");
        AppError::RecommendationError(e.to_string())
    })?;

    let similarities = index.similarities(&query_embedding).map_err(|e| {
        tracing::error!(query, stage = "similarity", error = %e, "Recommendation failed");
        AppError::RecommendationError(e.to_string())
    })?;

    let mut ranked: Vec<(usize, f32)> = similarities.into_iter().enumerate().collect();
    // sort_by is stable, so equal scores stay in catalog order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let records = catalog.all();
    let results: Vec<Recommendation> = ranked
        .into_iter()
        .take(top_k)
        .filter_map(|(idx, score)| {
            records.get(idx).map(|tool| Recommendation {
                tool_name: tool.name.clone(),
                similarity_score: score,
                description: tool.description.clone(),
            })
        })
        .collect();

    tracing::debug!(query, top_k, returned = results.len(), "Recommendation ranked");

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolRecord;
    use crate::inference::HashingEmbedder;
    use std::sync::Arc;

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

    fn fixture() -> (Catalog, EmbeddingIndex) {
        let catalog = Catalog::new(vec![
            record("Jasper", "AI copywriting assistant for marketing content"),
            record("Tripnotes", "Travel planning assistant that builds trip itineraries"),
            record("Airtable", "Spreadsheet database hybrid for structured data"),
            record("Clone A", "identical description"),
            record("Clone B", "identical description"),
        ]);
        let index =
            EmbeddingIndex::build(&catalog, Arc::new(HashingEmbedder::new(384)), 16, None).unwrap();
        (catalog, index)
    }

    #[test]
    fn test_relevant_tool_ranked_first() {
        let (catalog, index) = fixture();
        let results = recommend(&catalog, &index, "travel planning tool", 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].tool_name, "Tripnotes");
    }

    #[test]
    fn test_scores_descending_and_bounded() {
        let (catalog, index) = fixture();
        let results = recommend(&catalog, &index, "database for marketing data", 5).unwrap();

        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
        for r in &results {
            assert!((-1.0..=1.0).contains(&r.similarity_score));
        }
    }

    #[test]
    fn test_top_k_larger_than_catalog_returns_all() {
        let (catalog, index) = fixture();
        let results = recommend(&catalog, &index, "anything", 50).unwrap();
        assert_eq!(results.len(), catalog.len());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let (catalog, index) = fixture();
        let results = recommend(&catalog, &index, "identical description", 2).unwrap();

        assert_eq!(results[0].tool_name, "Clone A");
        assert_eq!(results[1].tool_name, "Clone B");
    }

    #[test]
    fn test_empty_query_still_ranked() {
        let (catalog, index) = fixture();
        let results = recommend(&catalog, &index, "   ", 2).unwrap();

        assert_eq!(results.len(), 2);
        // zero query vector scores 0 everywhere, so catalog order wins
        assert_eq!(results[0].tool_name, "Jasper");
        assert_eq!(results[0].similarity_score, 0.0);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let (catalog, index) = fixture();
        assert!(matches!(
            recommend(&catalog, &index, "travel", 0),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let (catalog, index) = fixture();
        let first = recommend(&catalog, &index, "marketing content", 4).unwrap();
        let second = recommend(&catalog, &index, "marketing content", 4).unwrap();
        assert_eq!(first, second);
    }
}
