//! Tests against the real ONNX bi-encoder.
//!
//! Requires an exported sentence-transformers model and tokenizer at
//! EMBEDDING_MODEL_PATH / EMBEDDING_TOKENIZER_PATH (defaults under ./models).
//! Run with: cargo test --test onnx_embedder_test -- --ignored --test-threads=1

use std::path::Path;
use std::sync::Arc;
use toolsight::{Catalog, Config, OnnxEmbedder, TextEmbedder, ToolIntelligence};

fn load_embedder() -> OnnxEmbedder {
    let config = Config::from_env().expect("Failed to load config");
    OnnxEmbedder::load(
        &config.model_path,
        &config.tokenizer_path,
        config.max_sequence_length,
        2,
        1,
    )
    .expect("Failed to load ONNX embedder")
}

#[test]
#[ignore = "Requires model files - run with --ignored"]
fn test_embeddings_are_normalized() {
    let embedder = load_embedder();
    let vector = embedder.embed("Automate my marketing emails").unwrap();

    assert_eq!(vector.len(), embedder.dimension());
    assert!((vector.dot(&vector) - 1.0).abs() < 1e-3);
}

#[test]
#[ignore = "Requires model files - run with --ignored"]
fn test_empty_text_is_embedded() {
    let embedder = load_embedder();
    let vector = embedder.embed("").unwrap();
    assert_eq!(vector.len(), embedder.dimension());
}

#[test]
#[ignore = "Requires model files - run with --ignored"]
fn test_embedding_is_deterministic() {
    let embedder = load_embedder();
    let a = embedder.embed("project tracking for remote teams").unwrap();
    let b = embedder.embed("project tracking for remote teams").unwrap();
    assert_eq!(a, b);
}

#[test]
#[ignore = "Requires model files - run with --ignored"]
fn test_travel_query_ranks_travel_tool_first() {
    let catalog = Catalog::load(Path::new("tests/data/tools.csv")).unwrap();
    let intelligence =
        ToolIntelligence::build(catalog, Arc::new(load_embedder()), 4, None).unwrap();

    let results = intelligence.recommend("travel planning tool", 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].tool_name, "Tripnotes");
}
