//! Persistence layer for caching catalog embeddings across restarts.
//!
//! The cache is keyed by the embedder identity and the catalog contents, so a
//! changed model or catalog is detected and re-encoded.

use crate::catalog::ToolRecord;
use crate::error::{AppError, Result};
use ndarray::Array2;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Cache file format version. Increment when format changes.
const CACHE_VERSION: u32 = 1;

/// Magic bytes to identify valid cache files.
const CACHE_MAGIC: &[u8; 8] = b"TOOLSGHT";

/// Magic, version, hash and the two u64 dimensions.
const HEADER_LEN: u64 = 8 + 4 + 32 + 8 + 8;

/// Cached embeddings with metadata for validation.
pub struct EmbeddingsCache {
    pub version: u32,
    /// SHA256 over embedder identity and every record's name and description
    pub catalog_hash: [u8; 32],
    pub num_records: usize,
    pub embedding_dim: usize,
    /// Row-major (num_records × embedding_dim)
    pub embeddings: Array2<f32>,
}

impl EmbeddingsCache {
    pub fn compute_catalog_hash(model_id: &str, records: &[ToolRecord]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(model_id.as_bytes());
        hasher.update(b"\n");

        for record in records {
            hasher.update(record.name.as_bytes());
            hasher.update(b"|");
            hasher.update(record.description.as_bytes());
            hasher.update(b"\n");
        }

        hasher.finalize().into()
    }

    pub fn new(model_id: &str, records: &[ToolRecord], embeddings: Array2<f32>) -> Self {
        Self {
            version: CACHE_VERSION,
            catalog_hash: Self::compute_catalog_hash(model_id, records),
            num_records: records.len(),
            embedding_dim: embeddings.ncols(),
            embeddings,
        }
    }

    /// Save cache to binary file.
    ///
    /// File format:
    /// - 8 bytes: magic "TOOLSGHT"
    /// - 4 bytes: version (u32 LE)
    /// - 32 bytes: catalog_hash
    /// - 8 bytes: num_records (u64 LE)
    /// - 8 bytes: embedding_dim (u64 LE)
    /// - N bytes: embeddings data (f32 LE, row-major)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error("create cache directory"))?;
        }

        let file = File::create(path).map_err(io_error("create cache file"))?;
        let mut writer = BufWriter::new(file);

        writer.write_all(CACHE_MAGIC).map_err(io_error("write header"))?;
        writer
            .write_all(&self.version.to_le_bytes())
            .map_err(io_error("write header"))?;
        writer
            .write_all(&self.catalog_hash)
            .map_err(io_error("write header"))?;
        writer
            .write_all(&(self.num_records as u64).to_le_bytes())
            .map_err(io_error("write header"))?;
        writer
            .write_all(&(self.embedding_dim as u64).to_le_bytes())
            .map_err(io_error("write header"))?;

        // `iter` walks logical (row-major) order regardless of memory layout.
        for &val in self.embeddings.iter() {
            writer
                .write_all(&val.to_le_bytes())
                .map_err(io_error("write embedding data"))?;
        }

        writer.flush().map_err(io_error("flush cache file"))?;

        tracing::info!(
            path = %path.display(),
            num_records = self.num_records,
            embedding_dim = self.embedding_dim,
            size_bytes = HEADER_LEN as usize + self.num_records * self.embedding_dim * 4,
            "Embeddings cache saved"
        );

        Ok(())
    }

    /// Load cache from binary file.
    ///
    /// Returns None if the file doesn't exist, has a foreign magic/version, or
    /// its header disagrees with the file length.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Cache file does not exist");
            return Ok(None);
        }

        let file = File::open(path).map_err(io_error("open cache file"))?;
        let file_len = file
            .metadata()
            .map_err(io_error("read cache metadata"))?
            .len();
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        if reader.read_exact(&mut magic).is_err() || &magic != CACHE_MAGIC {
            tracing::warn!(path = %path.display(), "Invalid cache magic, ignoring");
            return Ok(None);
        }

        let version = u32::from_le_bytes(read_array(&mut reader, "version")?);
        if version != CACHE_VERSION {
            tracing::warn!(
                path = %path.display(),
                cache_version = version,
                expected_version = CACHE_VERSION,
                "Cache version mismatch, ignoring"
            );
            return Ok(None);
        }

        let catalog_hash: [u8; 32] = read_array(&mut reader, "catalog hash")?;
        let num_records = u64::from_le_bytes(read_array(&mut reader, "num_records")?) as usize;
        let embedding_dim = u64::from_le_bytes(read_array(&mut reader, "embedding_dim")?) as usize;

        // The body must be exactly num_records * embedding_dim floats.
        let body_len = (num_records as u64)
            .checked_mul(embedding_dim as u64)
            .and_then(|floats| floats.checked_mul(4));
        if body_len.and_then(|len| len.checked_add(HEADER_LEN)) != Some(file_len) {
            tracing::warn!(
                path = %path.display(),
                num_records,
                embedding_dim,
                file_len,
                "Cache header does not match file size, ignoring"
            );
            return Ok(None);
        }

        let total_floats = num_records * embedding_dim;
        let mut data = Vec::with_capacity(total_floats);
        for _ in 0..total_floats {
            data.push(f32::from_le_bytes(read_array(&mut reader, "embedding data")?));
        }

        let embeddings = Array2::from_shape_vec((num_records, embedding_dim), data)
            .map_err(|e| AppError::CacheError(format!("Failed to reshape embeddings: {}", e)))?;

        tracing::info!(
            path = %path.display(),
            num_records,
            embedding_dim,
            "Embeddings cache loaded"
        );

        Ok(Some(Self {
            version,
            catalog_hash,
            num_records,
            embedding_dim,
            embeddings,
        }))
    }

    /// Check if cache is valid for the given embedder and catalog.
    pub fn is_valid_for(&self, model_id: &str, dimension: usize, records: &[ToolRecord]) -> bool {
        self.catalog_hash == Self::compute_catalog_hash(model_id, records)
            && self.num_records == records.len()
            && self.embedding_dim == dimension
    }
}

fn io_error(action: &'static str) -> impl Fn(std::io::Error) -> AppError {
    move |e| AppError::CacheError(format!("Failed to {}: {}", action, e))
}

fn read_array<const N: usize>(reader: &mut impl Read, field: &str) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| AppError::CacheError(format!("Failed to read {}: {}", field, e)))?;
    Ok(bytes)
}

/// Try to load embeddings from cache, validating against the current catalog.
///
/// Returns Some(embeddings) on a cache hit. Corrupt files are a miss.
pub fn try_load_embeddings_cache(
    cache_path: &Path,
    model_id: &str,
    dimension: usize,
    records: &[ToolRecord],
) -> Option<Array2<f32>> {
    match EmbeddingsCache::load(cache_path) {
        Ok(Some(cache)) if cache.is_valid_for(model_id, dimension, records) => {
            tracing::info!("Using cached embeddings (cache hit)");
            Some(cache.embeddings)
        }
        Ok(Some(_)) => {
            tracing::info!("Cache invalid (catalog or model changed), will recompute");
            None
        }
        Ok(None) => {
            tracing::info!("No cache found, will compute embeddings");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable embeddings cache, will recompute");
            None
        }
    }
}

/// Save computed embeddings to cache. Failures are logged, never fatal.
pub fn save_embeddings_cache(
    cache_path: &Path,
    model_id: &str,
    records: &[ToolRecord],
    embeddings: &Array2<f32>,
) {
    let cache = EmbeddingsCache::new(model_id, records, embeddings.clone());
    if let Err(e) = cache.save(cache_path) {
        tracing::warn!(path = %cache_path.display(), error = %e, "Failed to write embeddings cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_record(name: &str, desc: &str) -> ToolRecord {
        ToolRecord {
            name: name.to_string(),
            description: desc.to_string(),
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
    fn test_hash_changes_with_catalog_and_model() {
        let records1 = vec![make_record("tool1", "desc1")];
        let records2 = vec![make_record("tool1", "desc2")];

        let base = EmbeddingsCache::compute_catalog_hash("m", &records1);
        assert_ne!(base, EmbeddingsCache::compute_catalog_hash("m", &records2));
        assert_ne!(base, EmbeddingsCache::compute_catalog_hash("other", &records1));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("nested").join("embeddings.bin");

        let records = vec![make_record("tool1", "desc1"), make_record("tool2", "desc2")];
        let embeddings =
            Array2::from_shape_vec((2, 4), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();

        EmbeddingsCache::new("m", &records, embeddings.clone())
            .save(&cache_path)
            .unwrap();

        let loaded = EmbeddingsCache::load(&cache_path).unwrap().unwrap();

        assert_eq!(loaded.num_records, 2);
        assert_eq!(loaded.embedding_dim, 4);
        assert_eq!(loaded.embeddings, embeddings);
        assert!(loaded.is_valid_for("m", 4, &records));
        assert!(!loaded.is_valid_for("m", 8, &records));
    }

    #[test]
    fn test_cache_invalidation() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.bin");

        let records1 = vec![make_record("tool1", "desc1")];
        let records2 = vec![make_record("tool2", "desc2")];
        let embeddings = Array2::from_shape_vec((1, 4), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        save_embeddings_cache(&cache_path, "m", &records1, &embeddings);

        assert!(try_load_embeddings_cache(&cache_path, "m", 4, &records1).is_some());
        assert!(try_load_embeddings_cache(&cache_path, "m", 4, &records2).is_none());
    }

    #[test]
    fn test_foreign_file_is_miss() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.bin");
        fs::write(&cache_path, b"not a cache").unwrap();

        assert!(EmbeddingsCache::load(&cache_path).unwrap().is_none());
    }

    #[test]
    fn test_truncated_file_is_miss() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.bin");
        let records = vec![make_record("tool1", "desc1")];
        let embeddings = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        save_embeddings_cache(&cache_path, "m", &records, &embeddings);

        let bytes = fs::read(&cache_path).unwrap();
        fs::write(&cache_path, &bytes[..bytes.len() - 2]).unwrap();

        assert!(EmbeddingsCache::load(&cache_path).unwrap().is_none());
        assert!(try_load_embeddings_cache(&cache_path, "m", 2, &records).is_none());
    }

    #[test]
    fn test_oversized_header_is_miss() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.bin");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(CACHE_MAGIC);
        bytes.extend_from_slice(&CACHE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.extend_from_slice(&(1u64 << 31).to_le_bytes());
        bytes.extend_from_slice(&(1u64 << 31).to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        fs::write(&cache_path, &bytes).unwrap();

        assert!(EmbeddingsCache::load(&cache_path).unwrap().is_none());

        let records = vec![make_record("tool1", "desc1")];
        assert!(try_load_embeddings_cache(&cache_path, "m", 2, &records).is_none());
    }
}
