//! Catalog Store: the immutable, ordered set of tool records.
//!
//! Loaded once at startup and shared read-only by every query operation.

pub mod loader;
pub mod types;

pub use loader::load_catalog;
pub use types::{CatalogColumn, ToolRecord};

use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ToolRecord>,
}

impl Catalog {
    pub fn new(records: Vec<ToolRecord>) -> Self {
        Self { records }
    }

    /// Load the catalog from a CSV or JSON export.
    pub fn load(path: &Path) -> Result<Self> {
        load_catalog(path).map(Self::new)
    }

    /// All records in catalog order.
    pub fn all(&self) -> &[ToolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose name contains `query`, ignoring case.
    ///
    /// Substring containment, not equality: "monica" resolves to "Monica AI".
    /// When several names match, catalog order decides.
    pub fn find_by_name(&self, query: &str) -> Option<&ToolRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .find(|record| record.name.to_lowercase().contains(&needle))
    }
}
