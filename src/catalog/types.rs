//! Type definitions for the catalog module.

use serde::{Deserialize, Serialize};

/// One row of the tool catalog.
///
/// Every field is free text exactly as it appears in the source file. `name`
/// is the external lookup key and is never empty once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main_category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub who_should_use: String,
    #[serde(default)]
    pub pricing: String,
    /// Semi-structured rating sentence, e.g. "Rated 4.5 out of 5".
    #[serde(default, alias = "ratings")]
    pub ratings_raw: String,
    #[serde(default)]
    pub key_features: String,
    /// Comma-separated clauses.
    #[serde(default)]
    pub pros: String,
    /// Comma-separated clauses.
    #[serde(default)]
    pub cons: String,
    #[serde(default)]
    pub compatibility_integration: String,
}

/// The catalog columns a source file must provide, in `ToolRecord` field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogColumn {
    Name,
    Description,
    MainCategory,
    SubCategory,
    WhoShouldUse,
    Pricing,
    Ratings,
    KeyFeatures,
    Pros,
    Cons,
    CompatibilityIntegration,
}

impl CatalogColumn {
    pub const ALL: [CatalogColumn; 11] = [
        CatalogColumn::Name,
        CatalogColumn::Description,
        CatalogColumn::MainCategory,
        CatalogColumn::SubCategory,
        CatalogColumn::WhoShouldUse,
        CatalogColumn::Pricing,
        CatalogColumn::Ratings,
        CatalogColumn::KeyFeatures,
        CatalogColumn::Pros,
        CatalogColumn::Cons,
        CatalogColumn::CompatibilityIntegration,
    ];

    /// Header text used in tabular catalog exports.
    pub fn header(self) -> &'static str {
        match self {
            CatalogColumn::Name => "Name",
            CatalogColumn::Description => "Description",
            CatalogColumn::MainCategory => "Main Category",
            CatalogColumn::SubCategory => "Sub Category",
            CatalogColumn::WhoShouldUse => "Who Should Use",
            CatalogColumn::Pricing => "Pricing",
            CatalogColumn::Ratings => "Ratings",
            CatalogColumn::KeyFeatures => "Key Features",
            CatalogColumn::Pros => "Pros",
            CatalogColumn::Cons => "Cons",
            CatalogColumn::CompatibilityIntegration => "Compatibility and Integration",
        }
    }

    /// Whether a raw header cell names this column.
    ///
    /// Comparison ignores case, surrounding whitespace, and treats `_` as a space.
    pub fn matches(self, header: &str) -> bool {
        normalize_header(header) == normalize_header(self.header())
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_matching_is_lenient() {
        assert!(CatalogColumn::MainCategory.matches("main_category"));
        assert!(CatalogColumn::MainCategory.matches("  Main   Category "));
        assert!(CatalogColumn::Name.matches("\u{feff}Name"));
        assert!(!CatalogColumn::Pros.matches("Cons"));
    }
}
