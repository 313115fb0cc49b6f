//! Side-by-side feature comparison between named tools.

use crate::catalog::{Catalog, ToolRecord};
use crate::error::{AppError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Fewest tools a comparison accepts.
pub const MIN_COMPARE: usize = 2;

/// Most tools a comparison accepts.
pub const MAX_COMPARE: usize = 4;

/// Reported for every tool; the catalog carries no skill-level data.
pub const TECHNICAL_LEVEL: &str = "Intermediate";

/// Value used when a rating sentence cannot be parsed.
pub const DEFAULT_RATING: f64 = 0.0;

/// How a feature flag is derived from a record.
#[derive(Debug, Clone, Copy)]
pub enum FeatureRule {
    /// Any alias appears, ignoring case, in `key_features`.
    KeywordsInKeyFeatures(&'static [&'static str]),
    /// `compatibility_integration` is non-blank.
    HasCompatibilityInfo,
}

#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub label: &'static str,
    pub rule: FeatureRule,
}

impl Feature {
    pub fn detect(&self, record: &ToolRecord) -> bool {
        match self.rule {
            FeatureRule::KeywordsInKeyFeatures(aliases) => {
                let haystack = record.key_features.to_lowercase();
                aliases.iter().any(|alias| haystack.contains(alias))
            }
            FeatureRule::HasCompatibilityInfo => {
                !record.compatibility_integration.trim().is_empty()
            }
        }
    }
}

/// Ordered feature taxonomy. Aliases are lowercase.
pub const FEATURE_TAXONOMY: &[Feature] = &[
    Feature {
        label: "App Integrations",
        rule: FeatureRule::HasCompatibilityInfo,
    },
    Feature {
        label: "Workflow Automation",
        rule: FeatureRule::KeywordsInKeyFeatures(&["automation", "workflow"]),
    },
    Feature {
        label: "Triggers and Actions",
        rule: FeatureRule::KeywordsInKeyFeatures(&["trigger", "action"]),
    },
    Feature {
        label: "AI-powered Suggestions",
        rule: FeatureRule::KeywordsInKeyFeatures(&["suggestion", "recommendation", "ai-powered"]),
    },
    Feature {
        label: "AI Writing Assistance",
        rule: FeatureRule::KeywordsInKeyFeatures(&["writing", "copywriting", "content generation"]),
    },
    Feature {
        label: "Database Management",
        rule: FeatureRule::KeywordsInKeyFeatures(&["database", "spreadsheet", "data management"]),
    },
    Feature {
        label: "Project Tracking",
        rule: FeatureRule::KeywordsInKeyFeatures(&["project", "task", "tracking"]),
    },
    Feature {
        label: "Team Collaboration",
        rule: FeatureRule::KeywordsInKeyFeatures(&["collaboration", "team", "sharing"]),
    },
];

/// A resolved catalog record with its parsed rating.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDetails<'a> {
    pub record: &'a ToolRecord,
    pub rating: f64,
}

/// Attributes reported for one tool in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolComparison {
    pub pricing: String,
    pub rating: f64,
    pub technical_level: &'static str,
    pub use_cases: String,
    /// One flag per `FEATURE_TAXONOMY` entry, in taxonomy order.
    pub features: Vec<(&'static str, bool)>,
}

impl ToolComparison {
    fn from_details(details: &ToolDetails<'_>) -> Self {
        let record = details.record;
        Self {
            pricing: record.pricing.clone(),
            rating: details.rating,
            technical_level: TECHNICAL_LEVEL,
            use_cases: use_cases(record),
            features: FEATURE_TAXONOMY
                .iter()
                .map(|feature| (feature.label, feature.detect(record)))
                .collect(),
        }
    }

    pub fn feature(&self, label: &str) -> Option<bool> {
        self.features
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| *value)
    }
}

impl Serialize for ToolComparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.features.len()))?;
        map.serialize_entry("pricing", &self.pricing)?;
        map.serialize_entry("rating", &self.rating)?;
        map.serialize_entry("technical_level", self.technical_level)?;
        map.serialize_entry("use_cases", &self.use_cases)?;
        for (label, value) in &self.features {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Resolved tool name to its attributes, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    entries: Vec<(String, ToolComparison)>,
}

impl ComparisonResult {
    pub fn get(&self, name: &str) -> Option<&ToolComparison> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, comparison) in &self.entries {
            map.serialize_entry(name, comparison)?;
        }
        map.end()
    }
}

/// Parse a rating sentence such as "Rated 4.5 out of 5".
///
/// Reads the second whitespace-separated token as a number rounded to one
/// decimal place, with ties rounded away from zero ("Rated 4.25" gives 4.3).
/// Anything else yields `DEFAULT_RATING`.
pub fn parse_rating(raw: &str) -> f64 {
    let parsed = raw
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite());

    match parsed {
        Some(value) => (value * 10.0).round() / 10.0,
        None => {
            tracing::debug!(raw, "Unparseable rating, using default");
            DEFAULT_RATING
        }
    }
}

/// "main, sub, audience", skipping blank parts.
fn use_cases(record: &ToolRecord) -> String {
    [
        record.main_category.as_str(),
        record.sub_category.as_str(),
        record.who_should_use.as_str(),
    ]
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Look up a tool by case-insensitive name substring and parse its rating.
pub fn get_tool_details<'a>(catalog: &'a Catalog, name: &str) -> Option<ToolDetails<'a>> {
    catalog.find_by_name(name).map(|record| ToolDetails {
        record,
        rating: parse_rating(&record.ratings_raw),
    })
}

/// Compare exactly two tools.
pub fn compare(catalog: &Catalog, name1: &str, name2: &str) -> Result<ComparisonResult> {
    compare_many(catalog, &[name1, name2])
}

/// Compare two to four tools, failing on the first name that does not resolve.
///
/// Keys are the resolved catalog names. Two queries resolving to the same
/// tool produce a single entry.
///
/// # Errors
/// `InvalidSelectionError` for fewer than two or more than four names;
/// `ToolNotFoundError` for the first unknown name.
pub fn compare_many<S: AsRef<str>>(catalog: &Catalog, names: &[S]) -> Result<ComparisonResult> {
    if !(MIN_COMPARE..=MAX_COMPARE).contains(&names.len()) {
        return Err(AppError::InvalidSelectionError(format!(
            "Select between {} and {} tools to compare, got {}",
            MIN_COMPARE,
            MAX_COMPARE,
            names.len()
        )));
    }

    let mut result = ComparisonResult::default();

    for name in names {
        let name = name.as_ref();
        let details = get_tool_details(catalog, name)
            .ok_or_else(|| AppError::ToolNotFoundError(name.to_string()))?;

        if result.get(&details.record.name).is_none() {
            result.entries.push((
                details.record.name.clone(),
                ToolComparison::from_details(&details),
            ));
        }
    }

    Ok(result)
}
