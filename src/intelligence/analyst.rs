//! Heuristic SWOT analysis for a role or industry query.
//!
//! Candidate tools are found by case-insensitive substring search over four
//! descriptive fields; their pros and cons are turned into a four-bucket
//! Strengths/Weaknesses/Opportunities/Threats summary.

use crate::catalog::{Catalog, ToolRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Number of leading catalog records used when nothing matches the query.
const FALLBACK_TOOLS: usize = 10;

/// Maximum candidate tools considered per query.
const MAX_CANDIDATES: usize = 8;

/// Clauses taken from each tool's pros/cons.
const CLAUSES_PER_TOOL: usize = 2;

/// Maximum entries per SWOT bucket.
const MAX_BUCKET_ENTRIES: usize = 5;

/// Characters of `who_should_use` quoted in an opportunity.
const AUDIENCE_PREVIEW_CHARS: usize = 100;

/// Separator between clauses in `pros` and `cons`.
const CLAUSE_DELIMITER: char = ',';

/// Four fixed buckets, each at most five unique, non-blank entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwotResult {
    #[serde(rename = "Strengths")]
    pub strengths: Vec<String>,
    #[serde(rename = "Weaknesses")]
    pub weaknesses: Vec<String>,
    #[serde(rename = "Opportunities")]
    pub opportunities: Vec<String>,
    #[serde(rename = "Threats")]
    pub threats: Vec<String>,
}

/// Fields searched for the role query.
#[derive(Debug, Clone, Copy)]
enum SearchField {
    WhoShouldUse,
    MainCategory,
    SubCategory,
    Description,
}

const SEARCH_FIELDS: [SearchField; 4] = [
    SearchField::WhoShouldUse,
    SearchField::MainCategory,
    SearchField::SubCategory,
    SearchField::Description,
];

impl SearchField {
    fn value(self, record: &ToolRecord) -> &str {
        match self {
            SearchField::WhoShouldUse => &record.who_should_use,
            SearchField::MainCategory => &record.main_category,
            SearchField::SubCategory => &record.sub_category,
            SearchField::Description => &record.description,
        }
    }
}

/// True if any search field contains `needle`. `needle` must be lowercase.
fn matches_role(record: &ToolRecord, needle: &str) -> bool {
    SEARCH_FIELDS
        .iter()
        .any(|field| field.value(record).to_lowercase().contains(needle))
}

/// Matching records in catalog order, or the first ten when none match.
/// Capped at eight either way.
fn select_candidates<'a>(catalog: &'a Catalog, role_query: &str) -> Vec<&'a ToolRecord> {
    let needle = role_query.to_lowercase();

    let mut candidates: Vec<&ToolRecord> = catalog
        .all()
        .iter()
        .filter(|record| matches_role(record, &needle))
        .collect();

    if candidates.is_empty() {
        tracing::debug!(role_query, "No role match, falling back to general tools");
        candidates = catalog.all().iter().take(FALLBACK_TOOLS).collect();
    }

    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Leading non-empty trimmed clauses of a delimited field.
fn leading_clauses(field: &str) -> Vec<&str> {
    field
        .split(CLAUSE_DELIMITER)
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .take(CLAUSES_PER_TOOL)
        .collect()
}

/// Drop duplicates and blanks (first occurrence wins) and keep five.
fn finalize_bucket(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .filter(|entry| seen.insert(entry.clone()))
        .take(MAX_BUCKET_ENTRIES)
        .collect()
}

/// Build a SWOT summary for tools relevant to `role_query`.
///
/// Matching ignores case. An unmatched query falls back to the first ten
/// catalog tools; an empty catalog yields four empty buckets.
pub fn analyze(catalog: &Catalog, role_query: &str) -> SwotResult {
    let candidates = select_candidates(catalog, role_query);

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut opportunities = Vec::new();
    let mut threats = Vec::new();

    for tool in &candidates {
        let pros = leading_clauses(&tool.pros);
        let cons = leading_clauses(&tool.cons);

        strengths.extend(pros.iter().map(|clause| format!("{}: {}", tool.name, clause)));
        weaknesses.extend(cons.iter().map(|clause| format!("{}: {}", tool.name, clause)));

        let audience: String = tool
            .who_should_use
            .chars()
            .take(AUDIENCE_PREVIEW_CHARS)
            .collect();
        opportunities.push(format!(
            "Leverage {} for {} - ideal for {}",
            tool.name, tool.main_category, audience
        ));

        if let Some(first_con) = cons.first() {
            threats.push(format!("{} limitation: {}", tool.name, first_con));
        }
    }

    tracing::debug!(
        role_query,
        candidates = candidates.len(),
        "SWOT analysis complete"
    );

    SwotResult {
        strengths: finalize_bucket(strengths),
        weaknesses: finalize_bucket(weaknesses),
        opportunities: finalize_bucket(opportunities),
        threats: finalize_bucket(threats),
    }
}
