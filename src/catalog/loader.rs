//! Catalog loading from tabular (CSV) or JSON exports.
//!
//! Rows are validated into `ToolRecord`s once at startup. Structural problems
//! (unreadable file, missing columns) fail the whole load; individual rows
//! without a name are logged and skipped.

use crate::catalog::types::{CatalogColumn, ToolRecord};
use crate::error::{AppError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load every tool record from `path`, choosing the parser by file extension.
///
/// # Errors
/// Returns `AppError::DataLoadError` if the file is missing, unparseable,
/// lacks a required column, or if every row was rejected.
pub fn load_catalog(path: &Path) -> Result<Vec<ToolRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        other => {
            return Err(AppError::DataLoadError(format!(
                "Unsupported catalog format '{}' for {}",
                other,
                path.display()
            )))
        }
    };

    let total = rows.len();
    let records = retain_named(rows);

    if records.is_empty() && total > 0 {
        return Err(AppError::DataLoadError(
            "All catalog rows were rejected (no tool names)".into(),
        ));
    }

    tracing::info!(
        path = %path.display(),
        total,
        loaded = records.len(),
        "Tool catalog loaded"
    );

    Ok(records)
}

/// Parse a CSV export with a header row.
fn read_csv(path: &Path) -> Result<Vec<ToolRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            AppError::DataLoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::DataLoadError(format!("Failed to read CSV header: {}", e)))?
        .clone();

    let positions = resolve_columns(headers.iter())?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = result.map_err(|e| {
            AppError::DataLoadError(format!("Malformed CSV row {}: {}", line + 1, e))
        })?;
        let cell = |column: CatalogColumn| -> String {
            row.get(positions[column as usize])
                .unwrap_or("")
                .trim()
                .to_string()
        };

        rows.push(ToolRecord {
            name: cell(CatalogColumn::Name),
            description: cell(CatalogColumn::Description),
            main_category: cell(CatalogColumn::MainCategory),
            sub_category: cell(CatalogColumn::SubCategory),
            who_should_use: cell(CatalogColumn::WhoShouldUse),
            pricing: cell(CatalogColumn::Pricing),
            ratings_raw: cell(CatalogColumn::Ratings),
            key_features: cell(CatalogColumn::KeyFeatures),
            pros: cell(CatalogColumn::Pros),
            cons: cell(CatalogColumn::Cons),
            compatibility_integration: cell(CatalogColumn::CompatibilityIntegration),
        });
    }

    Ok(rows)
}

/// Parse a JSON array of records.
fn read_json(path: &Path) -> Result<Vec<ToolRecord>> {
    let file = File::open(path).map_err(|e| {
        AppError::DataLoadError(format!("Failed to open {}: {}", path.display(), e))
    })?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::DataLoadError(format!("Invalid JSON catalog: {}", e)))
}

/// Map every required column to its position in the header row.
///
/// The returned vector is indexed by `CatalogColumn as usize`.
fn resolve_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Result<Vec<usize>> {
    let headers: Vec<&str> = headers.collect();

    let mut positions = Vec::with_capacity(CatalogColumn::ALL.len());
    let mut missing = Vec::new();

    for column in CatalogColumn::ALL {
        match headers.iter().position(|h| column.matches(h)) {
            Some(idx) => positions.push(idx),
            None => {
                missing.push(column.header());
                positions.push(usize::MAX);
            }
        }
    }

    if !missing.is_empty() {
        return Err(AppError::DataLoadError(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    Ok(positions)
}

/// Drop rows without a usable name, keeping catalog order.
fn retain_named(rows: Vec<ToolRecord>) -> Vec<ToolRecord> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, mut record)| {
            record.name = record.name.trim().to_string();
            if record.name.is_empty() {
                tracing::warn!(row = idx, "Skipping catalog row without a tool name");
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const HEADER: &str = "Name,Description,Main Category,Sub Category,Who Should Use,Pricing,Ratings,Key Features,Pros,Cons,Compatibility and Integration";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_preserves_order_and_fields() {
        let dir = tempdir().unwrap();
        let csv = format!(
            "{}\n{}\n{}\n",
            HEADER,
            r#"Zapier,"Connect apps, automate work",Automation,Integrations,Small businesses,Freemium,Rated 4.7 out of 5,"Workflow automation, triggers","Easy setup, Many apps","Pricey, Complex zaps",Slack; Gmail"#,
            r#"Notion,Docs and wikis,Productivity,Notes,Teams,Free,Rated 4.6 out of 5,Database views,Flexible,Steep learning curve,"#
        );
        let path = write_file(&dir, "tools.csv", &csv);

        let records = load_catalog(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Zapier");
        assert_eq!(records[0].description, "Connect apps, automate work");
        assert_eq!(records[0].ratings_raw, "Rated 4.7 out of 5");
        assert_eq!(records[0].cons, "Pricey, Complex zaps");
        assert_eq!(records[1].name, "Notion");
        assert_eq!(records[1].compatibility_integration, "");
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "tools.csv", "Name,Description\nA,B\n");

        let err = load_catalog(&path).unwrap_err();
        match err {
            AppError::DataLoadError(msg) => {
                assert!(msg.contains("Main Category"));
                assert!(msg.contains("Pros"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let result = load_catalog(Path::new("/nonexistent/catalog.csv"));
        assert!(matches!(result, Err(AppError::DataLoadError(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "tools.xlsx", "");
        assert!(matches!(load_catalog(&path), Err(AppError::DataLoadError(_))));
    }

    #[test]
    fn test_header_only_file_is_empty_catalog() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "tools.csv", &format!("{}\n", HEADER));
        assert!(load_catalog(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unnamed_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let csv = format!("{}\n ,x,,,,,,,,,\nValid,y,,,,,,,,,\n", HEADER);
        let path = write_file(&dir, "tools.csv", &csv);

        let records = load_catalog(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Valid");
    }

    #[test]
    fn test_all_rows_unnamed_fails() {
        let dir = tempdir().unwrap();
        let csv = format!("{}\n,x,,,,,,,,,\n", HEADER);
        let path = write_file(&dir, "tools.csv", &csv);
        assert!(matches!(load_catalog(&path), Err(AppError::DataLoadError(_))));
    }

    #[test]
    fn test_load_json_catalog() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "tools.json",
            r#"[{"name": "Canva", "description": "Design tool", "ratings": "Rated 4.8 out of 5"}]"#,
        );

        let records = load_catalog(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ratings_raw, "Rated 4.8 out of 5");
        assert_eq!(records[0].pros, "");
    }

    #[test]
    fn test_json_without_name_is_data_load_error() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "tools.json", r#"[{"description": "nameless"}]"#);
        assert!(matches!(load_catalog(&path), Err(AppError::DataLoadError(_))));
    }
}
