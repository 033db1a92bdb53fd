#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw incident record discovery and flattening.
//!
//! The open-data portal exports each category as a directory of JSON files
//! (one per download batch), so a category's full table is the
//! concatenation of every `{data_dir}/{category}/*.json`. The flattened
//! table is persisted as `{category}_data.csv` for reuse by other tooling.

use std::path::{Path, PathBuf};

use theft_map_incident_models::{IncidentCategory, IncidentRecord};

/// Errors that can occur while loading or flattening raw records.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// I/O error (directory scan, file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file failed to parse as a JSON record array.
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying parse failure.
        source: serde_json::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No source files yielded any record for the category. Fatal: the
    /// category cannot be processed at all.
    #[error("no records found for category '{category}'")]
    NoData {
        /// The category whose directory was empty or missing.
        category: IncidentCategory,
    },
}

/// Loads every record for a category by concatenating all of its JSON
/// source files, read in sorted filename order.
///
/// # Errors
///
/// Returns [`LoaderError::NoData`] if no file yields any record, or the
/// underlying I/O / parse error if a file cannot be read.
pub fn load_category(
    data_dir: &Path,
    category: IncidentCategory,
) -> Result<Vec<IncidentRecord>, LoaderError> {
    let category_dir = data_dir.join(category.to_string());
    let mut records: Vec<IncidentRecord> = Vec::new();

    if category_dir.is_dir() {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&category_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let raw = std::fs::read(&path)?;
            let batch: Vec<IncidentRecord> =
                serde_json::from_slice(&raw).map_err(|source| LoaderError::Json {
                    path: path.clone(),
                    source,
                })?;
            log::debug!(
                "{category}: {} records from {}",
                batch.len(),
                path.display()
            );
            records.extend(batch);
        }
    }

    if records.is_empty() {
        return Err(LoaderError::NoData { category });
    }

    log::info!("{category}: loaded {} records", records.len());
    Ok(records)
}

/// Writes the flattened category table to `{data_dir}/{category}_data.csv`
/// with the record key as the first column. Returns the output path.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be written.
pub fn write_flattened(
    data_dir: &Path,
    category: IncidentCategory,
    records: &[IncidentRecord],
) -> Result<PathBuf, LoaderError> {
    let output_path = data_dir.join(format!("{category}_data.csv"));

    let mut writer = csv::Writer::from_path(&output_path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(output_path)
}
