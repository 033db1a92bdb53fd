#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch geocoding pipeline for theft incident records.
//!
//! Per category: load and flatten the raw records, fan out one geocode
//! lookup per row with bounded concurrency, then write the geocoded
//! features as a `GeoJSON` feature collection and the failed rows as a
//! CSV log.
//!
//! Rows are dispatched in fixed batches of [`BATCH_SIZE`]; the next batch
//! starts only after every row in the current one has resolved. Within a
//! batch at most [`MAX_CONCURRENT_REQUESTS`] lookups are in flight at any
//! instant. There is no retry: a failed lookup is final for that row in
//! that run.

pub mod writer;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt as _};
use geojson::{Feature, Geometry};
use theft_map_geocoder::progress::ProgressCallback;
use theft_map_geocoder::{GeocodeError, GeocodedPoint, arcgis};
use theft_map_incident_models::{FeatureProperties, IncidentCategory, IncidentRecord};
use theft_map_loader::LoaderError;

/// Rows dispatched per batch.
pub const BATCH_SIZE: usize = 100;

/// Peak concurrent lookups against the geocoding endpoint.
pub const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Connect and total deadline for each lookup request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that abort a category run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Loading or flattening the raw records failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// The shared HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Output serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the failure log failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one geocode attempt.
///
/// Each lookup future resolves to a tagged outcome; the coordinator
/// partitions them after every batch. This keeps failure bookkeeping local
/// to the run instead of a shared mutable list, so two categories can
/// never leak rows into each other.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The row geocoded; carries the output feature.
    Geocoded(Box<Feature>),
    /// The lookup failed or matched nothing; carries the original row.
    Failed(IncidentRecord),
}

/// Everything one category run produced.
#[derive(Debug, Default)]
pub struct CategoryOutcome {
    /// Geocoded features, in completion order (not input order).
    pub features: Vec<Feature>,
    /// Rows whose lookup failed, unchanged from the input.
    pub failures: Vec<IncidentRecord>,
}

impl CategoryOutcome {
    fn absorb(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Geocoded(feature) => self.features.push(*feature),
            FetchOutcome::Failed(record) => self.failures.push(record),
        }
    }

    /// Total rows accounted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len() + self.failures.len()
    }

    /// Whether no rows have been processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary of a completed category run.
#[derive(Debug)]
pub struct CategorySummary {
    /// The category that was processed.
    pub category: IncidentCategory,
    /// Input row count.
    pub total: usize,
    /// Rows that produced a feature.
    pub geocoded: usize,
    /// Rows that landed in the failure log.
    pub failed: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Builds the HTTP client shared by every lookup in a category run.
///
/// # Errors
///
/// Returns [`PipelineError::Http`] if the TLS backend fails to initialize.
pub fn build_client() -> Result<reqwest::Client, PipelineError> {
    Ok(reqwest::Client::builder()
        .user_agent("theft-map/0.1")
        .connect_timeout(REQUEST_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Geocodes one row and advances the progress reporter exactly once,
/// success or failure. Failures keep the original row.
async fn fetch_feature(
    client: &reqwest::Client,
    category: IncidentCategory,
    record: IncidentRecord,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> FetchOutcome {
    let result =
        arcgis::find_address_candidates(client, arcgis::DEFAULT_ENDPOINT, &record.address).await;

    if let Some(p) = progress {
        p.inc(1);
    }

    match result {
        Ok(Some(point)) => FetchOutcome::Geocoded(Box::new(point_feature(point, category, &record))),
        Ok(None) => {
            log::debug!("{category}: no candidates for '{}'", record.address);
            FetchOutcome::Failed(record)
        }
        Err(GeocodeError::Timeout) => {
            log::warn!("{category}: lookup timed out for '{}'", record.address);
            FetchOutcome::Failed(record)
        }
        Err(e) => {
            log::warn!("{category}: lookup failed for '{}': {e}", record.address);
            FetchOutcome::Failed(record)
        }
    }
}

/// Builds the output feature for a successfully geocoded row.
fn point_feature(point: GeocodedPoint, category: IncidentCategory, record: &IncidentRecord) -> Feature {
    let properties = serde_json::to_value(FeatureProperties::from_record(category, record))
        .ok()
        .and_then(|value| value.as_object().cloned());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![point.x, point.y]))),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Drives concurrent lookups across all rows of a category table.
///
/// Rows are split into fixed chunks of [`BATCH_SIZE`]; each chunk's
/// futures are driven through a buffered stream capped at
/// [`MAX_CONCURRENT_REQUESTS`] and fully drained before the next chunk
/// starts. A timed-out or failed row never affects its siblings.
pub async fn geocode_records(
    client: &reqwest::Client,
    category: IncidentCategory,
    records: &[IncidentRecord],
    progress: Option<Arc<dyn ProgressCallback>>,
) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::default();

    for (batch_num, batch) in records.chunks(BATCH_SIZE).enumerate() {
        let results: Vec<FetchOutcome> = stream::iter(batch.iter().map(|record| {
            let record = record.clone();
            let progress = progress.clone();
            async move { fetch_feature(client, category, record, progress.as_ref()).await }
        }))
        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await;

        for result in results {
            outcome.absorb(result);
        }

        log::debug!(
            "{category}: batch {} complete ({}/{} rows resolved)",
            batch_num + 1,
            outcome.len(),
            records.len()
        );
    }

    outcome
}

/// Runs the full pipeline for one category: load, flatten, geocode, write.
///
/// # Errors
///
/// Returns [`PipelineError`] if the category has no input records, the
/// client cannot be built, or an output file cannot be written. Per-row
/// geocode failures are not errors; they land in the failure log.
pub async fn run_category(
    data_dir: &Path,
    category: IncidentCategory,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<CategorySummary, PipelineError> {
    let start = Instant::now();

    let records = theft_map_loader::load_category(data_dir, category)?;
    theft_map_loader::write_flattened(data_dir, category, &records)?;

    let total = records.len();
    if let Some(ref p) = progress {
        p.set_total(total as u64);
    }

    let client = build_client()?;
    let outcome = geocode_records(&client, category, &records, progress).await;

    let geocoded = outcome.features.len();
    let failed = outcome.failures.len();

    writer::write_feature_collection(data_dir, category, outcome.features)?;
    writer::write_failures(data_dir, category, &outcome.failures)?;

    let elapsed = start.elapsed();
    log::info!(
        "{category}: geocoded {geocoded}/{total} rows in {:.1}s ({failed} failed)",
        elapsed.as_secs_f64()
    );

    Ok(CategorySummary {
        category,
        total,
        geocoded,
        failed,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, address: &str) -> IncidentRecord {
        IncidentRecord {
            id: id.to_string(),
            date: "1120315".to_string(),
            time_slot: "08~10".to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn batches_split_at_fixed_size() {
        let records: Vec<IncidentRecord> = (0..250)
            .map(|i| record(&format!("R{i}"), "somewhere"))
            .collect();

        let sizes: Vec<usize> = records.chunks(BATCH_SIZE).map(<[_]>::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[test]
    fn every_outcome_lands_on_exactly_one_side() {
        let mut outcome = CategoryOutcome::default();

        for i in 0..7 {
            let rec = record(&format!("R{i}"), "四維路124巷");
            if i % 3 == 0 {
                outcome.absorb(FetchOutcome::Failed(rec));
            } else {
                outcome.absorb(FetchOutcome::Geocoded(Box::new(point_feature(
                    GeocodedPoint { x: 121.55, y: 25.03 },
                    IncidentCategory::House,
                    &rec,
                ))));
            }
        }

        assert_eq!(outcome.features.len(), 4);
        assert_eq!(outcome.failures.len(), 3);
        assert_eq!(outcome.len(), 7);
    }

    #[test]
    fn point_feature_carries_geometry_and_properties() {
        let rec = record("A0001", "臺北市大安區住安里四維路124巷1~30號");
        let feature = point_feature(
            GeocodedPoint { x: 121.55, y: 25.03 },
            IncidentCategory::House,
            &rec,
        );

        let Some(geometry) = &feature.geometry else {
            panic!("feature has no geometry");
        };
        let geojson::Value::Point(coordinates) = &geometry.value else {
            panic!("geometry is not a point");
        };
        assert!((coordinates[0] - 121.55).abs() < 1e-9);
        assert!((coordinates[1] - 25.03).abs() < 1e-9);

        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["type"], "house");
        assert_eq!(properties["date"], "1120315");
        assert_eq!(properties["time"], "08~10");
        assert_eq!(properties["address"], "臺北市大安區住安里四維路124巷1~30號");
    }

    #[test]
    fn failed_rows_keep_the_original_record() {
        let rec = record("A0002", "somewhere");
        let outcome = FetchOutcome::Failed(rec.clone());
        match outcome {
            FetchOutcome::Failed(kept) => assert_eq!(kept, rec),
            FetchOutcome::Geocoded(_) => panic!("expected a failure"),
        }
    }

    #[tokio::test]
    async fn coordinator_starts_each_run_empty() {
        let client = build_client().unwrap();

        // Two back-to-back runs over empty tables issue no requests and
        // share no state.
        let first =
            geocode_records(&client, IncidentCategory::House, &[], None).await;
        let second =
            geocode_records(&client, IncidentCategory::Car, &[], None).await;

        assert!(first.is_empty());
        assert!(second.is_empty());
    }
}
