//! Output serialization for geocoded features and failed rows.
//!
//! Two files per category: `{category}_geo.json` (a `GeoJSON`
//! `FeatureCollection`) and `{category}_fail.csv` (the failed input rows,
//! same column layout as the flattened table). The two writes are not
//! atomic with respect to each other.

use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection};
use theft_map_incident_models::{IncidentCategory, IncidentRecord};

use crate::PipelineError;

/// Wraps the features into a single `FeatureCollection` and writes it to
/// `{data_dir}/{category}_geo.json`. Non-ASCII text is written verbatim,
/// not escaped. Returns the output path.
///
/// # Errors
///
/// Returns [`PipelineError`] if serialization or the file write fails.
pub fn write_feature_collection(
    data_dir: &Path,
    category: IncidentCategory,
    features: Vec<Feature>,
) -> Result<PathBuf, PipelineError> {
    let output_path = data_dir.join(format!("{category}_geo.json"));

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let json = serde_json::to_string(&collection)?;
    std::fs::write(&output_path, json)?;

    log::info!(
        "{category}: wrote {} features to {}",
        collection.features.len(),
        output_path.display()
    );
    Ok(output_path)
}

/// Dumps the failed rows to `{data_dir}/{category}_fail.csv`, unchanged
/// from the input. Writes nothing and returns `Ok(None)` when there are no
/// failures.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be written.
pub fn write_failures(
    data_dir: &Path,
    category: IncidentCategory,
    failures: &[IncidentRecord],
) -> Result<Option<PathBuf>, PipelineError> {
    if failures.is_empty() {
        return Ok(None);
    }

    let output_path = data_dir.join(format!("{category}_fail.csv"));

    let mut writer = csv::Writer::from_path(&output_path)?;
    for record in failures {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::info!(
        "{category}: wrote {} failed rows to {}",
        failures.len(),
        output_path.display()
    );
    Ok(Some(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_feature;
    use theft_map_geocoder::GeocodedPoint;

    fn record(id: &str) -> IncidentRecord {
        IncidentRecord {
            id: id.to_string(),
            date: "1120315".to_string(),
            time_slot: "08~10".to_string(),
            address: "臺北市大安區住安里四維路124巷1~30號".to_string(),
        }
    }

    #[test]
    fn feature_collection_preserves_non_ascii() {
        let tmp = std::env::temp_dir().join("theft_map_writer_test_geo");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let features = vec![point_feature(
            GeocodedPoint { x: 121.55, y: 25.03 },
            IncidentCategory::House,
            &record("A0001"),
        )];
        let path = write_feature_collection(&tmp, IncidentCategory::House, features).unwrap();
        assert!(path.ends_with("house_geo.json"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("FeatureCollection"));
        assert!(contents.contains("臺北市大安區住安里四維路124巷1~30號"));
        assert!(!contents.contains("\\u"));

        let parsed: geojson::GeoJson = contents.parse().unwrap();
        let geojson::GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.features.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_failures_writes_no_file() {
        let tmp = std::env::temp_dir().join("theft_map_writer_test_nofail");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let written = write_failures(&tmp, IncidentCategory::Bike, &[]).unwrap();
        assert!(written.is_none());
        assert!(!tmp.join("bike_fail.csv").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failures_dump_original_rows() {
        let tmp = std::env::temp_dir().join("theft_map_writer_test_fail");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let failures = vec![record("A0001"), record("A0002")];
        let path = write_failures(&tmp, IncidentCategory::Car, &failures)
            .unwrap()
            .unwrap();
        assert!(path.ends_with("car_fail.csv"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "編號,發生日期,發生時段,發生地點");
        assert_eq!(lines.clone().count(), 2);
        assert!(lines.next().unwrap().starts_with("A0001,"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
