#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Theft incident record types and the category taxonomy.
//!
//! The upstream open-data portal publishes one dataset per theft category
//! (bicycle, residential, vehicle, motorcycle), each as JSON arrays of
//! incident rows keyed by the portal's original field labels. This crate
//! defines the canonical in-memory representation shared by the loader,
//! geocoder, and pipeline crates.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Theft incident category, one per source dataset.
///
/// The lowercase name doubles as the on-disk naming convention: raw records
/// live under `{data_dir}/{category}/*.json` and outputs are written as
/// `{category}_data.csv`, `{category}_geo.json`, and `{category}_fail.csv`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentCategory {
    /// Bicycle theft
    Bike,
    /// Residential burglary
    House,
    /// Automobile theft
    Car,
    /// Motorcycle theft
    Cycle,
}

impl IncidentCategory {
    /// Returns all categories in the fixed processing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bike, Self::House, Self::Car, Self::Cycle]
    }
}

/// One theft incident row as published by the open-data portal.
///
/// Field names map the portal's original Chinese labels. The portal's
/// internal housekeeping columns (`_id`, `_importdate`) are ignored on
/// deserialization. Records are immutable once loaded: each one either
/// becomes a geocoded feature or lands in the failure log, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Portal-assigned unique record key.
    #[serde(rename = "編號", deserialize_with = "string_or_number")]
    pub id: String,
    /// Date of occurrence, as published (ROC calendar, e.g. `1120315`).
    #[serde(rename = "發生日期", deserialize_with = "string_or_number")]
    pub date: String,
    /// Time slot of occurrence (e.g. `08~10`).
    #[serde(rename = "發生時段", deserialize_with = "string_or_number")]
    pub time_slot: String,
    /// Free-text incident address.
    #[serde(rename = "發生地點")]
    pub address: String,
}

/// Properties attached to a geocoded output feature.
///
/// Serializes to the `{type, date, time, address}` properties bag of the
/// published `GeoJSON` features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Lowercase category name.
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    /// Date of occurrence, verbatim from the record.
    pub date: String,
    /// Time slot, verbatim from the record.
    pub time: String,
    /// The address that was geocoded, verbatim from the record.
    pub address: String,
}

impl FeatureProperties {
    /// Builds the properties bag for a record in the given category.
    #[must_use]
    pub fn from_record(category: IncidentCategory, record: &IncidentRecord) -> Self {
        Self {
            category,
            date: record.date.clone(),
            time: record.time_slot.clone(),
            address: record.address.clone(),
        }
    }
}

/// Deserializes a field that the portal emits as either a JSON string or a
/// bare number (date and time-slot columns vary between dataset vintages).
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl Visitor<'_> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
