#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding client for theft map data.
//!
//! Converts free-text incident addresses to longitude/latitude coordinates
//! via the `ArcGIS` World Geocoding Service single-line endpoint. One HTTP
//! GET per address, no API key required.
//!
//! Lookups never retry: a failed request is final for that address in that
//! run. Failures are classified into [`GeocodeError`] kinds (timeout,
//! transport, parse) at this boundary even though callers currently treat
//! them all the same, so they can be differentiated later without changing
//! the contract.

pub mod arcgis;
pub mod progress;

use thiserror::Error;

/// A geocoded coordinate pair as returned by the service, in the requested
/// spatial reference (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodedPoint {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

/// Errors from a single geocode lookup.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The request exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// Transport failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Response payload was missing or malformed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}
