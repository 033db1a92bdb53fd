//! `ArcGIS` World Geocoding Service client.
//!
//! Single-line address lookup via `findAddressCandidates`. The service is
//! free for search (no API key), returns up to [`MAX_LOCATIONS`] ranked
//! candidates, and the first candidate wins — no scoring or confidence
//! check is applied.
//!
//! See <https://developers.arcgis.com/rest/geocode/api-reference/geocoding-find-address-candidates.htm>

use crate::{GeocodeError, GeocodedPoint};

/// Default endpoint for the hosted World Geocoding Service.
pub const DEFAULT_ENDPOINT: &str =
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer/findAddressCandidates";

/// Maximum number of candidates requested per lookup.
pub const MAX_LOCATIONS: &str = "6";

/// Output spatial reference, sent as the literal JSON the service expects.
const OUT_SR: &str = r#"{"wkid":4326}"#;

/// Geocodes a single free-text address.
///
/// Returns `Ok(None)` when the service matches no candidates. The first
/// candidate's coordinate pair is returned otherwise.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request times out, the transport or
/// status fails, or the response payload is malformed.
pub async fn find_address_candidates(
    client: &reqwest::Client,
    base_url: &str,
    address: &str,
) -> Result<Option<GeocodedPoint>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("SingleLine", address),
            ("f", "json"),
            ("outSR", OUT_SR),
            ("maxLocations", MAX_LOCATIONS),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = resp.json().await?;
    parse_candidates(&body)
}

/// Parses a `findAddressCandidates` response body.
fn parse_candidates(body: &serde_json::Value) -> Result<Option<GeocodedPoint>, GeocodeError> {
    let candidates = body["candidates"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing candidates array".to_string(),
        })?;

    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let x = first["location"]["x"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing x coordinate".to_string(),
        })?;
    let y = first["location"]["y"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing y coordinate".to_string(),
        })?;

    Ok(Some(GeocodedPoint { x, y }))
}
