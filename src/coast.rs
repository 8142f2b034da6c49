//! # Nearest Coast Lookup
//!
//! Three ways to answer "where is the closest coastline?":
//! - **Fixed**: a built-in stub (Miami Beach, FL) for demos and offline use
//! - **Mock**: a configured coordinate, e.g. for testing a particular station
//! - **Remote**: a backend endpoint that does the real geometry
//!
//! Remote lookups are a single GET with no retries. The straight line from the
//! user to the coast is reported as a great-circle distance.

use crate::error::TideError;
use crate::Coordinates;
use serde::{Deserialize, Serialize};

/// Built-in coast used by [`CoastSource::Fixed`].
pub const MIAMI_BEACH: Coordinates = Coordinates {
    lat: 25.790654,
    lon: -80.130045,
};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Where the nearest coast comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum CoastSource {
    #[default]
    Fixed,
    Mock { lat: f64, lon: f64 },
    Remote { base_url: String },
}

/// The coast point chosen for a position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoastInfo {
    pub name: Option<String>,
    pub coordinates: Coordinates,
    /// Great-circle distance from the user's position
    pub distance_km: f64,
}

/// Backend response for `/nearest-coast`.
#[derive(Debug, Deserialize)]
struct NearestCoastResponse {
    lat: f64,
    lon: f64,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    name: Option<String>,
}

/// Find the nearest coast for `position`.
pub async fn locate(
    source: &CoastSource,
    client: &reqwest::Client,
    position: Coordinates,
) -> Result<CoastInfo, TideError> {
    match source {
        CoastSource::Fixed => Ok(CoastInfo {
            name: Some("Miami Beach, FL".to_string()),
            coordinates: MIAMI_BEACH,
            distance_km: haversine_km(position, MIAMI_BEACH),
        }),
        CoastSource::Mock { lat, lon } => {
            let coordinates = Coordinates::new(*lat, *lon);
            Ok(CoastInfo {
                name: None,
                coordinates,
                distance_km: haversine_km(position, coordinates),
            })
        }
        CoastSource::Remote { base_url } => fetch_nearest(client, base_url, position).await,
    }
}

async fn fetch_nearest(
    client: &reqwest::Client,
    base_url: &str,
    position: Coordinates,
) -> Result<CoastInfo, TideError> {
    let url = format!("{}/nearest-coast", base_url.trim_end_matches('/'));
    log::info!("Looking up nearest coast via {url}");

    let response = client
        .get(&url)
        .query(&[("lat", position.lat), ("lon", position.lon)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(TideError::Status {
            service: "coast backend",
            status: response.status().as_u16(),
        });
    }

    let body: NearestCoastResponse = response.json().await?;
    Ok(coast_from_response(body, position))
}

fn coast_from_response(body: NearestCoastResponse, position: Coordinates) -> CoastInfo {
    let coordinates = Coordinates::new(body.lat, body.lon);
    CoastInfo {
        name: body.name,
        coordinates,
        distance_km: body
            .distance_km
            .unwrap_or_else(|| haversine_km(position, coordinates)),
    }
}

/// Great-circle distance between two positions in kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// OpenStreetMap link centered on a position.
pub fn map_url(at: Coordinates, zoom: u8) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lon:.6}#map={zoom}/{lat:.6}/{lon:.6}",
        lat = at.lat,
        lon = at.lon,
    )
}
