//! # Tide Data Fetching
//!
//! This module obtains tide heights for a coast position. Each provider is
//! asked exactly once; there is no retry or backoff. Callers decide what to do
//! with a failure (the app falls back to [`crate::fallback::approximate`]).
//!
//! ## Providers
//!
//! ### Backend
//! - **URL**: `{base_url}/tides?lat=..&lon=..`
//! - **Format**: JSON with two parallel arrays:
//!   ```json
//!   { "times": ["2025-07-24T09:00:00Z", ...], "heights": [-0.2, ...] }
//!   ```
//!
//! ### WorldTides
//! - **URL**: `https://www.worldtides.info/api/v2?heights&lat=..&lon=..&key=..`
//! - **Format**: a list of events, each carrying its own time and height:
//!   ```json
//!   { "heights": [{ "dt": 1753347600, "date": "2025-07-24T09:00+0000", "height": -0.2 }] }
//!   ```
//!   Events are converted to the parallel-array shape.
//!
//! ### Harmonic
//! The offline model, for when no network provider is wanted at all.

use crate::error::TideError;
use crate::{fallback, Coordinates, TideData};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const WORLDTIDES_URL: &str = "https://www.worldtides.info/api/v2";

/// Which service supplies tide heights.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TideProvider {
    Backend { base_url: String },
    WorldTides { api_key: String },
    #[default]
    Harmonic,
}

/// Backend response: parallel arrays.
#[derive(Debug, Deserialize)]
struct BackendTides {
    times: Vec<DateTime<Utc>>,
    heights: Vec<f64>,
}

/// WorldTides response: one entry per height event.
#[derive(Debug, Deserialize)]
struct WorldTidesResponse {
    #[serde(default)]
    heights: Option<Vec<WorldTidesHeight>>,
}

#[derive(Debug, Deserialize)]
struct WorldTidesHeight {
    /// Unix seconds
    dt: i64,
    height: f64,
}

/// Fetch tide heights near `coast` from `provider`. The harmonic provider
/// derives its curve from `now`.
pub async fn fetch(
    provider: &TideProvider,
    client: &reqwest::Client,
    coast: Coordinates,
    now: DateTime<Utc>,
) -> Result<TideData, TideError> {
    match provider {
        TideProvider::Backend { base_url } => fetch_backend(client, base_url, coast).await,
        TideProvider::WorldTides { api_key } => fetch_worldtides(client, api_key, coast).await,
        TideProvider::Harmonic => Ok(fallback::approximate(Some(now))),
    }
}

async fn fetch_backend(
    client: &reqwest::Client,
    base_url: &str,
    coast: Coordinates,
) -> Result<TideData, TideError> {
    let url = format!("{}/tides", base_url.trim_end_matches('/'));
    log::info!("Fetching tide data from {url}");

    let response = client
        .get(&url)
        .query(&[("lat", coast.lat), ("lon", coast.lon)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(TideError::Status {
            service: "tide backend",
            status: response.status().as_u16(),
        });
    }

    let body = response.text().await?;
    parse_backend(&body)
}

async fn fetch_worldtides(
    client: &reqwest::Client,
    api_key: &str,
    coast: Coordinates,
) -> Result<TideData, TideError> {
    if api_key.trim().is_empty() {
        return Err(TideError::MissingApiKey);
    }
    log::info!("Fetching tide data from WorldTides");

    let lat = coast.lat.to_string();
    let lon = coast.lon.to_string();
    let response = client
        .get(format!("{WORLDTIDES_URL}?heights"))
        .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("key", api_key)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(TideError::Status {
            service: "WorldTides",
            status: response.status().as_u16(),
        });
    }

    let body = response.text().await?;
    parse_worldtides(&body)
}

/// Parse a backend body into tide data.
///
/// Unequal array lengths are kept as delivered; selection treats them as
/// "no result" rather than failing here.
fn parse_backend(body: &str) -> Result<TideData, TideError> {
    let tides: BackendTides = serde_json::from_str(body)?;
    if tides.times.is_empty() {
        return Err(TideError::NoData);
    }
    Ok(TideData {
        times: tides.times,
        heights: tides.heights,
        offline: false,
    })
}

fn parse_worldtides(body: &str) -> Result<TideData, TideError> {
    let response: WorldTidesResponse = serde_json::from_str(body)?;
    let events = response.heights.unwrap_or_default();

    let mut times = Vec::with_capacity(events.len());
    let mut heights = Vec::with_capacity(events.len());
    for event in events {
        match DateTime::from_timestamp(event.dt, 0) {
            Some(time) => {
                times.push(time);
                heights.push(event.height);
            }
            None => log::warn!("skipping WorldTides event with bad timestamp {}", event.dt),
        }
    }

    if times.is_empty() {
        return Err(TideError::NoData);
    }
    Ok(TideData {
        times,
        heights,
        offline: false,
    })
}
