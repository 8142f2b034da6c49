//! # Tide Info Core Library
//!
//! This library provides the data structures and building blocks for the tide
//! information tool: locating the nearest coast, obtaining tide heights, picking
//! the next high and low tide, and counting down to them.
//!
//! ## Data Flow
//! 1. **Position**: command line, stored session, or configured default
//! 2. **Coast**: fixed stub, remote backend, or mocked coordinate ([`coast`])
//! 3. **Tides**: remote provider, or the offline harmonic model ([`tide_data`], [`fallback`])
//! 4. **Cache**: the whole session is persisted as one record ([`session`])
//! 5. **Display**: next high/low ([`extrema`]) with live countdowns ([`countdown`], [`watch`])
//!
//! ## Core Types
//! - [`Coordinates`]: a latitude/longitude pair in decimal degrees
//! - [`TideSample`]: a single water height at an absolute instant
//! - [`TideData`]: the two parallel sequences (times, heights) as delivered by providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod alert;
pub mod app;
pub mod clock;
pub mod coast;
pub mod config;
pub mod countdown;
pub mod error;
pub mod extrema;
pub mod fallback;
pub mod renderer;
pub mod session;
pub mod tide_data;
pub mod watch;

/// A geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A single water-level observation.
///
/// Heights are meters relative to the provider's datum and may be negative.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_info_lib::TideSample;
///
/// let sample = TideSample {
///     time: Utc.with_ymd_and_hms(2025, 7, 24, 11, 0, 0).unwrap(),
///     height: 1.3,
/// };
/// assert!(sample.height > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideSample {
    pub time: DateTime<Utc>,
    /// Water height in meters
    pub height: f64,
}

/// Tide heights as two parallel, time-ordered sequences.
///
/// Position `i` of `times` belongs to position `i` of `heights`. Providers
/// deliver this shape directly; event-list providers are converted into it.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_info_lib::TideData;
///
/// let t0 = Utc.with_ymd_and_hms(2025, 7, 24, 9, 0, 0).unwrap();
/// let data = TideData {
///     times: vec![t0, t0 + chrono::Duration::hours(1)],
///     heights: vec![-0.2, 0.4],
///     offline: false,
/// };
/// assert_eq!(data.samples().unwrap().len(), 2);
///
/// let broken = TideData { heights: vec![0.1], ..data };
/// assert!(broken.samples().is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TideData {
    pub times: Vec<DateTime<Utc>>,
    pub heights: Vec<f64>,
    /// True if derived from the harmonic model instead of a remote provider
    #[serde(default)]
    pub offline: bool,
}

impl TideData {
    /// Zip the parallel sequences into samples.
    ///
    /// Returns `None` when the two sequences disagree in length.
    pub fn samples(&self) -> Option<Vec<TideSample>> {
        if self.times.len() != self.heights.len() {
            return None;
        }
        Some(
            self.times
                .iter()
                .zip(&self.heights)
                .map(|(&time, &height)| TideSample { time, height })
                .collect(),
        )
    }

    pub fn from_samples(samples: &[TideSample], offline: bool) -> Self {
        Self {
            times: samples.iter().map(|s| s.time).collect(),
            heights: samples.iter().map(|s| s.height).collect(),
            offline,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// True if at least one sample lies strictly after `now`.
    pub fn has_future(&self, now: DateTime<Utc>) -> bool {
        self.times.iter().any(|&t| t > now)
    }
}
