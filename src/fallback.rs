//! # Fallback Tide Model
//!
//! This module derives tide heights when no provider can be reached. It uses a
//! two-constituent semidiurnal model:
//!
//! - **S2** (principal solar, 12.00 h) follows solar time directly
//! - **M2** (principal lunar, ~12.42 h) lags S2 by twice the moon's phase
//!   angle, so the two line up at new/full moon (springs) and oppose each
//!   other at the quarters (neaps)
//!
//! Heights are meters about mean sea level, so highs are positive and lows
//! negative. The series is hourly, starting at the top of the current hour and
//! covering the next two days, which is enough for both a next high and a next
//! low to exist.
//!
//! ## Accuracy Trade-offs
//! - ✅ **Correct period**: Matches the real semidiurnal cycle
//! - ✅ **Spring–neap envelope**: Amplitude follows the moon phase
//! - ❌ **No local harmonics**: Not synchronized to any real station
//! - ❌ **No meteorological effects**: Ignores weather-driven surge
//!
//! The `offline` flag lets the display warn that heights are approximate.

use crate::{TideData, TideSample};
use chrono::{DateTime, Duration, DurationRound, TimeZone, Utc};

/// Mean synodic month in days.
const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Hourly samples produced by [`approximate`].
pub const HOURS: i64 = 48;

/// Age of the moon in days since the last new moon.
///
/// Counts whole synodic months from the new moon of 2000-01-06 18:14 UTC.
pub fn moon_age_days(at: DateTime<Utc>) -> f64 {
    let reference = Utc
        .with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
        .single()
        .unwrap_or_default();
    let days = (at - reference).num_seconds() as f64 / 86_400.0;
    days.rem_euclid(SYNODIC_MONTH_DAYS)
}

/// Generate approximate hourly tide heights for the next 48 h.
/// If `now` is `None`, fall back to `Utc::now()`.
pub fn approximate(now: Option<DateTime<Utc>>) -> TideData {
    let now = now.unwrap_or_else(Utc::now);
    let start = now.duration_trunc(Duration::hours(1)).unwrap_or(now);

    let tau = std::f64::consts::TAU;

    // Typical open-coast amplitudes
    const A_M2: f64 = 0.90; // m
    const A_S2: f64 = 0.30; // m
    const P_S2_HRS: f64 = 12.00;

    let samples: Vec<TideSample> = (0..=HOURS)
        .map(|h| {
            let time = start + Duration::hours(h);
            let hours = time.timestamp() as f64 / 3600.0;
            let moon_phase_angle = moon_age_days(time) / SYNODIC_MONTH_DAYS * tau;
            let theta_s2 = hours / P_S2_HRS * tau;
            let theta_m2 = theta_s2 - 2.0 * moon_phase_angle;
            TideSample {
                time,
                height: A_M2 * theta_m2.sin() + A_S2 * theta_s2.sin(),
            }
        })
        .collect();

    TideData::from_samples(&samples, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrema::select_extrema;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 24, 0, 30, 0).unwrap()
    }

    #[test]
    fn moon_age_is_within_a_month() {
        let age = moon_age_days(t0());
        assert!((0.0..SYNODIC_MONTH_DAYS).contains(&age));
    }

    #[test]
    fn moon_age_near_a_known_new_moon() {
        // New moon on 2025-07-24 19:11 UTC
        let new_moon = Utc.with_ymd_and_hms(2025, 7, 24, 19, 11, 0).unwrap();
        let age = moon_age_days(new_moon);
        assert!(
            age < 1.5 || age > SYNODIC_MONTH_DAYS - 1.5,
            "moon age at new moon was {age}"
        );
    }

    #[test]
    fn starts_on_the_hour_and_is_hourly() {
        let data = approximate(Some(t0()));
        assert_eq!(data.times.len(), HOURS as usize + 1);
        assert_eq!(
            data.times[0],
            Utc.with_ymd_and_hms(2025, 7, 24, 0, 0, 0).unwrap()
        );
        for w in data.times.windows(2) {
            assert_eq!(w[1] - w[0], Duration::hours(1));
        }
        assert!(data.offline);
    }

    #[test]
    fn heights_swing_around_mean_sea_level() {
        let data = approximate(Some(t0()));
        let max = data.heights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = data.heights.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(max > 0.3 && max <= 1.2, "max {max}");
        assert!(min < -0.3 && min >= -1.2, "min {min}");
    }

    #[test]
    fn always_has_a_future_high_and_low() {
        let data = approximate(Some(t0()));
        let samples = data.samples().unwrap();
        let extrema = select_extrema(&samples, t0());
        assert!(extrema.next_high.unwrap().height > 0.0);
        assert!(extrema.next_low.unwrap().height < 0.0);
    }

    #[test]
    fn curve_changes_with_time() {
        let a = approximate(Some(t0()));
        let b = approximate(Some(t0() + Duration::hours(6)));
        assert_ne!(a.heights[0], b.heights[0]);
    }
}
