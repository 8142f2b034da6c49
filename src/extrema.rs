//! # Next High / Low Tide Selection
//!
//! Picks the upcoming high and low tide out of a time-ordered series of
//! samples. Only samples strictly after `now` are considered.
//!
//! Two policies are supported:
//! - [`ExtremumPolicy::Global`] (default): the single highest and single lowest
//!   future sample, wherever in the window they fall. Ties keep the earliest.
//! - [`ExtremumPolicy::FirstSigned`]: the first future sample above the datum
//!   is the "high" and the first one below it is the "low".
//!
//! Results are never patched; call again whenever `now` or the samples change.

use crate::{TideData, TideSample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the next high and low are chosen among future samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtremumPolicy {
    /// Highest and lowest future sample
    #[default]
    Global,
    /// First future sample with positive / negative height
    FirstSigned,
}

/// High or low water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    pub fn label(&self) -> &'static str {
        match self {
            TideKind::High => "High",
            TideKind::Low => "Low",
        }
    }
}

/// The upcoming high and low tide, either of which may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TideExtrema {
    pub next_high: Option<TideSample>,
    pub next_low: Option<TideSample>,
}

impl TideExtrema {
    pub fn is_empty(&self) -> bool {
        self.next_high.is_none() && self.next_low.is_none()
    }

    /// Both extrema tagged with their kind, skipping absent ones.
    pub fn iter(&self) -> impl Iterator<Item = (TideKind, TideSample)> {
        [
            self.next_high.map(|s| (TideKind::High, s)),
            self.next_low.map(|s| (TideKind::Low, s)),
        ]
        .into_iter()
        .flatten()
    }

    /// Whichever of the high and low comes first.
    pub fn next_event(&self) -> Option<TideSample> {
        match (self.next_high, self.next_low) {
            (Some(high), Some(low)) => Some(if low.time < high.time { low } else { high }),
            (high, low) => high.or(low),
        }
    }
}

/// Select the next high and low tide using the global-extremum policy.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_info_lib::{extrema::select_extrema, TideSample};
///
/// let at = |h| Utc.with_ymd_and_hms(2025, 7, 24, h, 0, 0).unwrap();
/// let samples = [
///     TideSample { time: at(9), height: -0.2 },
///     TideSample { time: at(11), height: 1.3 },
///     TideSample { time: at(14), height: -0.8 },
///     TideSample { time: at(17), height: 1.1 },
/// ];
///
/// let extrema = select_extrema(&samples, at(8));
/// assert_eq!(extrema.next_high.unwrap().time, at(11));
/// assert_eq!(extrema.next_low.unwrap().time, at(14));
/// ```
pub fn select_extrema(samples: &[TideSample], now: DateTime<Utc>) -> TideExtrema {
    select_with_policy(samples, now, ExtremumPolicy::Global)
}

pub fn select_with_policy(
    samples: &[TideSample],
    now: DateTime<Utc>,
    policy: ExtremumPolicy,
) -> TideExtrema {
    // NaN would poison the running comparisons
    let future = samples
        .iter()
        .filter(|s| s.time > now && s.height.is_finite());

    let mut extrema = TideExtrema::default();
    match policy {
        ExtremumPolicy::Global => {
            for sample in future {
                if extrema.next_high.map_or(true, |h| sample.height > h.height) {
                    extrema.next_high = Some(*sample);
                }
                if extrema.next_low.map_or(true, |l| sample.height < l.height) {
                    extrema.next_low = Some(*sample);
                }
            }
        }
        ExtremumPolicy::FirstSigned => {
            for sample in future {
                if extrema.next_high.is_none() && sample.height > 0.0 {
                    extrema.next_high = Some(*sample);
                }
                if extrema.next_low.is_none() && sample.height < 0.0 {
                    extrema.next_low = Some(*sample);
                }
                if extrema.next_high.is_some() && extrema.next_low.is_some() {
                    break;
                }
            }
        }
    }
    extrema
}

impl TideData {
    /// Select extrema straight from the parallel sequences.
    ///
    /// Mismatched sequence lengths yield an empty result instead of an error.
    pub fn extrema(&self, now: DateTime<Utc>, policy: ExtremumPolicy) -> TideExtrema {
        match self.samples() {
            Some(samples) => select_with_policy(&samples, now, policy),
            None => {
                log::warn!(
                    "tide data has {} times but {} heights; ignoring it",
                    self.times.len(),
                    self.heights.len()
                );
                TideExtrema::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 24, hour, 0, 0).unwrap()
    }

    fn sample(hour: u32, height: f64) -> TideSample {
        TideSample {
            time: at(hour),
            height,
        }
    }

    fn scenario() -> Vec<TideSample> {
        vec![
            sample(9, -0.2),
            sample(11, 1.3),
            sample(14, -0.8),
            sample(17, 1.1),
        ]
    }

    #[test]
    fn picks_global_high_and_low() {
        let extrema = select_extrema(&scenario(), at(8));
        assert_eq!(extrema.next_high, Some(sample(11, 1.3)));
        assert_eq!(extrema.next_low, Some(sample(14, -0.8)));
    }

    #[test]
    fn matches_max_and_min_of_future_subset() {
        let samples: Vec<_> = (0..24)
            .map(|h| sample(h, ((h as f64) * 0.5).sin() * 1.5))
            .collect();
        let now = at(5);
        let extrema = select_extrema(&samples, now);

        let future: Vec<f64> = samples
            .iter()
            .filter(|s| s.time > now)
            .map(|s| s.height)
            .collect();
        let max = future.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = future.iter().cloned().fold(f64::INFINITY, f64::min);

        assert_eq!(extrema.next_high.unwrap().height, max);
        assert_eq!(extrema.next_low.unwrap().height, min);
    }

    #[test]
    fn first_occurrence_wins_ties() {
        let samples = [sample(10, 5.0), sample(12, 5.0)];
        let extrema = select_extrema(&samples, at(8));
        assert_eq!(extrema.next_high, Some(sample(10, 5.0)));
        assert_eq!(extrema.next_low, Some(sample(10, 5.0)));
    }

    #[test]
    fn ignores_past_and_present_samples() {
        let extrema = select_extrema(&scenario(), at(11));
        // 11:00 is not strictly after now
        assert_eq!(extrema.next_high, Some(sample(17, 1.1)));
        assert_eq!(extrema.next_low, Some(sample(14, -0.8)));
    }

    #[test]
    fn empty_and_all_past_inputs_yield_nothing() {
        assert!(select_extrema(&[], at(8)).is_empty());
        assert!(select_extrema(&scenario(), at(18)).is_empty());
    }

    #[test]
    fn selection_is_idempotent() {
        let samples = scenario();
        assert_eq!(
            select_extrema(&samples, at(8)),
            select_extrema(&samples, at(8))
        );
    }

    #[test]
    fn non_finite_heights_are_skipped() {
        let samples = [sample(9, f64::NAN), sample(10, 0.5), sample(11, -0.5)];
        let extrema = select_extrema(&samples, at(8));
        assert_eq!(extrema.next_high, Some(sample(10, 0.5)));
        assert_eq!(extrema.next_low, Some(sample(11, -0.5)));
    }

    #[test]
    fn first_signed_policy_takes_first_crossing() {
        let extrema = select_with_policy(&scenario(), at(8), ExtremumPolicy::FirstSigned);
        assert_eq!(extrema.next_high, Some(sample(11, 1.3)));
        assert_eq!(extrema.next_low, Some(sample(9, -0.2)));
    }

    #[test]
    fn first_signed_policy_skips_zero_heights() {
        let samples = [sample(9, 0.0), sample(10, 0.0)];
        let extrema = select_with_policy(&samples, at(8), ExtremumPolicy::FirstSigned);
        assert!(extrema.is_empty());
    }

    #[test]
    fn next_event_is_the_earlier_extremum() {
        let extrema = select_extrema(&scenario(), at(8));
        assert_eq!(extrema.next_event(), Some(sample(11, 1.3)));

        let only_low = TideExtrema {
            next_high: None,
            next_low: Some(sample(14, -0.8)),
        };
        assert_eq!(only_low.next_event(), Some(sample(14, -0.8)));
        assert_eq!(TideExtrema::default().next_event(), None);
    }

    #[test]
    fn mismatched_parallel_sequences_yield_nothing() {
        let data = TideData {
            times: vec![at(9), at(10)],
            heights: vec![1.0],
            offline: false,
        };
        assert!(data.extrema(at(8), ExtremumPolicy::Global).is_empty());
    }

    #[test]
    fn parallel_sequences_select_like_samples() {
        let data = TideData::from_samples(&scenario(), false);
        let now = at(8) + Duration::minutes(30);
        assert_eq!(
            data.extrema(now, ExtremumPolicy::Global),
            select_extrema(&scenario(), now)
        );
    }
}
