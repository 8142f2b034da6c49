//! # Countdown Timers
//!
//! A [`Countdown`] shows the time remaining until a target instant, refreshed
//! on a fixed period (one second by default):
//!
//! - The first value is computed synchronously inside [`Countdown::start`], so
//!   a display is never blank while waiting for the first period.
//! - Every later tick runs on a tokio task and recomputes `target - now` from
//!   the [`Clock`]; no state is carried between ticks.
//! - Once the remaining time is zero or negative the countdown emits
//!   [`CountdownDisplay::Reached`] and its task ends for good.
//!
//! Each countdown owns its task handle and cancellation token. Dropping it,
//! calling [`Countdown::cancel`], or replacing it in a [`CountdownSlot`] stops
//! the timer, so a superseded countdown never keeps ticking.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default refresh period.
pub const TICK: Duration = Duration::from_secs(1);

/// Shortest accepted refresh period; tokio intervals cannot be zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// What a single countdown tick shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownDisplay {
    Remaining {
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Reached,
}

impl CountdownDisplay {
    /// Compute the display for `target` as seen at `now`.
    ///
    /// Whole hours, minutes and seconds are floored from the millisecond
    /// difference; anything at or past the target is `Reached`.
    pub fn at(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff_ms = (target - now).num_milliseconds();
        if diff_ms <= 0 {
            return CountdownDisplay::Reached;
        }
        let total_secs = diff_ms / 1000;
        CountdownDisplay::Remaining {
            hours: total_secs / 3600,
            minutes: (total_secs % 3600) / 60,
            seconds: total_secs % 60,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, CountdownDisplay::Reached)
    }
}

impl fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownDisplay::Remaining {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours}h {minutes}m {seconds}s remaining"),
            CountdownDisplay::Reached => f.write_str("Reached!"),
        }
    }
}

/// A running countdown towards one target instant.
pub struct Countdown {
    target: DateTime<Utc>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Start counting down to `target`, calling `on_tick` once immediately and
    /// then once per `period` until the target is reached or the countdown is
    /// cancelled.
    ///
    /// Must be called from within a tokio runtime unless the target is
    /// already reached. Periods shorter than a millisecond are raised to one.
    pub fn start<F>(
        target: DateTime<Utc>,
        clock: Arc<dyn Clock>,
        period: Duration,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut(CountdownDisplay) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let period = period.max(MIN_PERIOD);

        let first = CountdownDisplay::at(target, clock.now());
        on_tick(first);
        if first.is_reached() {
            return Self {
                target,
                cancel,
                handle: None,
            };
        }

        let token = cancel.clone();
        let start = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let display = CountdownDisplay::at(target, clock.now());
                        on_tick(display);
                        if display.is_reached() {
                            break;
                        }
                    }
                    _ = token.cancelled() => {
                        log::debug!("countdown to {target} cancelled");
                        break;
                    }
                }
            }
        });

        Self {
            target,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// True while the timer task is still ticking.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the timer to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the timer and wait for its task to wind down.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Wait until the countdown reaches its target (or is cancelled elsewhere).
    pub async fn finished(mut self) {
        self.join().await;
    }

    async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("countdown task failed: {e}");
            }
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Holds at most one countdown; installing a new one stops the old one.
#[derive(Default)]
pub struct CountdownSlot {
    current: Option<Countdown>,
}

impl CountdownSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `countdown`, cancelling whatever it supersedes.
    pub fn replace(&mut self, countdown: Countdown) {
        if let Some(old) = self.current.replace(countdown) {
            old.cancel();
        }
    }

    /// Cancel and remove the current countdown, if any.
    pub fn clear(&mut self) {
        if let Some(old) = self.current.take() {
            old.cancel();
        }
    }

    pub fn current(&self) -> Option<&Countdown> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(Countdown::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, PausedClock};
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 24, 8, 0, 0).unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(CountdownDisplay) + Send + 'static) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        (lines, move |d: CountdownDisplay| {
            sink.lock().unwrap().push(d.to_string())
        })
    }

    #[test]
    fn decomposes_remaining_time() {
        let target = t0() + chrono::Duration::seconds(2 * 3600 + 5 * 60 + 9);
        let display = CountdownDisplay::at(target, t0());
        assert_eq!(display.to_string(), "2h 5m 9s remaining");
    }

    #[test]
    fn floors_partial_seconds() {
        let target = t0() + chrono::Duration::milliseconds(1999);
        assert_eq!(
            CountdownDisplay::at(target, t0()).to_string(),
            "0h 0m 1s remaining"
        );
    }

    #[test]
    fn target_equal_to_now_is_reached() {
        assert_eq!(CountdownDisplay::at(t0(), t0()), CountdownDisplay::Reached);
        assert_eq!(CountdownDisplay::Reached.to_string(), "Reached!");
    }

    #[test]
    fn past_target_never_goes_negative() {
        let target = t0() - chrono::Duration::minutes(5);
        assert!(CountdownDisplay::at(target, t0()).is_reached());
    }

    #[test]
    fn reached_target_does_not_spawn_a_timer() {
        // No runtime here: start must not need one for an elapsed target
        let (lines, on_tick) = recorder();
        let countdown = Countdown::start(t0(), Arc::new(FixedClock(t0())), TICK, on_tick);
        assert!(!countdown.is_running());
        assert_eq!(*lines.lock().unwrap(), vec!["Reached!".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_reaches_target() {
        let clock = Arc::new(PausedClock::starting_at(t0()));
        let target = t0() + chrono::Duration::seconds(3);
        let (lines, on_tick) = recorder();

        let countdown = Countdown::start(target, clock, TICK, on_tick);
        // Tick zero is synchronous
        assert_eq!(lines.lock().unwrap().len(), 1);

        countdown.finished().await;
        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "0h 0m 3s remaining",
                "0h 0m 2s remaining",
                "0h 0m 1s remaining",
                "Reached!",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ten_second_countdown_is_monotonic() {
        let clock = Arc::new(PausedClock::starting_at(t0()));
        let target = t0() + chrono::Duration::seconds(10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        Countdown::start(target, clock, TICK, move |d| sink.lock().unwrap().push(d))
            .finished()
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&CountdownDisplay::Reached));
        assert_eq!(seen.iter().filter(|d| d.is_reached()).count(), 1);

        let secs: Vec<i64> = seen
            .iter()
            .filter_map(|d| match d {
                CountdownDisplay::Remaining {
                    hours,
                    minutes,
                    seconds,
                } => Some(hours * 3600 + minutes * 60 + seconds),
                CountdownDisplay::Reached => None,
            })
            .collect();
        assert_eq!(secs.first(), Some(&10));
        assert!(secs.windows(2).all(|w| w[1] <= w[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_further_ticks() {
        let clock = Arc::new(PausedClock::starting_at(t0()));
        let target = t0() + chrono::Duration::seconds(10);
        let (lines, on_tick) = recorder();

        let countdown = Countdown::start(target, clock, TICK, on_tick);
        time::sleep(Duration::from_millis(2500)).await;
        countdown.stop().await;
        time::sleep(Duration::from_secs(20)).await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(!lines.iter().any(|l| l == "Reached!"));
    }

    #[tokio::test(start_paused = true)]
    async fn slot_cancels_superseded_countdown() {
        let clock: Arc<dyn Clock> = Arc::new(PausedClock::starting_at(t0()));
        let (old_lines, old_tick) = recorder();
        let (new_lines, new_tick) = recorder();
        let mut slot = CountdownSlot::new();

        slot.replace(Countdown::start(
            t0() + chrono::Duration::seconds(30),
            clock.clone(),
            TICK,
            old_tick,
        ));
        time::sleep(Duration::from_millis(1500)).await;

        slot.replace(Countdown::start(
            t0() + chrono::Duration::seconds(5),
            clock,
            TICK,
            new_tick,
        ));
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(old_lines.lock().unwrap().len(), 2);
        assert_eq!(new_lines.lock().unwrap().last().unwrap(), "Reached!");
        assert!(!slot.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn independent_countdowns_do_not_interfere() {
        let clock: Arc<dyn Clock> = Arc::new(PausedClock::starting_at(t0()));
        let (high_lines, high_tick) = recorder();
        let (low_lines, low_tick) = recorder();

        let high = Countdown::start(
            t0() + chrono::Duration::seconds(2),
            clock.clone(),
            TICK,
            high_tick,
        );
        let low = Countdown::start(t0() + chrono::Duration::seconds(4), clock, TICK, low_tick);
        high.finished().await;
        assert!(low.is_running());
        low.finished().await;

        assert_eq!(high_lines.lock().unwrap().len(), 3);
        assert_eq!(low_lines.lock().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_minimum() {
        let clock = Arc::new(PausedClock::starting_at(t0()));
        let target = t0() + chrono::Duration::milliseconds(3);
        let (lines, on_tick) = recorder();

        Countdown::start(target, clock, Duration::ZERO, on_tick)
            .finished()
            .await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.last().map(String::as_str), Some("Reached!"));
        assert_eq!(lines.len(), 4);
    }
}
