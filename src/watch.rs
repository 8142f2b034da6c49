//! # Live Tide Watch
//!
//! Keeps one countdown running per upcoming extremum and restarts both as soon
//! as either target is reached, so the next high and low are always picked
//! from what is still ahead.
//!
//! Countdowns report through one channel. Every restart bumps a generation
//! number, and lines from countdowns of an older generation are dropped even
//! when they were already queued, so output never goes backwards.

use crate::clock::Clock;
use crate::countdown::{Countdown, CountdownDisplay, CountdownSlot};
use crate::extrema::{ExtremumPolicy, TideKind};
use crate::TideData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type WatchMessage = (u64, TideKind, CountdownDisplay);

/// Countdowns to the next high and low tide over one set of tide data.
pub struct TideWatch {
    data: TideData,
    policy: ExtremumPolicy,
    clock: Arc<dyn Clock>,
    period: Duration,
    generation: u64,
    restart_pending: bool,
    high: CountdownSlot,
    low: CountdownSlot,
    tx: mpsc::UnboundedSender<WatchMessage>,
    rx: mpsc::UnboundedReceiver<WatchMessage>,
}

impl TideWatch {
    /// Start countdowns for the upcoming extrema in `data`.
    ///
    /// Returns `None` when nothing lies ahead. Must be called from within a
    /// tokio runtime.
    pub fn start(
        data: TideData,
        policy: ExtremumPolicy,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watch = Self {
            data,
            policy,
            clock,
            period,
            generation: 0,
            restart_pending: false,
            high: CountdownSlot::new(),
            low: CountdownSlot::new(),
            tx,
            rx,
        };
        watch.restart().then_some(watch)
    }

    /// Next line to show. After a `Reached` line the extrema are recomputed on
    /// the following call; `None` means the data has no further extrema.
    ///
    /// Cancel safe: dropping the future loses no current-generation line.
    pub async fn next(&mut self) -> Option<(TideKind, CountdownDisplay)> {
        if self.restart_pending {
            self.restart_pending = false;
            if !self.restart() {
                return None;
            }
        }

        loop {
            // Self holds a sender, so the channel never closes here
            let (generation, kind, display) = self.rx.recv().await?;
            if generation != self.generation {
                log::trace!("dropping {kind:?} tick from generation {generation}");
                continue;
            }
            if display.is_reached() {
                self.restart_pending = true;
            }
            return Some((kind, display));
        }
    }

    /// Stop both countdowns.
    pub fn stop(&mut self) {
        self.high.clear();
        self.low.clear();
    }

    pub fn is_running(&self) -> bool {
        self.high.is_running() || self.low.is_running()
    }

    /// Cancel the current countdowns and start new ones from `clock.now()`.
    fn restart(&mut self) -> bool {
        self.stop();
        self.generation += 1;

        let extrema = self.data.extrema(self.clock.now(), self.policy);
        for (kind, sample) in extrema.iter() {
            let tx = self.tx.clone();
            let generation = self.generation;
            let on_tick = move |d| {
                let _ = tx.send((generation, kind, d));
            };
            let countdown = Countdown::start(sample.time, self.clock.clone(), self.period, on_tick);
            match kind {
                TideKind::High => self.high.replace(countdown),
                TideKind::Low => self.low.replace(countdown),
            }
        }
        if extrema.is_empty() {
            log::info!("no upcoming extrema left to watch");
        }
        !extrema.is_empty()
    }
}
