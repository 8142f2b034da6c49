//! Wall-clock source for countdowns and alerts.

use chrono::{DateTime, Utc};

/// Anything that can tell the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Wall time that advances with tokio's (possibly paused) timer clock.
#[cfg(test)]
pub(crate) struct PausedClock {
    wall: DateTime<Utc>,
    origin: tokio::time::Instant,
}

#[cfg(test)]
impl PausedClock {
    pub(crate) fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.origin.elapsed();
        self.wall + chrono::Duration::milliseconds(elapsed.as_millis() as i64)
    }
}
