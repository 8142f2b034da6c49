//! # Session Orchestration
//!
//! Ties the pieces together for one run: pick a position, reuse the stored
//! session if it still fits, otherwise look up the coast and fetch tides, and
//! hand back a [`TideReport`] for display.
//!
//! All run state lives in [`TideApp`] and the returned report; nothing is
//! shared through globals.

use crate::clock::{Clock, SystemClock};
use crate::coast::{self, CoastInfo};
use crate::config::Config;
use crate::error::TideError;
use crate::extrema::{ExtremumPolicy, TideExtrema};
use crate::session::{Session, SessionStore};
use crate::{fallback, tide_data, Coordinates, TideData};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Where the position used for this run came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionSource {
    /// Given on the command line
    Provided,
    /// Read back from the session cache
    Stored,
    /// `[location]` in the config file
    Configured,
}

/// Everything the display layer needs for one position.
#[derive(Clone, Debug)]
pub struct TideReport {
    pub position: Coordinates,
    pub position_source: PositionSource,
    pub coast: CoastInfo,
    pub tide_data: TideData,
    pub from_cache: bool,
}

impl TideReport {
    /// Next high and low as seen from `now`. Recompute whenever `now` moves.
    pub fn extrema(&self, now: DateTime<Utc>, policy: ExtremumPolicy) -> TideExtrema {
        self.tide_data.extrema(now, policy)
    }
}

pub struct TideApp {
    config: Config,
    client: reqwest::Client,
    store: SessionStore,
    clock: Arc<dyn Clock>,
}

impl TideApp {
    pub fn new(config: Config) -> Result<Self, TideError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let store = SessionStore::new(&config.cache.path);
        Ok(Self {
            config,
            client,
            store,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Forget the stored position, coast and tide data.
    pub fn clear_session(&self) -> Result<(), TideError> {
        self.store.clear()
    }

    /// Resolve position, coast and tide data for this run.
    pub async fn prepare(
        &self,
        position_override: Option<Coordinates>,
    ) -> Result<TideReport, TideError> {
        let now = self.clock.now();
        let stored = self.store.load().unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable session cache: {e}");
            None
        });

        let (position, position_source) =
            resolve_position(position_override, stored.as_ref(), self.config.location)?;

        if let Some(Session {
            coast: Some(coast),
            tide_data: Some(tide_data),
            saved_at,
            ..
        }) = stored.filter(|s| {
            s.is_usable_for(position, &self.config.coast, now, self.config.cache_ttl())
        })
        {
            log::info!("Using cached coast and tide data from {saved_at}");
            return Ok(TideReport {
                position,
                position_source,
                coast,
                tide_data,
                from_cache: true,
            });
        }

        let coast = coast::locate(&self.config.coast, &self.client, position).await?;

        let provider = self.config.tides.provider();
        let fetched = tide_data::fetch(&provider, &self.client, coast.coordinates, now).await;
        let tide_data = match fetched {
            Ok(data) => data,
            Err(error) => {
                log::warn!("Tide data fetch failed: {error}");
                log::warn!("Falling back to offline harmonic model");
                fallback::approximate(Some(now))
            }
        };

        // Offline heights are cheap to rederive, so only remote data is kept
        let session = Session {
            position,
            coast_source: self.config.coast.clone(),
            coast: Some(coast.clone()),
            tide_data: (!tide_data.offline).then(|| tide_data.clone()),
            saved_at: now,
        };
        if let Err(e) = self.store.save(&session) {
            log::warn!("Could not save session cache: {e}");
        }

        Ok(TideReport {
            position,
            position_source,
            coast,
            tide_data,
            from_cache: false,
        })
    }
}

/// Command line beats the stored session, which beats the config file.
fn resolve_position(
    provided: Option<Coordinates>,
    stored: Option<&Session>,
    configured: Option<Coordinates>,
) -> Result<(Coordinates, PositionSource), TideError> {
    if let Some(position) = provided {
        return Ok((position, PositionSource::Provided));
    }
    if let Some(session) = stored {
        return Ok((session.position, PositionSource::Stored));
    }
    configured
        .map(|position| (position, PositionSource::Configured))
        .ok_or(TideError::NoPosition)
}
