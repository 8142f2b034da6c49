//! # Session Cache
//!
//! The last used position, its nearest coast and the tide data fetched for it
//! are persisted together as one JSON record. Keeping a single record means a
//! load never sees half of an old session mixed with half of a new one, and a
//! clear removes everything at once.
//!
//! Saves go to a sibling temp file that is then renamed over the record, so an
//! interrupted write leaves the previous session intact.

use crate::coast::{CoastInfo, CoastSource};
use crate::error::TideError;
use crate::{Coordinates, TideData};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Everything remembered between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub position: Coordinates,
    /// Lookup that produced `coast`
    #[serde(default)]
    pub coast_source: CoastSource,
    pub coast: Option<CoastInfo>,
    pub tide_data: Option<TideData>,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// Whether the cached coast and tides can be reused for `position` at `now`.
    ///
    /// Requires the same position and coast lookup, a record younger than
    /// `ttl`, and tide data that still reaches into the future.
    pub fn is_usable_for(
        &self,
        position: Coordinates,
        source: &CoastSource,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> bool {
        self.position == position
            && self.coast_source == *source
            && now - self.saved_at <= ttl
            && self.coast.is_some()
            && self
                .tide_data
                .as_ref()
                .is_some_and(|data| data.has_future(now))
    }
}

/// File-backed store for the single session record.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; `Ok(None)` if nothing is stored.
    pub fn load(&self) -> Result<Option<Session>, TideError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Replace the stored session.
    pub fn save(&self, session: &Session) -> Result<(), TideError> {
        let data = serde_json::to_vec_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("session saved to {}", self.path.display());
        Ok(())
    }

    /// Forget the stored session. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), TideError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
