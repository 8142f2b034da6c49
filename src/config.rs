//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the default position, the coast
//! lookup, the tide provider, the session cache and display options.
//!
//! Every section is optional; missing sections and fields take their defaults.
//!
//! ```toml
//! [location]
//! lat = 25.77
//! lon = -80.19
//!
//! [coast]
//! source = "remote"
//! base_url = "http://localhost:8000"
//!
//! [tides]
//! provider = "world-tides"
//! api_key = "..."
//! policy = "global"
//!
//! [cache]
//! path = "/tmp/tide_session.json"
//! ttl_minutes = 360
//!
//! [display]
//! chart_rows = 12
//! tick_seconds = 1
//! ```

use crate::coast::CoastSource;
use crate::extrema::ExtremumPolicy;
use crate::tide_data::TideProvider;
use crate::Coordinates;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Fallback position when none is given or stored
    pub location: Option<Coordinates>,
    /// Nearest-coast lookup
    pub coast: CoastSource,
    /// Tide data provider and selection policy
    pub tides: TidesConfig,
    /// Session cache location and lifetime
    pub cache: CacheConfig,
    /// Terminal output options
    pub display: DisplayConfig,
}

/// Provider names accepted in the `[tides]` section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Backend,
    WorldTides,
    #[default]
    Harmonic,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TidesConfig {
    #[serde(rename = "provider")]
    pub kind: ProviderKind,
    /// Base URL for the `backend` provider
    pub base_url: Option<String>,
    /// Key for the `world-tides` provider
    pub api_key: Option<String>,
    /// How the next high and low are picked
    pub policy: ExtremumPolicy,
}

impl TidesConfig {
    /// Resolve the configured provider.
    ///
    /// A backend without a URL degrades to the harmonic model.
    pub fn provider(&self) -> TideProvider {
        match self.kind {
            ProviderKind::Backend => match &self.base_url {
                Some(base_url) => TideProvider::Backend {
                    base_url: base_url.clone(),
                },
                None => {
                    log::warn!(
                        "tides.provider = \"backend\" needs tides.base_url; using harmonic model"
                    );
                    TideProvider::Harmonic
                }
            },
            ProviderKind::WorldTides => TideProvider::WorldTides {
                api_key: self.api_key.clone().unwrap_or_default(),
            },
            ProviderKind::Harmonic => TideProvider::Harmonic,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Session record file (cleared on reboot when under /tmp)
    pub path: PathBuf,
    /// How long a stored coast and tide payload is reused
    pub ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/tmp/tide_session.json"),
            ttl_minutes: 360,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Height of the ASCII tide chart
    pub chart_rows: usize,
    /// Hours of upcoming data shown in the chart
    pub chart_hours: i64,
    /// Countdown refresh period
    pub tick_seconds: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chart_rows: 12,
            chart_hours: 24,
            tick_seconds: 1,
        }
    }
}

impl Config {
    /// Load configuration from tide-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format: {e}");
                    log::warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Session reuse window. Values beyond chrono's range saturate.
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache.ttl_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.display.tick_seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.location.is_none());
        assert_eq!(config.coast, CoastSource::Fixed);
        assert_eq!(config.tides.provider(), TideProvider::Harmonic);
        assert_eq!(config.tides.policy, ExtremumPolicy::Global);
        assert_eq!(config.cache.ttl_minutes, 360);
        assert_eq!(config.display.tick_seconds, 1);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.location = Some(Coordinates::new(43.66, -70.25));
        config.coast = CoastSource::Remote {
            base_url: "http://localhost:8000".to_string(),
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.location, config.location);
        assert_eq!(parsed.coast, config.coast);
    }

    #[test]
    fn test_partial_file() {
        let parsed: Config = toml::from_str(
            r#"
[coast]
source = "mock"
lat = 43.6567
lon = -70.2467

[tides]
provider = "world-tides"
api_key = "secret"
policy = "first-signed"
"#,
        )
        .unwrap();
        assert_eq!(
            parsed.coast,
            CoastSource::Mock {
                lat: 43.6567,
                lon: -70.2467
            }
        );
        assert_eq!(
            parsed.tides.provider(),
            TideProvider::WorldTides {
                api_key: "secret".to_string()
            }
        );
        assert_eq!(parsed.tides.policy, ExtremumPolicy::FirstSigned);
        assert_eq!(parsed.cache.ttl_minutes, 360);
    }

    #[test]
    fn test_backend_without_url_degrades() {
        let parsed: Config = toml::from_str("[tides]\nprovider = \"backend\"\n").unwrap();
        assert_eq!(parsed.tides.provider(), TideProvider::Harmonic);

        let parsed: Config =
            toml::from_str("[tides]\nprovider = \"backend\"\nbase_url = \"http://tides.local\"\n")
                .unwrap();
        assert_eq!(
            parsed.tides.provider(),
            TideProvider::Backend {
                base_url: "http://tides.local".to_string()
            }
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.coast, CoastSource::Fixed);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[coast\nsource = ").unwrap();
        let config = Config::load_from_path(&path);
        assert_eq!(config.coast, CoastSource::Fixed);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let parsed: Config = toml::from_str("[cache]\nttl_minutes = 1000000000000000\n").unwrap();
        assert_eq!(parsed.cache_ttl(), chrono::Duration::MAX);

        let mut config = Config::default();
        config.cache.ttl_minutes = u64::MAX;
        assert_eq!(config.cache_ttl(), chrono::Duration::MAX);

        config.cache.ttl_minutes = 90;
        assert_eq!(config.cache_ttl(), chrono::Duration::minutes(90));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.display.chart_rows = 20;
        config.save(&path).unwrap();
        assert_eq!(Config::load_from_path(&path).display.chart_rows, 20);
    }
}
