//! Configuration module for the risk monitor
//!
//! Values come from `SHESECURE_*` environment variables; defaults live in
//! utils/constants.rs.

use chrono::{FixedOffset, Local, Offset};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::Coordinate;
use crate::utils::constants::{
    DEFAULT_COORDINATE, DEFAULT_INTERVAL, DEFAULT_LOCATION_MAX_AGE, DEFAULT_LOCATION_TIMEOUT,
    DEFAULT_NIGHT_INTERVAL,
};

pub const ENV_INTERVAL_SECS: &str = "SHESECURE_INTERVAL_SECS";
pub const ENV_NIGHT_INTERVAL_SECS: &str = "SHESECURE_NIGHT_INTERVAL_SECS";
pub const ENV_LOCATION_TIMEOUT_SECS: &str = "SHESECURE_LOCATION_TIMEOUT_SECS";
pub const ENV_LOCATION_MAX_AGE_SECS: &str = "SHESECURE_LOCATION_MAX_AGE_SECS";
pub const ENV_DEFAULT_LAT: &str = "SHESECURE_DEFAULT_LAT";
pub const ENV_DEFAULT_LNG: &str = "SHESECURE_DEFAULT_LNG";
pub const ENV_HISTORY_PATH: &str = "SHESECURE_HISTORY_PATH";
pub const ENV_UTC_OFFSET_MINUTES: &str = "SHESECURE_UTC_OFFSET_MINUTES";
pub const ENV_SIM_SEED: &str = "SHESECURE_SIM_SEED";
pub const ENV_SHARE_LOCATION: &str = "SHESECURE_SHARE_LOCATION";

/// Configuration for the risk monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Unconditional evaluation cadence
    pub interval: Duration,
    /// Extra cadence, effective only during the night band
    pub night_interval: Duration,
    /// How long to wait for a location fix
    pub location_timeout: Duration,
    /// How long a previous fix stays usable as fallback
    pub location_max_age: Duration,
    /// Used when no fix is available at all
    pub default_location: Coordinate,
    /// JSON history file; in-memory history when `None`
    pub history_path: Option<PathBuf>,
    /// Offset used to derive local hour and weekday
    pub utc_offset: FixedOffset,
    /// Seed for the simulated weather/behavior sources
    pub simulation_seed: u64,
    /// Location-sharing toggle; when off the location analyzer never runs
    pub share_location: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            night_interval: DEFAULT_NIGHT_INTERVAL,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            location_max_age: DEFAULT_LOCATION_MAX_AGE,
            default_location: DEFAULT_COORDINATE,
            history_path: None,
            utc_offset: Local::now().offset().fix(),
            simulation_seed: 0,
            share_location: true,
        }
    }
}

impl MonitorConfig {
    /// Load from environment; unset variables keep their defaults,
    /// unparsable ones are rejected.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_INTERVAL_SECS)? {
            config.interval = positive_secs(ENV_INTERVAL_SECS, secs)?;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_NIGHT_INTERVAL_SECS)? {
            config.night_interval = positive_secs(ENV_NIGHT_INTERVAL_SECS, secs)?;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_LOCATION_TIMEOUT_SECS)? {
            config.location_timeout = positive_secs(ENV_LOCATION_TIMEOUT_SECS, secs)?;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_LOCATION_MAX_AGE_SECS)? {
            config.location_max_age = Duration::from_secs(secs);
        }

        let lat = parse_var::<f64, _>(&lookup, ENV_DEFAULT_LAT)?;
        let lng = parse_var::<f64, _>(&lookup, ENV_DEFAULT_LNG)?;
        if let Some(lat) = lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::invalid_config(ENV_DEFAULT_LAT, &lat.to_string()));
            }
            config.default_location.lat = lat;
        }
        if let Some(lng) = lng {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::invalid_config(ENV_DEFAULT_LNG, &lng.to_string()));
            }
            config.default_location.lng = lng;
        }

        if let Some(path) = lookup(ENV_HISTORY_PATH).filter(|p| !p.is_empty()) {
            config.history_path = Some(PathBuf::from(path));
        }

        if let Some(minutes) = parse_var::<i32, _>(&lookup, ENV_UTC_OFFSET_MINUTES)? {
            config.utc_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    AppError::invalid_config(ENV_UTC_OFFSET_MINUTES, &minutes.to_string())
                })?;
        }

        if let Some(seed) = parse_var::<u64, _>(&lookup, ENV_SIM_SEED)? {
            config.simulation_seed = seed;
        }

        if let Some(raw) = lookup(ENV_SHARE_LOCATION) {
            config.share_location = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(AppError::invalid_config(ENV_SHARE_LOCATION, &raw)),
            };
        }

        info!(
            "⚙️ Monitor config: every {}s (night {}s), location timeout {}s, history {}",
            config.interval.as_secs(),
            config.night_interval.as_secs(),
            config.location_timeout.as_secs(),
            config
                .history_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "in-memory".to_string())
        );

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::invalid_config(key, &raw)),
    }
}

fn positive_secs(key: &str, secs: u64) -> AppResult<Duration> {
    if secs == 0 {
        return Err(AppError::invalid_config(key, "0"));
    }
    Ok(Duration::from_secs(secs))
}
