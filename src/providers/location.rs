//! Positioning sources
//!
//! The monitor calls these with a timeout and falls back to the last known
//! or default coordinate when they fail.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Coordinate, LocationFix};

/// Source of the device's current position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_fix(&self) -> AppResult<LocationFix>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation {
    fix: LocationFix,
}

impl StaticLocation {
    pub fn new(coordinate: Coordinate, accuracy_meters: Option<f64>) -> Self {
        Self {
            fix: LocationFix::new(coordinate, accuracy_meters),
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_fix(&self) -> AppResult<LocationFix> {
        Ok(self.fix)
    }
}

/// Positioning not supported on this device
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocation;

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current_fix(&self) -> AppResult<LocationFix> {
        Err(AppError::location_unavailable("Geolocation not supported"))
    }
}

/// Replays a scripted series of results, repeating the last one.
/// Each result may be delayed to simulate a slow positioning source.
pub struct ScriptedLocation {
    script: Mutex<Vec<(Duration, Option<LocationFix>)>>,
}

impl ScriptedLocation {
    /// `None` entries answer with `LOC_UNAVAILABLE`
    pub fn new(script: Vec<(Duration, Option<LocationFix>)>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
        }
    }

    fn next_step(&self) -> (Duration, Option<LocationFix>) {
        let mut script = match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if script.len() > 1 {
            script.pop().unwrap_or((Duration::ZERO, None))
        } else {
            script.last().copied().unwrap_or((Duration::ZERO, None))
        }
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn current_fix(&self) -> AppResult<LocationFix> {
        let (delay, fix) = self.next_step();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        fix.ok_or_else(|| AppError::location_unavailable("Scripted failure"))
    }
}
