//! Location signal sources (population density, lighting, incident rate)

use chrono::{DateTime, FixedOffset, Timelike};
use rand::Rng;

use super::{coordinate_seed, seeded_rng};
use crate::models::types::{Coordinate, LocationSignals};
use crate::utils::constants::{DAYTIME_END_HOUR, DAYTIME_START_HOUR};

/// Looks up environmental signals for a coordinate.
/// `None` means no data for this place; the location analyzer then adds nothing.
pub trait LocationSignalProvider: Send + Sync {
    fn signals(&self, coordinate: Coordinate, now: &DateTime<FixedOffset>) -> Option<LocationSignals>;
}

/// Synthesizes signals from the coordinate and the local hour.
///
/// - density: `0.3 + (sin(lat) + cos(lng)) * 0.3`
/// - lighting: 0.9 by day, 0.4 otherwise, plus jitter in [-0.15, 0.15)
/// - incidents: uniform in [0, 0.8)
///
/// Jitter and incidents are seeded from the coordinate, so the same
/// place at the same hour always yields the same signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLocationSignals;

impl SimulatedLocationSignals {
    pub fn population_density(coordinate: Coordinate) -> f64 {
        (0.3 + (coordinate.lat.sin() + coordinate.lng.cos()) * 0.3).clamp(0.0, 1.0)
    }

    pub fn lighting_quality(coordinate: Coordinate, hour: u32) -> f64 {
        let base: f64 = if (DAYTIME_START_HOUR..=DAYTIME_END_HOUR).contains(&hour) {
            0.9
        } else {
            0.4
        };
        let jitter = seeded_rng(coordinate_seed(coordinate), u64::from(hour)).gen_range(-0.15..0.15);
        (base + jitter).clamp(0.0, 1.0)
    }

    pub fn incident_rate(coordinate: Coordinate) -> f64 {
        seeded_rng(coordinate_seed(coordinate), u64::MAX).gen::<f64>() * 0.8
    }
}

impl LocationSignalProvider for SimulatedLocationSignals {
    fn signals(&self, coordinate: Coordinate, now: &DateTime<FixedOffset>) -> Option<LocationSignals> {
        Some(LocationSignals {
            population_density: Self::population_density(coordinate),
            lighting_quality: Self::lighting_quality(coordinate, now.hour()),
            incident_rate: Self::incident_rate(coordinate),
        })
    }
}

/// Returns the same signals for every place
#[derive(Debug, Clone, Copy)]
pub struct FixedSignals(pub LocationSignals);

impl LocationSignalProvider for FixedSignals {
    fn signals(&self, _coordinate: Coordinate, _now: &DateTime<FixedOffset>) -> Option<LocationSignals> {
        Some(self.0)
    }
}

/// No signal data for any place
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignals;

impl LocationSignalProvider for NoSignals {
    fn signals(&self, _coordinate: Coordinate, _now: &DateTime<FixedOffset>) -> Option<LocationSignals> {
        None
    }
}
