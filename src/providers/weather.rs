//! Weather sources

use chrono::{DateTime, FixedOffset};
use rand::seq::SliceRandom;

use super::{coordinate_seed, seeded_rng};
use crate::models::types::{Coordinate, Precipitation, Sky, Visibility, WeatherConditions};

/// Current weather near the user. `None` = no data, no contribution.
pub trait WeatherProvider: Send + Sync {
    fn conditions(
        &self,
        now: &DateTime<FixedOffset>,
        location: Option<Coordinate>,
    ) -> Option<WeatherConditions>;
}

const SKIES: [Sky; 4] = [Sky::Clear, Sky::Cloudy, Sky::Rainy, Sky::Foggy];
const VISIBILITIES: [Visibility; 4] = [
    Visibility::Excellent,
    Visibility::Good,
    Visibility::Fair,
    Visibility::Poor,
];
const PRECIPITATIONS: [Precipitation; 4] = [
    Precipitation::None,
    Precipitation::Light,
    Precipitation::Moderate,
    Precipitation::Heavy,
];

/// Picks each condition uniformly at random, reseeded per hour bucket so
/// every evaluation within the same hour sees the same weather.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWeather {
    pub seed: u64,
}

impl SimulatedWeather {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl WeatherProvider for SimulatedWeather {
    fn conditions(
        &self,
        now: &DateTime<FixedOffset>,
        location: Option<Coordinate>,
    ) -> Option<WeatherConditions> {
        let hour_bucket = now.timestamp().div_euclid(3600) as u64;
        let place = location.map(coordinate_seed).unwrap_or(0);
        let mut rng = seeded_rng(self.seed ^ place, hour_bucket);

        Some(WeatherConditions {
            condition: *SKIES.choose(&mut rng)?,
            visibility: *VISIBILITIES.choose(&mut rng)?,
            precipitation: *PRECIPITATIONS.choose(&mut rng)?,
        })
    }
}

/// Always reports the same weather
#[derive(Debug, Clone, Copy)]
pub struct FixedWeather(pub WeatherConditions);

impl WeatherProvider for FixedWeather {
    fn conditions(
        &self,
        _now: &DateTime<FixedOffset>,
        _location: Option<Coordinate>,
    ) -> Option<WeatherConditions> {
        Some(self.0)
    }
}

/// Weather feed unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeather;

impl WeatherProvider for NoWeather {
    fn conditions(
        &self,
        _now: &DateTime<FixedOffset>,
        _location: Option<Coordinate>,
    ) -> Option<WeatherConditions> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    #[test]
    fn test_simulated_weather_stable_within_hour() {
        let weather = SimulatedWeather::new(7);
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 14, 0, 0)
            .unwrap();
        let later = start + Duration::minutes(59);
        assert_eq!(weather.conditions(&start, None), weather.conditions(&later, None));
    }

    #[test]
    fn test_simulated_weather_varies_across_hours() {
        let weather = SimulatedWeather::new(7);
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 0, 0, 0)
            .unwrap();

        let seen: HashSet<Visibility> = (0..200)
            .filter_map(|h| weather.conditions(&(start + Duration::hours(h)), None))
            .map(|c| c.visibility)
            .collect();
        assert_eq!(seen.len(), 4);
    }
}
