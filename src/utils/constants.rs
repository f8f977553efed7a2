//! Constants Module - Single Source of Truth
//!
//! Scoring arithmetic, level thresholds, time bands and scheduler cadences.
//! Other modules reference these instead of repeating literals.

use std::time::Duration;

use crate::models::types::Coordinate;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "SheSecure Risk";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// SCORE ARITHMETIC
// ============================================

/// Starting score before any analyzer runs
pub const BASE_SCORE: i32 = 50;

/// Score bounds
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// Highest score classified as LOW
pub const LOW_LEVEL_MAX: u8 = 30;

/// Lowest score classified as HIGH
pub const HIGH_LEVEL_MIN: u8 = 61;

// ============================================
// TIME BANDS (local hours, inclusive)
// ============================================

pub const DAYTIME_START_HOUR: u32 = 6;
pub const DAYTIME_END_HOUR: u32 = 18;
pub const EVENING_START_HOUR: u32 = 19;
pub const EVENING_END_HOUR: u32 = 21;
// Late night is every remaining hour: 22..=23 and 0..=2
pub const EARLY_MORNING_START_HOUR: u32 = 3;
pub const EARLY_MORNING_END_HOUR: u32 = 5;

/// Night band used by the scheduler and recommendations (>=22 or <=5)
pub const NIGHT_BAND_START_HOUR: u32 = 22;
pub const NIGHT_BAND_END_HOUR: u32 = 5;

// ============================================
// ANALYZER DELTAS
// ============================================

pub const DAYTIME_DELTA: i32 = -20;
pub const EVENING_DELTA: i32 = -5;
pub const LATE_NIGHT_DELTA: i32 = 25;
pub const EARLY_MORNING_DELTA: i32 = 15;
pub const WEEKEND_DELTA: i32 = 5;

pub const HIGH_DENSITY_DELTA: i32 = -10;
pub const LOW_DENSITY_DELTA: i32 = 15;
pub const WELL_LIT_DELTA: i32 = -8;
pub const POORLY_LIT_DELTA: i32 = 12;
pub const HIGH_INCIDENT_DELTA: i32 = 20;
pub const LOW_INCIDENT_DELTA: i32 = -10;

pub const POOR_VISIBILITY_DELTA: i32 = 10;
pub const EXCELLENT_VISIBILITY_DELTA: i32 = -5;
pub const HEAVY_PRECIPITATION_DELTA: i32 = 8;

pub const RECENT_HIGH_RISK_DELTA: i32 = 5;

pub const NIGHT_ACTIVITY_DELTA: i32 = 5;
pub const REGULAR_ROUTES_DELTA: i32 = -3;

// ============================================
// SIGNAL THRESHOLDS (strict comparisons)
// ============================================

pub const HIGH_DENSITY_THRESHOLD: f64 = 0.7;
pub const LOW_DENSITY_THRESHOLD: f64 = 0.3;
pub const WELL_LIT_THRESHOLD: f64 = 0.8;
pub const POORLY_LIT_THRESHOLD: f64 = 0.4;
pub const HIGH_INCIDENT_THRESHOLD: f64 = 0.7;
pub const LOW_INCIDENT_THRESHOLD: f64 = 0.3;

// ============================================
// HISTORY
// ============================================

/// Assessments kept by a history store
pub const HISTORY_CAPACITY: usize = 100;

/// Look-back window of the historical analyzer
pub const HISTORY_WINDOW_HOURS: i64 = 24;

/// Scores strictly above this count as high-risk periods
pub const HISTORY_HIGH_RISK_SCORE: u8 = 70;

// ============================================
// RECOMMENDATIONS
// ============================================

/// Scores strictly above this suggest sharing location
pub const SHARE_LOCATION_SCORE: u8 = 70;

/// Scores strictly above this suggest planning a route
pub const PLAN_ROUTE_SCORE: u8 = 40;

// ============================================
// MONITOR
// ============================================

/// Unconditional evaluation cadence
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Extra cadence during the night band
pub const DEFAULT_NIGHT_INTERVAL: Duration = Duration::from_secs(60);

/// Location acquisition timeout
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum age of a cached location fix
pub const DEFAULT_LOCATION_MAX_AGE: Duration = Duration::from_secs(300);

/// Fallback coordinate (New York City)
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(40.7128, -74.0060);

/// Signal cache TTL
pub const DEFAULT_SIGNAL_CACHE_TTL_SECS: u64 = 300;

// ============================================
// HELPERS
// ============================================

/// True when `hour` is in the scheduler's night band
#[inline]
pub fn is_night_band(hour: u32) -> bool {
    hour >= NIGHT_BAND_START_HOUR || hour <= NIGHT_BAND_END_HOUR
}

/// Clamp a raw score into the valid range
#[inline]
pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(MIN_SCORE, MAX_SCORE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_night_band() {
        let night: Vec<u32> = (0..24).filter(|h| is_night_band(*h)).collect();
        assert_eq!(night, vec![0, 1, 2, 3, 4, 5, 22, 23]);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-42), 0);
        assert_eq!(clamp_score(57), 57);
        assert_eq!(clamp_score(145), 100);
    }
}
