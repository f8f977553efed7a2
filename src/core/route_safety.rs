//! Route Safety Scoring
//!
//! Scores candidate walking routes and picks the safest one. Unlike the risk
//! score, this is a *safety* score: higher = safer.
//!
//! Algorithm:
//! 1. Start at 70
//! 2. Time of day: +15 daylight, +5 evening, -10 late night
//! 3. Walks longer than 30 minutes: -5
//! 4. User preferences: +10 avoid dark areas, +8 prefer crowded, +12 avoid incidents
//! 5. Route signals: +5 improvements, +8 patrol, -10 incident, +6 lit main street
//! 6. Clamp to 0..=100

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::constants::{
    clamp_score, DAYTIME_END_HOUR, DAYTIME_START_HOUR, EVENING_END_HOUR, EVENING_START_HOUR,
};

const ROUTE_BASE_SCORE: i32 = 70;
const LONG_WALK: Duration = Duration::from_secs(30 * 60);

/// What the user asked the route planner to favor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePreferences {
    pub avoid_dark_areas: bool,
    pub prefer_crowded: bool,
    pub avoid_incidents: bool,
}

/// Per-route observations from an external feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSignals {
    pub recent_improvements: bool,
    pub police_patrol: bool,
    pub recent_incident: bool,
    pub well_lit_main_street: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub label: String,
    pub walking_duration: Duration,
    pub signals: RouteSignals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteSafetyLevel {
    /// Score >= 80
    High,
    /// Score 60-79
    Medium,
    /// Score < 60
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSafety {
    pub score: u8,
    pub level: RouteSafetyLevel,
    pub message: String,
    pub factors: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score one route at the given local hour
pub fn score_route(candidate: &RouteCandidate, preferences: &RoutePreferences, hour: u32) -> RouteSafety {
    let mut score = ROUTE_BASE_SCORE;
    let mut factors = Vec::new();
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    let mut add = |points: i32, text: &str, factors: &mut Vec<String>| {
        score += points;
        factors.push(format!("{} ({:+} points)", text, points));
    };

    if (DAYTIME_START_HOUR..=DAYTIME_END_HOUR).contains(&hour) {
        add(15, "Daylight hours", &mut factors);
    } else if (EVENING_START_HOUR..=EVENING_END_HOUR).contains(&hour) {
        add(5, "Evening hours", &mut factors);
    } else {
        add(-10, "Late night hours", &mut factors);
        warnings.push("Consider using transportation after 10 PM".to_string());
    }

    if candidate.walking_duration > LONG_WALK {
        add(-5, "Long walking distance", &mut factors);
        recommendations.push("Consider breaking the journey or using public transport".to_string());
    }

    if preferences.avoid_dark_areas {
        add(10, "Avoiding poorly lit areas", &mut factors);
    }
    if preferences.prefer_crowded {
        add(8, "Preferring crowded areas", &mut factors);
    }
    if preferences.avoid_incidents {
        add(12, "Avoiding incident-prone areas", &mut factors);
    }

    let signals = &candidate.signals;
    if signals.recent_improvements {
        add(5, "Recent safety improvements in area", &mut factors);
    }
    if signals.police_patrol {
        add(8, "Police patrol route", &mut factors);
    }
    if signals.recent_incident {
        add(-10, "Recent incident reported", &mut factors);
    }
    if signals.well_lit_main_street {
        add(6, "Well-lit main street", &mut factors);
    }

    let score = clamp_score(score);

    let (level, message) = if score >= 80 {
        (
            RouteSafetyLevel::High,
            "This route is very safe with good lighting and regular foot traffic.",
        )
    } else if score >= 60 {
        recommendations.push("Stay alert and consider sharing your location".to_string());
        (
            RouteSafetyLevel::Medium,
            "This route is generally safe but has some areas requiring caution.",
        )
    } else {
        warnings.push("High risk route - strongly consider alternatives".to_string());
        recommendations.push("Use ride-share service or public transportation".to_string());
        (
            RouteSafetyLevel::Low,
            "This route has safety concerns. Consider alternative transportation.",
        )
    };

    RouteSafety {
        score,
        level,
        message: message.to_string(),
        factors,
        warnings,
        recommendations,
    }
}

/// Index and analysis of the highest-scoring route; ties keep the earliest
pub fn safest_route(
    candidates: &[RouteCandidate],
    preferences: &RoutePreferences,
    hour: u32,
) -> Option<(usize, RouteSafety)> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, score_route(candidate, preferences, hour)))
        .fold(None, |best: Option<(usize, RouteSafety)>, (index, safety)| match best {
            Some((kept, current)) if current.score >= safety.score => Some((kept, current)),
            _ => Some((index, safety)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(label: &str, minutes: u64, signals: RouteSignals) -> RouteCandidate {
        RouteCandidate {
            label: label.to_string(),
            walking_duration: Duration::from_secs(minutes * 60),
            signals,
        }
    }

    #[test]
    fn test_daytime_short_route() {
        let safety = score_route(&route("a", 10, RouteSignals::default()), &RoutePreferences::default(), 12);
        assert_eq!(safety.score, 85);
        assert_eq!(safety.level, RouteSafetyLevel::High);
        assert!(safety.warnings.is_empty());
    }

    #[test]
    fn test_late_night_long_route_with_incident() {
        let signals = RouteSignals {
            recent_incident: true,
            ..Default::default()
        };
        let safety = score_route(&route("b", 45, signals), &RoutePreferences::default(), 23);
        // 70 - 10 - 5 - 10
        assert_eq!(safety.score, 45);
        assert_eq!(safety.level, RouteSafetyLevel::Low);
        assert_eq!(safety.warnings.len(), 2);
        assert!(safety
            .recommendations
            .contains(&"Use ride-share service or public transportation".to_string()));
    }

    #[test]
    fn test_score_clamps_at_100() {
        let prefs = RoutePreferences {
            avoid_dark_areas: true,
            prefer_crowded: true,
            avoid_incidents: true,
        };
        let signals = RouteSignals {
            recent_improvements: true,
            police_patrol: true,
            recent_incident: false,
            well_lit_main_street: true,
        };
        let safety = score_route(&route("c", 5, signals), &prefs, 10);
        assert_eq!(safety.score, 100);
    }

    #[test]
    fn test_evening_is_medium() {
        let safety = score_route(&route("d", 20, RouteSignals::default()), &RoutePreferences::default(), 20);
        assert_eq!(safety.score, 75);
        assert_eq!(safety.level, RouteSafetyLevel::Medium);
        assert_eq!(safety.factors, vec!["Evening hours (+5 points)".to_string()]);
    }

    #[test]
    fn test_safest_route_prefers_first_on_tie() {
        let patrol = RouteSignals {
            police_patrol: true,
            ..Default::default()
        };
        let candidates = vec![
            route("plain", 10, RouteSignals::default()),
            route("patrolled", 10, patrol),
            route("patrolled-again", 10, patrol),
        ];
        let (index, safety) = safest_route(&candidates, &RoutePreferences::default(), 20).unwrap();
        assert_eq!(index, 1);
        assert_eq!(safety.score, 83);

        assert!(safest_route(&[], &RoutePreferences::default(), 20).is_none());
    }
}
