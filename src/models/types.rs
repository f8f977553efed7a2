//! Type definitions for the risk engine
//! All core data structures for personal safety assessment

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{HIGH_LEVEL_MIN, LOW_LEVEL_MAX};

/// Coarse risk classification derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Score 0-30
    Low,
    /// Score 31-60
    Medium,
    /// Score 61-100
    High,
}

impl RiskLevel {
    /// Classify a clamped score
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s <= LOW_LEVEL_MAX => RiskLevel::Low,
            s if s >= HIGH_LEVEL_MIN => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which analyzer produced a factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorCategory {
    Time,
    Location,
    Weather,
    Historical,
    Behavior,
}

impl FactorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorCategory::Time => "time",
            FactorCategory::Location => "location",
            FactorCategory::Weather => "weather",
            FactorCategory::Historical => "historical",
            FactorCategory::Behavior => "behavior",
        }
    }
}

/// Direction of a factor's effect on safety.
///
/// `Positive` means safer, which lowers the score: a positive factor carries a
/// negative `score_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

/// Display weight of a factor (not used in arithmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorWeight {
    Low,
    Medium,
    High,
}

/// One contributor to the aggregate score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: FactorCategory,
    pub description: String,
    pub impact: Impact,
    pub weight: FactorWeight,
    /// Signed contribution; higher score = higher risk
    pub score_delta: i32,
}

impl RiskFactor {
    pub fn new(
        category: FactorCategory,
        description: impl Into<String>,
        impact: Impact,
        weight: FactorWeight,
        score_delta: i32,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            impact,
            weight,
            score_delta,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "[{}] {} ({:+})",
            self.category.as_str().to_uppercase(),
            self.description,
            self.score_delta
        )
    }
}

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A location reading from a positioning source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    /// Reported accuracy radius; `None` when the fix is a fallback
    pub accuracy_meters: Option<f64>,
}

impl LocationFix {
    pub fn new(coordinate: Coordinate, accuracy_meters: Option<f64>) -> Self {
        Self {
            coordinate,
            accuracy_meters,
        }
    }
}

/// Environmental signals for a location, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSignals {
    pub population_density: f64,
    pub lighting_quality: f64,
    pub incident_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sky {
    Clear,
    Cloudy,
    Rainy,
    Foggy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precipitation {
    None,
    Light,
    Moderate,
    Heavy,
}

/// Current weather as reported by a weather source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub condition: Sky,
    pub visibility: Visibility,
    pub precipitation: Precipitation,
}

impl WeatherConditions {
    /// Conditions that trigger no weather factor
    pub fn neutral() -> Self {
        Self {
            condition: Sky::Cloudy,
            visibility: Visibility::Good,
            precipitation: Precipitation::None,
        }
    }
}

/// Behavioral flags from the user's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub frequent_night_activity: bool,
    pub regular_routes: bool,
}

/// Result of one evaluation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped score (0-100)
    pub score: u8,
    pub level: RiskLevel,
    /// Factors in evaluation order
    pub factors: Vec<RiskFactor>,
    pub location: Option<Coordinate>,
    /// Local wall-clock time of the evaluation
    pub timestamp: DateTime<FixedOffset>,
}

impl RiskAssessment {
    /// Local hour used for scoring
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn factors_in(&self, category: FactorCategory) -> impl Iterator<Item = &RiskFactor> {
        self.factors.iter().filter(move |f| f.category == category)
    }

    /// Pretty print the assessment
    pub fn summary(&self) -> String {
        let mut output = format!(
            "{} Risk: {} ({}%) at {}\n",
            self.level.emoji(),
            self.level.as_str(),
            self.score,
            self.timestamp.format("%Y-%m-%d %H:%M %:z")
        );

        if let Some(loc) = self.location {
            output.push_str(&format!("   Location: {:.4}, {:.4}\n", loc.lat, loc.lng));
        }

        if !self.factors.is_empty() {
            output.push_str("   Factors:\n");
            for factor in &self.factors {
                output.push_str(&format!("     - {}\n", factor.describe()));
            }
        }

        output
    }
}

/// Urgency of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Opaque action tag for the caller to interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionHint {
    OpenRideShare,
    ShareLocation,
    PlanRoute,
    CheckEmergencyContacts,
}

impl ActionHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionHint::OpenRideShare => "open-ride-share",
            ActionHint::ShareLocation => "share-location",
            ActionHint::PlanRoute => "plan-route",
            ActionHint::CheckEmergencyContacts => "check-emergency-contacts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action_hint: Option<ActionHint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(31), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(61), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_action_hint_serialization() {
        let json = serde_json::to_string(&ActionHint::OpenRideShare).unwrap();
        assert_eq!(json, "\"open-ride-share\"");
        for hint in [
            ActionHint::OpenRideShare,
            ActionHint::ShareLocation,
            ActionHint::PlanRoute,
            ActionHint::CheckEmergencyContacts,
        ] {
            let json = serde_json::to_string(&hint).unwrap();
            assert_eq!(json, format!("\"{}\"", hint.as_str()));
        }
    }

    #[test]
    fn test_factor_describe() {
        let factor = RiskFactor::new(
            FactorCategory::Time,
            "Daytime hours",
            Impact::Positive,
            FactorWeight::High,
            -20,
        );
        assert_eq!(factor.describe(), "[TIME] Daytime hours (-20)");
    }
}
