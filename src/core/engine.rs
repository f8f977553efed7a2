//! Risk Scoring Engine
//!
//! Turns time, location, weather, history and behavior into a 0-100 risk
//! score. Higher score = more dangerous.
//!
//! Algorithm:
//! 1. Start at `BASE_SCORE` (50)
//! 2. Each analyzer returns a signed delta plus the factors explaining it
//! 3. Sum all deltas, clamp to 0..=100, classify into LOW / MEDIUM / HIGH
//!
//! Safety-improving factors are labelled `Positive` and *subtract* from the
//! score. The engine holds only read-only data sources, so one instance can
//! serve overlapping evaluations.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Weekday};
use std::sync::Arc;
use tracing::debug;

use crate::models::types::{
    BehaviorProfile, Coordinate, FactorCategory, FactorWeight, Impact, LocationSignals,
    Precipitation, RiskAssessment, RiskFactor, RiskLevel, Visibility, WeatherConditions,
};
use crate::providers::{
    BehaviorProvider, LocationSignalProvider, NoBehavior, NoSignals, NoWeather,
    SimulatedBehavior, SimulatedLocationSignals, SimulatedWeather, WeatherProvider,
};
use crate::utils::constants::*;

/// Delta and factors produced by one analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub score_modifier: i32,
    pub factors: Vec<RiskFactor>,
}

impl Analysis {
    fn push(&mut self, factor: RiskFactor) {
        self.score_modifier += factor.score_delta;
        self.factors.push(factor);
    }
}

/// Hour-of-day bands. Every hour 0-23 falls in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBand {
    /// 06:00-18:59
    Daytime,
    /// 19:00-21:59
    EarlyEvening,
    /// 22:00-02:59
    LateNight,
    /// 03:00-05:59
    VeryEarlyMorning,
}

impl TimeBand {
    pub fn for_hour(hour: u32) -> Self {
        match hour % 24 {
            h if (DAYTIME_START_HOUR..=DAYTIME_END_HOUR).contains(&h) => TimeBand::Daytime,
            h if (EVENING_START_HOUR..=EVENING_END_HOUR).contains(&h) => TimeBand::EarlyEvening,
            h if (EARLY_MORNING_START_HOUR..=EARLY_MORNING_END_HOUR).contains(&h) => {
                TimeBand::VeryEarlyMorning
            }
            // 22..=23 and 0..=2, wrapping midnight
            _ => TimeBand::LateNight,
        }
    }

    fn factor(&self) -> RiskFactor {
        let (description, impact, weight, delta) = match self {
            TimeBand::Daytime => ("Daytime hours", Impact::Positive, FactorWeight::High, DAYTIME_DELTA),
            TimeBand::EarlyEvening => (
                "Early evening hours",
                Impact::Neutral,
                FactorWeight::Medium,
                EVENING_DELTA,
            ),
            TimeBand::LateNight => (
                "Late night hours",
                Impact::Negative,
                FactorWeight::High,
                LATE_NIGHT_DELTA,
            ),
            TimeBand::VeryEarlyMorning => (
                "Very early morning hours",
                Impact::Negative,
                FactorWeight::High,
                EARLY_MORNING_DELTA,
            ),
        };
        RiskFactor::new(FactorCategory::Time, description, impact, weight, delta)
    }
}

/// Time analyzer: hour band plus weekend bump
pub fn analyze_time(now: &DateTime<FixedOffset>) -> Analysis {
    let mut analysis = Analysis::default();
    analysis.push(TimeBand::for_hour(now.hour()).factor());

    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        analysis.push(RiskFactor::new(
            FactorCategory::Time,
            "Weekend - increased social activity",
            Impact::Neutral,
            FactorWeight::Low,
            WEEKEND_DELTA,
        ));
    }

    analysis
}

/// Location analyzer: three independently thresholded signals
pub fn analyze_location(signals: &LocationSignals) -> Analysis {
    let mut analysis = Analysis::default();

    if signals.population_density > HIGH_DENSITY_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "High population density area",
            Impact::Positive,
            FactorWeight::Medium,
            HIGH_DENSITY_DELTA,
        ));
    } else if signals.population_density < LOW_DENSITY_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "Low population density area",
            Impact::Negative,
            FactorWeight::Medium,
            LOW_DENSITY_DELTA,
        ));
    }

    if signals.lighting_quality > WELL_LIT_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "Well-lit area",
            Impact::Positive,
            FactorWeight::Medium,
            WELL_LIT_DELTA,
        ));
    } else if signals.lighting_quality < POORLY_LIT_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "Poorly lit area",
            Impact::Negative,
            FactorWeight::High,
            POORLY_LIT_DELTA,
        ));
    }

    if signals.incident_rate > HIGH_INCIDENT_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "Higher reported incidents",
            Impact::Negative,
            FactorWeight::High,
            HIGH_INCIDENT_DELTA,
        ));
    } else if signals.incident_rate < LOW_INCIDENT_THRESHOLD {
        analysis.push(RiskFactor::new(
            FactorCategory::Location,
            "Low incident reports",
            Impact::Positive,
            FactorWeight::Medium,
            LOW_INCIDENT_DELTA,
        ));
    }

    analysis
}

/// Weather analyzer: visibility and precipitation are checked independently
pub fn analyze_weather(weather: &WeatherConditions) -> Analysis {
    let mut analysis = Analysis::default();

    match weather.visibility {
        Visibility::Poor => analysis.push(RiskFactor::new(
            FactorCategory::Weather,
            "Poor visibility due to weather conditions",
            Impact::Negative,
            FactorWeight::Medium,
            POOR_VISIBILITY_DELTA,
        )),
        Visibility::Excellent => analysis.push(RiskFactor::new(
            FactorCategory::Weather,
            "Clear weather with good visibility",
            Impact::Positive,
            FactorWeight::Low,
            EXCELLENT_VISIBILITY_DELTA,
        )),
        Visibility::Good | Visibility::Fair => {}
    }

    if weather.precipitation == Precipitation::Heavy {
        analysis.push(RiskFactor::new(
            FactorCategory::Weather,
            "Heavy precipitation affecting movement",
            Impact::Negative,
            FactorWeight::Medium,
            HEAVY_PRECIPITATION_DELTA,
        ));
    }

    analysis
}

/// Historical analyzer: any high-risk assessment in the last 24 hours
pub fn analyze_history(now: &DateTime<FixedOffset>, history: &[RiskAssessment]) -> Analysis {
    let mut analysis = Analysis::default();
    let window = Duration::hours(HISTORY_WINDOW_HOURS);

    let recent_high_risk = history.iter().any(|entry| {
        now.signed_duration_since(entry.timestamp) <= window
            && entry.score > HISTORY_HIGH_RISK_SCORE
    });

    if recent_high_risk {
        analysis.push(RiskFactor::new(
            FactorCategory::Historical,
            "Recent high-risk periods detected",
            Impact::Negative,
            FactorWeight::Low,
            RECENT_HIGH_RISK_DELTA,
        ));
    }

    analysis
}

/// Behavior analyzer
pub fn analyze_behavior(profile: &BehaviorProfile) -> Analysis {
    let mut analysis = Analysis::default();

    if profile.frequent_night_activity {
        analysis.push(RiskFactor::new(
            FactorCategory::Behavior,
            "Frequent late-night activity detected",
            Impact::Neutral,
            FactorWeight::Low,
            NIGHT_ACTIVITY_DELTA,
        ));
    }

    if profile.regular_routes {
        analysis.push(RiskFactor::new(
            FactorCategory::Behavior,
            "Using familiar, regular routes",
            Impact::Positive,
            FactorWeight::Low,
            REGULAR_ROUTES_DELTA,
        ));
    }

    analysis
}

/// The scoring engine with its injected data sources
#[derive(Clone)]
pub struct RiskEngine {
    signals: Arc<dyn LocationSignalProvider>,
    weather: Arc<dyn WeatherProvider>,
    behavior: Arc<dyn BehaviorProvider>,
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine").finish_non_exhaustive()
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        RiskEngineBuilder::new().build()
    }
}

impl RiskEngine {
    pub fn builder() -> RiskEngineBuilder {
        RiskEngineBuilder::new()
    }

    /// Engine backed by the simulated signal, weather and behavior sources
    pub fn simulated(seed: u64) -> Self {
        RiskEngineBuilder::new()
            .with_signals(SimulatedLocationSignals)
            .with_weather(SimulatedWeather::new(seed))
            .with_behavior(SimulatedBehavior::new(seed))
            .build()
    }

    /// Produce one assessment. Never fails: missing location skips the
    /// location analyzer, missing weather/behavior data contributes nothing.
    pub fn assess(
        &self,
        now: &DateTime<FixedOffset>,
        location: Option<Coordinate>,
        history: &[RiskAssessment],
    ) -> RiskAssessment {
        let mut score = BASE_SCORE;
        let mut factors = Vec::new();

        let mut apply = |analysis: Analysis| {
            score += analysis.score_modifier;
            factors.extend(analysis.factors);
        };

        apply(analyze_time(now));

        if let Some(coordinate) = location {
            if let Some(signals) = self.signals.signals(coordinate, now) {
                apply(analyze_location(&signals));
            }
        }

        if let Some(weather) = self.weather.conditions(now, location) {
            apply(analyze_weather(&weather));
        }

        apply(analyze_history(now, history));

        if let Some(profile) = self.behavior.profile() {
            apply(analyze_behavior(&profile));
        }

        let clamped = clamp_score(score);
        debug!("🧮 Raw score {} -> {} ({} factors)", score, clamped, factors.len());

        RiskAssessment {
            score: clamped,
            level: RiskLevel::from_score(clamped),
            factors,
            location,
            timestamp: *now,
        }
    }
}

/// Builder for wiring data sources into an engine.
/// Unset sources default to "no data".
pub struct RiskEngineBuilder {
    signals: Arc<dyn LocationSignalProvider>,
    weather: Arc<dyn WeatherProvider>,
    behavior: Arc<dyn BehaviorProvider>,
}

impl RiskEngineBuilder {
    pub fn new() -> Self {
        Self {
            signals: Arc::new(NoSignals),
            weather: Arc::new(NoWeather),
            behavior: Arc::new(NoBehavior),
        }
    }

    pub fn with_signals(mut self, provider: impl LocationSignalProvider + 'static) -> Self {
        self.signals = Arc::new(provider);
        self
    }

    pub fn with_shared_signals(mut self, provider: Arc<dyn LocationSignalProvider>) -> Self {
        self.signals = provider;
        self
    }

    pub fn with_weather(mut self, provider: impl WeatherProvider + 'static) -> Self {
        self.weather = Arc::new(provider);
        self
    }

    pub fn with_behavior(mut self, provider: impl BehaviorProvider + 'static) -> Self {
        self.behavior = Arc::new(provider);
        self
    }

    pub fn build(self) -> RiskEngine {
        RiskEngine {
            signals: self.signals,
            weather: self.weather,
            behavior: self.behavior,
        }
    }
}

impl Default for RiskEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::Sky;
    use crate::providers::{FixedBehavior, FixedSignals, FixedWeather};
    use chrono::TimeZone;

    // 2024-03-06 is a Wednesday, 2024-03-09 a Saturday
    fn wednesday(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, hour, 0, 0)
            .unwrap()
    }

    fn saturday(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_time_bands_cover_every_hour_once() {
        let expected = [
            (0, TimeBand::LateNight),
            (2, TimeBand::LateNight),
            (3, TimeBand::VeryEarlyMorning),
            (5, TimeBand::VeryEarlyMorning),
            (6, TimeBand::Daytime),
            (18, TimeBand::Daytime),
            (19, TimeBand::EarlyEvening),
            (21, TimeBand::EarlyEvening),
            (22, TimeBand::LateNight),
            (23, TimeBand::LateNight),
        ];
        for (hour, band) in expected {
            assert_eq!(TimeBand::for_hour(hour), band, "hour {}", hour);
        }
        for hour in 0..24 {
            assert_eq!(analyze_time(&wednesday(hour)).factors.len(), 1);
        }
    }

    #[test]
    fn test_weekend_adds_five() {
        let weekday = analyze_time(&wednesday(19));
        let weekend = analyze_time(&saturday(19));
        assert_eq!(weekday.score_modifier, -5);
        assert_eq!(weekend.score_modifier, 0);
        assert_eq!(weekend.factors.len(), 2);
    }

    #[test]
    fn test_location_thresholds_are_strict() {
        let boundary = LocationSignals {
            population_density: 0.7,
            lighting_quality: 0.8,
            incident_rate: 0.3,
        };
        assert_eq!(analyze_location(&boundary), Analysis::default());

        let bad = LocationSignals {
            population_density: 0.1,
            lighting_quality: 0.2,
            incident_rate: 0.75,
        };
        let analysis = analyze_location(&bad);
        assert_eq!(analysis.score_modifier, 15 + 12 + 20);
        assert!(analysis.factors.iter().all(|f| f.impact == Impact::Negative));
    }

    #[test]
    fn test_weather_checks_are_independent() {
        let weather = WeatherConditions {
            condition: Sky::Rainy,
            visibility: Visibility::Poor,
            precipitation: Precipitation::Heavy,
        };
        let analysis = analyze_weather(&weather);
        assert_eq!(analysis.score_modifier, 18);
        assert_eq!(analysis.factors.len(), 2);

        let clear = WeatherConditions {
            condition: Sky::Clear,
            visibility: Visibility::Excellent,
            precipitation: Precipitation::None,
        };
        assert_eq!(analyze_weather(&clear).score_modifier, -5);
        assert_eq!(analyze_weather(&WeatherConditions::neutral()), Analysis::default());
    }

    #[test]
    fn test_history_only_counts_recent_high_scores() {
        let engine = RiskEngine::default();
        let old_high = engine.assess(&saturday(23), None, &[]);
        assert_eq!(old_high.score, 80);

        // Three days later: outside the window
        let now = saturday(23) + Duration::days(3);
        assert_eq!(analyze_history(&now, &[old_high.clone()]), Analysis::default());

        // Twelve hours later: inside the window
        let now = saturday(23) + Duration::hours(12);
        let analysis = analyze_history(&now, &[old_high]);
        assert_eq!(analysis.score_modifier, 5);
        assert_eq!(analysis.factors[0].category, FactorCategory::Historical);
    }

    #[test]
    fn test_history_ignores_scores_at_threshold() {
        let engine = RiskEngine::default();
        let mut entry = engine.assess(&wednesday(12), None, &[]);
        entry.score = 70;
        assert_eq!(analyze_history(&wednesday(13), &[entry]), Analysis::default());
    }

    #[test]
    fn test_behavior_flags() {
        let both = BehaviorProfile {
            frequent_night_activity: true,
            regular_routes: true,
        };
        assert_eq!(analyze_behavior(&both).score_modifier, 2);
        assert_eq!(analyze_behavior(&BehaviorProfile::default()), Analysis::default());
    }

    #[test]
    fn test_factor_order_follows_evaluation_order() {
        let engine = RiskEngine::builder()
            .with_signals(FixedSignals(LocationSignals {
                population_density: 0.1,
                lighting_quality: 0.5,
                incident_rate: 0.5,
            }))
            .with_weather(FixedWeather(WeatherConditions {
                condition: Sky::Foggy,
                visibility: Visibility::Poor,
                precipitation: Precipitation::None,
            }))
            .with_behavior(FixedBehavior(BehaviorProfile {
                frequent_night_activity: true,
                regular_routes: false,
            }))
            .build();

        let previous = engine.assess(&saturday(22), None, &[]);
        let assessment = engine.assess(
            &saturday(23),
            Some(Coordinate::new(40.0, -74.0)),
            &[previous],
        );

        let categories: Vec<FactorCategory> =
            assessment.factors.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![
                FactorCategory::Time,
                FactorCategory::Time,
                FactorCategory::Location,
                FactorCategory::Weather,
                FactorCategory::Historical,
                FactorCategory::Behavior,
            ]
        );
        // 50 + 25 + 5 + 15 + 10 + 5 + 5 = 115
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_sign_convention() {
        let engine = RiskEngine::simulated(3);
        for hour in 0..24 {
            let a = engine.assess(&wednesday(hour), Some(Coordinate::new(40.7, -74.0)), &[]);
            for factor in &a.factors {
                match factor.impact {
                    Impact::Positive => assert!(factor.score_delta < 0, "{:?}", factor),
                    Impact::Negative => assert!(factor.score_delta > 0, "{:?}", factor),
                    Impact::Neutral => {}
                }
            }
        }
    }
}
