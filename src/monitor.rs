//! Risk monitor
//! Periodically gathers inputs, runs the engine and records the result
//!
//! Cadence: every `interval` (5 min) unconditionally, plus every
//! `night_interval` (1 min) while the local hour is in the night band.

use chrono::{DateTime, FixedOffset, Timelike};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::engine::RiskEngine;
use crate::core::history::HistoryStore;
use crate::core::recommendations::recommend;
use crate::models::config::MonitorConfig;
use crate::models::errors::AppError;
use crate::models::types::{LocationFix, Recommendation, RiskAssessment};
use crate::providers::{Clock, LocationProvider, SystemClock};
use crate::utils::constants::{is_night_band, HISTORY_WINDOW_HOURS};
use crate::utils::telemetry::{LocationFallback, TelemetryCollector};

/// Output of one monitor tick
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub assessment: RiskAssessment,
    pub recommendations: Vec<Recommendation>,
    /// Set when the location came from a fallback instead of a fresh fix
    pub fallback: Option<LocationFallback>,
}

/// Owns everything one user's periodic assessment needs
pub struct RiskMonitor {
    config: MonitorConfig,
    engine: RiskEngine,
    location: Arc<dyn LocationProvider>,
    history: Arc<dyn HistoryStore>,
    telemetry: Arc<TelemetryCollector>,
    clock: Arc<dyn Clock>,
    share_location: AtomicBool,
    last_fix: Mutex<Option<(LocationFix, Instant)>>,
    latest: watch::Sender<Option<Evaluation>>,
}

impl RiskMonitor {
    pub fn new(
        config: MonitorConfig,
        engine: RiskEngine,
        location: Arc<dyn LocationProvider>,
        history: Arc<dyn HistoryStore>,
        telemetry: Arc<TelemetryCollector>,
    ) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            share_location: AtomicBool::new(config.share_location),
            config,
            engine,
            location,
            history,
            telemetry,
            clock: Arc::new(SystemClock),
            last_fix: Mutex::new(None),
            latest,
        }
    }

    /// Replace the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Watch the most recent evaluation
    pub fn subscribe(&self) -> watch::Receiver<Option<Evaluation>> {
        self.latest.subscribe()
    }

    pub fn latest(&self) -> Option<Evaluation> {
        self.latest.borrow().clone()
    }

    /// Location-sharing toggle. While off, assessments carry no location.
    pub fn set_location_sharing(&self, enabled: bool) {
        self.share_location.store(enabled, Ordering::Relaxed);
        if enabled {
            info!("📍 Location sharing enabled for better risk assessment");
        } else {
            info!("📍 Location sharing disabled, risk assessment will be limited");
        }
    }

    pub fn location_sharing(&self) -> bool {
        self.share_location.load(Ordering::Relaxed)
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.config.utc_offset)
    }

    /// Run one evaluation now
    pub async fn evaluate_once(&self) -> Evaluation {
        let now = self.local_now();

        let (fix, fallback) = if self.location_sharing() {
            let (fix, fallback) = self.acquire_location().await;
            (Some(fix), fallback)
        } else {
            (None, None)
        };

        let history = match self.history.recent(&now, HISTORY_WINDOW_HOURS) {
            Ok(entries) => entries,
            Err(e) => {
                self.history_failure("read", &e);
                Vec::new()
            }
        };

        let assessment = self
            .engine
            .assess(&now, fix.map(|f| f.coordinate), &history);

        if let Err(e) = self.history.append(assessment.clone()) {
            self.history_failure("append", &e);
        }

        self.telemetry.record_assessment(&assessment);
        info!(
            "{} Risk {} ({}%) with {} factors",
            assessment.level.emoji(),
            assessment.level,
            assessment.score,
            assessment.factors.len()
        );
        debug!("{}", assessment.summary());

        let evaluation = Evaluation {
            recommendations: recommend(&assessment),
            assessment,
            fallback,
        };
        self.latest.send_replace(Some(evaluation.clone()));
        evaluation
    }

    /// Fresh fix within the timeout, else last known fix within max age,
    /// else the configured default coordinate.
    async fn acquire_location(&self) -> (LocationFix, Option<LocationFallback>) {
        let timeout = self.config.location_timeout;
        let result = match tokio::time::timeout(timeout, self.location.current_fix()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::location_timeout(timeout)),
        };

        match result {
            Ok(fix) => {
                *self.last_fix_guard() = Some((fix, Instant::now()));
                (fix, None)
            }
            Err(e) => {
                let cached = *self.last_fix_guard();
                let (fix, fallback) = match cached {
                    Some((fix, at)) if at.elapsed() <= self.config.location_max_age => {
                        (fix, LocationFallback::LastKnown)
                    }
                    _ => (
                        LocationFix::new(self.config.default_location, None),
                        LocationFallback::Default,
                    ),
                };
                warn!("⚠️ Location unavailable ({}), using {:?} fix", e, fallback);
                self.telemetry.record_fallback(fallback);
                (fix, Some(fallback))
            }
        }
    }

    fn last_fix_guard(&self) -> std::sync::MutexGuard<'_, Option<(LocationFix, Instant)>> {
        match self.last_fix.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn history_failure(&self, operation: &str, error: &AppError) {
        if error.code.is_retryable() {
            warn!("⚠️ History {} failed, retrying next tick: {}", operation, error);
        } else {
            warn!("⚠️ History {} failed: {}", operation, error);
        }
        self.telemetry.record_history_failure();
    }

    /// Evaluate on schedule until `shutdown` resolves.
    /// The first evaluation happens immediately.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "🚀 Risk monitor started (every {}s, every {}s at night)",
            self.config.interval.as_secs(),
            self.config.night_interval.as_secs()
        );

        let mut regular = interval(self.config.interval);
        regular.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut night = interval_at(
            Instant::now() + self.config.night_interval,
            self.config.night_interval,
        );
        night.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            let regular_tick = tokio::select! {
                _ = &mut shutdown => break,
                _ = regular.tick() => true,
                _ = night.tick() => false,
            };

            if !regular_tick {
                let hour = self.local_now().hour();
                if !is_night_band(hour) {
                    debug!("Night tick skipped at hour {}", hour);
                    continue;
                }
            }

            // A pending location fix must not hold up shutdown
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.evaluate_once() => {}
            }
        }

        info!("🛑 Risk monitor stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::MemoryHistory;
    use crate::models::types::Coordinate;
    use crate::providers::{FixedClock, StaticLocation, UnavailableLocation};
    use chrono::{TimeZone, Utc};

    fn monitor(location: Arc<dyn LocationProvider>, hour: u32) -> RiskMonitor {
        let config = MonitorConfig {
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            ..MonitorConfig::default()
        };
        RiskMonitor::new(
            config,
            RiskEngine::default(),
            location,
            Arc::new(MemoryHistory::new()),
            Arc::new(TelemetryCollector::new()),
        )
        .with_clock(Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 3, 6, hour, 0, 0).unwrap(),
        )))
    }

    #[tokio::test]
    async fn test_evaluate_once_uses_fresh_fix() {
        let coordinate = Coordinate::new(51.5, -0.12);
        let monitor = monitor(Arc::new(StaticLocation::new(coordinate, Some(8.0))), 12);

        let evaluation = monitor.evaluate_once().await;
        assert!(evaluation.fallback.is_none());
        assert_eq!(evaluation.assessment.location, Some(coordinate));
        assert_eq!(evaluation.assessment.score, 30);
        assert!(monitor.latest().is_some());
    }

    #[tokio::test]
    async fn test_unavailable_location_falls_back_to_default() {
        let monitor = monitor(Arc::new(UnavailableLocation), 12);
        let evaluation = monitor.evaluate_once().await;

        assert_eq!(evaluation.fallback, Some(LocationFallback::Default));
        assert_eq!(
            evaluation.assessment.location,
            Some(monitor.config().default_location)
        );
    }

    #[tokio::test]
    async fn test_sharing_disabled_skips_location() {
        let monitor = monitor(Arc::new(UnavailableLocation), 12);
        monitor.set_location_sharing(false);

        let evaluation = monitor.evaluate_once().await;
        assert!(evaluation.assessment.location.is_none());
        assert!(evaluation.fallback.is_none());
    }
}
