//! Telemetry Module
//!
//! Counts evaluations by level plus location fallbacks and store failures.
//! Privacy-first: no coordinates or timestamps of individual assessments are
//! kept here, only aggregates.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::{RiskAssessment, RiskLevel};

/// Why the monitor did not use a fresh fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationFallback {
    /// Previous fix still within its max age
    LastKnown,
    /// Configured default coordinate
    Default,
}

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    pub total_assessments: u64,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub avg_score: f64,
    pub last_known_fallbacks: u64,
    pub default_fallbacks: u64,
    pub history_failures: u64,
    pub period_start: u64,
    pub period_end: u64,
}

impl TelemetryStats {
    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            r#"
📊 Risk Monitor Summary ({} minutes)
   Assessments:        {:>8}
   🟢 Low:             {:>8}
   🟠 Medium:          {:>8}
   🔴 High:            {:>8}
   Average score:      {:>8.1}
   Last-known fixes:   {:>8}
   Default fixes:      {:>8}
   History failures:   {:>8}
"#,
            self.period_end.saturating_sub(self.period_start) / 60,
            self.total_assessments,
            self.low,
            self.medium,
            self.high,
            self.avg_score,
            self.last_known_fallbacks,
            self.default_fallbacks,
            self.history_failures,
        )
    }
}

/// Lock-free telemetry collector
pub struct TelemetryCollector {
    total: AtomicU64,
    low: AtomicU64,
    medium: AtomicU64,
    high: AtomicU64,
    score_sum: AtomicU64,
    last_known_fallbacks: AtomicU64,
    default_fallbacks: AtomicU64,
    history_failures: AtomicU64,
    session_start: u64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            low: AtomicU64::new(0),
            medium: AtomicU64::new(0),
            high: AtomicU64::new(0),
            score_sum: AtomicU64::new(0),
            last_known_fallbacks: AtomicU64::new(0),
            default_fallbacks: AtomicU64::new(0),
            history_failures: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    pub fn record_assessment(&self, assessment: &RiskAssessment) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.score_sum
            .fetch_add(u64::from(assessment.score), Ordering::Relaxed);
        let counter = match assessment.level {
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self, fallback: LocationFallback) {
        let counter = match fallback {
            LocationFallback::LastKnown => &self.last_known_fallbacks,
            LocationFallback::Default => &self.default_fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_history_failure(&self) {
        self.history_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total = self.total.load(Ordering::Relaxed);
        let score_sum = self.score_sum.load(Ordering::Relaxed);

        TelemetryStats {
            total_assessments: total,
            low: self.low.load(Ordering::Relaxed),
            medium: self.medium.load(Ordering::Relaxed),
            high: self.high.load(Ordering::Relaxed),
            avg_score: if total > 0 {
                score_sum as f64 / total as f64
            } else {
                0.0
            },
            last_known_fallbacks: self.last_known_fallbacks.load(Ordering::Relaxed),
            default_fallbacks: self.default_fallbacks.load(Ordering::Relaxed),
            history_failures: self.history_failures.load(Ordering::Relaxed),
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Export current stats to `stats_<unix>.json` inside `dir`
    pub fn export_stats_json(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let path = dir.join(format!("stats_{}.json", stats.period_end));
        fs::write(&path, serde_json::to_string_pretty(&stats)?)?;
        Ok(path)
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
