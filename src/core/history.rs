//! Assessment history
//!
//! Append-only log of past assessments, capped at the most recent
//! `HISTORY_CAPACITY` entries. The historical analyzer reads it; the monitor
//! appends to it after every evaluation.

use chrono::{DateTime, Duration, FixedOffset};
use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::RiskAssessment;
use crate::utils::constants::HISTORY_CAPACITY;

/// Storage for past assessments
pub trait HistoryStore: Send + Sync {
    /// Append one assessment, evicting the oldest beyond capacity
    fn append(&self, assessment: RiskAssessment) -> AppResult<()>;

    /// All retained entries, oldest first
    fn entries(&self) -> AppResult<Vec<RiskAssessment>>;

    /// Entries no older than `hours` relative to `now`
    fn recent(&self, now: &DateTime<FixedOffset>, hours: i64) -> AppResult<Vec<RiskAssessment>> {
        let window = Duration::hours(hours);
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| now.signed_duration_since(entry.timestamp) <= window)
            .collect())
    }

    fn len(&self) -> AppResult<usize> {
        Ok(self.entries()?.len())
    }

    fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory history
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RwLock<VecDeque<RiskAssessment>>,
    capacity: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, assessment: RiskAssessment) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::new(ErrorCode::HistoryIo, "History lock poisoned"))?;
        entries.push_back(assessment);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    fn entries(&self) -> AppResult<Vec<RiskAssessment>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::new(ErrorCode::HistoryIo, "History lock poisoned"))?;
        Ok(entries.iter().cloned().collect())
    }

    fn len(&self) -> AppResult<usize> {
        self.entries
            .read()
            .map(|e| e.len())
            .map_err(|_| AppError::new(ErrorCode::HistoryIo, "History lock poisoned"))
    }
}

/// History persisted as a JSON array in a single file.
///
/// A missing file reads as empty. A corrupt file makes `entries()` fail with
/// `HISTORY_CORRUPT`; the next `append()` starts a fresh log over it.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    capacity: usize,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, HISTORY_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> AppResult<Vec<RiskAssessment>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorCode::HistoryIo,
                    format!("Failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    fn store(&self, entries: &[RiskAssessment]) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl HistoryStore for FileHistory {
    fn append(&self, assessment: RiskAssessment) -> AppResult<()> {
        let _guard = self.guard();

        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) if e.code == ErrorCode::HistoryCorrupt => {
                warn!("⚠️ {}: starting a fresh history log", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        entries.push(assessment);
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }

        self.store(&entries)?;
        debug!("💾 History: {} entries in {}", entries.len(), self.path.display());
        Ok(())
    }

    fn entries(&self) -> AppResult<Vec<RiskAssessment>> {
        let _guard = self.guard();
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::RiskLevel;
    use chrono::TimeZone;

    fn assessment(score: u8, minutes: i64) -> RiskAssessment {
        let base = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 0, 0, 0)
            .unwrap();
        RiskAssessment {
            score,
            level: RiskLevel::from_score(score),
            factors: vec![],
            location: None,
            timestamp: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_memory_history_caps_at_capacity() {
        let history = MemoryHistory::new();
        for i in 0..150 {
            history.append(assessment((i % 100) as u8, i)).unwrap();
        }

        let entries = history.entries().unwrap();
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        // Oldest 50 evicted
        assert_eq!(entries.first().unwrap().timestamp, assessment(0, 50).timestamp);
        assert_eq!(entries.last().unwrap().timestamp, assessment(0, 149).timestamp);
    }

    #[test]
    fn test_recent_window() {
        let history = MemoryHistory::new();
        history.append(assessment(80, 0)).unwrap();
        history.append(assessment(20, 60 * 20)).unwrap();

        let now = assessment(0, 60 * 24).timestamp;
        let recent = history.recent(&now, 24).unwrap();
        assert_eq!(recent.len(), 2, "exactly 24h old is still inside the window");

        let now = assessment(0, 60 * 24 + 1).timestamp;
        let recent = history.recent(&now, 24).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].score, 20);
    }

    #[test]
    fn test_file_history_roundtrip_and_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("risk-history.json");
        let history = FileHistory::with_capacity(&path, 3);

        assert!(history.is_empty().unwrap());
        for i in 0..5 {
            history.append(assessment(10 * i as u8, i)).unwrap();
        }

        let reopened = FileHistory::with_capacity(&path, 3);
        let scores: Vec<u8> = reopened.entries().unwrap().iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![20, 30, 40]);
    }

    #[test]
    fn test_file_history_recovers_from_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk-history.json");
        fs::write(&path, "{not json").unwrap();

        let history = FileHistory::new(&path);
        let err = history.entries().unwrap_err();
        assert_eq!(err.code, ErrorCode::HistoryCorrupt);

        history.append(assessment(55, 0)).unwrap();
        assert_eq!(history.len().unwrap(), 1);
    }
}
