//! Location Signal Cache
//!
//! TTL cache in front of a `LocationSignalProvider`, for feeds where a lookup
//! is expensive (crime statistics, lighting surveys).
//!
//! Features:
//! - TTL-based expiration (5 minutes default)
//! - Keys snap coordinates to a ~100 m grid and include the local hour
//! - Cache HIT/MISS logging and counters
//! - Thread-safe with DashMap, no explicit locking
//! - Optional background cleanup task

use chrono::{DateTime, FixedOffset, Timelike};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::types::{Coordinate, LocationSignals};
use crate::providers::LocationSignalProvider;
use crate::utils::constants::DEFAULT_SIGNAL_CACHE_TTL_SECS;

/// Grid resolution in degrees (~110 m of latitude)
const GRID_DEGREES: f64 = 0.001;

/// Cache entry with timestamp for TTL validation
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// `None` caches "no data" answers too
    pub signals: Option<LocationSignals>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    lat_cell: i64,
    lng_cell: i64,
    hour: u32,
}

impl CacheKey {
    fn new(coordinate: Coordinate, hour: u32) -> Self {
        Self {
            lat_cell: (coordinate.lat / GRID_DEGREES).round() as i64,
            lng_cell: (coordinate.lng / GRID_DEGREES).round() as i64,
            hour,
        }
    }
}

/// Caching wrapper around any signal provider
pub struct CachedSignals<P> {
    inner: P,
    store: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: LocationSignalProvider> CachedSignals<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, Duration::from_secs(DEFAULT_SIGNAL_CACHE_TTL_SECS))
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            store: Arc::new(DashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Remove expired entries
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before - self.store.len();
        if removed > 0 {
            debug!("🧹 SIGNAL CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl.as_secs(),
        }
    }

}

impl<P: LocationSignalProvider + 'static> CachedSignals<P> {
    /// Background task: drop expired entries every `period`.
    /// Keys are per grid cell and hour, so a moving user keeps adding new ones.
    pub fn spawn_cleanup(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = cache.cleanup_expired();
                if removed > 0 {
                    let stats = cache.stats();
                    info!(
                        "🧹 Signal cache cleanup: {} removed, {} left ({:.1}% hit rate)",
                        removed, stats.entries, stats.hit_rate
                    );
                }
            }
        })
    }
}

impl<P: LocationSignalProvider> LocationSignalProvider for CachedSignals<P> {
    fn signals(&self, coordinate: Coordinate, now: &DateTime<FixedOffset>) -> Option<LocationSignals> {
        let key = CacheKey::new(coordinate, now.hour());

        if let Some(entry) = self.store.get(&key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "✅ SIGNAL CACHE HIT: {:?} (TTL: {}s remaining)",
                    key,
                    entry.remaining_ttl().as_secs()
                );
                return entry.signals;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("📭 SIGNAL CACHE MISS: {:?}", key);

        let signals = self.inner.signals(coordinate, now);
        self.store.insert(
            key,
            CacheEntry {
                signals,
                created_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        signals
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;

    struct CountingSignals {
        calls: AtomicUsize,
    }

    impl LocationSignalProvider for CountingSignals {
        fn signals(&self, _coordinate: Coordinate, _now: &DateTime<FixedOffset>) -> Option<LocationSignals> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(LocationSignals {
                population_density: 0.5,
                lighting_quality: 0.5,
                incident_rate: 0.5,
            })
        }
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 12, 0, 0)
            .unwrap()
    }

    fn cache() -> CachedSignals<CountingSignals> {
        CachedSignals::new(CountingSignals {
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_cache_hit_within_grid_cell() {
        let cache = cache();
        cache.signals(Coordinate::new(40.71280, -74.00600), &noon());
        cache.signals(Coordinate::new(40.71284, -74.00603), &noon());

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_cache_miss_on_new_hour_or_cell() {
        let cache = cache();
        let coordinate = Coordinate::new(40.7128, -74.0060);
        cache.signals(coordinate, &noon());
        cache.signals(coordinate, &(noon() + chrono::Duration::hours(1)));
        cache.signals(Coordinate::new(40.7228, -74.0060), &noon());

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_expired_entries_are_refreshed() {
        let cache = CachedSignals::with_ttl(
            CountingSignals {
                calls: AtomicUsize::new(0),
            },
            Duration::ZERO,
        );
        let coordinate = Coordinate::new(1.0, 1.0);
        cache.signals(coordinate, &noon());
        std::thread::sleep(Duration::from_millis(5));
        cache.signals(coordinate, &noon());

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.cleanup_expired(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_task_drops_visited_cells() {
        let cache = Arc::new(CachedSignals::with_ttl(
            CountingSignals {
                calls: AtomicUsize::new(0),
            },
            Duration::ZERO,
        ));
        for i in 0..500 {
            cache.signals(Coordinate::new(40.0 + f64::from(i) * 0.002, -74.0), &noon());
        }
        assert_eq!(cache.stats().entries, 500);
        std::thread::sleep(Duration::from_millis(5));

        let handle = cache.spawn_cleanup(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(cache.stats().entries, 0);
    }
}
