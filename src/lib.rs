//! SheSecure Risk Library
//!
//! Personal safety risk scoring. Combines five analyzers into a 0-100 score:
//! - Time of day and weekend activity
//! - Location signals (density, lighting, incidents)
//! - Weather (visibility, precipitation)
//! - Recent assessment history
//! - Travel behavior
//!
//! The monitor re-evaluates on a schedule that tightens during night hours.

pub mod core;
pub mod models;
pub mod monitor;
pub mod providers;
pub mod utils;

pub use crate::core::engine::{RiskEngine, RiskEngineBuilder};
pub use crate::core::history::{FileHistory, HistoryStore, MemoryHistory};
pub use crate::core::recommendations::recommend;
pub use crate::core::route_safety::{safest_route, score_route, RouteCandidate, RouteSafety};
pub use models::config::MonitorConfig;
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{
    Coordinate, LocationFix, Recommendation, RiskAssessment, RiskFactor, RiskLevel,
};
pub use monitor::{Evaluation, RiskMonitor};
pub use utils::cache::{CacheStats, CachedSignals};
pub use utils::telemetry::{LocationFallback, TelemetryCollector, TelemetryStats};
