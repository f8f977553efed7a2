//! Utils Module - Shared Helpers
//!
//! Scoring constants, the signal cache and telemetry counters.

pub mod cache;
pub mod constants;
pub mod telemetry;

pub use cache::*;
pub use constants::*;
pub use telemetry::*;
