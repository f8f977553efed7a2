//! Core Module - Scoring Logic
//!
//! Risk engine with its five analyzers, assessment history,
//! recommendation rules and route safety scoring.

pub mod engine;
pub mod history;
pub mod recommendations;
pub mod route_safety;

pub use engine::*;
pub use history::*;
pub use recommendations::*;
pub use route_safety::*;
