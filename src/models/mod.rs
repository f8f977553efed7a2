//! Models Module - Data Structures & Configuration
//!
//! Assessment types, error codes and monitor configuration.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
