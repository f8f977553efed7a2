//! Providers Module - External Data Sources
//!
//! Clock, positioning, location signals, weather and behavior profiles sit behind
//! traits so production feeds and deterministic fakes are interchangeable.
//! The simulated implementations stand in for feeds the app does not have yet.

pub mod behavior;
pub mod clock;
pub mod location;
pub mod signals;
pub mod weather;

pub use behavior::*;
pub use clock::*;
pub use location::*;
pub use signals::*;
pub use weather::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::types::Coordinate;

/// Stable 64-bit key for a coordinate, used to seed simulations
pub(crate) fn coordinate_seed(coordinate: Coordinate) -> u64 {
    coordinate.lat.to_bits() ^ coordinate.lng.to_bits().rotate_left(32)
}

/// Deterministic RNG for a (seed, salt) pair. `seed_from_u64` scrambles the input.
pub(crate) fn seeded_rng(seed: u64, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ salt.rotate_left(17))
}
