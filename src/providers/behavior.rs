//! Behavior profile sources

use rand::Rng;

use super::seeded_rng;
use crate::models::types::BehaviorProfile;

/// User behavior flags. `None` = profile unavailable, no contribution.
pub trait BehaviorProvider: Send + Sync {
    fn profile(&self) -> Option<BehaviorProfile>;
}

/// Simulated profile: night activity 30% of the time, regular routes 50%.
/// Fixed for the lifetime of the provider.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBehavior {
    profile: BehaviorProfile,
}

impl SimulatedBehavior {
    pub fn new(seed: u64) -> Self {
        let mut rng = seeded_rng(seed, 0xB3A7);
        Self {
            profile: BehaviorProfile {
                frequent_night_activity: rng.gen::<f64>() > 0.7,
                regular_routes: rng.gen::<f64>() > 0.5,
            },
        }
    }
}

impl BehaviorProvider for SimulatedBehavior {
    fn profile(&self) -> Option<BehaviorProfile> {
        Some(self.profile)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedBehavior(pub BehaviorProfile);

impl BehaviorProvider for FixedBehavior {
    fn profile(&self) -> Option<BehaviorProfile> {
        Some(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBehavior;

impl BehaviorProvider for NoBehavior {
    fn profile(&self) -> Option<BehaviorProfile> {
        None
    }
}
