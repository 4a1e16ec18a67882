//! Per-save world state shared with the terrain engine.

use serde::{Deserialize, Serialize};

/// Mutable state of one save: the world seed and the sun angle.
///
/// The terrain engine only ever reads `seed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMeta {
    /// World seed every feature stream derives from.
    pub seed: u64,
    /// Sun angle in radians, advanced once per tick.
    pub tick: f64,
}

impl WorldMeta {
    /// Fresh meta for a new save.
    pub fn new(seed: u64) -> Self {
        Self { seed, tick: 0.0 }
    }
}

impl Default for WorldMeta {
    fn default() -> Self {
        Self::new(0)
    }
}
