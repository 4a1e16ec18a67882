//! Terrain engine error types.

use strata_config::ConfigError;

use crate::feature::FeatureKind;

/// Errors raised by the terrain engine.
///
/// Apart from [`TerrainError::Config`], these are invariant violations: a
/// correct build never produces them, and callers must not swallow them.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The world generation configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cache slot holds a feature of a different kind, or the slot does not exist.
    #[error("feature cache entry at {position} is inconsistent for {kind:?}")]
    CacheConsistency {
        /// Slice position of the entry.
        position: i64,
        /// Kind that was looked up.
        kind: FeatureKind,
    },

    /// A slice was read outside every resolved window.
    #[error("slice {position} lies outside the resolved window")]
    OutOfRange {
        /// The offending slice position.
        position: i64,
    },
}
