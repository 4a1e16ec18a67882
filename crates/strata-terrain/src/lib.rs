//! Deterministic 2D terrain generation: feature cache, per-kind feature generators, elevation and biome resolution, chunk assembly, and gravity.

mod cache;
mod error;
mod generator;
mod meta;
mod resolve;
mod tables;

pub mod biome;
pub mod cave;
pub mod feature;
pub mod gravity;
pub mod grass;
pub mod hill;
pub mod ore;
pub mod seed;
pub mod tree;

pub use cache::FeatureCache;
pub use error::TerrainError;
pub use feature::{
    BiomeFeature, BiomeId, CaveFeature, Feature, FeatureKind, GrassFeature, HillFeature, OreId,
    OreRoot, SliceFeatures, Slot, TreeFeature, TypedFeature,
};
pub use generator::{GeneratedChunk, TerrainGenerator};
pub use gravity::{FallDeltas, apply_deltas, fall_step, grounded_cells};
pub use meta::WorldMeta;
pub use resolve::{GroundHeights, ResolvedTerrain, SliceBiome};
pub use seed::{derive_feature_seed, feature_rng};
pub use tables::{Biome, OreType, TerrainTables, TreeType, Windows};
