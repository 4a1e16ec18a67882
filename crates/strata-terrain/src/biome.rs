//! Biome roots.
//!
//! A biome root is drawn per slice; when present it picks a biome by weight
//! and a radius in `[min_biome, max_biome]`.

use std::ops::Range;

use rand::Rng;
use rand::distr::Distribution;

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{BiomeFeature, BiomeId, FeatureKind};
use crate::seed::feature_rng;
use crate::tables::TerrainTables;

/// Evaluates the biome root at `position` from its own RNG stream.
pub fn generate_biome(tables: &TerrainTables, seed: u64, position: i64) -> Option<BiomeFeature> {
    let mut rng = feature_rng(seed, position, FeatureKind::Biome);
    if !rng.random_bool(tables.biome_chance) {
        return None;
    }
    let weights = tables.biome_weights.as_ref()?;
    let biome = BiomeId(weights.sample(&mut rng) as u16);
    let radius = rng.random_range(tables.min_biome..=tables.max_biome);
    Some(BiomeFeature { biome, radius })
}

/// Cached biome root at `position`, generated on first use.
pub fn biome_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    position: i64,
) -> Result<Option<BiomeFeature>, TerrainError> {
    cache.get_or_insert_with(position, FeatureKind::Biome, || {
        Ok(generate_biome(tables, seed, position))
    })
}

/// Fills the biome slot of every slice in `window`.
pub fn collect_biomes(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    window: Range<i64>,
) -> Result<(), TerrainError> {
    for position in window {
        biome_at(cache, tables, seed, position)?;
    }
    Ok(())
}
