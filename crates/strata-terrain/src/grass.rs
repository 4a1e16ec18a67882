//! Grass tufts on top of the surface.

use std::ops::Range;

use rand::Rng;
use strata_blocks::{BlockRegistry, SliceMap, symbols};

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{BiomeId, FeatureKind, GrassFeature};
use crate::generator::place_block;
use crate::resolve::ResolvedTerrain;
use crate::seed::feature_rng;
use crate::tables::TerrainTables;

/// Rolls the biome's grass chance at `position`, recording the ground height
/// the tuft sits on.
pub fn generate_grass(
    tables: &TerrainTables,
    seed: u64,
    position: i64,
    ground_height: usize,
    biome: BiomeId,
) -> Option<GrassFeature> {
    let mut rng = feature_rng(seed, position, FeatureKind::Grass);
    rng.random_bool(tables.biome(biome).grass_chance)
        .then_some(GrassFeature { ground_height })
}

/// Cached grass at `position`, generated on first use.
pub fn grass_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    position: i64,
) -> Result<Option<GrassFeature>, TerrainError> {
    let ground_height = terrain.ground_height(position)?;
    let biome = terrain.biome(position)?;
    cache.get_or_insert_with(position, FeatureKind::Grass, || {
        Ok(generate_grass(tables, seed, position, ground_height, biome))
    })
}

/// Ensures every slice in `window` has its grass slot computed.
pub fn collect_grass(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    window: Range<i64>,
) -> Result<(), TerrainError> {
    for position in window {
        grass_at(cache, tables, seed, terrain, position)?;
    }
    Ok(())
}

/// Puts the tuft in the cell directly above the surface marker.
pub fn place_grass(
    chunk: &mut SliceMap,
    blocks: &BlockRegistry,
    tables: &TerrainTables,
    x: i64,
    grass: &GrassFeature,
) {
    let row = tables.height as i64 - grass.ground_height as i64 - 1;
    place_block(chunk, blocks, x, row, symbols::GRASS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::{Config, WorldGenConfig};

    #[test]
    fn test_grass_records_ground_height() {
        let mut config = WorldGenConfig::default();
        config.biomes.get_mut("normal").unwrap().grass = 1.0;
        let tables = TerrainTables::new(&config).unwrap();
        let grass = generate_grass(&tables, 0, 3, 27, tables.default_biome).unwrap();
        assert_eq!(grass.ground_height, 27);
    }

    #[test]
    fn test_grass_yields_to_trunk() {
        let tables = TerrainTables::new(&WorldGenConfig::default()).unwrap();
        let blocks = Config::default().block_registry().unwrap();
        let mut chunk = SliceMap::new();
        chunk.insert(0, vec![symbols::AIR; tables.height]);
        chunk.insert(1, vec![symbols::AIR; tables.height]);
        let row = tables.height - tables.ground_height - 1;
        chunk.get_mut(1).unwrap()[row] = symbols::TRUNK;

        let grass = GrassFeature {
            ground_height: tables.ground_height,
        };
        place_grass(&mut chunk, &blocks, &tables, 0, &grass);
        place_grass(&mut chunk, &blocks, &tables, 1, &grass);
        place_grass(&mut chunk, &blocks, &tables, 2, &grass);

        assert_eq!(chunk.block(0, row), Some(symbols::GRASS));
        assert_eq!(chunk.block(1, row), Some(symbols::TRUNK));
        assert!(!chunk.contains(2));
    }
}
