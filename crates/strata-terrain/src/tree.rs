//! Trees: trunk plus a leaf silhouette centred on the trunk column.

use std::ops::Range;

use rand::Rng;
use strata_blocks::{BlockRegistry, SliceMap, symbols};

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{BiomeId, FeatureKind, TreeFeature};
use crate::generator::place_block;
use crate::resolve::ResolvedTerrain;
use crate::seed::feature_rng;
use crate::tables::TerrainTables;

/// Evaluates the tree at `position`, given the slice's resolved ground
/// height and biome.
///
/// The tree type is drawn before the presence check, so the type is part of
/// the stream even when no tree spawns.
pub fn generate_tree(
    tables: &TerrainTables,
    seed: u64,
    position: i64,
    ground_height: usize,
    biome: BiomeId,
) -> Option<TreeFeature> {
    if tables.trees.is_empty() {
        return None;
    }
    let mut rng = feature_rng(seed, position, FeatureKind::Tree);
    let tree_type = rng.random_range(0..tables.trees.len());
    let tree = &tables.trees[tree_type];

    let chance = (tables.biome(biome).tree_chance * tree.chance).clamp(0.0, 1.0);
    if !rng.random_bool(chance) {
        return None;
    }

    let air = tables.height.saturating_sub(ground_height);
    let overhang = tree.center().len() - tree.trunk_depth;
    let tallest = air.saturating_sub(overhang).max(2);
    Some(TreeFeature {
        tree_type,
        trunk_depth: tree.trunk_depth,
        height: rng.random_range(2..=tallest),
    })
}

/// Cached tree at `position`, generated on first use.
pub fn tree_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    position: i64,
) -> Result<Option<TreeFeature>, TerrainError> {
    let ground_height = terrain.ground_height(position)?;
    let biome = terrain.biome(position)?;
    cache.get_or_insert_with(position, FeatureKind::Tree, || {
        Ok(generate_tree(tables, seed, position, ground_height, biome))
    })
}

/// Fills the tree slot of every slice in `window`.
pub fn collect_trees(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    window: Range<i64>,
) -> Result<(), TerrainError> {
    for position in window {
        tree_at(cache, tables, seed, terrain, position)?;
    }
    Ok(())
}

/// Paints the tree rooted at `x` into `chunk`. Cells outside the chunk's
/// columns or the world's rows are skipped.
pub fn place_tree(
    chunk: &mut SliceMap,
    blocks: &BlockRegistry,
    tables: &TerrainTables,
    terrain: &ResolvedTerrain,
    x: i64,
    tree: &TreeFeature,
) -> Result<(), TerrainError> {
    let shape = tables
        .trees
        .get(tree.tree_type)
        .ok_or(TerrainError::CacheConsistency {
            position: x,
            kind: FeatureKind::Tree,
        })?;
    let air = tables.height as i64 - terrain.ground_height(x)? as i64;
    let trunk = tree.height as i64;

    if chunk.contains(x) {
        for row in air - trunk..air {
            place_block(chunk, blocks, x, row, symbols::TRUNK);
        }
    }

    let half = shape.half_width() as i64;
    for (dx, column) in shape.leaves.iter().enumerate() {
        let leaf_x = x + dx as i64 - half;
        if !chunk.contains(leaf_x) {
            continue;
        }
        let top = air - trunk - column.len() as i64 + tree.trunk_depth as i64;
        for (dy, _) in column.iter().enumerate().filter(|(_, leaf)| **leaf) {
            place_block(chunk, blocks, leaf_x, top + dy as i64, symbols::LEAF);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::{Config, WorldGenConfig};

    fn forest_tables() -> TerrainTables {
        let mut config = WorldGenConfig {
            biome_chance: 0.0,
            hill_chance: 0.0,
            default_biome: "forest".to_string(),
            ..Default::default()
        };
        for tree in &mut config.trees {
            tree.chance = 1.0;
        }
        TerrainTables::new(&config).unwrap()
    }

    #[test]
    fn test_height_bounds() {
        let tables = forest_tables();
        for x in 0..200 {
            let tree = generate_tree(&tables, 11, x, 24, tables.default_biome).unwrap();
            let shape = &tables.trees[tree.tree_type];
            let overhang = shape.center().len() - shape.trunk_depth;
            assert!(tree.height >= 2);
            assert!(tree.height <= (64 - 24 - overhang).max(2));
            assert_eq!(tree.trunk_depth, shape.trunk_depth);
        }
    }

    #[test]
    fn test_treeless_biome() {
        let mut config = WorldGenConfig::default();
        config.default_biome = "desert".to_string();
        let tables = TerrainTables::new(&config).unwrap();
        assert!((0..100).all(|x| generate_tree(&tables, 2, x, 24, tables.default_biome).is_none()));
    }

    #[test]
    fn test_place_tree_clips_to_chunk() {
        let tables = forest_tables();
        let blocks = Config::default().block_registry().unwrap();
        let windows = tables.windows(0);
        let mut cache = FeatureCache::new(tables.cache_capacity(), tables.ores.len());
        let terrain = ResolvedTerrain::resolve(&mut cache, &tables, 0, &windows).unwrap();

        let mut chunk: SliceMap = windows
            .chunk
            .clone()
            .map(|x| (x, vec![symbols::AIR; tables.height]))
            .collect();
        let tree = TreeFeature {
            tree_type: 0,
            trunk_depth: 1,
            height: 3,
        };
        // Anchored one slice left of the chunk: only the two right leaf columns land.
        place_tree(&mut chunk, &blocks, &tables, &terrain, -1, &tree).unwrap();

        let air = tables.height - tables.ground_height;
        assert!(!chunk.contains(-1));
        // Leaf column 3 is [true, true, true, false]; its top sits at air - 3 - 4 + 1.
        let top = air - 3 - 4 + 1;
        for row in top..top + 3 {
            assert_eq!(chunk.block(0, row), Some(symbols::LEAF));
        }
        assert_eq!(chunk.block(0, top + 3), Some(symbols::AIR));
        // Leaf column 4 is [false, true, true, false].
        assert_eq!(chunk.block(1, top), Some(symbols::AIR));
        assert_eq!(chunk.block(1, top + 1), Some(symbols::LEAF));
        assert_eq!(chunk.block(2, top + 1), Some(symbols::AIR));
    }

    #[test]
    fn test_trunk_sits_on_surface() {
        let tables = forest_tables();
        let blocks = Config::default().block_registry().unwrap();
        let windows = tables.windows(0);
        let mut cache = FeatureCache::new(tables.cache_capacity(), tables.ores.len());
        let terrain = ResolvedTerrain::resolve(&mut cache, &tables, 0, &windows).unwrap();
        let mut chunk: SliceMap = windows
            .chunk
            .clone()
            .map(|x| (x, vec![symbols::AIR; tables.height]))
            .collect();
        let tree = TreeFeature {
            tree_type: 1,
            trunk_depth: 1,
            height: 4,
        };
        place_tree(&mut chunk, &blocks, &tables, &terrain, 5, &tree).unwrap();
        let air = tables.height - tables.ground_height;
        for row in air - 4..air {
            assert_eq!(chunk.block(5, row), Some(symbols::TRUNK), "trunk row {row}");
        }
        assert_eq!(chunk.block(5, air), Some(symbols::AIR));
        // Center column [true, true, false]: its empty bottom cell is the top trunk row.
        assert_eq!(chunk.block(5, air - 6), Some(symbols::LEAF));
        assert_eq!(chunk.block(5, air - 5), Some(symbols::LEAF));
        assert_eq!(chunk.block(4, air - 5), Some(symbols::LEAF));
        assert_eq!(chunk.block(4, air - 6), Some(symbols::AIR));
    }
}
