//! Ore veins.
//!
//! Each ore type rolls its own root per slice. A root carries a depth and a
//! vein shape: one distinct threshold per cell of the `vein_size²` window,
//! drawn without replacement from `{0.00, 0.01, .., 0.99}`. A cell becomes
//! ore when its threshold is below the ore's density.

use std::ops::Range;

use rand::Rng;
use rand::seq::index;
use strata_blocks::{BlockRegistry, SliceMap, symbols};
use strata_config::MAX_VEIN_CELLS;

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{FeatureKind, OreRoot};
use crate::generator::place_block;
use crate::resolve::ResolvedTerrain;
use crate::seed::feature_rng;
use crate::tables::{OreType, TerrainTables};

/// Evaluates the root of `ore` at `position`.
///
/// The depth is drawn between the ore's bounds, with the upper bound kept at
/// least one cell under the slice's ground.
pub fn generate_ore(
    tables: &TerrainTables,
    ore: &OreType,
    seed: u64,
    position: i64,
    ground_height: usize,
) -> Option<OreRoot> {
    let mut rng = feature_rng(seed, position, FeatureKind::Ore(ore.id));
    if !rng.random_bool(ore.chance) {
        return None;
    }

    let height = tables.height as f64;
    let upper = ((height * ore.upper) as usize).min(ground_height.saturating_sub(1));
    let lower = ((height * ore.lower) as usize).min(upper);
    let depth = rng.random_range(lower..=upper);

    let cells = (ore.vein_size * ore.vein_size).min(MAX_VEIN_CELLS) as usize;
    let vein_shape = index::sample(&mut rng, MAX_VEIN_CELLS as usize, cells)
        .into_iter()
        .map(|value| value as f64 / f64::from(MAX_VEIN_CELLS))
        .collect();

    Some(OreRoot {
        root_height: tables.height - depth,
        vein_shape,
    })
}

/// Cached root of `ore` at `position`, generated on first use.
pub fn ore_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    ore: &OreType,
    seed: u64,
    terrain: &ResolvedTerrain,
    position: i64,
) -> Result<Option<OreRoot>, TerrainError> {
    let ground_height = terrain.ground_height(position)?;
    cache.get_or_insert_with(position, FeatureKind::Ore(ore.id), || {
        Ok(generate_ore(tables, ore, seed, position, ground_height))
    })
}

/// Fills every ore slot of every slice in `window`.
pub fn collect_ores(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    window: Range<i64>,
) -> Result<(), TerrainError> {
    for position in window {
        for ore in &tables.ores {
            ore_at(cache, tables, ore, seed, terrain, position)?;
        }
    }
    Ok(())
}

/// Paints the vein rooted at `x` into `chunk`.
///
/// Only cells strictly below the surface row, inside the world and not air
/// are candidates; each is hierarchy-resolved against the ore symbol.
pub fn place_ore(
    chunk: &mut SliceMap,
    blocks: &BlockRegistry,
    tables: &TerrainTables,
    terrain: &ResolvedTerrain,
    ore: &OreType,
    x: i64,
    root: &OreRoot,
) -> Result<(), TerrainError> {
    let size = i64::from(ore.vein_size);
    let offset = ore.vein_offset();
    let height = tables.height as i64;

    for (cell, &threshold) in root.vein_shape.iter().enumerate() {
        if threshold >= ore.vein_density {
            continue;
        }
        let cell = cell as i64;
        let block_x = x + cell % size - offset;
        let row = root.root_height as i64 + cell / size - offset;

        if !chunk.contains(block_x) {
            continue;
        }
        let surface = height - terrain.ground_height(block_x)? as i64;
        if row <= surface || row >= height {
            continue;
        }
        if chunk.block(block_x, row as usize) == Some(symbols::AIR) {
            continue;
        }
        place_block(chunk, blocks, block_x, row, ore.symbol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use strata_config::{Config, WorldGenConfig};

    fn tables_with_sure_ores() -> TerrainTables {
        let mut config = WorldGenConfig {
            biome_chance: 0.0,
            hill_chance: 0.0,
            ..Default::default()
        };
        for ore in config.ores.values_mut() {
            ore.chance = 1.0;
        }
        TerrainTables::new(&config).unwrap()
    }

    #[test]
    fn test_vein_shape_is_distinct_percentages() {
        let tables = tables_with_sure_ores();
        for ore in &tables.ores {
            let root = generate_ore(&tables, ore, 4, 10, tables.ground_height).unwrap();
            let cells = (ore.vein_size * ore.vein_size) as usize;
            assert_eq!(root.vein_shape.len(), cells);
            let distinct: BTreeSet<u32> = root
                .vein_shape
                .iter()
                .map(|value| (value * 100.0).round() as u32)
                .collect();
            assert_eq!(distinct.len(), cells, "thresholds drawn without replacement");
            assert!(root.vein_shape.iter().all(|v| (0.0..1.0).contains(v)));
        }
    }

    #[test]
    fn test_root_depth_within_bounds() {
        let tables = tables_with_sure_ores();
        let height = tables.height;
        for ore in &tables.ores {
            let upper = (height as f64 * ore.upper) as usize;
            let lower = (height as f64 * ore.lower) as usize;
            for x in 0..50 {
                let root = generate_ore(&tables, ore, 8, x, tables.ground_height).unwrap();
                let depth = height - root.root_height;
                assert!((lower..=upper.min(tables.ground_height - 1)).contains(&depth));
            }
        }
    }

    #[test]
    fn test_upper_bound_clamped_under_low_ground() {
        let tables = tables_with_sure_ores();
        let coal = &tables.ores[0];
        // Ground of 3 forces every depth into [0, 2].
        for x in 0..50 {
            let root = generate_ore(&tables, coal, 1, x, 3).unwrap();
            assert!(tables.height - root.root_height <= 2);
        }
    }

    #[test]
    fn test_place_ore_skips_air_and_surface() {
        let tables = tables_with_sure_ores();
        let blocks = Config::default().block_registry().unwrap();
        let windows = tables.windows(0);
        let mut cache = FeatureCache::new(tables.cache_capacity(), tables.ores.len());
        let terrain = ResolvedTerrain::resolve(&mut cache, &tables, 0, &windows).unwrap();

        let surface = tables.height - tables.ground_height;
        let mut column = vec![symbols::AIR; surface];
        column.push(symbols::SURFACE);
        column.resize(tables.height - 1, symbols::FILL);
        column.push(symbols::BEDROCK);
        let mut chunk: SliceMap = windows.chunk.clone().map(|x| (x, column.clone())).collect();
        // A hole just under the surface must stay empty.
        chunk.get_mut(4).unwrap()[surface + 1] = symbols::AIR;

        let coal = &tables.ores[0];
        let root = OreRoot {
            root_height: surface + 1,
            vein_shape: vec![0.0; 16],
        };
        place_ore(&mut chunk, &blocks, &tables, &terrain, coal, 4, &root).unwrap();

        // Window rows are surface .. surface + 3 and columns 3 ..= 6.
        for x in 3..=6 {
            assert_eq!(chunk.block(x, surface), Some(symbols::SURFACE), "surface kept");
            for row in surface + 1..=surface + 2 {
                let expected = if x == 4 && row == surface + 1 {
                    symbols::AIR
                } else {
                    coal.symbol
                };
                assert_eq!(chunk.block(x, row), Some(expected), "cell ({x}, {row})");
            }
        }
        assert_eq!(chunk.block(7, surface + 1), Some(symbols::FILL));
    }
}
