//! Chunk assembly.
//!
//! [`TerrainGenerator::generate_chunk`] runs the full pipeline for one chunk:
//! collect biome and hill roots, resolve elevation and biomes, collect the
//! biome-dependent features, lay down base columns and paint features onto
//! them.

use strata_blocks::{BlockRegistry, Column, SliceMap, chunk_origin, symbols};
use strata_config::{Config, WorldGenConfig};

use crate::biome::collect_biomes;
use crate::cache::FeatureCache;
use crate::cave::{cave_at, place_cave};
use crate::error::TerrainError;
use crate::grass::{collect_grass, grass_at, place_grass};
use crate::hill::collect_hills;
use crate::meta::WorldMeta;
use crate::ore::{collect_ores, ore_at, place_ore};
use crate::resolve::{GroundHeights, ResolvedTerrain};
use crate::tables::TerrainTables;
use crate::tree::{collect_trees, place_tree, tree_at};

/// Writes `symbol` at `(x, row)` if the cell exists and the symbol outranks
/// what is there. Returns whether the cell changed.
pub(crate) fn place_block(
    chunk: &mut SliceMap,
    blocks: &BlockRegistry,
    x: i64,
    row: i64,
    symbol: char,
) -> bool {
    let Ok(row) = usize::try_from(row) else {
        return false;
    };
    let Some(cell) = chunk.get_mut(x).and_then(|column| column.get_mut(row)) else {
        return false;
    };
    let before = *cell;
    blocks.place(cell, symbol);
    *cell != before
}

/// One generated chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedChunk {
    /// Chunk index.
    pub index: i64,
    /// Exactly the chunk's slices.
    pub slices: SliceMap,
    /// Resolved ground height of each slice in the chunk.
    pub ground_heights: GroundHeights,
}

/// Stateless chunk generator. All mutable state lives in the caller's
/// [`FeatureCache`] and [`WorldMeta`].
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    tables: TerrainTables,
    blocks: BlockRegistry,
}

impl TerrainGenerator {
    /// Validates `config` and builds the generation tables and block registry.
    pub fn new(config: &Config) -> Result<Self, TerrainError> {
        config.validate()?;
        Self::from_parts(&config.world_gen, config.block_registry()?)
    }

    /// Builds a generator from a world-gen table and an existing registry.
    ///
    /// The table is validated against `blocks` first.
    pub fn from_parts(
        world_gen: &WorldGenConfig,
        blocks: BlockRegistry,
    ) -> Result<Self, TerrainError> {
        world_gen.validate_with(|symbol| blocks.contains(symbol))?;
        Ok(Self {
            tables: TerrainTables::new(world_gen)?,
            blocks,
        })
    }

    /// Compiled generation tables.
    pub fn tables(&self) -> &TerrainTables {
        &self.tables
    }

    /// Block registry used for hierarchy resolution.
    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    /// An empty cache sized for this generator.
    pub fn new_cache(&self) -> FeatureCache {
        FeatureCache::new(self.tables.cache_capacity(), self.tables.ores.len())
    }

    /// Column for a slice whose ground is `ground_height` cells tall: air,
    /// one surface marker, fill, one bedrock.
    pub fn base_column(&self, ground_height: usize) -> Column {
        let height = self.tables.height;
        let ground = ground_height.clamp(2, height);
        let mut column = Vec::with_capacity(height);
        column.resize(height - ground, symbols::AIR);
        column.push(symbols::SURFACE);
        column.resize(height - 1, symbols::FILL);
        column.push(symbols::BEDROCK);
        column
    }

    /// Generates chunk `index`.
    ///
    /// The result depends only on `meta.seed` and `index`: neither the cache
    /// contents nor the order in which chunks are requested change it.
    ///
    /// # Errors
    ///
    /// Only invariant violations ([`TerrainError::CacheConsistency`],
    /// [`TerrainError::OutOfRange`]).
    pub fn generate_chunk(
        &self,
        cache: &mut FeatureCache,
        index: i64,
        meta: &WorldMeta,
    ) -> Result<GeneratedChunk, TerrainError> {
        let tables = &self.tables;
        let seed = meta.seed;
        let origin = chunk_origin(index, tables.chunk_size);
        let windows = tables.windows(origin);

        collect_biomes(cache, tables, seed, windows.biomes.clone())?;
        collect_hills(cache, tables, seed, windows.hills.clone())?;
        let terrain = ResolvedTerrain::resolve(cache, tables, seed, &windows)?;

        let cave = cave_at(cache, tables, seed, &terrain, origin)?;
        collect_trees(cache, tables, seed, &terrain, windows.trees.clone())?;
        collect_ores(cache, tables, seed, &terrain, windows.ores.clone())?;
        collect_grass(cache, tables, seed, &terrain, windows.chunk.clone())?;

        let mut slices = SliceMap::new();
        let mut ground_heights = GroundHeights::new();
        for x in windows.chunk.clone() {
            let ground = terrain.ground_height(x)?;
            slices.insert(x, self.base_column(ground));
            ground_heights.insert(x, ground);
        }

        let mut placed = 0usize;
        for x in windows.needed.clone() {
            if windows.trees.contains(&x)
                && let Some(tree) = tree_at(cache, tables, seed, &terrain, x)?
            {
                place_tree(&mut slices, &self.blocks, tables, &terrain, x, &tree)?;
                placed += 1;
            }
            if windows.chunk.contains(&x)
                && let Some(grass) = grass_at(cache, tables, seed, &terrain, x)?
            {
                place_grass(&mut slices, &self.blocks, tables, x, &grass);
                placed += 1;
            }
            if windows.ores.contains(&x) {
                for ore in &tables.ores {
                    if let Some(root) = ore_at(cache, tables, ore, seed, &terrain, x)? {
                        place_ore(&mut slices, &self.blocks, tables, &terrain, ore, x, &root)?;
                        placed += 1;
                    }
                }
            }
        }
        if let Some(cave) = &cave {
            place_cave(&mut slices, cave);
        }

        tracing::debug!(
            chunk = index,
            origin,
            features = placed,
            cave_points = cave.as_ref().map_or(0, |c| c.air_points.len()),
            cached = cache.len(),
            "generated chunk"
        );

        Ok(GeneratedChunk {
            index,
            slices,
            ground_heights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::ConfigError;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_base_column_layout() {
        let generator = generator();
        let column = generator.base_column(24);
        assert_eq!(column.len(), 64);
        assert!(column[..40].iter().all(|&c| c == symbols::AIR));
        assert_eq!(column[40], symbols::SURFACE);
        assert!(column[41..63].iter().all(|&c| c == symbols::FILL));
        assert_eq!(column[63], symbols::BEDROCK);
    }

    #[test]
    fn test_place_block_respects_hierarchy() {
        let generator = generator();
        let mut chunk = SliceMap::new();
        chunk.insert(0, vec![symbols::BEDROCK, symbols::AIR]);

        assert!(!place_block(&mut chunk, generator.blocks(), 0, 0, symbols::LEAF));
        assert!(place_block(&mut chunk, generator.blocks(), 0, 1, symbols::LEAF));
        assert!(!place_block(&mut chunk, generator.blocks(), 0, 2, symbols::LEAF));
        assert!(!place_block(&mut chunk, generator.blocks(), 0, -1, symbols::LEAF));
        assert!(!place_block(&mut chunk, generator.blocks(), 3, 0, symbols::LEAF));
        assert_eq!(chunk.get(0).unwrap(), &vec![symbols::BEDROCK, symbols::LEAF]);
    }

    #[test]
    fn test_equal_hierarchy_keeps_existing() {
        let generator = generator();
        let mut chunk = SliceMap::new();
        chunk.insert(0, vec![symbols::FILL]);
        assert!(!place_block(&mut chunk, generator.blocks(), 0, 0, symbols::SURFACE));
        assert_eq!(chunk.block(0, 0), Some(symbols::FILL));
    }

    #[test]
    fn test_chunk_covers_exactly_its_slices() {
        let generator = generator();
        let mut cache = generator.new_cache();
        let chunk = generator
            .generate_chunk(&mut cache, -3, &WorldMeta::new(7))
            .unwrap();
        let xs: Vec<i64> = chunk.slices.iter().map(|(x, _)| x).collect();
        assert_eq!(xs, (-48..-32).collect::<Vec<_>>());
        assert_eq!(chunk.ground_heights.len(), 16);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.world_gen.chunk_size = 0;
        assert!(matches!(
            TerrainGenerator::new(&config),
            Err(TerrainError::Config(_))
        ));
    }

    #[test]
    fn test_from_parts_rejects_invalid_table() {
        let config = Config::default();
        let world_gen = WorldGenConfig {
            min_grad: 0,
            hill_chance: 1.0,
            ..config.world_gen.clone()
        };
        let blocks = config.block_registry().unwrap();
        assert!(matches!(
            TerrainGenerator::from_parts(&world_gen, blocks),
            Err(TerrainError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_from_parts_rejects_unregistered_ore() {
        let config = Config::default();
        let mut world_gen = config.world_gen.clone();
        world_gen.ores.values_mut().for_each(|ore| ore.symbol = '?');
        let blocks = config.block_registry().unwrap();
        assert!(matches!(
            TerrainGenerator::from_parts(&world_gen, blocks),
            Err(TerrainError::Config(ConfigError::UndefinedBlock { symbol: '?', .. }))
        ));
    }
}
