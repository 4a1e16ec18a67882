//! Generation tables derived once from [`WorldGenConfig`].
//!
//! Resolves names to dense ids, precomputes per-tree trunk depths and the
//! spatial windows each generator scans around a chunk.

use std::ops::Range;

use rand::distr::weighted::WeightedIndex;
use strata_config::{ConfigError, WorldGenConfig};

use crate::error::TerrainError;
use crate::feature::{BiomeId, OreId};

/// One biome, addressed by [`BiomeId`].
#[derive(Debug, Clone, PartialEq)]
pub struct Biome {
    /// Name from the config.
    pub name: String,
    /// Integer spawn weight (percent).
    pub weight: u32,
    /// Multiplier on each tree type's chance.
    pub tree_chance: f64,
    /// Grass chance per slice.
    pub grass_chance: f64,
}

/// One tree silhouette.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeType {
    /// Leaf columns, each top to bottom.
    pub leaves: Vec<Vec<bool>>,
    /// Base chance before the biome multiplier.
    pub chance: f64,
    /// Cells from the bottom of the central column to its lowest leaf, or the
    /// column length when the central column has no leaves.
    pub trunk_depth: usize,
}

impl TreeType {
    /// Index of the trunk column within `leaves`.
    pub fn half_width(&self) -> usize {
        self.leaves.len() / 2
    }

    /// The column holding the trunk.
    pub fn center(&self) -> &[bool] {
        &self.leaves[self.half_width()]
    }
}

/// One ore type, addressed by [`OreId`].
#[derive(Debug, Clone, PartialEq)]
pub struct OreType {
    /// Dense id, equal to the position in [`TerrainTables::ores`].
    pub id: OreId,
    /// Name from the config.
    pub name: String,
    /// Vein root chance per slice.
    pub chance: f64,
    /// Side of the square vein window.
    pub vein_size: u32,
    /// Shape threshold below which a cell becomes ore.
    pub vein_density: f64,
    /// Highest root as a fraction of world height.
    pub upper: f64,
    /// Lowest root as a fraction of world height.
    pub lower: f64,
    /// Block written for this ore.
    pub symbol: char,
}

impl OreType {
    /// Offset of the vein window's first cell from the root, per axis.
    pub fn vein_offset(&self) -> i64 {
        (i64::from(self.vein_size) - 1) / 2
    }
}

/// Slice ranges one chunk build touches. All ranges are half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Windows {
    /// The chunk itself.
    pub chunk: Range<i64>,
    /// Slices whose ground height and biome the build consults.
    pub needed: Range<i64>,
    /// Hill anchors that can raise a needed slice.
    pub hills: Range<i64>,
    /// Biome anchors that can claim a needed slice.
    pub biomes: Range<i64>,
    /// Tree anchors that can paint into the chunk.
    pub trees: Range<i64>,
    /// Ore anchors that can paint into the chunk.
    pub ores: Range<i64>,
}

fn widen(range: &Range<i64>, by: i64) -> Range<i64> {
    range.start - by..range.end + by
}

/// Immutable generation tables shared by every generator.
#[derive(Debug, Clone)]
pub struct TerrainTables {
    /// Slices per chunk.
    pub chunk_size: i64,
    /// Cells per column.
    pub height: usize,
    /// Baseline ground elevation before hills.
    pub ground_height: usize,
    /// Smallest biome radius.
    pub min_biome: u32,
    /// Largest biome radius.
    pub max_biome: u32,
    /// Tallest hill above the baseline.
    pub max_hill: u32,
    /// Largest hill gradient.
    pub min_grad: u32,
    /// Initial air probability of the cave automaton.
    pub cave_chance: f64,
    /// Biome root probability per slice.
    pub biome_chance: f64,
    /// Hill root probability per slice.
    pub hill_chance: f64,
    /// Biome of unclaimed slices.
    pub default_biome: BiomeId,
    /// Biomes, ordered by name; indexed by [`BiomeId`].
    pub biomes: Vec<Biome>,
    /// `None` when every biome weight is zero.
    pub biome_weights: Option<WeightedIndex<u32>>,
    /// Tree types in config order.
    pub trees: Vec<TreeType>,
    /// Ores, ordered by name; indexed by `OreId`.
    pub ores: Vec<OreType>,
}

impl TerrainTables {
    /// Builds the tables. Biomes and ores are ordered by name.
    pub fn new(config: &WorldGenConfig) -> Result<Self, TerrainError> {
        let biomes: Vec<Biome> = config
            .biomes
            .iter()
            .map(|(name, biome)| Biome {
                name: name.clone(),
                weight: (biome.chance * 100.0) as u32,
                tree_chance: biome.trees,
                grass_chance: biome.grass,
            })
            .collect();

        let default_index = biomes
            .iter()
            .position(|biome| biome.name == config.default_biome)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "default biome `{}` is not in the biome table",
                    config.default_biome
                ))
            })?;
        let default_biome = BiomeId(u16::try_from(default_index).map_err(|_| {
            ConfigError::Invalid("biome table exceeds u16::MAX entries".to_string())
        })?);
        if config.ores.len() > usize::from(u16::MAX) {
            return Err(ConfigError::Invalid("ore table exceeds u16::MAX entries".to_string()).into());
        }

        let biome_weights = WeightedIndex::new(biomes.iter().map(|biome| biome.weight)).ok();

        let trees = config
            .trees
            .iter()
            .map(|tree| {
                let center = tree.leaves.get(tree.leaves.len() / 2).ok_or_else(|| {
                    ConfigError::Invalid("tree with no leaf columns".to_string())
                })?;
                let trunk_depth = center
                    .iter()
                    .rev()
                    .position(|&leaf| leaf)
                    .unwrap_or(center.len());
                Ok(TreeType {
                    leaves: tree.leaves.clone(),
                    chance: tree.chance,
                    trunk_depth,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let ores = config
            .ores
            .iter()
            .enumerate()
            .map(|(index, (name, ore))| OreType {
                id: OreId(index as u16),
                name: name.clone(),
                chance: ore.chance,
                vein_size: ore.vein_size,
                vein_density: ore.vein_density,
                upper: ore.upper,
                lower: ore.lower,
                symbol: ore.symbol,
            })
            .collect();

        Ok(Self {
            chunk_size: i64::from(config.chunk_size),
            height: config.height,
            ground_height: config.ground_height,
            min_biome: config.min_biome,
            max_biome: config.max_biome,
            max_hill: config.max_hill,
            min_grad: config.min_grad,
            cave_chance: config.cave_chance,
            biome_chance: config.biome_chance,
            hill_chance: config.hill_chance,
            default_biome,
            biomes,
            biome_weights,
            trees,
            ores,
        })
    }

    /// Feature cache capacity: four biome radii plus one chunk.
    pub fn cache_capacity(&self) -> usize {
        4 * self.max_biome as usize + self.chunk_size as usize
    }

    /// Widest hill footprint on either side of its anchor.
    pub fn hill_radius(&self) -> i64 {
        i64::from(self.max_hill) * i64::from(self.min_grad)
    }

    /// Half the widest tree silhouette.
    pub fn tree_margin(&self) -> i64 {
        self.trees
            .iter()
            .map(|tree| tree.half_width() as i64)
            .max()
            .unwrap_or(0)
    }

    /// Widest reach of a vein from its root.
    pub fn ore_margin(&self) -> i64 {
        self.ores
            .iter()
            .map(|ore| i64::from(ore.vein_size / 2))
            .max()
            .unwrap_or(0)
    }

    /// Scan windows for the chunk starting at `origin`.
    ///
    /// `needed` always extends at least one slice past the chunk so the cave
    /// automaton can read the ground height of its closing column.
    pub fn windows(&self, origin: i64) -> Windows {
        let chunk = origin..origin + self.chunk_size;
        let margin = self.tree_margin().max(self.ore_margin()).max(1);
        let needed = widen(&chunk, margin);
        Windows {
            hills: widen(&needed, self.hill_radius()),
            biomes: widen(&needed, i64::from(self.max_biome)),
            trees: widen(&chunk, self.tree_margin()),
            ores: widen(&chunk, self.ore_margin()),
            needed,
            chunk,
        }
    }

    /// Biome by id. Ids come from this table, so the lookup cannot miss.
    pub fn biome(&self, id: BiomeId) -> &Biome {
        &self.biomes[id.index()]
    }
}
