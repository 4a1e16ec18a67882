//! World generation tables: dimensions, biomes, trees, ores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_blocks::{BlockDef, symbols};

use crate::error::ConfigError;

/// Static world-generation parameters. Loaded once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Slices per chunk.
    pub chunk_size: u32,
    /// Cells per column.
    pub height: usize,
    /// Baseline ground elevation, counted from the bottom and including the
    /// surface marker and bedrock rows.
    pub ground_height: usize,
    /// Smallest biome radius.
    pub min_biome: u32,
    /// Largest biome radius. Also sizes the feature cache.
    pub max_biome: u32,
    /// Tallest hill above the baseline.
    pub max_hill: u32,
    /// Largest hill gradient (slices of run per block of rise).
    pub min_grad: u32,
    /// Probability that a cell starts as air in the cave automaton.
    pub cave_chance: f64,
    /// Probability of a biome root at any slice.
    pub biome_chance: f64,
    /// Probability of a hill root at any slice.
    pub hill_chance: f64,
    /// Biome of slices no biome feature claims.
    pub default_biome: String,
    /// Biome table, keyed by name.
    pub biomes: BTreeMap<String, BiomeConfig>,
    /// Tree silhouettes.
    pub trees: Vec<TreeConfig>,
    /// Ore table, keyed by name.
    pub ores: BTreeMap<String, OreConfig>,
}

/// One biome's spawn weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeConfig {
    /// Relative weight of this biome when a biome root spawns.
    pub chance: f64,
    /// Multiplier on every tree's own chance.
    pub trees: f64,
    /// Probability of a grass tuft per slice.
    pub grass: f64,
}

/// One tree type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeConfig {
    /// Leaf pattern as a list of columns, each listed top to bottom. The
    /// middle column holds the trunk.
    pub leaves: Vec<Vec<bool>>,
    /// Chance of this tree type, scaled by the biome's tree multiplier.
    pub chance: f64,
}

/// One ore type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OreConfig {
    /// Probability of a vein root per slice.
    pub chance: f64,
    /// Side length of the square vein window.
    pub vein_size: u32,
    /// Fraction of the vein window that becomes ore.
    pub vein_density: f64,
    /// Highest root, as a fraction of world height measured from the bottom.
    pub upper: f64,
    /// Lowest root, as a fraction of world height measured from the bottom.
    pub lower: f64,
    /// Block symbol written for this ore.
    pub symbol: char,
}

/// Largest vein the shape permutation can describe (one value per percent).
pub const MAX_VEIN_CELLS: u32 = 100;

impl Default for WorldGenConfig {
    fn default() -> Self {
        let biomes = BTreeMap::from([
            (
                "normal".to_string(),
                BiomeConfig {
                    chance: 0.6,
                    trees: 0.4,
                    grass: 0.5,
                },
            ),
            (
                "forest".to_string(),
                BiomeConfig {
                    chance: 0.25,
                    trees: 1.0,
                    grass: 0.8,
                },
            ),
            (
                "desert".to_string(),
                BiomeConfig {
                    chance: 0.15,
                    trees: 0.0,
                    grass: 0.05,
                },
            ),
        ]);

        let trees = vec![
            TreeConfig {
                leaves: vec![
                    vec![false, true, true, false],
                    vec![true, true, true, false],
                    vec![true, true, true, false],
                    vec![true, true, true, false],
                    vec![false, true, true, false],
                ],
                chance: 0.3,
            },
            TreeConfig {
                leaves: vec![
                    vec![false, true, false],
                    vec![true, true, false],
                    vec![false, true, false],
                ],
                chance: 0.5,
            },
        ];

        let ores = BTreeMap::from([
            (
                "coal".to_string(),
                OreConfig {
                    chance: 0.05,
                    vein_size: 4,
                    vein_density: 0.6,
                    upper: 0.5,
                    lower: 0.15,
                    symbol: ':',
                },
            ),
            (
                "iron".to_string(),
                OreConfig {
                    chance: 0.03,
                    vein_size: 3,
                    vein_density: 0.5,
                    upper: 0.4,
                    lower: 0.1,
                    symbol: '+',
                },
            ),
            (
                "gold".to_string(),
                OreConfig {
                    chance: 0.01,
                    vein_size: 3,
                    vein_density: 0.4,
                    upper: 0.25,
                    lower: 0.05,
                    symbol: '*',
                },
            ),
            (
                "diamond".to_string(),
                OreConfig {
                    chance: 0.005,
                    vein_size: 2,
                    vein_density: 0.5,
                    upper: 0.15,
                    lower: 0.03,
                    symbol: '$',
                },
            ),
        ]);

        Self {
            chunk_size: 16,
            height: 64,
            ground_height: 24,
            min_biome: 16,
            max_biome: 64,
            max_hill: 12,
            min_grad: 3,
            cave_chance: 0.4,
            biome_chance: 0.05,
            hill_chance: 0.05,
            default_biome: "normal".to_string(),
            biomes,
            trees,
            ores,
        }
    }
}

/// The block table shipped with the default config.
pub fn default_block_table() -> BTreeMap<char, BlockDef> {
    let def = |name: &str, solid: bool, hierarchy: i32| BlockDef {
        name: name.to_string(),
        solid,
        hierarchy,
    };
    BTreeMap::from([
        (symbols::AIR, def("air", false, 0)),
        (symbols::GRASS, def("grass", false, 1)),
        (symbols::LEAF, def("leaves", false, 2)),
        (symbols::TRUNK, def("trunk", false, 3)),
        (symbols::SURFACE, def("turf", true, 4)),
        (symbols::FILL, def("dirt", true, 4)),
        (':', def("coal", true, 5)),
        ('+', def("iron", true, 6)),
        ('*', def("gold", true, 7)),
        ('$', def("diamond", true, 8)),
        (symbols::BEDROCK, def("bedrock", true, 10)),
    ])
}

fn check_probability(what: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{what} must be within [0, 1], got {value}"
        )))
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(reason.into())
}

impl WorldGenConfig {
    /// Checks every table against itself and against the block table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UndefinedBlock`] for unregistered symbols and
    /// [`ConfigError::Invalid`] for any out-of-range value.
    pub fn validate(&self, blocks: &BTreeMap<char, BlockDef>) -> Result<(), ConfigError> {
        self.validate_with(|symbol| blocks.contains_key(&symbol))
    }

    /// Same checks as [`WorldGenConfig::validate`], with block lookups going
    /// through `is_defined` so an already built registry can be checked.
    pub fn validate_with(&self, is_defined: impl Fn(char) -> bool) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size must be positive"));
        }
        if self.ground_height < 2 {
            return Err(invalid("ground_height must leave room for surface and bedrock"));
        }
        if self
            .ground_height
            .checked_add(self.max_hill as usize)
            .is_none_or(|peak| peak > self.height)
        {
            return Err(invalid(format!(
                "ground_height ({}) + max_hill ({}) exceeds height ({})",
                self.ground_height, self.max_hill, self.height
            )));
        }
        if self.min_biome > self.max_biome {
            return Err(invalid("min_biome exceeds max_biome"));
        }
        if self.min_grad == 0 {
            return Err(invalid("min_grad must be at least 1"));
        }
        check_probability("cave_chance", self.cave_chance)?;
        check_probability("biome_chance", self.biome_chance)?;
        check_probability("hill_chance", self.hill_chance)?;

        if !self.biomes.contains_key(&self.default_biome) {
            return Err(invalid(format!(
                "default biome `{}` is not in the biome table",
                self.default_biome
            )));
        }
        for (name, biome) in &self.biomes {
            check_probability(&format!("biome `{name}` chance"), biome.chance)?;
            check_probability(&format!("biome `{name}` trees"), biome.trees)?;
            check_probability(&format!("biome `{name}` grass"), biome.grass)?;
        }
        let total_weight: u32 = self
            .biomes
            .values()
            .map(|biome| (biome.chance * 100.0) as u32)
            .sum();
        if self.biome_chance > 0.0 && total_weight == 0 {
            return Err(invalid("biome weights sum to zero"));
        }

        for (index, tree) in self.trees.iter().enumerate() {
            check_probability(&format!("tree {index} chance"), tree.chance)?;
            if tree.leaves.is_empty() || tree.leaves.iter().any(Vec::is_empty) {
                return Err(invalid(format!("tree {index} has an empty leaf column")));
            }
        }

        for (name, ore) in &self.ores {
            check_probability(&format!("ore `{name}` chance"), ore.chance)?;
            check_probability(&format!("ore `{name}` vein_density"), ore.vein_density)?;
            check_probability(&format!("ore `{name}` upper"), ore.upper)?;
            check_probability(&format!("ore `{name}` lower"), ore.lower)?;
            if ore.lower > ore.upper {
                return Err(invalid(format!("ore `{name}` lower bound above upper bound")));
            }
            if ore.vein_size == 0
                || ore
                    .vein_size
                    .checked_mul(ore.vein_size)
                    .is_none_or(|cells| cells > MAX_VEIN_CELLS)
            {
                return Err(invalid(format!(
                    "ore `{name}` vein_size must be in 1..=10, got {}",
                    ore.vein_size
                )));
            }
            if !is_defined(ore.symbol) {
                return Err(ConfigError::UndefinedBlock {
                    context: format!("ore `{name}`"),
                    symbol: ore.symbol,
                });
            }
        }

        for symbol in symbols::RESERVED {
            if !is_defined(symbol) {
                return Err(ConfigError::UndefinedBlock {
                    context: "terrain engine".to_string(),
                    symbol,
                });
            }
        }

        Ok(())
    }
}
