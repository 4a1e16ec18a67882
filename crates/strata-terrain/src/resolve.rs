//! Elevation and biome resolution.
//!
//! Folds the hill and biome roots around a chunk into a ground height and a
//! biome for every slice of the chunk's `needed` window.

use std::collections::BTreeMap;

use crate::biome::biome_at;
use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::BiomeId;
use crate::hill::hill_at;
use crate::tables::{TerrainTables, Windows};

/// Slice position to ground height, counted from the bottom of the world.
pub type GroundHeights = BTreeMap<i64, usize>;

/// Biome of a slice and the anchor of the feature that claimed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBiome {
    pub biome: BiomeId,
    /// `None` when no biome feature claims the slice.
    pub anchor: Option<i64>,
}

/// Ground heights and biomes over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTerrain {
    pub ground_heights: GroundHeights,
    pub biomes: BTreeMap<i64, SliceBiome>,
}

impl ResolvedTerrain {
    /// Resolves every slice of `windows.needed`.
    ///
    /// Hill and biome roots are read through the cache, so anchors evicted
    /// since collection are regenerated transparently.
    pub fn resolve(
        cache: &mut FeatureCache,
        tables: &TerrainTables,
        seed: u64,
        windows: &Windows,
    ) -> Result<Self, TerrainError> {
        let needed = windows.needed.clone();

        let mut ground_heights: GroundHeights =
            needed.clone().map(|x| (x, tables.ground_height)).collect();
        for anchor in windows.hills.clone() {
            let Some(hill) = hill_at(cache, tables, seed, anchor)? else {
                continue;
            };
            for offset in hill.footprint() {
                if let Some(height) = ground_heights.get_mut(&(anchor + offset)) {
                    *height = (*height).max(tables.ground_height + hill.contribution(offset));
                }
            }
        }

        let mut biomes: BTreeMap<i64, SliceBiome> = needed
            .map(|x| {
                (
                    x,
                    SliceBiome {
                        biome: tables.default_biome,
                        anchor: None,
                    },
                )
            })
            .collect();
        for anchor in windows.biomes.clone() {
            let Some(feature) = biome_at(cache, tables, seed, anchor)? else {
                continue;
            };
            let radius = i64::from(feature.radius);
            for (_, slice) in biomes.range_mut(anchor - radius..anchor + radius) {
                if slice.anchor.is_none_or(|previous| previous < anchor) {
                    *slice = SliceBiome {
                        biome: feature.biome,
                        anchor: Some(anchor),
                    };
                }
            }
        }

        Ok(Self {
            ground_heights,
            biomes,
        })
    }

    /// Ground height at `x`.
    pub fn ground_height(&self, x: i64) -> Result<usize, TerrainError> {
        self.ground_heights
            .get(&x)
            .copied()
            .ok_or(TerrainError::OutOfRange { position: x })
    }

    /// Biome at `x`.
    pub fn biome(&self, x: i64) -> Result<BiomeId, TerrainError> {
        self.biomes
            .get(&x)
            .map(|slice| slice.biome)
            .ok_or(TerrainError::OutOfRange { position: x })
    }
}
