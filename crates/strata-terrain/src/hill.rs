//! Hill roots and their triangular height profile.

use std::ops::Range;

use rand::Rng;

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{FeatureKind, HillFeature};
use crate::seed::feature_rng;
use crate::tables::TerrainTables;

/// Evaluates the hill root at `position` from its own RNG stream.
pub fn generate_hill(tables: &TerrainTables, seed: u64, position: i64) -> Option<HillFeature> {
    let mut rng = feature_rng(seed, position, FeatureKind::Hill);
    if !rng.random_bool(tables.hill_chance) {
        return None;
    }
    Some(HillFeature {
        gradient_l: rng.random_range(1..=tables.min_grad),
        gradient_r: rng.random_range(1..=tables.min_grad),
        height: rng.random_range(0..=tables.max_hill),
    })
}

/// Cached hill root at `position`, generated on first use.
pub fn hill_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    position: i64,
) -> Result<Option<HillFeature>, TerrainError> {
    cache.get_or_insert_with(position, FeatureKind::Hill, || {
        Ok(generate_hill(tables, seed, position))
    })
}

/// Fills the hill slot of every slice in `window`.
pub fn collect_hills(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    window: Range<i64>,
) -> Result<(), TerrainError> {
    for position in window {
        hill_at(cache, tables, seed, position)?;
    }
    Ok(())
}

impl HillFeature {
    /// Offsets from the anchor this hill covers.
    pub fn footprint(&self) -> Range<i64> {
        let height = i64::from(self.height);
        -height * i64::from(self.gradient_l)..height * i64::from(self.gradient_r)
    }

    /// Height added above the baseline at `offset` from the anchor.
    ///
    /// Falls off by one block per `gradient` slices; the apex itself sits one
    /// block below the peak.
    pub fn contribution(&self, offset: i64) -> usize {
        let gradient = if offset < 0 {
            self.gradient_l
        } else {
            self.gradient_r
        };
        let drop = offset.unsigned_abs().div_ceil(u64::from(gradient));
        let apex = u64::from(offset == 0);
        u64::from(self.height).saturating_sub(drop + apex) as usize
    }
}
