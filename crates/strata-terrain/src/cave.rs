//! Cave automaton.
//!
//! Caves are chunk-granular: one air-point set per chunk, keyed by the chunk
//! origin. The region covers columns `origin ..= origin + chunk_size` and, in
//! each column, the rows strictly between the surface marker and bedrock.

use std::collections::BTreeSet;

use rand::Rng;
use rustc_hash::FxHashSet;
use strata_blocks::{SliceMap, symbols};

use crate::cache::FeatureCache;
use crate::error::TerrainError;
use crate::feature::{CaveFeature, FeatureKind};
use crate::resolve::ResolvedTerrain;
use crate::seed::feature_rng;
use crate::tables::TerrainTables;

/// Smoothing passes after the initial scatter.
pub const CAVE_ITERATIONS: usize = 4;

/// A cell with at least this many air neighbours turns solid.
pub const CROWDED_NEIGHBOURS: usize = 5;

const NEIGHBOURHOOD: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Runs the automaton for the chunk starting at `origin`.
///
/// Returns `None` when no cell survives.
pub fn generate_cave(
    tables: &TerrainTables,
    seed: u64,
    origin: i64,
    terrain: &ResolvedTerrain,
) -> Result<Option<CaveFeature>, TerrainError> {
    let height = tables.height as i64;
    let mut region = Vec::new();
    for x in origin..=origin + tables.chunk_size {
        let ground = terrain.ground_height(x)? as i64;
        region.extend((0..ground - 2).map(|depth| (x, height - depth - 2)));
    }

    let mut rng = feature_rng(seed, origin, FeatureKind::Cave);
    let mut air: FxHashSet<(i64, i64)> = region
        .iter()
        .copied()
        .filter(|_| rng.random_bool(tables.cave_chance))
        .collect();

    for _ in 0..CAVE_ITERATIONS {
        let snapshot = air.clone();
        for &(x, row) in &region {
            let neighbours = NEIGHBOURHOOD
                .iter()
                .filter(|(dx, dy)| snapshot.contains(&(x + dx, row + dy)))
                .count();
            if neighbours >= CROWDED_NEIGHBOURS {
                air.remove(&(x, row));
            } else {
                air.insert((x, row));
            }
        }
    }

    if air.is_empty() {
        return Ok(None);
    }
    Ok(Some(CaveFeature {
        air_points: air.into_iter().collect::<BTreeSet<_>>(),
    }))
}

/// Cached cave of the chunk starting at `origin`, generated on first use.
pub fn cave_at(
    cache: &mut FeatureCache,
    tables: &TerrainTables,
    seed: u64,
    terrain: &ResolvedTerrain,
    origin: i64,
) -> Result<Option<CaveFeature>, TerrainError> {
    cache.get_or_insert_with(origin, FeatureKind::Cave, || {
        generate_cave(tables, seed, origin, terrain)
    })
}

/// Carves every air point that falls inside `chunk`, regardless of hierarchy.
pub fn place_cave(chunk: &mut SliceMap, cave: &CaveFeature) {
    for &(x, row) in &cave.air_points {
        let Ok(row) = usize::try_from(row) else {
            continue;
        };
        if let Some(cell) = chunk.get_mut(x).and_then(|column| column.get_mut(row)) {
            *cell = symbols::AIR;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::WorldGenConfig;

    fn setup(cave_chance: f64) -> (TerrainTables, ResolvedTerrain) {
        let config = WorldGenConfig {
            biome_chance: 0.0,
            hill_chance: 0.0,
            cave_chance,
            ..Default::default()
        };
        let tables = TerrainTables::new(&config).unwrap();
        let mut cache = FeatureCache::new(tables.cache_capacity(), tables.ores.len());
        let terrain =
            ResolvedTerrain::resolve(&mut cache, &tables, 0, &tables.windows(0)).unwrap();
        (tables, terrain)
    }

    #[test]
    fn test_points_stay_in_region() {
        let (tables, terrain) = setup(0.4);
        let cave = generate_cave(&tables, 21, 0, &terrain).unwrap().unwrap();
        let height = tables.height as i64;
        let surface = height - tables.ground_height as i64;
        for &(x, row) in &cave.air_points {
            assert!((0..=tables.chunk_size).contains(&x), "column {x} outside region");
            assert!(row > surface && row < height - 1, "row {row} outside region");
        }
    }

    #[test]
    fn test_deterministic() {
        let (tables, terrain) = setup(0.4);
        let a = generate_cave(&tables, 5, 0, &terrain).unwrap();
        let b = generate_cave(&tables, 5, 0, &terrain).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_scatter_fills_region() {
        // With no initial air, every cell has zero air neighbours and turns
        // to air on the first pass; afterwards interior cells are crowded.
        let (tables, terrain) = setup(0.0);
        let cave = generate_cave(&tables, 0, 0, &terrain).unwrap().unwrap();
        let height = tables.height as i64;
        let corner = (0, height - 2);
        assert!(cave.air_points.contains(&corner), "corners have few neighbours");
    }

    #[test]
    fn test_place_cave_only_touches_chunk() {
        let mut chunk = SliceMap::new();
        chunk.insert(0, vec![symbols::FILL; 4]);
        let cave = CaveFeature {
            air_points: BTreeSet::from([(0, 1), (0, 9), (1, 1)]),
        };
        place_cave(&mut chunk, &cave);
        assert_eq!(chunk.get(0).unwrap(), &vec!['#', ' ', '#', '#']);
        assert!(!chunk.contains(1));
    }
}
