//! A game session over one save.
//!
//! The session owns everything mutable about a running world: the meta, the
//! feature cache, and the slices loaded so far. Chunks come from the store when
//! saved and from the terrain generator otherwise; saved columns always win.

use std::collections::BTreeSet;
use std::ops::Range;
use std::time::{Duration, Instant};

use strata_blocks::{SliceMap, chunk_index, chunk_origin};
use strata_config::{Config, ConfigError};
use strata_terrain::{
    FallDeltas, FeatureCache, TerrainError, TerrainGenerator, WorldMeta, apply_deltas, fall_step,
};

use crate::store::{PersistenceStore, StoreError};

/// Per-column cell edits: x → (row → symbol).
pub type BlockEdits = FallDeltas;

/// Errors surfaced by [`Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One open save.
#[derive(Debug)]
pub struct Session<S: PersistenceStore> {
    store: S,
    save_id: String,
    meta: WorldMeta,
    generator: TerrainGenerator,
    cache: FeatureCache,
    map: SliceMap,
    tick_interval: Duration,
    sun_tick: f64,
    last_tick: Instant,
}

impl<S: PersistenceStore> Session<S> {
    /// Opens an existing save.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingSave`] if the save does not exist, or a config
    /// error if the generation tables are unusable.
    pub fn open(store: S, save_id: &str, config: &Config) -> Result<Self, SessionError> {
        let meta = store.load_meta(save_id)?;
        tracing::info!(save = save_id, seed = meta.seed, "opened save");
        Self::start(store, save_id, meta, config)
    }

    /// Creates a save with `seed`, overwriting any existing meta.
    pub fn create(
        mut store: S,
        save_id: &str,
        seed: u64,
        config: &Config,
    ) -> Result<Self, SessionError> {
        let meta = WorldMeta::new(seed);
        store.save_meta(save_id, &meta)?;
        tracing::info!(save = save_id, seed, "created save");
        Self::start(store, save_id, meta, config)
    }

    /// Opens `save_id` if it exists, otherwise creates it with `seed` or a
    /// random seed.
    pub fn open_or_create(
        store: S,
        save_id: &str,
        seed: Option<u64>,
        config: &Config,
    ) -> Result<Self, SessionError> {
        if store.exists(save_id) {
            Self::open(store, save_id, config)
        } else {
            Self::create(store, save_id, seed.unwrap_or_else(rand::random), config)
        }
    }

    fn start(
        store: S,
        save_id: &str,
        meta: WorldMeta,
        config: &Config,
    ) -> Result<Self, SessionError> {
        let generator = TerrainGenerator::new(config)?;
        let cache = generator.new_cache();
        let tps = f64::from(config.server.tps.max(1));
        Ok(Self {
            store,
            save_id: save_id.to_string(),
            meta,
            generator,
            cache,
            map: SliceMap::new(),
            tick_interval: Duration::from_secs_f64(1.0 / tps),
            sun_tick: config.server.sun_tick,
            last_tick: Instant::now(),
        })
    }

    /// Loads every chunk that holds one of `slices` into the session map.
    ///
    /// Saved columns are used as-is. Any missing column is taken from a freshly
    /// generated chunk and persisted.
    pub fn load_chunks(
        &mut self,
        slices: impl IntoIterator<Item = i64>,
    ) -> Result<(), SessionError> {
        let chunk_size = self.generator.tables().chunk_size;
        let chunks: BTreeSet<i64> = slices
            .into_iter()
            .map(|x| chunk_index(x, chunk_size))
            .collect();

        let mut generated = SliceMap::new();
        for index in chunks {
            let mut chunk = self.store.load_chunk(&self.save_id, index)?;
            let origin = chunk_origin(index, chunk_size);
            let missing = chunk.missing(origin, origin + chunk_size);
            if !missing.is_empty() {
                let fresh = self
                    .generator
                    .generate_chunk(&mut self.cache, index, &self.meta)?;
                for x in missing {
                    if let Some(column) = fresh.slices.get(x) {
                        chunk.insert(x, column.clone());
                        generated.insert(x, column.clone());
                    }
                }
            }
            self.map.extend(chunk);
        }

        if !generated.is_empty() {
            tracing::debug!(
                save = %self.save_id,
                slices = generated.len(),
                "saving generated slices"
            );
            self.store.save_slices(&self.save_id, &generated)?;
        }
        Ok(())
    }

    /// Advances the sun one step if a tick interval has passed since the last
    /// tick. Returns whether a tick happened.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if now < self.last_tick + self.tick_interval {
            return false;
        }
        self.meta.tick += self.sun_tick;
        self.last_tick = now;
        true
    }

    /// [`Session::tick_at`] with the current time.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Runs one fall step over `edges`, applies it to the map and persists the
    /// touched columns.
    pub fn apply_gravity(&mut self, edges: Range<i64>) -> Result<FallDeltas, SessionError> {
        let deltas = fall_step(
            &self.map,
            edges,
            self.generator.tables().height,
            self.generator.blocks(),
        );
        self.save_blocks(&deltas)?;
        Ok(deltas)
    }

    /// Applies `edits` to loaded columns and persists them. Edits to columns
    /// that are not loaded are ignored.
    pub fn save_blocks(&mut self, edits: &BlockEdits) -> Result<(), SessionError> {
        if edits.is_empty() {
            return Ok(());
        }
        apply_deltas(&mut self.map, edits);
        let touched: SliceMap = edits
            .keys()
            .filter_map(|&x| self.map.get(x).map(|column| (x, column.clone())))
            .collect();
        self.store.save_slices(&self.save_id, &touched)?;
        Ok(())
    }

    /// Persists the current meta (seed and sun angle).
    pub fn save_meta(&mut self) -> Result<(), SessionError> {
        self.store.save_meta(&self.save_id, &self.meta)?;
        Ok(())
    }

    pub fn map(&self) -> &SliceMap {
        &self.map
    }

    pub fn meta(&self) -> &WorldMeta {
        &self.meta
    }

    pub fn save_id(&self) -> &str {
        &self.save_id
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// When the last tick happened.
    pub fn last_tick(&self) -> Instant {
        self.last_tick
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::store::{MemoryStore, RonStore};
    use strata_blocks::symbols;

    fn memory_session(seed: u64) -> Session<MemoryStore> {
        let config = Config::default();
        let store = MemoryStore::new(config.world_gen.chunk_size);
        Session::create(store, "world", seed, &config).unwrap()
    }

    #[test]
    fn test_open_missing_save_fails() {
        let config = Config::default();
        let store = MemoryStore::new(16);
        assert!(matches!(
            Session::open(store, "ghost", &config),
            Err(SessionError::Store(StoreError::MissingSave(_)))
        ));
    }

    #[test]
    fn test_load_chunks_generates_and_persists() {
        let mut session = memory_session(3);
        session.load_chunks([-1, 5, 20]).unwrap();

        assert_eq!(session.map().len(), 48);
        assert!(session.map().contains(-16) && session.map().contains(31));
        let saved = session.store().load_chunk("world", 1).unwrap();
        assert_eq!(saved.len(), 16);
        assert_eq!(saved.get(20), session.map().get(20));
    }

    #[test]
    fn test_saved_slices_win_over_generation() {
        let config = Config::default();
        let mut store = MemoryStore::new(16);
        store.save_meta("world", &WorldMeta::new(8)).unwrap();
        let marker = vec!['$'; config.world_gen.height];
        let saved: SliceMap = [(3, marker.clone())].into_iter().collect();
        store.save_slices("world", &saved).unwrap();

        let mut session = Session::open(store, "world", &config).unwrap();
        session.load_chunks([0]).unwrap();
        assert_eq!(session.map().get(3), Some(&marker));
        assert_eq!(session.map().len(), 16);
    }

    #[test]
    fn test_reopened_save_matches() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::default();

        let store = RonStore::new(temp_dir.path(), config.world_gen.chunk_size);
        let mut first = Session::create(store, "world", 55, &config).unwrap();
        first.load_chunks(0..32).unwrap();

        let store = RonStore::new(temp_dir.path(), config.world_gen.chunk_size);
        let mut second = Session::open(store, "world", &config).unwrap();
        second.load_chunks(0..32).unwrap();

        assert_eq!(first.map(), second.map());
        assert_eq!(second.meta().seed, 55);
    }

    #[test]
    fn test_tick_rate_limited() {
        let mut session = memory_session(0);
        let start = session.last_tick();
        let interval = Duration::from_millis(100);

        assert!(!session.tick_at(start + interval / 2));
        assert!(session.tick_at(start + interval));
        assert!(!session.tick_at(start + interval + interval / 2));
        assert!(session.tick_at(start + interval * 2));

        let expected = 2.0 * (1.0_f64 / 32.0).to_radians();
        assert!((session.meta().tick - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_drops_floating_block() {
        let mut session = memory_session(12);
        session.load_chunks(0..16).unwrap();

        let edit: BlockEdits = BTreeMap::from([(8, BTreeMap::from([(0, symbols::FILL)]))]);
        session.save_blocks(&edit).unwrap();

        let deltas = session.apply_gravity(0..16).unwrap();
        assert_eq!(deltas[&8][&0], symbols::AIR);
        assert_eq!(deltas[&8][&1], symbols::FILL);
        assert_eq!(session.map().block(8, 1), Some(symbols::FILL));

        let saved = session.store().load_chunk("world", 0).unwrap();
        assert_eq!(saved.block(8, 1), Some(symbols::FILL));
        assert_eq!(saved.block(8, 0), Some(symbols::AIR));
    }
}
