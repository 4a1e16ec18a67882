//! Save storage.
//!
//! A save is a [`WorldMeta`] plus the slices generated or edited so far,
//! grouped by chunk. [`RonStore`] keeps one directory per save:
//!
//! ```text
//! <root>/<save_id>/meta.ron
//! <root>/<save_id>/chunk_<index>.ron
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use strata_blocks::{SliceMap, chunk_index, chunk_origin};
use strata_terrain::WorldMeta;

/// Errors raised by a [`PersistenceStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A save file is not valid RON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Serializing save data failed.
    #[error("failed to serialize save data: {0}")]
    Serialize(#[from] ron::Error),

    /// No save with this id exists.
    #[error("save `{0}` does not exist")]
    MissingSave(String),
}

/// Where sessions read and write saves.
pub trait PersistenceStore {
    /// Returns `true` if `save_id` has meta.
    fn exists(&self, save_id: &str) -> bool;

    /// Meta of an existing save.
    fn load_meta(&self, save_id: &str) -> Result<WorldMeta, StoreError>;

    /// Creates or overwrites the meta of `save_id`.
    fn save_meta(&mut self, save_id: &str, meta: &WorldMeta) -> Result<(), StoreError>;

    /// Slices of chunk `index` saved so far. Possibly empty, never generated.
    fn load_chunk(&self, save_id: &str, index: i64) -> Result<SliceMap, StoreError>;

    /// Writes `slices`, replacing any saved columns at the same positions.
    fn save_slices(&mut self, save_id: &str, slices: &SliceMap) -> Result<(), StoreError>;
}

/// Groups `slices` by the chunk they belong to.
fn by_chunk(slices: &SliceMap, chunk_size: i64) -> BTreeMap<i64, SliceMap> {
    let mut chunks: BTreeMap<i64, SliceMap> = BTreeMap::new();
    for (x, column) in slices.iter() {
        chunks
            .entry(chunk_index(x, chunk_size))
            .or_default()
            .insert(x, column.clone());
    }
    chunks
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemorySave {
    meta: WorldMeta,
    slices: SliceMap,
}

/// Store that keeps everything in memory. Used by tests and throwaway worlds.
#[derive(Debug)]
pub struct MemoryStore {
    chunk_size: i64,
    saves: FxHashMap<String, MemorySave>,
}

impl MemoryStore {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size: i64::from(chunk_size.max(1)),
            saves: FxHashMap::default(),
        }
    }
}

impl PersistenceStore for MemoryStore {
    fn exists(&self, save_id: &str) -> bool {
        self.saves.contains_key(save_id)
    }

    fn load_meta(&self, save_id: &str) -> Result<WorldMeta, StoreError> {
        self.saves
            .get(save_id)
            .map(|save| save.meta)
            .ok_or_else(|| StoreError::MissingSave(save_id.to_string()))
    }

    fn save_meta(&mut self, save_id: &str, meta: &WorldMeta) -> Result<(), StoreError> {
        self.saves.entry(save_id.to_string()).or_default().meta = *meta;
        Ok(())
    }

    fn load_chunk(&self, save_id: &str, index: i64) -> Result<SliceMap, StoreError> {
        let save = self
            .saves
            .get(save_id)
            .ok_or_else(|| StoreError::MissingSave(save_id.to_string()))?;
        let origin = chunk_origin(index, self.chunk_size);
        Ok(save.slices.subset(origin, origin + self.chunk_size))
    }

    fn save_slices(&mut self, save_id: &str, slices: &SliceMap) -> Result<(), StoreError> {
        let save = self
            .saves
            .get_mut(save_id)
            .ok_or_else(|| StoreError::MissingSave(save_id.to_string()))?;
        save.slices.extend(slices.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RON directory store
// ---------------------------------------------------------------------------

const META_FILE: &str = "meta.ron";

/// Store backed by a directory of RON files.
#[derive(Debug, Clone)]
pub struct RonStore {
    root: PathBuf,
    chunk_size: i64,
}

impl RonStore {
    /// A store rooted at `root`. Nothing is touched until the first write.
    pub fn new(root: impl Into<PathBuf>, chunk_size: u32) -> Self {
        Self {
            root: root.into(),
            chunk_size: i64::from(chunk_size.max(1)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn save_dir(&self, save_id: &str) -> PathBuf {
        self.root.join(save_id)
    }

    fn chunk_path(&self, save_id: &str, index: i64) -> PathBuf {
        self.save_dir(save_id).join(format!("chunk_{index}.ron"))
    }

    fn read<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        ron::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        std::fs::write(path, ron::ser::to_string_pretty(value, pretty)?)?;
        Ok(())
    }
}

impl PersistenceStore for RonStore {
    fn exists(&self, save_id: &str) -> bool {
        self.save_dir(save_id).join(META_FILE).is_file()
    }

    fn load_meta(&self, save_id: &str) -> Result<WorldMeta, StoreError> {
        if !self.exists(save_id) {
            return Err(StoreError::MissingSave(save_id.to_string()));
        }
        Self::read(&self.save_dir(save_id).join(META_FILE))
    }

    fn save_meta(&mut self, save_id: &str, meta: &WorldMeta) -> Result<(), StoreError> {
        Self::write(&self.save_dir(save_id).join(META_FILE), meta)
    }

    fn load_chunk(&self, save_id: &str, index: i64) -> Result<SliceMap, StoreError> {
        if !self.exists(save_id) {
            return Err(StoreError::MissingSave(save_id.to_string()));
        }
        let path = self.chunk_path(save_id, index);
        if !path.exists() {
            return Ok(SliceMap::new());
        }
        Self::read(&path)
    }

    fn save_slices(&mut self, save_id: &str, slices: &SliceMap) -> Result<(), StoreError> {
        for (index, slices) in by_chunk(slices, self.chunk_size) {
            let mut chunk = self.load_chunk(save_id, index)?;
            chunk.extend(slices);
            Self::write(&self.chunk_path(save_id, index), &chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slices() -> SliceMap {
        [(-1, vec![' ', '-', '_']), (0, vec!['v', '-', '_']), (17, vec![' ', '#', '_'])]
            .into_iter()
            .collect()
    }

    fn round_trip(store: &mut impl PersistenceStore) {
        assert!(!store.exists("world"));
        assert!(matches!(
            store.load_meta("world"),
            Err(StoreError::MissingSave(_))
        ));

        let meta = WorldMeta {
            seed: 42,
            tick: 0.25,
        };
        store.save_meta("world", &meta).unwrap();
        assert!(store.exists("world"));
        assert_eq!(store.load_meta("world").unwrap(), meta);

        assert!(store.load_chunk("world", 0).unwrap().is_empty());
        store.save_slices("world", &sample_slices()).unwrap();

        let chunk = store.load_chunk("world", -1).unwrap();
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.get(-1), Some(&vec![' ', '-', '_']));
        assert_eq!(store.load_chunk("world", 0).unwrap().len(), 1);
        assert_eq!(store.load_chunk("world", 1).unwrap().len(), 1);

        // Overwrite one column, keep the others.
        let edit: SliceMap = [(0, vec![' ', '-', '_'])].into_iter().collect();
        store.save_slices("world", &edit).unwrap();
        assert_eq!(store.load_chunk("world", 0).unwrap().block(0, 0), Some(' '));
        assert_eq!(store.load_chunk("world", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store_round_trip() {
        round_trip(&mut MemoryStore::new(16));
    }

    #[test]
    fn test_ron_store_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RonStore::new(temp_dir.path(), 16);
        round_trip(&mut store);
        assert!(temp_dir.path().join("world").join("chunk_-1.ron").is_file());
    }

    #[test]
    fn test_ron_store_rejects_garbage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RonStore::new(temp_dir.path(), 16);
        store.save_meta("world", &WorldMeta::new(1)).unwrap();
        std::fs::write(temp_dir.path().join("world").join("chunk_0.ron"), "{{{").unwrap();
        assert!(matches!(
            store.load_chunk("world", 0),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_saving_slices_needs_a_save() {
        let mut store = MemoryStore::new(16);
        assert!(store.save_slices("nowhere", &sample_slices()).is_err());
    }
}
