//! Bounded, insertion-ordered feature cache.
//!
//! Maps slice position to the [`SliceFeatures`] computed there. Eviction is
//! strict FIFO on first insertion: overwriting a slot of an existing entry does
//! not move it in the queue. Nothing depends on an entry surviving, only on
//! regeneration being deterministic.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::error::TerrainError;
use crate::feature::{Feature, FeatureKind, SliceFeatures, Slot, TypedFeature};

static UNCOMPUTED: Slot<Feature> = Slot::Uncomputed;

/// Session-owned feature cache.
#[derive(Debug)]
pub struct FeatureCache {
    entries: FxHashMap<i64, SliceFeatures>,
    order: VecDeque<i64>,
    capacity: usize,
    ore_count: usize,
}

impl FeatureCache {
    /// Creates an empty cache holding at most `capacity` slices (at least one).
    pub fn new(capacity: usize, ore_count: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
            ore_count,
        }
    }

    /// Entry at `position`, created empty on first access.
    ///
    /// Creating an entry may evict the oldest-inserted one.
    pub fn get_or_init(&mut self, position: i64) -> &mut SliceFeatures {
        if !self.entries.contains_key(&position) {
            self.entries
                .insert(position, SliceFeatures::new(self.ore_count));
            self.order.push_back(position);
            while self.entries.len() > self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                tracing::trace!(evicted = oldest, inserted = position, "feature cache eviction");
            }
        }
        self.entries
            .entry(position)
            .or_insert_with(|| SliceFeatures::new(self.ore_count))
    }

    /// Slot for `kind` at `position`. A slice never visited reads as uncomputed.
    pub fn get(&self, position: i64, kind: FeatureKind) -> Result<&Slot<Feature>, TerrainError> {
        match self.entries.get(&position) {
            Some(features) => features
                .slot(kind)
                .ok_or(TerrainError::CacheConsistency { position, kind }),
            None => Ok(&UNCOMPUTED),
        }
    }

    /// Records the outcome of evaluating `kind` at `position`.
    pub fn set(
        &mut self,
        position: i64,
        kind: FeatureKind,
        feature: Option<Feature>,
    ) -> Result<(), TerrainError> {
        let slot = self
            .get_or_init(position)
            .slot_mut(kind)
            .ok_or(TerrainError::CacheConsistency { position, kind })?;
        *slot = Slot::from(feature);
        Ok(())
    }

    /// Returns the cached feature of `kind` at `position`, computing and
    /// storing it with `make` when the slot is uncomputed.
    ///
    /// # Errors
    ///
    /// [`TerrainError::CacheConsistency`] if the slot holds a different
    /// feature type than `T`; otherwise whatever `make` returns.
    pub fn get_or_insert_with<T, F>(
        &mut self,
        position: i64,
        kind: FeatureKind,
        make: F,
    ) -> Result<Option<T>, TerrainError>
    where
        T: TypedFeature,
        F: FnOnce() -> Result<Option<T>, TerrainError>,
    {
        let inconsistent = TerrainError::CacheConsistency { position, kind };
        match self.get_or_init(position).slot(kind) {
            None => return Err(inconsistent),
            Some(Slot::Absent) => return Ok(None),
            Some(Slot::Present(feature)) => {
                return T::from_feature(feature).cloned().map(Some).ok_or(inconsistent);
            }
            Some(Slot::Uncomputed) => {}
        }

        let value = make()?;
        self.set(position, kind, value.clone().map(T::into_feature))?;
        Ok(value)
    }

    /// Number of cached slices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached slices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `position` has an entry.
    pub fn contains(&self, position: i64) -> bool {
        self.entries.contains_key(&position)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
