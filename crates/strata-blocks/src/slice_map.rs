//! Slice containers keyed by world x-position.
//!
//! A [`SliceMap`] holds columns of block symbols (index 0 = sky, last index =
//! bedrock). A generated chunk is a `SliceMap` covering exactly one chunk's
//! x-range; the session's loaded world is a `SliceMap` spanning many chunks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One vertical column of the world, top to bottom.
pub type Column = Vec<char>;

/// Index of the chunk containing slice `x`.
pub fn chunk_index(x: i64, chunk_size: i64) -> i64 {
    x.div_euclid(chunk_size)
}

/// x-position of the first slice of chunk `index`.
pub fn chunk_origin(index: i64, chunk_size: i64) -> i64 {
    index * chunk_size
}

/// Ordered mapping from slice x-position to its [`Column`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SliceMap {
    slices: BTreeMap<i64, Column>,
}

impl SliceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a column, replacing any previous column at `x`.
    pub fn insert(&mut self, x: i64, column: Column) -> Option<Column> {
        self.slices.insert(x, column)
    }

    /// Column at `x`.
    pub fn get(&self, x: i64) -> Option<&Column> {
        self.slices.get(&x)
    }

    /// Mutable column at `x`.
    pub fn get_mut(&mut self, x: i64) -> Option<&mut Column> {
        self.slices.get_mut(&x)
    }

    /// Symbol at `(x, row)`, if that column is loaded and tall enough.
    pub fn block(&self, x: i64, row: usize) -> Option<char> {
        self.slices.get(&x).and_then(|column| column.get(row).copied())
    }

    /// Returns `true` if a column exists at `x`.
    pub fn contains(&self, x: i64) -> bool {
        self.slices.contains_key(&x)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Returns `true` if no columns are present.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Iterates `(x, column)` in ascending x.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Column)> {
        self.slices.iter().map(|(&x, column)| (x, column))
    }

    /// Iterates the columns whose x lies in `lo..hi`.
    pub fn range(&self, lo: i64, hi: i64) -> impl Iterator<Item = (i64, &Column)> {
        self.slices.range(lo..hi).map(|(&x, column)| (x, column))
    }

    /// Copies every column of `other` into `self`, replacing existing ones.
    pub fn extend(&mut self, other: SliceMap) {
        self.slices.extend(other.slices);
    }

    /// Returns a new map holding only the columns in `lo..hi`.
    pub fn subset(&self, lo: i64, hi: i64) -> SliceMap {
        self.range(lo, hi)
            .map(|(x, column)| (x, column.clone()))
            .collect()
    }

    /// x-positions in `lo..hi` that have no column.
    pub fn missing(&self, lo: i64, hi: i64) -> Vec<i64> {
        (lo..hi).filter(|x| !self.contains(*x)).collect()
    }
}

impl FromIterator<(i64, Column)> for SliceMap {
    fn from_iter<T: IntoIterator<Item = (i64, Column)>>(iter: T) -> Self {
        Self {
            slices: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SliceMap {
    type Item = (i64, Column);
    type IntoIter = std::collections::btree_map::IntoIter<i64, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.into_iter()
    }
}
