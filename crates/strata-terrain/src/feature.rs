//! Feature kinds and their cached attribute bundles.
//!
//! Every slice position owns one [`SliceFeatures`] record in the cache, with a
//! three-state [`Slot`] per kind so that "computed, nothing here" is cached
//! just like a present feature.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Index into the biome table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeId(pub u16);

impl BiomeId {
    /// Position in the biome table.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Index into the ore table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OreId(pub u16);

impl OreId {
    /// Position in the ore table.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// The kind of a feature. Also the discriminator for RNG seeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Biome root.
    Biome,
    /// Hill root.
    Hill,
    /// Tree root.
    Tree,
    /// Vein root of one ore type.
    Ore(OreId),
    /// Grass tuft.
    Grass,
    /// Chunk-wide cave air set, keyed by chunk origin.
    Cave,
}

/// A biome claiming `[anchor - radius, anchor + radius)`.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeFeature {
    /// Which biome.
    pub biome: BiomeId,
    /// Half-width of the claimed range.
    pub radius: u32,
}

/// A triangular hill with its apex at the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct HillFeature {
    /// Run per block of rise on the left flank.
    pub gradient_l: u32,
    /// Run per block of rise on the right flank.
    pub gradient_r: u32,
    /// Peak height above the baseline.
    pub height: u32,
}

/// A tree rooted on the surface of its anchor slice.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeFeature {
    /// Index into the tree table.
    pub tree_type: usize,
    /// How far the trunk reaches into the central leaf column.
    pub trunk_depth: usize,
    /// Trunk height in cells above the surface.
    pub height: usize,
}

/// Root of one ore vein.
#[derive(Clone, Debug, PartialEq)]
pub struct OreRoot {
    /// Row of the vein centre (0 = top of the world).
    pub root_height: usize,
    /// Per-cell inclusion thresholds, row-major over the vein window.
    pub vein_shape: Vec<f64>,
}

/// A grass tuft on top of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct GrassFeature {
    /// Ground height resolved at the anchor when the tuft was generated.
    pub ground_height: usize,
}

/// Cells carved to air by a chunk's cave automaton, as `(x, row)`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CaveFeature {
    /// Air points in world coordinates.
    pub air_points: BTreeSet<(i64, i64)>,
}

/// A feature of any kind, as stored in the cache.
#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    /// See [`BiomeFeature`].
    Biome(BiomeFeature),
    /// See [`HillFeature`].
    Hill(HillFeature),
    /// See [`TreeFeature`].
    Tree(TreeFeature),
    /// See [`OreRoot`].
    Ore(OreRoot),
    /// See [`GrassFeature`].
    Grass(GrassFeature),
    /// See [`CaveFeature`].
    Cave(CaveFeature),
}

/// Conversion between a concrete feature struct and the stored [`Feature`].
pub trait TypedFeature: Clone {
    /// Wraps the value.
    fn into_feature(self) -> Feature;
    /// Borrows the value if `feature` is of this type.
    fn from_feature(feature: &Feature) -> Option<&Self>;
}

macro_rules! typed_feature {
    ($ty:ty, $variant:ident) => {
        impl TypedFeature for $ty {
            fn into_feature(self) -> Feature {
                Feature::$variant(self)
            }

            fn from_feature(feature: &Feature) -> Option<&Self> {
                match feature {
                    Feature::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

typed_feature!(BiomeFeature, Biome);
typed_feature!(HillFeature, Hill);
typed_feature!(TreeFeature, Tree);
typed_feature!(OreRoot, Ore);
typed_feature!(GrassFeature, Grass);
typed_feature!(CaveFeature, Cave);

/// Cache state of one feature kind at one slice.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Slot<T> {
    /// No generator has evaluated this kind here yet.
    #[default]
    Uncomputed,
    /// Evaluated; no feature.
    Absent,
    /// Evaluated; feature present.
    Present(T),
}

impl<T> Slot<T> {
    /// Returns `true` unless the slot is [`Slot::Uncomputed`].
    pub fn is_computed(&self) -> bool {
        !matches!(self, Slot::Uncomputed)
    }

    /// The present value, if any.
    pub fn present(&self) -> Option<&T> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Slot::Absent, Slot::Present)
    }
}

/// All feature slots of one slice position.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SliceFeatures {
    biome: Slot<Feature>,
    hill: Slot<Feature>,
    tree: Slot<Feature>,
    grass: Slot<Feature>,
    cave: Slot<Feature>,
    ores: Vec<Slot<Feature>>,
}

impl SliceFeatures {
    /// Creates an all-uncomputed record with one slot per ore type.
    pub fn new(ore_count: usize) -> Self {
        Self {
            ores: vec![Slot::Uncomputed; ore_count],
            ..Default::default()
        }
    }

    /// Slot for `kind`, or `None` for an ore id beyond the table.
    pub fn slot(&self, kind: FeatureKind) -> Option<&Slot<Feature>> {
        match kind {
            FeatureKind::Biome => Some(&self.biome),
            FeatureKind::Hill => Some(&self.hill),
            FeatureKind::Tree => Some(&self.tree),
            FeatureKind::Grass => Some(&self.grass),
            FeatureKind::Cave => Some(&self.cave),
            FeatureKind::Ore(id) => self.ores.get(id.index()),
        }
    }

    /// Mutable slot for `kind`.
    pub fn slot_mut(&mut self, kind: FeatureKind) -> Option<&mut Slot<Feature>> {
        match kind {
            FeatureKind::Biome => Some(&mut self.biome),
            FeatureKind::Hill => Some(&mut self.hill),
            FeatureKind::Tree => Some(&mut self.tree),
            FeatureKind::Grass => Some(&mut self.grass),
            FeatureKind::Cave => Some(&mut self.cave),
            FeatureKind::Ore(id) => self.ores.get_mut(id.index()),
        }
    }

    /// Returns `true` if no slot has been evaluated.
    pub fn is_empty(&self) -> bool {
        [&self.biome, &self.hill, &self.tree, &self.grass, &self.cave]
            .into_iter()
            .chain(self.ores.iter())
            .all(|slot| !slot.is_computed())
    }
}
