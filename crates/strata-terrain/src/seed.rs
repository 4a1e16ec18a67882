//! Deterministic seeded feature streams.
//!
//! Every (world seed, slice position, feature kind) triple owns an independent
//! RNG stream, so evaluating one feature never perturbs another and a cache
//! entry regenerated after eviction comes back identical.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::feature::FeatureKind;

/// SplitMix64 finaliser. Pure `u64` arithmetic, so the output is fixed across
/// toolchains and targets.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Stable numeric tag per feature kind. Ore ids start at `0x1_0000`.
fn kind_tag(kind: FeatureKind) -> u64 {
    match kind {
        FeatureKind::Biome => 1,
        FeatureKind::Hill => 2,
        FeatureKind::Tree => 3,
        FeatureKind::Grass => 4,
        FeatureKind::Cave => 5,
        FeatureKind::Ore(id) => 0x1_0000 + u64::from(id.0),
    }
}

/// Derive a u64 seed for one feature from the world seed, slice and kind.
///
/// Chains SplitMix64 over the three inputs. The result does not depend on the
/// toolchain or target.
pub fn derive_feature_seed(world_seed: u64, position: i64, kind: FeatureKind) -> u64 {
    let state = splitmix64(world_seed);
    let state = splitmix64(state ^ position as u64);
    splitmix64(state ^ kind_tag(kind))
}

/// Derive the RNG stream for one feature.
///
/// The returned RNG produces an identical sequence for the same inputs,
/// regardless of thread, call order, or platform.
pub fn feature_rng(world_seed: u64, position: i64, kind: FeatureKind) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_feature_seed(world_seed, position, kind))
}
