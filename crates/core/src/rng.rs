//! RNG module - seeded tile draws
//!
//! Provides a simple LCG so every board, refill and reshuffle is reproducible from a seed,
//! and the weighted per-kind table used to draw tile kinds from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TileKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current generator state (reseeding with it continues the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Relative spawn weight per tile kind
///
/// A fixed table indexed by [`TileKind::index`], so every kind always has an entry.
/// Serialized as a map from kind name to weight; kinds missing from the map weigh 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<TileKind, u32>", into = "BTreeMap<TileKind, u32>")]
pub struct SpawnWeights {
    weights: [u32; TileKind::COUNT],
}

impl SpawnWeights {
    /// Equal weight for every kind
    pub fn uniform() -> Self {
        Self {
            weights: [1; TileKind::COUNT],
        }
    }

    /// Equal weight for the first `n` kinds only
    pub fn first_kinds(n: usize) -> Self {
        let mut weights = [0; TileKind::COUNT];
        for w in weights.iter_mut().take(n) {
            *w = 1;
        }
        Self { weights }
    }

    pub fn from_pairs(pairs: &[(TileKind, u32)]) -> Self {
        let mut out = Self::default();
        for &(kind, weight) in pairs {
            out.set(kind, weight);
        }
        out
    }

    pub fn get(&self, kind: TileKind) -> u32 {
        self.weights[kind.index()]
    }

    pub fn set(&mut self, kind: TileKind, weight: u32) {
        self.weights[kind.index()] = weight;
    }

    pub fn total(&self) -> u32 {
        self.weights.iter().fold(0u32, |acc, w| acc.saturating_add(*w))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Kinds with a non-zero weight, in ordinal order
    pub fn kinds(&self) -> impl Iterator<Item = TileKind> + '_ {
        TileKind::ALL
            .iter()
            .copied()
            .filter(|k| self.weights[k.index()] > 0)
    }

    /// Draw a kind proportionally to its weight
    ///
    /// # Panics
    ///
    /// Panics if every weight is zero.
    pub fn pick(&self, rng: &mut SimpleRng) -> TileKind {
        let total = self.total();
        assert!(total > 0, "cannot draw a tile kind from all-zero spawn weights");

        let mut roll = rng.next_range(total);
        for kind in TileKind::ALL {
            let w = self.weights[kind.index()];
            if roll < w {
                return kind;
            }
            roll -= w;
        }
        unreachable!("roll is always below the weight total")
    }
}

impl From<BTreeMap<TileKind, u32>> for SpawnWeights {
    fn from(map: BTreeMap<TileKind, u32>) -> Self {
        let mut out = Self::default();
        for (kind, weight) in map {
            out.set(kind, weight);
        }
        out
    }
}

impl From<SpawnWeights> for BTreeMap<TileKind, u32> {
    fn from(value: SpawnWeights) -> Self {
        TileKind::ALL
            .iter()
            .filter(|k| value.get(**k) > 0)
            .map(|k| (*k, value.get(*k)))
            .collect()
    }
}
