//! RNG module - deterministic randomness for refills and reshuffles
//!
//! Every random decision the engine makes (refill kinds, reshuffle visit order, pair
//! neighbour order, retry color remaps) draws from one seeded [`SimpleRng`], so a level
//! replayed with the same seed and the same pops produces identical boards.

use crate::types::Kind;

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

    /// Uniform kind in `0..kind_count`
    pub fn next_kind(&mut self, kind_count: u8) -> Kind {
        self.next_range(kind_count.max(1) as u32) as Kind
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Random permutation of `0..n`
    pub fn permutation(&mut self, n: u8) -> Vec<Kind> {
        let mut out: Vec<Kind> = (0..n).collect();
        self.shuffle(&mut out);
        out
    }
}
