//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ algorithm for fast, deterministic randomness.
//! Given the same seed, produces identical sequence on all platforms.
//! Map generation draws from this generator so that a seed fully
//! determines the terrain.

use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_ONE};

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use island_raid::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random Fixed in range [0, max).
    #[inline]
    pub fn next_fixed(&mut self, max: Fixed) -> Fixed {
        if max <= 0 {
            return 0;
        }
        // Use upper 32 bits to avoid overflow in multiplication
        let raw = (self.next_u64() >> 32) as u32;
        ((raw as i64 * max as i64) >> 32) as Fixed
    }

    /// Roll a chance check.
    ///
    /// `probability` is in range [0, FIXED_ONE] where FIXED_ONE = 100%.
    #[inline]
    pub fn next_chance(&mut self, probability: Fixed) -> bool {
        self.next_fixed(FIXED_ONE) < probability
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================
