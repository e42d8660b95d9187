//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ algorithm for fast, high-quality, deterministic randomness.
//! Given the same seed, produces identical sequence on all platforms.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of random numbers on any platform (x86, ARM, WASM).
///
/// Every mini-game engine receives one of these at mount time instead of
/// reaching for an ambient generator, so replays and tests fix a seed and
/// observe identical content draws.
///
/// # Example
///
/// ```
/// use plaza_games::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u64();
/// assert_eq!(value, 6233086606872742541); // Always the same!
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

    /// Fork a child generator seeded from this one.
    ///
    /// Used to hand each stage mount its own stream so that replaying a
    /// stage draws fresh content without disturbing the session stream.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u64())
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

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in range [min, max].
    #[inline]
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_int(range) as i32
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Draw up to `count` elements from `pool`, in random order, without
    /// replacement.
    ///
    /// This is the content-sampling primitive every engine uses on mount:
    /// shuffle the pool, truncate to the stage's configured count.
    pub fn sample<T: Clone>(&mut self, pool: &[T], count: usize) -> Vec<T> {
        let mut drawn: Vec<T> = pool.to_vec();
        self.shuffle(&mut drawn);
        drawn.truncate(count);
        drawn
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
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

/// Derive a selection seed from the session identity, the selected level
/// and a per-session selection counter.
///
/// The counter makes every selection a fresh draw (re-picking a level rolls
/// new dynamic stages), while a replay with the same identifiers reproduces
/// the exact same session.
///
/// # Parameters
///
/// - `session_id`: Unique session identifier (UUID bytes)
/// - `level`: Canonical level identifier string
/// - `selection`: How many selections this session has made, this one
///   included
pub fn derive_session_seed(session_id: &[u8; 16], level: &str, selection: u64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"PLAZA_SESSION_SEED_V1");

    // Session identity
    hasher.update(session_id);

    // Level id
    hasher.update(level.as_bytes());

    // Selection counter
    hasher.update(selection.to_le_bytes());

    let hash = hasher.finalize();

    // Take first 8 bytes as seed
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}

// =============================================================================
// TESTS
// =============================================================================
