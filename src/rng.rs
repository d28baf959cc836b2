//! Deterministic xorshift* generator for reproducible workloads.
//!
//! Every measured round feeds the set under test with values drawn from
//! [`Prng`]. The generator is tiny (one state word), has period 2^64 - 1
//! over the nonzero states, and two instances with the same seed and the
//! same number of draws are bit-identical. That makes workloads
//! reproducible across runs and lets two drivers be re-synchronized by
//! equalizing their draw counts.
//!
//! A seed of `0` is a fixed point of the xorshift step: the generator
//! would emit `0` forever. [`Prng::new`] accepts it anyway so that callers
//! can reproduce any stored state verbatim; pick a nonzero seed for
//! workloads.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::constants::PRNG_MULTIPLIER;

/// Xorshift* pseudo-random generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prng {
    /// Current 64-bit state word.
    pub state: u64,
    /// Number of draws so far (diagnostic only).
    pub round: u64,
}

impl Prng {
    /// Create a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed,
            round: 0,
        }
    }

    /// Draw the next 64-bit value.
    #[inline]
    pub fn next_value(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        self.round = self.round.wrapping_add(1);
        x.wrapping_mul(PRNG_MULTIPLIER)
    }
}

impl RngCore for Prng {
    /// Upper half of the 64-bit output; those bits mix best.
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_value() >> 32) as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.next_value()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut chunks = dst.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_value().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let bytes = self.next_value().to_le_bytes();
            rest.copy_from_slice(&bytes[..rest.len()]);
        }
    }
}
