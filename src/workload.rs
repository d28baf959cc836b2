//! Deterministic lookup workload.
//!
//! [`SearchDataDriver`] pre-generates the values of a set and then hands out
//! search keys that hit the set with a configurable probability. Hit and
//! miss paths draw the same number of generator values and touch the same
//! table slot, so the driver's own cost does not depend on the outcome.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rng::Prng;

/// Generator of search keys with a target hit ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDataDriver {
    rng: Prng,
    set_values: Vec<u64>,
    hit_ratio: f64,
    hit_threshold: u64,
}

impl SearchDataDriver {
    /// Draw `set_size` values from a generator seeded with `seed`.
    ///
    /// `hit_ratio` is clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySet`] if `set_size` is zero.
    pub fn new(set_size: usize, hit_ratio: f64, seed: u64) -> Result<Self, ConfigError> {
        if set_size == 0 {
            return Err(ConfigError::EmptySet);
        }

        let mut rng = Prng::new(seed);
        let set_values = (0..set_size).map(|_| rng.next_value()).collect();
        let hit_ratio = hit_ratio.clamp(0.0, 1.0);

        Ok(Self {
            rng,
            set_values,
            hit_ratio,
            hit_threshold: (u64::MAX as f64 * hit_ratio) as u64,
        })
    }

    /// Values to insert into the set under test.
    pub fn set_values(&self) -> &[u64] {
        &self.set_values
    }

    /// Target probability that a search key is in the set.
    pub fn hit_ratio(&self) -> f64 {
        self.hit_ratio
    }

    /// Next search key.
    #[inline]
    pub fn next_search_value(&mut self) -> u64 {
        let random = self.rng.next_value();
        let idx = (random >> 32) as usize % self.set_values.len();
        let table = self.set_values[idx];
        if self.rng.next_value() < self.hit_threshold {
            random ^ table ^ random
        } else {
            table ^ random ^ table
        }
    }
}
