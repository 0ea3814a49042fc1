//! Construction parameters for [`ShadowHashMap`](crate::ShadowHashMap).

use crate::error::ConfigError;

/// Bucket count used by [`ShadowHashMap::new`](crate::ShadowHashMap::new).
pub const DEFAULT_CAPACITY: usize = 16;
/// Occupancy ratio above which the table doubles and is rebuilt.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Initial capacity and load factor of a map.
///
/// ```
/// use shadow_hashmap::{Config, ShadowHashMap};
///
/// let cfg = Config::default().with_initial_capacity(4).with_load_factor(0.5);
/// let m: ShadowHashMap<u32, &str> = ShadowHashMap::with_config(cfg).unwrap();
/// assert_eq!(m.capacity(), 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    pub initial_capacity: usize,
    pub load_factor: f64,
}

impl Config {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Capacity must be non-zero; the load factor must be finite and in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        // NaN fails both comparisons.
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }

    /// Largest entry count a table of `capacity` buckets may hold.
    pub(crate) fn grow_threshold(&self, capacity: usize) -> usize {
        (self.load_factor * capacity as f64) as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}
