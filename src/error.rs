//! Error types for this crate.
//!
//! Lookups never fail: a missing key or value is `None` or an empty `Vec`.
//! The only fallible step is construction from a [`Config`](crate::Config).

use core::fmt;

/// A [`Config`](crate::Config) was rejected by
/// [`ShadowHashMap::with_config`](crate::ShadowHashMap::with_config).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The initial capacity was zero.
    ZeroCapacity,
    /// The load factor was not a finite number in `(0, 1]`.
    InvalidLoadFactor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("initial capacity must be greater than zero"),
            ConfigError::InvalidLoadFactor(lf) => {
                write!(f, "load factor must be in (0, 1], got {}", lf)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
