//! shadow-hashmap: a single-threaded hash map that answers both
//! key -> value and value -> keys in amortized constant time, without a
//! second full index.
//!
//! Internal Design:
//!
//! Summary
//! - One chained table serves both directions. An entry lives in the
//!   bucket of its key's hash. The bucket of its value's hash holds a
//!   *witness*: a non-owning reference back to the entry.
//! - A witness rides on an entry that already lives in that bucket when
//!   one has a free slot (each entry can carry one witness), otherwise on a
//!   dedicated marker node appended to the chain. Markers share the table
//!   with entries instead of living in a parallel index.
//! - Layers:
//!   - `Table<K, V>`: bucket array of chain heads plus a `slotmap` arena of
//!     nodes. Forward store, witness casting, rebuild. Never hashes.
//!   - `ShadowHashMap<K, V, S>`: public API. Hashes keys and values with
//!     `S`, hands the hashes to the table, and guards entry points with a
//!     debug-only reentrancy check.
//!
//! Constraints
//! - Single-threaded: no interior locking. Callers needing shared mutation
//!   provide their own exclusion.
//! - Witnesses are generational arena keys, so a witness can never alias a
//!   node that reused a freed slot, and never owns what it points at.
//! - Entries precede markers in every chain; forward lookups stop at the
//!   first marker. Value lookups walk the whole chain of the value bucket.
//!
//! Witness lifecycle
//! - Insert of a new key casts one witness. If the key's bucket position
//!   is occupied by a marker, the new entry takes the marker's place and
//!   inherits the witness it was carrying.
//! - Updating a key's value moves its witness when the new value hashes to
//!   a different bucket.
//! - Removing a key retracts its witness (a marker holding it is freed). If
//!   the removed entry was carrying a witness for some other entry, that
//!   witness is re-cast into the same bucket.
//! - Crossing the load factor doubles capacity and rebuilds everything:
//!   all markers are dropped and every witness is cast again.
//!
//! Hasher and rehashing invariants
//! - Key and value hashes are computed once and stored on the entry;
//!   rebuilds place nodes from stored hashes and never call `Hash`.
//!
//! Notes and non-goals
//! - No ordering guarantee beyond "bucket index, then chain order".
//! - No `get_mut`/`values_mut`: changing a value in place would strand its
//!   witness. Use `insert` to replace a value.
//! - No serialization.

mod config;
mod dump;
mod error;
mod iter;
mod node;
mod reentrancy;
mod shadow_hash_map;
mod shadow_hash_map_proptest;
mod table;
mod test_hasher;
mod witness;

// Public surface
pub use config::{Config, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use dump::Dump;
pub use error::ConfigError;
pub use iter::{Iter, Keys, Values};
pub use shadow_hash_map::{DefaultHashBuilder, ShadowHashMap};
