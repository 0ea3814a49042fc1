//! ShadowHashMap: chained hash table whose nodes also answer value -> keys.

use crate::config::Config;
use crate::dump::Dump;
use crate::error::ConfigError;
use crate::iter::{Iter, Keys, Values};
use crate::reentrancy::DebugReentrancy;
use crate::table::Table;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Hasher used when none is given.
pub type DefaultHashBuilder = hashbrown::hash_map::DefaultHashBuilder;

/// A hash map that finds keys by value as cheaply as values by key.
///
/// Each bucket holds a chain of nodes. Entries live in the bucket of their
/// key's hash. For every entry, the bucket of its *value's* hash holds a
/// witness: a non-owning reference back to the entry, carried either by an
/// entry already living there or by a small marker node. Value lookups walk
/// only that one chain.
///
/// ```
/// use shadow_hashmap::ShadowHashMap;
///
/// let mut m = ShadowHashMap::new();
/// m.insert(1, "a");
/// m.insert(2, "a");
/// m.insert(3, "b");
///
/// let mut keys = m.get_keys("a");
/// keys.sort();
/// assert_eq!(keys, vec![&1, &2]);
/// assert_eq!(m.get_first_key("b"), Some(&3));
/// assert_eq!(m.get(&3), Some(&"b"));
/// ```
pub struct ShadowHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    pub(crate) table: Table<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> ShadowHashMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    /// Empty map with 16 buckets and a 0.75 load factor.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for ShadowHashMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ShadowHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: Table::new(Config::default()),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_config_and_hasher(config: Config, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hasher,
            table: Table::new(config),
            reentrancy: DebugReentrancy::new(),
        })
    }

    /// Number of live entries. Markers are not counted.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of buckets. Only ever grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.config().load_factor
    }

    /// Number of non-empty buckets, counting those holding only markers.
    pub fn occupied_buckets(&self) -> usize {
        self.table.occupied_buckets()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drops every entry and marker; capacity is kept.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Entries in bucket order, then chain order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Keys in bucket order, then chain order. Single pass: call again for
    /// a fresh traversal.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Bucket-by-bucket rendering of every chain, markers and witnesses
    /// included. Meant for debugging; the format is not stable.
    pub fn dump(&self) -> Dump<'_, K, V> {
        Dump { table: &self.table }
    }
}

impl<K, V, S> ShadowHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Returns the value stored for `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get");
        let hash = self.make_hash(q);
        let id = self.table.find_entry(hash, q)?;
        self.table.value(id)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_key");
        let hash = self.make_hash(q);
        self.table.find_entry(hash, q).is_some()
    }

    /// Returns the first key found mapping to `value`, if any. Which one is
    /// first depends on the order witnesses were cast.
    pub fn get_first_key<Q>(&self, value: &Q) -> Option<&K>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_first_key");
        let hash = self.make_hash(value);
        self.table.witnessed(hash, value).next()
    }

    /// Returns every key currently mapping to `value`, possibly none.
    pub fn get_keys<Q>(&self, value: &Q) -> Vec<&K>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_keys");
        let hash = self.make_hash(value);
        self.table.witnessed(hash, value).collect()
    }

    pub fn contains_value<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_value");
        let hash = self.make_hash(value);
        self.table.witnessed(hash, value).next().is_some()
    }

    /// Maps `key` to `value`, returning the value it replaced.
    ///
    /// A new key may push the entry count over the load factor, in which case
    /// capacity doubles and the whole table is rebuilt before returning.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("insert");
        let key_hash = self.hasher.hash_one(&key);
        let value_hash = self.hasher.hash_one(&value);
        match self.table.find_entry(key_hash, &key) {
            Some(id) => Some(self.table.replace_value(id, value, value_hash)),
            None => {
                self.table.insert_new(key, value, key_hash, value_hash);
                None
            }
        }
    }

    /// Removes `q`, returning its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Removes `q`, returning the stored key and value.
    ///
    /// Any witness pointing at the entry goes with it, so value lookups never
    /// report removed keys.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("remove");
        let hash = self.hasher.hash_one(q);
        let id = self.table.find_entry(hash, q)?;
        Some(self.table.remove(id, hash))
    }
}

impl<K, V, S> Extend<(K, V)> for ShadowHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ShadowHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a ShadowHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ShadowHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
impl<K, V, S> ShadowHashMap<K, V, S> {
    pub(crate) fn assert_invariants(&self) {
        self.table.assert_invariants();
    }
}
