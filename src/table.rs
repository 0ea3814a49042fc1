//! Table: bucket array plus node arena, with the forward store and resize.
//!
//! The table never hashes anything itself; callers pass in precomputed
//! hashes and the table stores them on each entry. Only the lookup
//! routines taking a `&Q` call into user code (`Eq`).

use crate::config::Config;
use crate::iter::{Chain, Iter};
use crate::node::{Node, NodeKey, NodeKind};
use core::borrow::Borrow;
use slotmap::SlotMap;

pub(crate) struct Table<K, V> {
    config: Config,
    pub(crate) buckets: Vec<Option<NodeKey>>,
    pub(crate) nodes: SlotMap<NodeKey, Node<K, V>>,
    len: usize,
    threshold: usize,
}

impl<K, V> Table<K, V> {
    /// `config` must already be validated.
    pub(crate) fn new(config: Config) -> Self {
        Self {
            buckets: vec![None; config.initial_capacity],
            nodes: SlotMap::with_key(),
            len: 0,
            threshold: config.grow_threshold(config.initial_capacity),
            config,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn occupied_buckets(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, &self.buckets, self.len)
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub(crate) fn chain(&self, bucket: usize) -> Chain<'_, K, V> {
        Chain::new(&self.nodes, self.buckets[bucket])
    }

    /// Scans the entry prefix of the bucket for `hash`.
    pub(crate) fn find_entry<Q>(&self, hash: u64, q: &Q) -> Option<NodeKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        for (id, node) in self.chain(self.bucket_of(hash)) {
            match &node.kind {
                NodeKind::Entry { key, key_hash, .. } => {
                    if *key_hash == hash && key.borrow() == q {
                        return Some(id);
                    }
                }
                // Entries precede markers in every chain.
                NodeKind::Marker { .. } => return None,
            }
        }
        None
    }

    pub(crate) fn value(&self, id: NodeKey) -> Option<&V> {
        self.nodes.get(id)?.key_value().map(|(_, v)| v)
    }

    /// Keys of the entries witnessed in the bucket for `hash` whose value
    /// equals `q`. Walks the whole chain: witnesses need not be contiguous.
    pub(crate) fn witnessed<'a, 'q, Q>(
        &'a self,
        hash: u64,
        q: &'q Q,
    ) -> impl Iterator<Item = &'a K> + 'q
    where
        'a: 'q,
        V: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let nodes = &self.nodes;
        self.chain(self.bucket_of(hash))
            .filter_map(move |(_, node)| match &nodes.get(node.witness()?)?.kind {
                NodeKind::Entry {
                    key,
                    value,
                    value_hash,
                    ..
                } if *value_hash == hash && value.borrow() == q => Some(key),
                _ => None,
            })
    }

    /// Links a new entry, casts its witness, and grows if the load factor
    /// is exceeded. The key must not be present.
    pub(crate) fn insert_new(&mut self, key: K, value: V, key_hash: u64, value_hash: u64) -> NodeKey {
        let id = self.nodes.insert(Node::entry(key, value, key_hash, value_hash));
        self.link_entry(id);
        self.cast_witness(id);
        self.len += 1;
        if self.len > self.threshold {
            self.grow();
        }
        id
    }

    /// Swaps in a new value for entry `id`, moving its witness when the new
    /// value hashes to a different bucket. The key's chain is untouched.
    pub(crate) fn replace_value(&mut self, id: NodeKey, value: V, value_hash: u64) -> V {
        let old_hash = self.nodes[id].value_hash().expect("replacing an entry value");
        let moves = self.bucket_of(old_hash) != self.bucket_of(value_hash);
        if moves {
            self.retract_witness(id);
        }
        let old = match &mut self.nodes[id].kind {
            NodeKind::Entry {
                value: slot,
                value_hash: slot_hash,
                ..
            } => {
                *slot_hash = value_hash;
                core::mem::replace(slot, value)
            }
            NodeKind::Marker { .. } => unreachable!("markers carry no value"),
        };
        if moves {
            self.cast_witness(id);
        }
        old
    }

    /// Unlinks entry `id` from the bucket for `key_hash`.
    ///
    /// The witness pointing at the entry is retracted. If the entry was
    /// itself carrying a witness for another entry, that witness is re-cast
    /// into the same bucket so the other entry stays reachable by value.
    pub(crate) fn remove(&mut self, id: NodeKey, key_hash: u64) -> (K, V) {
        self.retract_witness(id);

        let bucket = self.bucket_of(key_hash);
        let prev = self.predecessor(bucket, id);
        let node = self.unlink(bucket, prev, id);
        self.len -= 1;

        let NodeKind::Entry {
            key,
            value,
            witness,
            ..
        } = node.kind
        else {
            unreachable!("only entries are removed by key");
        };
        // A self-witness was cleared by retract_witness above.
        if let Some(carried) = witness {
            log::trace!("relocating witness carried by removed entry in bucket {}", bucket);
            self.cast_into(bucket, carried);
        }
        (key, value)
    }

    /// Places an unlinked entry at the end of the entry prefix of its key
    /// bucket, taking over a marker found there.
    fn link_entry(&mut self, id: NodeKey) {
        let key_hash = self.nodes[id].key_hash().expect("only entries are linked");
        let bucket = self.bucket_of(key_hash);
        let Some(head) = self.buckets[bucket] else {
            self.buckets[bucket] = Some(id);
            return;
        };
        if !self.nodes[head].is_entry() {
            self.take_over(id, head);
            self.buckets[bucket] = Some(id);
            return;
        }
        let mut cur = head;
        loop {
            let next = self.nodes[cur].next;
            match next {
                None => {
                    self.nodes[cur].next = Some(id);
                    return;
                }
                Some(next) if self.nodes[next].is_entry() => cur = next,
                Some(marker) => {
                    self.take_over(id, marker);
                    self.nodes[cur].next = Some(id);
                    return;
                }
            }
        }
    }

    fn predecessor(&self, bucket: usize, id: NodeKey) -> Option<NodeKey> {
        let mut prev = None;
        for (cur, _) in self.chain(bucket) {
            if cur == id {
                break;
            }
            prev = Some(cur);
        }
        prev
    }

    /// Doubles capacity until the entry count fits, then rebuilds once.
    fn grow(&mut self) {
        let old = self.buckets.len();
        let mut capacity = old;
        while self.len > self.config.grow_threshold(capacity) {
            capacity = capacity
                .checked_mul(2)
                .unwrap_or_else(|| panic!("capacity overflow"));
        }
        log::debug!(
            "growing shadow map from {} to {} buckets ({} entries)",
            old,
            capacity,
            self.len
        );
        self.rebuild(capacity);
    }

    /// Re-places every entry under `capacity` buckets in old bucket order,
    /// then chain order, and re-casts all witnesses from scratch. Entries
    /// keep their arena keys; markers are dropped and regenerated.
    fn rebuild(&mut self, capacity: usize) {
        let entries: Vec<NodeKey> = (0..self.buckets.len())
            .flat_map(|b| self.chain(b))
            .filter(|(_, node)| node.is_entry())
            .map(|(id, _)| id)
            .collect();
        debug_assert_eq!(entries.len(), self.len);

        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.is_entry());
        log::trace!("rebuild dropped {} markers", before - self.nodes.len());
        for &id in &entries {
            let node = &mut self.nodes[id];
            node.next = None;
            node.set_witness(None);
        }

        self.buckets.clear();
        self.buckets.resize(capacity, None);
        self.threshold = self.config.grow_threshold(capacity);
        for &id in &entries {
            self.link_entry(id);
            self.cast_witness(id);
        }
    }

    /// Panics unless every structural invariant holds:
    /// - entries sit in their key bucket, ahead of all markers of the chain;
    /// - every witness points at a live entry and sits in that entry's value bucket;
    /// - every entry is witnessed exactly once;
    /// - the arena holds no unlinked nodes, and `len` respects the load factor.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashMap;

        let mut reached = 0usize;
        let mut entries = 0usize;
        let mut witnessed: HashMap<NodeKey, usize> = HashMap::new();
        for b in 0..self.buckets.len() {
            let mut seen_marker = false;
            for (_, node) in self.chain(b) {
                reached += 1;
                match &node.kind {
                    NodeKind::Entry { key_hash, .. } => {
                        assert!(!seen_marker, "entry behind a marker in bucket {b}");
                        assert_eq!(self.bucket_of(*key_hash), b, "entry outside its key bucket");
                        entries += 1;
                    }
                    NodeKind::Marker { .. } => seen_marker = true,
                }
                if let Some(w) = node.witness() {
                    let target = self.nodes.get(w).expect("stale witness");
                    let vh = target.value_hash().expect("witness points at a marker");
                    assert_eq!(self.bucket_of(vh), b, "witness outside its value bucket");
                    *witnessed.entry(w).or_default() += 1;
                }
            }
        }
        assert_eq!(entries, self.len, "len disagrees with linked entries");
        assert_eq!(reached, self.nodes.len(), "arena holds unlinked nodes");
        assert_eq!(witnessed.len(), self.len, "some entry has no witness");
        assert!(witnessed.values().all(|&c| c == 1), "entry witnessed twice");
        assert!(self.len <= self.threshold, "load factor exceeded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    // Hashes are passed in directly: key k hashes to k, value v to v.
    fn table(capacity: usize, load_factor: f64) -> Table<u64, u64> {
        let cfg = Config::default()
            .with_initial_capacity(capacity)
            .with_load_factor(load_factor);
        Table::new(cfg)
    }

    fn put(t: &mut Table<u64, u64>, k: u64, v: u64) -> NodeKey {
        t.insert_new(k, v, k, v)
    }

    fn keys_of(t: &Table<u64, u64>, v: u64) -> Vec<u64> {
        let mut ks: Vec<u64> = t.witnessed(v, &v).copied().collect();
        ks.sort();
        ks
    }

    /// Invariant: Forward lookups find every linked entry, stop at the first
    /// marker, and report absence for unknown keys.
    #[test]
    fn find_entry_scans_prefix() {
        let mut t = table(4, 1.0);
        let a = put(&mut t, 0, 1);
        let b = put(&mut t, 4, 2);
        assert_eq!(t.find_entry(0, &0), Some(a));
        assert_eq!(t.find_entry(4, &4), Some(b));
        assert_eq!(t.find_entry(8, &8), None);
        assert_eq!(t.value(b), Some(&2));
        t.assert_invariants();
    }

    /// Invariant: The 13th insert at 16 buckets / 0.75 doubles the table and
    /// keeps every mapping.
    #[test]
    fn thirteenth_insert_doubles() {
        let mut t = table(16, 0.75);
        for k in 0..12 {
            put(&mut t, k, k % 4);
        }
        assert_eq!(t.capacity(), 16);
        put(&mut t, 12, 0);
        assert_eq!(t.capacity(), 32);
        for k in 0..13 {
            assert!(t.find_entry(k, &k).is_some());
        }
        assert_eq!(keys_of(&t, 0), vec![0, 4, 8, 12]);
        t.assert_invariants();
    }

    /// Invariant: A tiny load factor may need several doublings; they all
    /// happen before a single rebuild.
    #[test]
    fn grows_multiple_times_at_once() {
        let mut t = table(1, 0.25);
        put(&mut t, 7, 7);
        // 1 > floor(0.25 * c) until c == 4
        assert_eq!(t.capacity(), 4);
        t.assert_invariants();
    }

    /// Invariant: Rebuild drops markers, keeps entry arena keys, and leaks
    /// nothing.
    #[test]
    fn rebuild_keeps_entry_keys() {
        let mut t = table(4, 1.0);
        let ids: BTreeSet<NodeKey> = (0..4).map(|k| put(&mut t, k, 100 + k)).collect();
        put(&mut t, 4, 104);
        assert_eq!(t.capacity(), 8);
        for k in 0..4 {
            assert!(ids.contains(&t.find_entry(k, &k).unwrap()));
        }
        t.assert_invariants();
    }

    /// Invariant: An update to a value in another bucket moves the witness;
    /// the old value no longer resolves to the key.
    #[test]
    fn replace_value_moves_witness() {
        let mut t = table(8, 0.75);
        let id = put(&mut t, 1, 2);
        assert_eq!(t.replace_value(id, 5, 5), 2);
        assert!(keys_of(&t, 2).is_empty());
        assert_eq!(keys_of(&t, 5), vec![1]);
        // the bucket-2 marker went away with the retraction
        assert_eq!(t.chain(2).count(), 0);
        t.assert_invariants();
    }

    /// Invariant: An update within the same bucket keeps the witness in place.
    #[test]
    fn replace_value_same_bucket() {
        let mut t = table(8, 0.75);
        let id = put(&mut t, 1, 2);
        assert_eq!(t.replace_value(id, 10, 10), 2); // 10 % 8 == 2
        assert!(keys_of(&t, 2).is_empty());
        assert_eq!(keys_of(&t, 10), vec![1]);
        t.assert_invariants();
    }

    /// Invariant: Removing from the middle of a chain relinks its neighbours.
    #[test]
    fn remove_mid_chain() {
        let mut t = table(4, 1.0);
        put(&mut t, 0, 1);
        let mid = put(&mut t, 4, 1);
        put(&mut t, 8, 1);
        assert_eq!(t.remove(mid, 4), (4, 1));
        assert_eq!(t.len(), 2);
        assert!(t.find_entry(0, &0).is_some());
        assert!(t.find_entry(8, &8).is_some());
        assert!(t.find_entry(4, &4).is_none());
        assert_eq!(keys_of(&t, 1), vec![0, 8]);
        t.assert_invariants();
    }

    /// Invariant: `clear` drops all nodes and keeps the bucket count.
    #[test]
    fn clear_keeps_capacity() {
        let mut t = table(2, 1.0);
        for k in 0..5 {
            put(&mut t, k, k);
        }
        let cap = t.capacity();
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), cap);
        assert_eq!(t.occupied_buckets(), 0);
        assert!(t.nodes.is_empty());
        t.assert_invariants();
    }
}
