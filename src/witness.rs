//! Witness casting: how an entry becomes findable from its value.
//!
//! Every entry `E` with value `v` is referenced by exactly one witness,
//! stored on some node of the bucket `hash(v) % capacity`. The witness lives
//! on the first node of that chain whose witness slot is free (an entry
//! that is not yet witnessing anything); when the chain has no free slot a
//! marker node is appended just to hold it. Markers always sit behind the
//! entries of their chain, so forward lookups may stop at the first marker.
//!
//! None of these routines call user code: buckets are chosen from the
//! hashes stored on each entry.

use crate::node::{Node, NodeKey, NodeKind};
use crate::table::Table;

impl<K, V> Table<K, V> {
    /// Casts the witness for entry `target` into its value bucket.
    pub(crate) fn cast_witness(&mut self, target: NodeKey) {
        let value_hash = self.nodes[target]
            .value_hash()
            .expect("witnesses are only cast for entries");
        let bucket = self.bucket_of(value_hash);
        self.cast_into(bucket, target);
    }

    /// Stores a witness for `target` on the first free slot of `bucket`'s
    /// chain, appending a marker if there is none.
    pub(crate) fn cast_into(&mut self, bucket: usize, target: NodeKey) {
        let Some(mut cur) = self.buckets[bucket] else {
            let marker = self.nodes.insert(Node::marker(target, None));
            self.buckets[bucket] = Some(marker);
            return;
        };
        loop {
            let node = &mut self.nodes[cur];
            if node.is_entry() && node.witness().is_none() {
                node.set_witness(Some(target));
                return;
            }
            let next = node.next;
            match next {
                Some(next) => cur = next,
                None => {
                    let marker = self.nodes.insert(Node::marker(target, None));
                    self.nodes[cur].next = Some(marker);
                    return;
                }
            }
        }
    }

    /// Removes the witness pointing at entry `target`. An entry holding it
    /// gets its slot freed; a marker holding it is unlinked and dropped.
    pub(crate) fn retract_witness(&mut self, target: NodeKey) {
        let value_hash = self.nodes[target]
            .value_hash()
            .expect("witnesses only point at entries");
        let bucket = self.bucket_of(value_hash);
        let mut prev = None;
        let mut cur = self.buckets[bucket];
        while let Some(id) = cur {
            let node = &mut self.nodes[id];
            if node.witness() == Some(target) {
                if node.is_entry() {
                    node.set_witness(None);
                } else {
                    self.unlink(bucket, prev, id);
                }
                return;
            }
            prev = cur;
            cur = node.next;
        }
        debug_assert!(false, "entry has no witness in its value bucket");
    }

    /// Entry `entry` (not yet linked anywhere) takes `marker`'s place in its
    /// chain, inheriting the marker's witness and link. The marker is freed.
    pub(crate) fn take_over(&mut self, entry: NodeKey, marker: NodeKey) {
        let Node { kind, next } = self.nodes.remove(marker).expect("marker is live");
        let NodeKind::Marker { witness } = kind else {
            unreachable!("only markers are taken over");
        };
        let node = &mut self.nodes[entry];
        debug_assert!(node.witness().is_none());
        node.next = next;
        node.set_witness(Some(witness));
    }

    /// Unlinks `id` from `bucket`, given its predecessor, and frees it.
    pub(crate) fn unlink(&mut self, bucket: usize, prev: Option<NodeKey>, id: NodeKey) -> Node<K, V> {
        let node = self.nodes.remove(id).expect("unlinking a live node");
        match prev {
            None => self.buckets[bucket] = node.next,
            Some(p) => self.nodes[p].next = node.next,
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::node::NodeKey;
    use crate::table::Table;

    // Key k hashes to k and value v to v, so bucket placement is explicit.
    fn table(capacity: usize) -> Table<u64, u64> {
        Table::new(
            Config::default()
                .with_initial_capacity(capacity)
                .with_load_factor(1.0),
        )
    }

    fn put(t: &mut Table<u64, u64>, k: u64, v: u64) -> NodeKey {
        t.insert_new(k, v, k, v)
    }

    fn keys_of(t: &Table<u64, u64>, v: u64) -> Vec<u64> {
        let mut ks: Vec<u64> = t.witnessed(v, &v).copied().collect();
        ks.sort();
        ks
    }

    fn shape(t: &Table<u64, u64>, bucket: usize) -> Vec<(bool, bool)> {
        t.chain(bucket)
            .map(|(_, n)| (n.is_entry(), n.witness().is_some()))
            .collect()
    }

    /// Invariant: Casting into an empty bucket creates a lone marker there.
    #[test]
    fn witness_into_empty_bucket_creates_marker() {
        let mut t = table(8);
        put(&mut t, 1, 5);
        assert_eq!(shape(&t, 5), vec![(false, true)]);
        assert_eq!(keys_of(&t, 5), vec![1]);
        t.assert_invariants();
    }

    /// Invariant: A free witness slot on an existing entry is used before any
    /// marker is appended.
    #[test]
    fn witness_reuses_entry_slot() {
        let mut t = table(8);
        put(&mut t, 3, 6); // entry 3 in bucket 3, witnessing nothing
        put(&mut t, 4, 3); // value bucket 3: entry 3 takes the witness
        assert_eq!(shape(&t, 3), vec![(true, true)]);
        assert_eq!(keys_of(&t, 3), vec![4]);
        t.assert_invariants();
    }

    /// Invariant: A new entry landing on a marker-headed bucket replaces the
    /// marker and inherits its witness, so reverse lookups keep working.
    #[test]
    fn entry_takes_over_marker_head() {
        let mut t = table(8);
        put(&mut t, 1, 2); // marker in bucket 2 witnessing key 1
        let before = t.nodes.len();
        put(&mut t, 2, 7); // key bucket 2: takes over the marker
        assert_eq!(shape(&t, 2), vec![(true, true)]);
        // new entry plus its marker in bucket 7, minus the bucket-2 marker
        assert_eq!(t.nodes.len(), before + 1);
        assert_eq!(keys_of(&t, 2), vec![1]);
        assert_eq!(keys_of(&t, 7), vec![2]);
        t.assert_invariants();
    }

    /// Invariant: Entries stay ahead of markers; a marker right after the
    /// entry prefix is taken over in place.
    #[test]
    fn entry_takes_over_marker_after_prefix() {
        let mut t = table(4);
        put(&mut t, 0, 9); // entry in bucket 0; witness into bucket 1
        put(&mut t, 5, 0); // entry 0 witnesses key 5
        put(&mut t, 6, 0); // no free slot left: marker appended to bucket 0
        assert_eq!(shape(&t, 0), vec![(true, true), (false, true)]);
        put(&mut t, 4, 1); // key bucket 0: replaces the trailing marker
        assert_eq!(shape(&t, 0), vec![(true, true), (true, true)]);
        assert_eq!(keys_of(&t, 0), vec![5, 6]);
        t.assert_invariants();
    }

    /// Invariant: Removing an entry that held another entry's witness keeps
    /// that other entry reachable by value.
    #[test]
    fn removal_relocates_carried_witness() {
        let mut t = table(8);
        let three = put(&mut t, 3, 6);
        put(&mut t, 4, 3); // entry 3 carries the witness for key 4
        assert_eq!(t.remove(three, 3), (3, 6));
        assert_eq!(keys_of(&t, 3), vec![4]);
        assert_eq!(shape(&t, 3), vec![(false, true)]);
        assert!(keys_of(&t, 6).is_empty());
        t.assert_invariants();
    }

    /// Invariant: Retracting a witness held by an entry frees the slot, and
    /// the next cast into that bucket fills it again.
    #[test]
    fn retracted_slot_is_refilled() {
        let mut t = table(8);
        put(&mut t, 3, 6);
        let four = put(&mut t, 4, 3);
        t.remove(four, 4);
        assert_eq!(shape(&t, 3), vec![(true, false)]);
        put(&mut t, 5, 11); // 11 % 8 == 3
        assert_eq!(shape(&t, 3), vec![(true, true)]);
        assert_eq!(keys_of(&t, 11), vec![5]);
        t.assert_invariants();
    }

    /// Invariant: An entry that witnesses itself leaves nothing behind.
    #[test]
    fn self_witness_removed_cleanly() {
        let mut t = table(8);
        let id = put(&mut t, 2, 2);
        assert_eq!(shape(&t, 2), vec![(true, true)]);
        assert_eq!(keys_of(&t, 2), vec![2]);
        assert_eq!(t.remove(id, 2), (2, 2));
        assert_eq!(t.chain(2).count(), 0);
        assert!(t.nodes.is_empty());
        t.assert_invariants();
    }
}
