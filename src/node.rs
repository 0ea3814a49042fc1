//! Chain nodes and their arena keys.

slotmap::new_key_type! {
    /// Arena address of a chain node. Used both for chain links and for
    /// witnesses; generational, so a key to a freed node never resolves to
    /// whatever later reuses its slot.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) enum NodeKind<K, V> {
    /// A live key -> value mapping. Lives in the bucket of `key_hash`.
    Entry {
        key: K,
        value: V,
        key_hash: u64,
        value_hash: u64,
        witness: Option<NodeKey>,
    },
    /// Carries a witness for a bucket that had no free witness slot.
    Marker { witness: NodeKey },
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) kind: NodeKind<K, V>,
    pub(crate) next: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn entry(key: K, value: V, key_hash: u64, value_hash: u64) -> Self {
        Node {
            kind: NodeKind::Entry {
                key,
                value,
                key_hash,
                value_hash,
                witness: None,
            },
            next: None,
        }
    }

    pub(crate) fn marker(witness: NodeKey, next: Option<NodeKey>) -> Self {
        Node {
            kind: NodeKind::Marker { witness },
            next,
        }
    }

    #[inline]
    pub(crate) fn is_entry(&self) -> bool {
        matches!(self.kind, NodeKind::Entry { .. })
    }

    #[inline]
    pub(crate) fn witness(&self) -> Option<NodeKey> {
        match self.kind {
            NodeKind::Entry { witness, .. } => witness,
            NodeKind::Marker { witness } => Some(witness),
        }
    }

    /// Entries only; a marker's witness is fixed for its whole life.
    #[inline]
    pub(crate) fn set_witness(&mut self, w: Option<NodeKey>) {
        match &mut self.kind {
            NodeKind::Entry { witness, .. } => *witness = w,
            NodeKind::Marker { .. } => debug_assert!(false, "marker witness is fixed"),
        }
    }

    /// Key and value, or `None` for a marker.
    #[inline]
    pub(crate) fn key_value(&self) -> Option<(&K, &V)> {
        match &self.kind {
            NodeKind::Entry { key, value, .. } => Some((key, value)),
            NodeKind::Marker { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn key_hash(&self) -> Option<u64> {
        match self.kind {
            NodeKind::Entry { key_hash, .. } => Some(key_hash),
            NodeKind::Marker { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn value_hash(&self) -> Option<u64> {
        match self.kind {
            NodeKind::Entry { value_hash, .. } => Some(value_hash),
            NodeKind::Marker { .. } => None,
        }
    }
}
