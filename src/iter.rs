//! Iterators over chains and over live entries.

use crate::node::{Node, NodeKey};
use core::iter::FusedIterator;
use slotmap::SlotMap;

/// Walks one bucket chain, markers included.
pub(crate) struct Chain<'a, K, V> {
    nodes: &'a SlotMap<NodeKey, Node<K, V>>,
    cur: Option<NodeKey>,
}

impl<'a, K, V> Chain<'a, K, V> {
    pub(crate) fn new(nodes: &'a SlotMap<NodeKey, Node<K, V>>, head: Option<NodeKey>) -> Self {
        Self { nodes, cur: head }
    }
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (NodeKey, &'a Node<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let node = &self.nodes[id];
        self.cur = node.next;
        Some((id, node))
    }
}

/// Iterator over the entries of a `ShadowHashMap`, skipping markers.
///
/// Visits buckets in index order and each chain front to back. Exhausted
/// iterators keep returning `None`.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<NodeKey, Node<K, V>>,
    buckets: core::slice::Iter<'a, Option<NodeKey>>,
    cur: Option<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(
        nodes: &'a SlotMap<NodeKey, Node<K, V>>,
        buckets: &'a [Option<NodeKey>],
        len: usize,
    ) -> Self {
        Self {
            nodes,
            buckets: buckets.iter(),
            cur: None,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(id) = self.cur {
                let node = &self.nodes[id];
                self.cur = node.next;
                if let Some(kv) = node.key_value() {
                    self.remaining -= 1;
                    return Some(kv);
                }
            }
            if self.remaining == 0 {
                return None;
            }
            self.cur = *self.buckets.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over the keys of a `ShadowHashMap`. See [`Iter`] for ordering.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over the values of a `ShadowHashMap`. See [`Iter`] for ordering.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
