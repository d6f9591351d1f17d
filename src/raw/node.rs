use alloc::vec::Vec;
use core::mem;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use crate::btree_map::{DEFAULT_BRANCHING, Entry, Layer};
use crate::compare::Compare;

// Inline room for a default-branching node, including the transient `2B`
// overflow before a split. Larger `B` spill to the heap.
const INLINE_KEYS: usize = 2 * DEFAULT_BRANCHING;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

/// A single B-tree node: up to `2B - 1` ordered entries and, when internal,
/// exactly one more child than entries.
///
/// Nodes know nothing about their parent or about tree-wide invariants. They
/// may hold `2B` entries for the short window between an insertion and the
/// [`split`](Node::split) that follows it.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V, const B: usize> {
    keys: SmallVec<[K; INLINE_KEYS]>,
    values: SmallVec<[V; INLINE_KEYS]>,
    // Empty for leaves.
    children: SmallVec<[Handle; INLINE_CHILDREN]>,
}

/// Result of searching a node for a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Search {
    /// The key is stored at this index.
    Found(usize),
    /// The key is absent from this node; `child[index]` is the only subtree
    /// that may contain it. `index` is also where the key would be inserted.
    Descend(usize),
}

impl<K, V, const B: usize> Node<K, V, B> {
    /// The most entries a node keeps between operations.
    pub(crate) const MAX_KEYS: usize = 2 * B - 1;
    /// The fewest entries a non-root node keeps between operations.
    pub(crate) const MIN_KEYS: usize = B - 1;

    /// Creates an empty leaf.
    pub(crate) fn new() -> Self {
        Self {
            keys: SmallVec::with_capacity(2 * B),
            values: SmallVec::with_capacity(2 * B),
            children: SmallVec::new(),
        }
    }

    /// Creates a leaf holding a single entry.
    pub(crate) fn leaf(key: K, value: V) -> Self {
        let mut node = Self::new();
        node.keys.push(key);
        node.values.push(value);
        node
    }

    /// Creates the root that sits above a split: one entry, two children.
    pub(crate) fn root(key: K, value: V, left: Handle, right: Handle) -> Self {
        let mut node = Self::leaf(key, value);
        node.children.reserve_exact(2 * B + 1);
        node.children.push(left);
        node.children.push(right);
        node
    }

    /// Number of entries.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Binary search for `key`.
    #[inline]
    pub(crate) fn locate<C: Compare<K>>(&self, key: &K, compare: &C) -> Search {
        match self.keys.binary_search_by(|probe| compare.compare(probe, key)) {
            Ok(index) => Search::Found(index),
            Err(index) => Search::Descend(index),
        }
    }

    /// Inserts an entry where it keeps the keys ascending. Child links are not
    /// touched; callers that add a child pair this with [`insert_child`](Self::insert_child).
    ///
    /// The key must not already be present.
    pub(crate) fn ordered_insert<C: Compare<K>>(&mut self, key: K, value: V, compare: &C) {
        debug_assert!(self.len() <= Self::MAX_KEYS, "`Node::ordered_insert()` - node is already overflowing");
        let index = match self.locate(&key, compare) {
            Search::Found(index) | Search::Descend(index) => index,
        };
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Inserts a child link at `index`, shifting later links right.
    pub(crate) fn insert_child(&mut self, child: Handle, index: usize) {
        self.children.insert(index, child);
    }

    /// Removes the child link at `index`, shifting later links left.
    pub(crate) fn remove_child(&mut self, index: usize) -> Handle {
        self.children.remove(index)
    }

    /// Removes and returns the entry at `index`, shifting later entries left.
    /// Child links are not touched.
    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Swaps the entry at `index` for a new one, returning the old entry.
    pub(crate) fn replace(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[index], key),
            mem::replace(&mut self.values[index], value),
        )
    }

    /// Splits an overflowing node (`2B` entries).
    ///
    /// The first `B` entries, together with the first `B` children of an
    /// internal node, move into the returned node; the remaining `B` entries
    /// and `B + 1` children stay here. The caller promotes the returned node's
    /// last entry (index `B - 1`) into the parent, leaving it with `B - 1`
    /// entries and `B` children.
    ///
    /// Returns `None` when the node is not overflowing.
    pub(crate) fn split(&mut self) -> Option<Self> {
        if self.len() < 2 * B {
            return None;
        }

        let mut left = Self::new();
        left.keys.extend(self.keys.drain(..B));
        left.values.extend(self.values.drain(..B));
        if !self.is_leaf() {
            left.children.reserve_exact(2 * B + 1);
            left.children.extend(self.children.drain(..B));
        }
        Some(left)
    }

    /// Appends the separator pulled down from the parent followed by every
    /// entry and child of `right`, the sibling immediately to the right.
    pub(crate) fn merge(&mut self, separator_key: K, separator_value: V, mut right: Self) {
        self.keys.push(separator_key);
        self.values.push(separator_value);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.children.append(&mut right.children);
    }

    /// Removes the smallest entry and, for an internal node, its leftmost
    /// child.
    ///
    /// # Panics
    ///
    /// Panics if the node is empty.
    pub(crate) fn pop_first(&mut self) -> (K, V, Option<Handle>) {
        let (key, value) = self.remove(0);
        let child = (!self.is_leaf()).then(|| self.children.remove(0));
        (key, value, child)
    }

    /// Removes the largest entry and, for an internal node, its rightmost
    /// child.
    ///
    /// # Panics
    ///
    /// Panics if the node is empty.
    pub(crate) fn pop_last(&mut self) -> (K, V, Option<Handle>) {
        let (key, value) = self.remove(self.len() - 1);
        let child = self.children.pop();
        (key, value, child)
    }

    /// Prepends an entry and, for an internal node, a new leftmost child.
    pub(crate) fn push_first(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Appends an entry and, for an internal node, a new rightmost child.
    pub(crate) fn push_last(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.push(key);
        self.values.push(value);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Appends this node's entries to `layers[layer]`, then visits the
    /// children one layer deeper. Empty nodes contribute nothing.
    pub(crate) fn bfs<'a>(&'a self, nodes: &'a Arena<Self>, layer: usize, layers: &mut Vec<Layer<'a, K, V>>) {
        if self.keys.is_empty() {
            return;
        }

        let entries = self.keys.iter().zip(&self.values).collect();
        match layers.get_mut(layer) {
            Some(nodes_in_layer) => nodes_in_layer.push(entries),
            None => layers.push(alloc::vec![entries]),
        }

        for &child in &self.children {
            nodes.get(child).bfs(nodes, layer + 1, layers);
        }
    }

    /// Appends every entry of this subtree in ascending key order by visiting
    /// `child[i]` before `entry[i]` for each slot.
    pub(crate) fn in_order<'a>(&'a self, nodes: &'a Arena<Self>, entries: &mut Vec<Entry<'a, K, V>>) {
        for index in 0..=self.len() {
            if let Some(&child) = self.children.get(index) {
                nodes.get(child).in_order(nodes, entries);
            }
            if index < self.len() {
                entries.push((&self.keys[index], &self.values[index]));
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use alloc::vec;

    type TestNode = Node<i32, i32, 3>;

    fn leaf_of(keys: &[i32]) -> TestNode {
        let mut node = TestNode::new();
        for &key in keys {
            node.ordered_insert(key, key * 10, &Natural);
        }
        node
    }

    #[test]
    fn bounds_follow_branching_factor() {
        assert_eq!(TestNode::MAX_KEYS, 5);
        assert_eq!(TestNode::MIN_KEYS, 2);
        assert_eq!(Node::<u8, u8, 32>::MAX_KEYS, 63);
    }

    #[test]
    fn ordered_insert_keeps_keys_ascending() {
        let node = leaf_of(&[4, 1, 3, 0, 2]);
        assert_eq!(node.keys.as_slice(), [0, 1, 2, 3, 4]);
        assert_eq!(node.values.as_slice(), [0, 10, 20, 30, 40]);
        assert!(node.is_leaf());
    }

    #[test]
    fn locate_reports_found_or_descend() {
        let node = leaf_of(&[10, 20, 30]);
        assert_eq!(node.locate(&20, &Natural), Search::Found(1));
        assert_eq!(node.locate(&5, &Natural), Search::Descend(0));
        assert_eq!(node.locate(&25, &Natural), Search::Descend(2));
        assert_eq!(node.locate(&35, &Natural), Search::Descend(3));
    }

    #[test]
    fn remove_shifts_entries_left() {
        let mut node = leaf_of(&[1, 2, 3]);
        assert_eq!(node.remove(1), (2, 20));
        assert_eq!(node.keys.as_slice(), [1, 3]);
        assert_eq!(node.values.as_slice(), [10, 30]);
    }

    #[test]
    fn split_requires_overflow() {
        let mut node = leaf_of(&[1, 2, 3, 4, 5]);
        assert!(node.split().is_none());
        assert_eq!(node.len(), 5);
    }

    #[test]
    fn split_leaf_moves_lower_half() {
        let mut node = leaf_of(&[0, 1, 2, 3, 4, 5]);
        let left = node.split().expect("node holds 2B entries");
        assert_eq!(left.keys.as_slice(), [0, 1, 2]);
        assert_eq!(node.keys.as_slice(), [3, 4, 5]);
        assert!(left.is_leaf());
    }

    #[test]
    fn split_internal_moves_lower_children() {
        let mut arena: Arena<TestNode> = Arena::new();
        let mut node = leaf_of(&[10, 20, 30, 40, 50, 60]);
        let children: Vec<Handle> = (0..7).map(|i| arena.alloc(leaf_of(&[i * 10 + 5]))).collect();
        for (index, &child) in children.iter().enumerate() {
            node.insert_child(child, index);
        }

        let mut left = node.split().expect("node holds 2B entries");
        assert_eq!(left.children(), &children[..3]);
        assert_eq!(node.children(), &children[3..]);

        assert_eq!(left.remove(2), (30, 300));
        assert_eq!(left.len() + 1, left.children().len());
        assert_eq!(node.len() + 1, node.children().len());
    }

    #[test]
    fn default_branching_stays_inline() {
        let mut node: Node<i32, i32, DEFAULT_BRANCHING> = Node::new();
        for key in 0..(2 * DEFAULT_BRANCHING) as i32 {
            node.ordered_insert(key, key, &Natural);
        }
        assert!(!node.keys.spilled());
        assert!(!node.values.spilled());

        let left = node.split().expect("node holds 2B entries");
        assert_eq!(left.len(), DEFAULT_BRANCHING);
        assert_eq!(node.len(), DEFAULT_BRANCHING);
    }

    #[test]
    fn wide_nodes_spill_to_heap() {
        const WIDE: usize = 16;
        let mut arena: Arena<Node<i32, i32, WIDE>> = Arena::new();
        let mut node: Node<i32, i32, WIDE> = Node::new();
        for key in (0..(2 * WIDE) as i32).rev() {
            node.ordered_insert(key, -key, &Natural);
        }
        for index in 0..=2 * WIDE {
            node.insert_child(arena.alloc(Node::new()), index);
        }
        assert!(node.keys.spilled());

        let left = node.split().expect("node holds 2B entries");
        assert_eq!(left.keys.as_slice(), (0..WIDE as i32).collect::<Vec<_>>().as_slice());
        assert_eq!(node.keys.as_slice(), (WIDE as i32..2 * WIDE as i32).collect::<Vec<_>>().as_slice());
        assert_eq!(left.children().len(), WIDE);
        assert_eq!(node.children().len(), WIDE + 1);
        assert_eq!(*node.value(0), -(WIDE as i32));
    }

    #[test]
    fn merge_pulls_down_separator() {
        let mut left = leaf_of(&[1, 2]);
        left.merge(3, 30, leaf_of(&[4, 5]));
        assert_eq!(left.keys.as_slice(), [1, 2, 3, 4, 5]);
        assert_eq!(left.values.as_slice(), [10, 20, 30, 40, 50]);
    }

    #[test]
    fn pop_and_push_carry_children() {
        let mut arena: Arena<TestNode> = Arena::new();
        let mut node = leaf_of(&[10, 20]);
        let a = arena.alloc(leaf_of(&[5]));
        let b = arena.alloc(leaf_of(&[15]));
        let c = arena.alloc(leaf_of(&[25]));
        node.insert_child(a, 0);
        node.insert_child(b, 1);
        node.insert_child(c, 2);

        assert_eq!(node.pop_first(), (10, 100, Some(a)));
        assert_eq!(node.pop_last(), (20, 200, Some(c)));
        assert_eq!(node.children(), &[b]);

        node.push_first(1, 10, Some(a));
        node.push_last(30, 300, Some(c));
        assert_eq!(node.keys.as_slice(), [1, 30]);
        assert_eq!(node.children(), &[a, b, c]);

        let mut leaf = leaf_of(&[1, 2]);
        assert_eq!(leaf.pop_first(), (1, 10, None));
        leaf.push_last(3, 30, None);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn traversals_visit_children_in_order() {
        let mut arena: Arena<TestNode> = Arena::new();
        let left = arena.alloc(leaf_of(&[1, 2]));
        let right = arena.alloc(leaf_of(&[4, 5, 6]));
        let root = TestNode::root(3, 30, left, right);

        let mut entries = Vec::new();
        root.in_order(&arena, &mut entries);
        let keys: Vec<i32> = entries.iter().map(|(k, _)| **k).collect();
        assert_eq!(keys, [1, 2, 3, 4, 5, 6]);

        let mut layers = Vec::new();
        root.bfs(&arena, 0, &mut layers);
        let layer_keys: Vec<Vec<Vec<i32>>> = layers
            .iter()
            .map(|layer| layer.iter().map(|node| node.iter().map(|(k, _)| **k).collect()).collect())
            .collect();
        assert_eq!(layer_keys, vec![vec![vec![3]], vec![vec![1, 2], vec![4, 5, 6]]]);
    }
}
