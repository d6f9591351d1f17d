use alloc::vec::Vec;

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Search};
use crate::btree_map::{Entry, Layer};
use crate::compare::Compare;

/// The core B-tree implementation backing `BTreeMap`.
#[derive(Clone)]
pub(crate) struct RawBTreeMap<K, V, const B: usize, C> {
    /// Arena owning every node; a node is referenced only by its parent.
    nodes: Arena<Node<K, V, B>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    compare: C,
}

/// One step of a root-to-leaf descent.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// The descent recorded by insert and erase. Popping it replays the recursion
/// bottom-up.
type Path = SmallVec<[PathElement; 16]>;

impl<K, V, const B: usize, C> RawBTreeMap<K, V, B, C> {
    pub(crate) const fn new(compare: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            compare,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.compare
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Number of node layers; every leaf sits on the last one.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = self.nodes.get(handle).children().first().copied();
        }
        height
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.nodes.get(self.root?);
        while let Some(&child) = node.children().first() {
            node = self.nodes.get(child);
        }
        Some((node.key(0), node.value(0)))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.nodes.get(self.root?);
        while let Some(&child) = node.children().last() {
            node = self.nodes.get(child);
        }
        let last = node.len() - 1;
        Some((node.key(last), node.value(last)))
    }

    /// Snapshot of every node, grouped by depth, left to right.
    pub(crate) fn breadth_first(&self) -> Vec<Layer<'_, K, V>> {
        let mut layers = Vec::new();
        if let Some(root) = self.root {
            self.nodes.get(root).bfs(&self.nodes, 0, &mut layers);
        }
        layers
    }

    /// Every entry in ascending key order.
    pub(crate) fn in_order(&self) -> Vec<Entry<'_, K, V>> {
        let mut entries = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            self.nodes.get(root).in_order(&self.nodes, &mut entries);
        }
        entries
    }
}

impl<K, V, const B: usize, C: Compare<K>> RawBTreeMap<K, V, B, C> {
    /// Searches for a key and returns the holding node and slot if found.
    pub(crate) fn search(&self, key: &K) -> Option<(Handle, usize)> {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            match node.locate(key, &self.compare) {
                Search::Found(index) => return Some((current, index)),
                Search::Descend(_) if node.is_leaf() => return None,
                Search::Descend(child_index) => current = node.child(child_index),
            }
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let (handle, index) = self.search(key)?;
        Some(self.nodes.get(handle).value(index))
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (handle, index) = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut(index))
    }

    /// Inserts a key-value pair if the key is absent.
    ///
    /// An existing key is left untouched and the rejected pair is handed back.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(key, value)));
            self.len = 1;
            return Ok(());
        };

        // Build path from root to leaf
        let mut path: Path = SmallVec::new();
        let mut current = root;

        loop {
            let node = self.nodes.get(current);
            match node.locate(&key, &self.compare) {
                Search::Found(_) => return Err((key, value)),
                Search::Descend(_) if node.is_leaf() => break,
                Search::Descend(child_index) => {
                    path.push(PathElement {
                        node: current,
                        child_index,
                    });
                    current = node.child(child_index);
                }
            }
        }

        self.nodes.get_mut(current).ordered_insert(key, value, &self.compare);
        self.len += 1;
        self.split_and_propagate(current, &mut path);
        Ok(())
    }

    /// Splits `current` while it overflows, promoting into each parent on the
    /// path in turn. A split of the root grows the tree by one layer.
    fn split_and_propagate(&mut self, mut current: Handle, path: &mut Path) {
        while let Some(mut left) = self.nodes.get_mut(current).split() {
            // The lower half's largest entry becomes the separator.
            let (key, value) = left.remove(B - 1);
            let leaf = left.is_leaf();
            let left = self.nodes.alloc(left);
            trace!(?left, right = ?current, leaf, "split overflowing node");

            let Some(PathElement { node: parent, child_index }) = path.pop() else {
                let root = self.nodes.alloc(Node::root(key, value, left, current));
                self.root = Some(root);
                trace!(?root, height = self.height(), "grew new root");
                return;
            };

            let parent_node = self.nodes.get_mut(parent);
            parent_node.ordered_insert(key, value, &self.compare);
            parent_node.insert_child(left, child_index);
            current = parent;
        }
    }

    /// Removes a key from the tree and returns its value.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root?;

        let mut path: Path = SmallVec::new();
        let mut current = root;

        let value = loop {
            let node = self.nodes.get(current);
            match node.locate(key, &self.compare) {
                Search::Found(index) if node.is_leaf() => break self.nodes.get_mut(current).remove(index).1,
                Search::Found(index) => break self.remove_internal(current, index, &mut path),
                Search::Descend(_) if node.is_leaf() => return None,
                Search::Descend(child_index) => {
                    path.push(PathElement {
                        node: current,
                        child_index,
                    });
                    current = node.child(child_index);
                }
            }
        };

        self.len -= 1;
        self.rebalance(&mut path);
        self.collapse_root();
        Some(value)
    }

    /// Removes the entry at `index` of internal node `found`, refilling the
    /// hole with its in-order successor: the smallest entry of the subtree at
    /// `child[index + 1]`. The descent to that successor's leaf is appended to
    /// `path` so the caller can repair underflow along it.
    fn remove_internal(&mut self, found: Handle, index: usize, path: &mut Path) -> V {
        path.push(PathElement {
            node: found,
            child_index: index + 1,
        });
        let mut current = self.nodes.get(found).child(index + 1);

        while let Some(&child) = self.nodes.get(current).children().first() {
            path.push(PathElement {
                node: current,
                child_index: 0,
            });
            current = child;
        }

        let (successor_key, successor_value) = self.nodes.get_mut(current).remove(0);
        let found_node = self.nodes.get_mut(found);
        let (_, value) = found_node.remove(index);
        found_node.ordered_insert(successor_key, successor_value, &self.compare);
        value
    }

    /// Walks the recorded path upward repairing underflow. Only a merge takes
    /// an entry from the parent, so the walk stops at the first level that
    /// did not merge.
    fn rebalance(&mut self, path: &mut Path) {
        while let Some(PathElement { node, child_index }) = path.pop() {
            if !self.fix_underflow(node, child_index) {
                return;
            }
        }
    }

    /// Restores minimum occupancy of `parent.child[index]`, trying in order:
    /// merge into the left sibling, merge the right sibling in, borrow from
    /// the right sibling, borrow from the left sibling.
    ///
    /// Returns `true` if a merge removed an entry from `parent`.
    fn fix_underflow(&mut self, parent: Handle, index: usize) -> bool {
        let parent_node = self.nodes.get(parent);
        let child = parent_node.child(index);
        if self.nodes.get(child).len() >= Node::<K, V, B>::MIN_KEYS {
            return false;
        }

        let left = index.checked_sub(1).map(|i| parent_node.child(i));
        let right = parent_node.children().get(index + 1).copied();
        let sibling_len = |sibling: Option<Handle>| sibling.map(|handle| self.nodes.get(handle).len());
        let lens = (sibling_len(left), sibling_len(right));

        // A sibling of at most B entries merges into at most 2B - 1.
        match lens {
            (Some(len), _) if len <= B => {
                self.merge(parent, index - 1);
                true
            }
            (_, Some(len)) if len <= B => {
                self.merge(parent, index);
                true
            }
            (_, Some(_)) => {
                self.borrow_from_right(parent, index);
                false
            }
            (Some(_), None) => {
                self.borrow_from_left(parent, index);
                false
            }
            (None, None) => false,
        }
    }

    /// Merges `child[separator + 1]` into `child[separator]`, pulling the
    /// separating entry down from `parent`. The right node is destroyed.
    fn merge(&mut self, parent: Handle, separator: usize) {
        let parent_node = self.nodes.get_mut(parent);
        let (key, value) = parent_node.remove(separator);
        let right = parent_node.remove_child(separator + 1);
        let left = parent_node.child(separator);

        let right_node = self.nodes.take(right);
        self.nodes.get_mut(left).merge(key, value, right_node);
        trace!(?left, ?right, separator, "merged siblings");
    }

    /// Rotates the right sibling's smallest entry up into `parent` and the old
    /// separator down onto the end of `child[index]`.
    fn borrow_from_right(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get(parent);
        let (child, right) = (parent_node.child(index), parent_node.child(index + 1));

        let (key, value, grandchild) = self.nodes.get_mut(right).pop_first();
        let (key, value) = self.nodes.get_mut(parent).replace(index, key, value);
        self.nodes.get_mut(child).push_last(key, value, grandchild);
        trace!(?child, ?right, "borrowed from right sibling");
    }

    /// Rotates the left sibling's largest entry up into `parent` and the old
    /// separator down onto the front of `child[index]`.
    fn borrow_from_left(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get(parent);
        let (left, child) = (parent_node.child(index - 1), parent_node.child(index));

        let (key, value, grandchild) = self.nodes.get_mut(left).pop_last();
        let (key, value) = self.nodes.get_mut(parent).replace(index - 1, key, value);
        self.nodes.get_mut(child).push_first(key, value, grandchild);
        trace!(?child, ?left, "borrowed from left sibling");
    }

    /// Drops an empty root. An internal root left without entries has exactly
    /// one child, which becomes the new root.
    fn collapse_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let node = self.nodes.get(root);
        if node.len() > 0 {
            return;
        }

        match node.children().first().copied() {
            Some(child) => {
                self.nodes.free(root);
                self.root = Some(child);
                trace!(new_root = ?child, "collapsed root");
            }
            None => self.clear(),
        }
    }
}
