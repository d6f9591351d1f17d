use alloc::vec::Vec;
use core::fmt;

use crate::compare::{Compare, Natural};
use crate::error::DuplicateKey;
use crate::raw::RawBTreeMap;

/// The branching parameter used when none is given: nodes hold 5 to 11
/// entries.
pub const DEFAULT_BRANCHING: usize = 6;

/// A borrowed key-value pair, as produced by the traversals.
pub type Entry<'a, K, V> = (&'a K, &'a V);

/// The entries of one node, in key order.
pub type NodeSnapshot<'a, K, V> = Vec<Entry<'a, K, V>>;

/// Every node at one depth of the tree, left to right.
pub type Layer<'a, K, V> = Vec<NodeSnapshot<'a, K, V>>;

/// An ordered map based on a [B-Tree].
///
/// Every node other than the root holds between `B - 1` and `2B - 1`
/// entries, all leaves sit at the same depth, and keys are kept in the order
/// defined by the comparator `C` (by default the key type's [`Ord`]). Lookup,
/// insertion and erasure visit one node per layer, so they take
/// O(B log<sub>B</sub> n) comparisons in the worst case.
///
/// `B` must be at least 2; smaller values are rejected at compile time.
///
/// Keys are unique. [`insert`](Self::insert) never overwrites: inserting a key
/// that is already present is refused and leaves the map unchanged.
///
/// The map performs unsynchronized in-place mutation and is not meant to be
/// shared between writers; wrap it in a lock if several threads must mutate
/// it.
///
/// # Examples
///
/// ```
/// use ods_btree::BTreeMap;
///
/// let mut movie_reviews: BTreeMap<&str, &str, 2> = BTreeMap::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space",       "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction",       "Masterpiece.");
/// movie_reviews.insert("The Godfather",      "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// assert_eq!(movie_reviews.find(&"Les Miserables"), None);
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// assert_eq!(movie_reviews.erase(&"The Blues Brothers"), Some("Eye lyked it a lot."));
///
/// // look up the values associated with some keys.
/// assert_eq!(movie_reviews.find(&"Office Space"), Some(&"Deals with real issues in the workplace."));
/// assert_eq!(movie_reviews.find(&"Up!"), None);
/// ```
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
#[derive(Clone)]
pub struct BTreeMap<K, V, const B: usize = DEFAULT_BRANCHING, C = Natural> {
    raw: RawBTreeMap<K, V, B, C>,
}

impl<K, V, const B: usize> BTreeMap<K, V, B, Natural> {
    /// Makes a new, empty `BTreeMap` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<i32, &str, 3> = BTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, const B: usize, C> BTreeMap<K, V, B, C> {
    const VALID_BRANCHING: () = assert!(B >= 2, "BTreeMap requires a branching parameter B >= 2");

    /// Makes a new, empty `BTreeMap` ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<&str, usize, 2, _> =
    ///     BTreeMap::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b)));
    /// map.insert("ccc", 3);
    /// map.insert("a", 1);
    /// map.insert("bb", 2);
    /// assert_eq!(map.first_key_value(), Some((&"a", &1)));
    /// ```
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        let () = Self::VALID_BRANCHING;
        BTreeMap {
            raw: RawBTreeMap::new(compare),
        }
    }

    /// The comparator this map orders its keys with.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of node layers: 0 when empty, 1 while everything
    /// fits in the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<u32, (), 2> = BTreeMap::new();
    /// assert_eq!(map.height(), 0);
    /// for key in 0..3 {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.height(), 1);
    /// map.insert(3, ());
    /// assert_eq!(map.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Returns the tree's structure: one [`Layer`] per depth, root first, each
    /// listing its nodes left to right. An empty map has no layers.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let map: BTreeMap<i32, (), 2> = (0..4).map(|k| (k, ())).collect();
    /// let keys: Vec<Vec<Vec<i32>>> = map
    ///     .traverse_breadth_first()
    ///     .iter()
    ///     .map(|layer| layer.iter().map(|node| node.iter().map(|(k, _)| **k).collect()).collect())
    ///     .collect();
    /// assert_eq!(keys, vec![vec![vec![1]], vec![vec![0], vec![2, 3]]]);
    /// ```
    #[must_use]
    pub fn traverse_breadth_first(&self) -> Vec<Layer<'_, K, V>> {
        self.raw.breadth_first()
    }

    /// Returns every entry in ascending key order.
    #[must_use]
    pub fn traverse_in_order(&self) -> Vec<Entry<'_, K, V>> {
        self.raw.in_order()
    }
}

impl<K, V, const B: usize, C: Compare<K>> BTreeMap<K, V, B, C> {
    /// Inserts a key-value pair if the key is not present yet.
    ///
    /// Returns `false`, and leaves the map untouched, if the key is already
    /// present. Use [`try_insert`](Self::try_insert) to get the rejected pair
    /// back.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<i32, &str> = BTreeMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.find(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value).is_ok()
    }

    /// Inserts a key-value pair if the key is not present yet, handing the
    /// pair back inside the error otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] if the map already contains `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<i32, String> = BTreeMap::new();
    /// map.try_insert(1, "first".to_string()).unwrap();
    ///
    /// let err = map.try_insert(1, "second".to_string()).unwrap_err();
    /// assert_eq!(err.into_inner(), (1, "second".to_string()));
    /// assert_eq!(map.find(&1).map(String::as_str), Some("first"));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), DuplicateKey<K, V>> {
        self.raw.insert(key, value).map_err(|(key, value)| DuplicateKey::new(key, value))
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<i32, &str> = BTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.erase(&1), Some("a"));
    /// assert_eq!(map.erase(&1), None);
    /// ```
    pub fn erase(&mut self, key: &K) -> Option<V> {
        self.raw.remove(key)
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&V> {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let mut map: BTreeMap<i32, i32> = BTreeMap::new();
    /// map.insert(1, 10);
    /// if let Some(value) = map.find_mut(&1) {
    ///     *value += 1;
    /// }
    /// assert_eq!(map.find(&1), Some(&11));
    /// ```
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(key).is_some()
    }
}

impl<K, V, const B: usize, C: Default> Default for BTreeMap<K, V, B, C> {
    /// Creates an empty `BTreeMap`.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const B: usize, C> fmt::Debug for BTreeMap<K, V, B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.traverse_in_order()).finish()
    }
}

/// Entries whose key is already present are skipped; the first occurrence wins.
impl<K, V, const B: usize, C: Compare<K>> Extend<(K, V)> for BTreeMap<K, V, B, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, const B: usize, C: Compare<K> + Default> FromIterator<(K, V)> for BTreeMap<K, V, B, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const B: usize, const N: usize> From<[(K, V); N]> for BTreeMap<K, V, B> {
    /// Converts a `[(K, V); N]` into a `BTreeMap`.
    ///
    /// ```
    /// use ods_btree::BTreeMap;
    ///
    /// let map1: BTreeMap<i32, i32> = BTreeMap::from([(1, 2), (3, 4)]);
    /// let map2: BTreeMap<i32, i32> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1.traverse_in_order(), map2.traverse_in_order());
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::{String, ToString};

    #[test]
    fn debug_lists_entries_in_key_order() {
        let map: BTreeMap<i32, &str, 2> = BTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
    }

    #[test]
    fn extend_keeps_first_occurrence() {
        let mut map: BTreeMap<i32, &str, 2> = BTreeMap::new();
        map.extend([(1, "first"), (2, "two"), (1, "second")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.find(&1), Some(&"first"));
    }

    #[test]
    fn duplicate_key_error_reports_and_returns_pair() {
        let mut map: BTreeMap<String, u8> = BTreeMap::new();
        assert!(map.try_insert("k".to_string(), 1).is_ok());

        let err = map.try_insert("k".to_string(), 2).unwrap_err();
        assert_eq!(err.key(), "k");
        assert_eq!(*err.value(), 2);
        assert_eq!(err.to_string(), "key already present in BTreeMap");
        assert_eq!(format!("{err:?}"), "DuplicateKey { .. }");
        assert_eq!(map.find(&"k".to_string()), Some(&1));
    }

    #[test]
    fn clone_is_independent() {
        let mut original: BTreeMap<i32, i32, 2> = (0..20).map(|k| (k, k)).collect();
        let copy = original.clone();
        assert_eq!(original.erase(&5), Some(5));
        assert_eq!(copy.find(&5), Some(&5));
        assert_eq!(copy.len(), 20);
        assert_eq!(original.len(), 19);
    }
}
