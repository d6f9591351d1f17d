use core::cmp::Ordering;

/// A strict total order over keys of type `K`.
///
/// The order a [`BTreeMap`](crate::BTreeMap) keeps its entries in is fixed at
/// construction by its comparator. It is a logic error for a comparator to be
/// inconsistent (for example, to report `a < b` and `b < a`), or for it to
/// change its answers while keys are stored in a map. The behavior resulting
/// from such a logic error is not specified, but will not result in undefined
/// behavior.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use ods_btree::{BTreeMap, Compare};
///
/// struct Reverse;
///
/// impl Compare<i32> for Reverse {
///     fn compare(&self, lhs: &i32, rhs: &i32) -> Ordering {
///         rhs.cmp(lhs)
///     }
/// }
///
/// let mut map: BTreeMap<i32, &str, 2, Reverse> = BTreeMap::with_comparator(Reverse);
/// map.insert(1, "one");
/// map.insert(3, "three");
/// map.insert(2, "two");
///
/// let keys: Vec<i32> = map.traverse_in_order().into_iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, [3, 2, 1]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Compares `lhs` to `rhs`.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// The default comparator: the key type's own [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: ?Sized + Ord> Compare<K> for Natural {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn natural_follows_ord() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Natural.compare("b", "a"), Ordering::Greater);
        assert_eq!(Natural.compare(&7u8, &7u8), Ordering::Equal);
    }

    #[test]
    fn closures_are_comparators() {
        let by_len = |lhs: &&str, rhs: &&str| lhs.len().cmp(&rhs.len());
        assert_eq!(by_len.compare(&"aaa", &"b"), Ordering::Greater);
        assert_eq!(by_len.compare(&"aa", &"bb"), Ordering::Equal);
    }
}
