use core::fmt;

/// The error returned by [`BTreeMap::try_insert`](crate::BTreeMap::try_insert)
/// when the key is already present.
///
/// The map is left untouched; the rejected key and value are handed back.
#[derive(thiserror::Error)]
#[error("key already present in BTreeMap")]
pub struct DuplicateKey<K, V> {
    key: K,
    value: V,
}

impl<K, V> DuplicateKey<K, V> {
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// The key that was rejected.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The value that was not inserted.
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Recovers the rejected key and value.
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }
}

// Keys and values need not be `Debug`; use `key()` to inspect the rejected key.
impl<K, V> fmt::Debug for DuplicateKey<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateKey").finish_non_exhaustive()
    }
}
