//! Bidirectional many-to-many map.
//!
//! Both directions keep first-insertion order, so iterating either side is
//! deterministic for a given traversal.

use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;

/// Many-to-many relation queryable from either side.
#[derive(Debug, Clone)]
pub struct BiMultiMap<K, V> {
    forward: IndexMap<K, IndexSet<V>>,
    reverse: IndexMap<V, IndexSet<K>>,
}

impl<K, V> Default for BiMultiMap<K, V> {
    fn default() -> Self {
        Self {
            forward: IndexMap::new(),
            reverse: IndexMap::new(),
        }
    }
}

impl<K, V> BiMultiMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` relates to `value`. Returns `false` if already known.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let added = self
            .forward
            .entry(key.clone())
            .or_default()
            .insert(value.clone());
        if added {
            self.reverse.entry(value).or_default().insert(key);
        }
        added
    }

    /// Whether the exact pair is present.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.forward.get(key).is_some_and(|set| set.contains(value))
    }

    /// Whether `key` has at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    /// Whether `value` has at least one key.
    pub fn contains_value(&self, value: &V) -> bool {
        self.reverse.contains_key(value)
    }

    /// Values related to `key`, in insertion order.
    pub fn values_of<'a>(&'a self, key: &K) -> impl Iterator<Item = &'a V> + 'a {
        self.forward.get(key).into_iter().flatten()
    }

    /// Keys related to `value`, in insertion order.
    pub fn keys_of<'a>(&'a self, value: &V) -> impl Iterator<Item = &'a K> + 'a {
        self.reverse.get(value).into_iter().flatten()
    }

    /// Number of keys related to `value`.
    pub fn key_count(&self, value: &V) -> usize {
        self.reverse.get(value).map_or(0, IndexSet::len)
    }

    /// Number of values related to `key`.
    pub fn value_count(&self, key: &K) -> usize {
        self.forward.get(key).map_or(0, IndexSet::len)
    }

    /// Every distinct value with its keys, in first-insertion order.
    pub fn iter_values(&self) -> impl Iterator<Item = (&V, &IndexSet<K>)> {
        self.reverse.iter()
    }

    /// Number of distinct keys.
    pub fn len_keys(&self) -> usize {
        self.forward.len()
    }

    /// Number of distinct values.
    pub fn len_values(&self) -> usize {
        self.reverse.len()
    }

    /// Whether the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
