//! Eviction policy invoked after each new-key insertion.

use core::fmt;

/// Read-only view of the eldest entry, handed to the eviction policy right
/// after a new key was fully inserted. The eldest entry is the head of the
/// order list: oldest-inserted in insertion order, least-recently-used in
/// access order.
#[derive(Debug)]
pub struct Eldest<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
    /// Map size including the entry that triggered the decision.
    pub len: usize,
}

/// Decides whether the eldest entry is dropped after an insertion.
///
/// The policy runs synchronously inside `put`, exactly once per insertion of
/// a new key and never on value-only replacement. Returning `true` removes
/// the eldest entry from the map before `put` returns.
pub enum EvictionPolicy<K, V> {
    /// Never evict; the map is unbounded. This is the default.
    Never,
    /// Evict whenever the map holds more than this many entries. Combined
    /// with access order this is a classic LRU cache; with insertion order
    /// it is a FIFO cache.
    MaxLen(usize),
    /// Arbitrary predicate over the eldest entry.
    Custom(Box<dyn FnMut(Eldest<'_, K, V>) -> bool>),
}

impl<K, V> EvictionPolicy<K, V> {
    pub(crate) fn should_evict(&mut self, eldest: Eldest<'_, K, V>) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::MaxLen(capacity) => eldest.len > *capacity,
            EvictionPolicy::Custom(decide) => decide(eldest),
        }
    }
}

impl<K, V> Default for EvictionPolicy<K, V> {
    fn default() -> Self {
        EvictionPolicy::Never
    }
}

impl<K, V> fmt::Debug for EvictionPolicy<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Never => f.write_str("Never"),
            EvictionPolicy::MaxLen(capacity) => f.debug_tuple("MaxLen").field(capacity).finish(),
            EvictionPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
