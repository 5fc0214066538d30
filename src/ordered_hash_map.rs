//! OrderedHashMap: hash-indexed key/value storage with a deterministic
//! iteration order maintained by an order list.
//!
//! The index maps a key's hash to the slotmap key of its list node; the
//! order list owns every entry. Both structures are updated in the same
//! logical step on every structural mutation, so the set of entries
//! reachable from the index always equals the set threaded on the list.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::DefaultKey;

use crate::eviction::{Eldest, EvictionPolicy};
use crate::iter::{Cursor, Iter, Keys, Values};
use crate::order_list::OrderList;
use crate::probe_guard::ProbeGuard;

/// Construction parameters.
///
/// `initial_capacity` and `load_factor` together pre-size the map: roughly
/// `initial_capacity * load_factor` entries fit before the index grows. Both
/// are sizing hints only; the map grows without bound unless an eviction
/// policy says otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    pub initial_capacity: usize,
    pub load_factor: f32,
    /// `false`: iteration follows insertion order and reads leave the order
    /// untouched. `true`: every `get`/`get_mut` and every value replacement
    /// relinks the touched entry to the tail, so the head is always the
    /// least recently used entry.
    pub access_order: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            initial_capacity: 16,
            load_factor: 0.75,
            access_order: false,
        }
    }
}

impl MapConfig {
    pub fn with_initial_capacity(self, initial_capacity: usize) -> Self {
        MapConfig {
            initial_capacity,
            ..self
        }
    }

    pub fn with_load_factor(self, load_factor: f32) -> Self {
        MapConfig {
            load_factor,
            ..self
        }
    }

    pub fn with_access_order(self, access_order: bool) -> Self {
        MapConfig {
            access_order,
            ..self
        }
    }

    /// Entries that fit before the first index growth.
    ///
    /// # Panics
    ///
    /// Panics if the load factor is not a positive finite number.
    fn pre_size(&self) -> usize {
        assert!(
            self.load_factor > 0.0 && self.load_factor.is_finite(),
            "load factor must be a positive finite number"
        );
        (self.initial_capacity as f64 * self.load_factor as f64).ceil() as usize
    }
}

/// A hash map with deterministic iteration order and pluggable eviction.
///
/// Single-threaded by design: no internal locking, every operation completes
/// synchronously. Structural consistency during iteration is checked
/// dynamically only by [`Cursor`]; plain iterators are covered statically by
/// the borrow checker.
pub struct OrderedHashMap<K, V, S = RandomState> {
    hasher: S,
    pub(crate) index: HashTable<DefaultKey>,
    pub(crate) list: OrderList<K, V>,
    access_order: bool,
    /// Bumped on every structural change: new-key insert, removal (explicit,
    /// cursor-driven, or eviction), and clear. Never on reads or value
    /// replacement, even when access order relinks the entry.
    pub(crate) mod_count: u64,
    policy: EvictionPolicy<K, V>,
    probe: ProbeGuard,
}

impl<K, V> OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Unbounded map with insertion order and default configuration.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self::with_policy(config, EvictionPolicy::Never)
    }

    pub fn with_policy(config: MapConfig, policy: EvictionPolicy<K, V>) -> Self {
        Self::with_policy_and_hasher(config, policy, RandomState::default())
    }

    /// LRU cache holding at most `capacity` entries: access order plus a
    /// [`EvictionPolicy::MaxLen`] policy.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_policy(
            MapConfig::default()
                .with_initial_capacity(capacity)
                .with_access_order(true),
            EvictionPolicy::MaxLen(capacity),
        )
    }
}

impl<K, V, S> Default for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_policy_and_hasher(MapConfig::default(), EvictionPolicy::Never, S::default())
    }
}

impl<K, V, S> OrderedHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The ordering mode fixed at construction.
    pub fn access_order(&self) -> bool {
        self.access_order
    }

    /// Entries in current order, oldest first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.list)
    }

    /// Keys in current order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(&self.list)
    }

    /// Values in current order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.list)
    }

    /// Detached fail-fast iterator over the current order. See [`Cursor`].
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    /// The entry at the head of the order list: oldest-inserted, or least
    /// recently used in access order.
    pub fn eldest(&self) -> Option<(&K, &V)> {
        self.list.head().map(|node| {
            let data = self.list.data(node);
            (&data.key, &data.value)
        })
    }

    /// The entry at the tail of the order list: newest-inserted, or most
    /// recently used in access order.
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.list.tail().map(|node| {
            let data = self.list.data(node);
            (&data.key, &data.value)
        })
    }

    /// Removes and returns the eldest entry.
    pub fn remove_eldest(&mut self) -> Option<(K, V)> {
        let head = self.list.head()?;
        Some(self.remove_node(head))
    }

    /// Removes `node` from both the index and the order list. The two
    /// removals are one structural change: a single counter bump, no
    /// intermediate state observable by callers.
    pub(crate) fn remove_node(&mut self, node: DefaultKey) -> (K, V) {
        let hash = self.list.hash(node);
        self.index
            .find_entry(hash, |&n| n == node)
            .ok()
            .expect("index and order list must stay in sync")
            .remove();
        let data = self.list.remove(node);
        self.mod_count += 1;
        (data.key, data.value)
    }

    /// Drops every entry and restores the empty sentinel cycle. One
    /// structural change regardless of how many entries were held.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.mod_count += 1;
    }

    /// Consumes the map, keeping only the order list for owned iteration.
    pub(crate) fn into_list(self) -> OrderList<K, V> {
        self.list
    }

    /// Linear scan in list order. Walking the list visits only live entries
    /// sequentially instead of probing the index's sparse buckets.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, S> OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_policy_and_hasher(
        config: MapConfig,
        policy: EvictionPolicy<K, V>,
        hasher: S,
    ) -> Self {
        let pre_size = config.pre_size();
        OrderedHashMap {
            hasher,
            index: HashTable::with_capacity(pre_size),
            list: OrderList::with_capacity(pre_size),
            access_order: config.access_order,
            mod_count: 0,
            policy,
            probe: ProbeGuard::new(),
        }
    }

    pub fn with_hasher(hasher: S) -> Self {
        Self::with_policy_and_hasher(MapConfig::default(), EvictionPolicy::Never, hasher)
    }

    fn find_node<Q>(&self, key: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _scope = self.probe.scope();
        let hash = self.hasher.hash_one(key);
        self.index
            .find(hash, |&n| self.list.data(n).key.borrow() == key)
            .copied()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_node(key).is_some()
    }

    /// Looks up `key`; in access order the hit is relinked to the tail.
    ///
    /// The relink is a structural touch for ordering purposes only: it does
    /// not bump the modification counter, so a [`Cursor`] cannot tell reads
    /// apart from no activity at all. Writes remain visible to it.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find_node(key)?;
        if self.access_order {
            self.list.move_to_back(node);
        }
        Some(&self.list.data(node).value)
    }

    /// Like [`get`](Self::get), with mutable access to the value.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find_node(key)?;
        if self.access_order {
            self.list.move_to_back(node);
        }
        Some(&mut self.list.data_mut(node).value)
    }

    /// Looks up `key` without recording an access, in either mode.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find_node(key)?;
        Some(&self.list.data(node).value)
    }

    /// Mutable [`peek`](Self::peek).
    pub fn peek_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find_node(key)?;
        Some(&mut self.list.data_mut(node).value)
    }

    /// Inserts or replaces, returning the previous value if the key existed.
    ///
    /// Replacement keeps the entry's position (insertion order) or relinks
    /// it to the tail (access order); no new entry is created and the
    /// eviction policy does not run. A new key is appended at the tail,
    /// counted as a structural change, and then offered to the eviction
    /// policy together with the current eldest entry.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hasher.hash_one(&key);
        let scope = self.probe.scope();
        let replaced = match self.index.entry(
            hash,
            |&n| self.list.data(n).key == key,
            |&n| self.list.hash(n),
        ) {
            TableEntry::Occupied(occupied) => {
                let node = *occupied.get();
                let old = mem::replace(&mut self.list.data_mut(node).value, value);
                if self.access_order {
                    self.list.move_to_back(node);
                }
                Some(old)
            }
            TableEntry::Vacant(vacant) => {
                let node = self.list.push_back(hash, key, value);
                vacant.insert(node);
                None
            }
        };
        drop(scope);
        if replaced.is_none() {
            self.mod_count += 1;
            self.evict_if_instructed();
        }
        replaced
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the owned entry.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find_node(key)?;
        Some(self.remove_node(node))
    }

    /// Runs once per new-key insertion, after the entry is fully linked.
    /// The policy sees a consistent map; an eviction removes the eldest
    /// entry from both structures before `put` returns.
    fn evict_if_instructed(&mut self) {
        let Some(head) = self.list.head() else { return };
        let len = self.list.len();
        let data = self.list.data(head);
        let evict = self.policy.should_evict(Eldest {
            key: &data.key,
            value: &data.value,
            len,
        });
        if evict {
            let _ = self.remove_node(head);
        }
    }
}

impl<K, V, S> fmt::Debug for OrderedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            let _ = self.put(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map =
            Self::with_policy_and_hasher(MapConfig::default(), EvictionPolicy::Never, S::default());
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    fn keys_in_order<S: BuildHasher>(map: &OrderedHashMap<&'static str, i32, S>) -> Vec<&'static str> {
        map.keys().copied().collect()
    }

    /// Invariant: `put` then `get` round-trips, and a fresh map is empty.
    #[test]
    fn put_get_round_trip() {
        let mut map = OrderedHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.put("a", 1), None);
        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
    }

    /// Invariant: replacing a value returns the old one, keeps size, and in
    /// insertion order keeps the entry's position.
    #[test]
    fn replacement_keeps_position_in_insertion_order() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.put("a", 10), Some(1));
        assert_eq!(map.len(), 2);
        assert_eq!(keys_in_order(&map), ["a", "b"]);
        assert_eq!(map.get(&"a"), Some(&10));
    }

    /// Invariant: in access order, `get` and replacement relink the touched
    /// entry to the tail; `peek` and `contains_key` never do.
    #[test]
    fn access_order_relinks_on_touch() {
        let mut map =
            OrderedHashMap::with_config(MapConfig::default().with_access_order(true));
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);

        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(keys_in_order(&map), ["b", "c", "a"]);

        map.put("b", 20); // replacement counts as an access
        assert_eq!(keys_in_order(&map), ["c", "a", "b"]);

        assert_eq!(map.peek(&"c"), Some(&3));
        assert!(map.contains_key(&"c"));
        assert_eq!(keys_in_order(&map), ["c", "a", "b"]);
    }

    /// Invariant: in insertion order mode, reads never reorder.
    #[test]
    fn insertion_order_ignores_reads() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(map.get_mut(&"a"), Some(&mut 1));
        assert_eq!(keys_in_order(&map), ["a", "b"]);
    }

    /// Invariant: `remove` returns the value, drops the entry from both the
    /// index and the order, and is a no-op `None` for absent keys.
    #[test]
    fn remove_updates_both_structures() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);

        assert_eq!(map.remove(&"b"), Some(2));
        assert_eq!(map.remove(&"b"), None);
        assert!(!map.contains_key(&"b"));
        assert_eq!(keys_in_order(&map), ["a", "c"]);
        assert_eq!(map.len(), 2);

        assert_eq!(map.remove_entry(&"a"), Some(("a", 1)));
        assert_eq!(keys_in_order(&map), ["c"]);
    }

    /// Invariant: `clear` empties the map and iteration yields nothing.
    #[test]
    fn clear_empties_map() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.eldest(), None);
        assert_eq!(map.newest(), None);

        map.put("c", 3);
        assert_eq!(keys_in_order(&map), ["c"]);
    }

    /// Invariant: eldest/newest track the list head and tail through
    /// insertions, touches, and removals.
    #[test]
    fn eldest_and_newest_track_order() {
        let mut map =
            OrderedHashMap::with_config(MapConfig::default().with_access_order(true));
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.eldest(), Some((&"a", &1)));
        assert_eq!(map.newest(), Some((&"b", &2)));

        map.get(&"a");
        assert_eq!(map.eldest(), Some((&"b", &2)));
        assert_eq!(map.newest(), Some((&"a", &1)));

        assert_eq!(map.remove_eldest(), Some(("b", 2)));
        assert_eq!(map.eldest(), Some((&"a", &1)));
    }

    /// Invariant: `contains_value` scans list order and respects `PartialEq`
    /// on values.
    #[test]
    fn contains_value_scans_in_order() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        assert!(map.contains_value(&1));
        assert!(map.contains_value(&2));
        assert!(!map.contains_value(&3));
        map.remove(&"a");
        assert!(!map.contains_value(&1));
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`),
    /// including the empty string as a key.
    #[test]
    fn borrowed_lookup_and_empty_string_key() {
        let mut map: OrderedHashMap<String, i32> = OrderedHashMap::new();
        map.put("hello".to_string(), 1);
        map.put(String::new(), 2);

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.get(""), Some(&2));
        assert!(map.contains_key("hello"));
        assert_eq!(map.remove(""), Some(2));
        assert!(!map.contains_key(""));
    }

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0 // force every key into the same bucket
        }
    }

    /// Invariant: order and lookups survive worst-case hash collisions;
    /// equality probing resolves the correct entry.
    #[test]
    fn collisions_preserve_order_and_lookup() {
        let mut map: OrderedHashMap<&str, i32, ConstBuildHasher> =
            OrderedHashMap::with_hasher(ConstBuildHasher);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);

        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(keys_in_order(&map), ["a", "b", "c"]);
        assert_eq!(map.remove(&"a"), Some(1));
        assert_eq!(keys_in_order(&map), ["b", "c"]);
        assert_eq!(map.get(&"c"), Some(&3));
    }

    /// Invariant: the modification counter moves only on structural changes.
    /// Reads and value replacement leave it alone, even when access order
    /// relinks the entry.
    #[test]
    fn mod_count_tracks_structural_changes_only() {
        let mut map =
            OrderedHashMap::with_config(MapConfig::default().with_access_order(true));
        let initial = map.mod_count;
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.mod_count, initial + 2);

        map.get(&"a"); // relinks, not structural
        map.put("a", 10); // replacement, not structural
        assert_eq!(map.mod_count, initial + 2);

        map.remove(&"b");
        assert_eq!(map.mod_count, initial + 3);
        map.clear();
        assert_eq!(map.mod_count, initial + 4);
    }

    /// Invariant: `FromIterator`/`Extend` apply put semantics; later
    /// duplicates replace values without changing first-insertion order.
    #[test]
    fn from_iterator_and_extend() {
        let mut map: OrderedHashMap<&str, i32> =
            [("a", 1), ("b", 2), ("a", 10)].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(keys_in_order(&map), ["a", "b"]);
        assert_eq!(map.peek(&"a"), Some(&10));

        map.extend([("c", 3)]);
        assert_eq!(keys_in_order(&map), ["a", "b", "c"]);
    }

    /// Invariant: `Debug` renders entries in list order.
    #[test]
    fn debug_renders_in_order() {
        let mut map = OrderedHashMap::new();
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(format!("{map:?}"), r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    #[should_panic(expected = "load factor must be a positive finite number")]
    fn invalid_load_factor_panics() {
        let _map: OrderedHashMap<&str, i32> =
            OrderedHashMap::with_config(MapConfig::default().with_load_factor(0.0));
    }

    /// Invariant (debug-only): re-entering the map from user `Eq` code
    /// during a probe panics instead of observing a mid-update structure.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_from_eq_during_probe_panics() {
        struct ReentryKey {
            id: &'static str,
            map: *const OrderedHashMap<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Attempt to re-enter the same map during probing.
                    unsafe {
                        let m = &*other.map;
                        let _ = m.contains_key(self.id);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
        impl Borrow<str> for ReentryKey {
            fn borrow(&self) -> &str {
                self.id
            }
        }

        let mut map: OrderedHashMap<ReentryKey, i32, ConstBuildHasher> =
            OrderedHashMap::with_hasher(ConstBuildHasher);
        let stored = ReentryKey {
            id: "a",
            map: core::ptr::null(),
            trigger: false,
        };
        map.put(stored, 1);

        let query = ReentryKey {
            id: "b",
            map: &map as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = map.peek(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
