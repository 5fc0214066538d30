//! ordered-hashmap: a single-threaded hash map that maintains a
//! deterministic iteration order (insertion order or access order) and
//! supports pluggable eviction for bounded caches.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: combine O(1) average hashed lookup with an explicit, observable
//!   entry order, in safe, verifiable layers.
//! - Layers:
//!   - OrderList<K, V>: arena-backed circular doubly-linked list with a
//!     sentinel node; owns every entry and threads them in traversal order.
//!   - OrderedHashMap<K, V, S>: public API; a hashbrown index from key hash
//!     to list node composed with the OrderList, plus the eviction hook and
//!     the modification counter.
//!   - Cursor: detached fail-fast traversal with mid-iteration removal.
//!
//! Constraints
//! - Single-threaded: no internal locking; one logical owner at a time.
//!   Concurrent misuse during traversal is caught best-effort by the
//!   Cursor's modification-counter check, not prevented.
//! - All list linkage is slotmap keys, never owning pointers: the sentinel
//!   "points at itself" by storing its own key, so the cyclic list involves
//!   no ownership cycles and no unsafe code.
//! - O(1) average get/put/remove; O(1) worst-case relink and unlink;
//!   iteration is O(len), independent of index capacity.
//!
//! Ordering semantics
//! - Insertion order (default): entries iterate oldest-inserted first;
//!   replacing a value never moves an entry.
//! - Access order: `get`/`get_mut` and value replacement relink the touched
//!   entry to the tail, so the head is always the least recently used
//!   entry. `peek`/`contains_key` never reorder.
//!
//! Eviction
//! - An `EvictionPolicy` runs inside `put` after each new-key insertion,
//!   exactly once, with a read-only view of the current eldest entry.
//!   `MaxLen` turns the map into an LRU cache (access order) or FIFO cache
//!   (insertion order); the default `Never` keeps the map unbounded.
//!
//! Fail-fast
//! - A monotone modification counter is bumped by every structural change:
//!   new-key insert, removal, clear, eviction. Reads are deliberately
//!   invisible to it even when access order relinks an entry, so read-heavy
//!   traversal keeps working while writes behind a cursor's back surface as
//!   `IterError::ConcurrentModification`.
//!
//! Hasher and rehashing invariants
//! - Each entry caches its `u64` hash; the index only ever re-buckets using
//!   the cached hash, so `K: Hash` is never invoked after insertion and
//!   index growth cannot call into user code or disturb list linkage.
//!
//! Notes and non-goals
//! - No internal synchronization and no concurrent variants; callers that
//!   share a map must wrap it in their own lock.
//! - No comparator-based (sorted) ordering; that is a different structure.
//! - Keys are immutable post-insert; there is no `key_mut`.
//! - Public surface is `OrderedHashMap` plus its configuration, policy,
//!   error, and iterator types; lower layers are implementation details.

mod eviction;
mod iter;
mod order_list;
mod ordered_hash_map;
mod ordered_map_proptest;
mod probe_guard;

// Public surface
pub use eviction::{Eldest, EvictionPolicy};
pub use iter::{Cursor, IntoIter, Iter, IterError, Keys, Values};
pub use ordered_hash_map::{MapConfig, OrderedHashMap};
