//! Order-respecting iterators and the detached fail-fast cursor.
//!
//! Borrowing iterators ([`Iter`], [`Keys`], [`Values`]) hold a shared borrow
//! of the map, so the borrow checker already rules out structural mutation
//! while they are alive; they need no runtime checks. [`Cursor`] keeps its
//! state outside the map and is handed the map on every operation, which
//! permits interleaved mutation — so it carries the modification-counter
//! check and supports removal mid-traversal.

use core::fmt;
use core::hash::{BuildHasher, Hash};

use slotmap::DefaultKey;

use crate::order_list::OrderList;
use crate::ordered_hash_map::OrderedHashMap;

/// Cursor misuse errors. Absent keys and exhaustion are not errors; they
/// surface as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterError {
    /// The map was structurally modified (new key, removal, clear, or
    /// eviction) after the cursor captured its counter. Best-effort
    /// detection of same-owner misuse, not a guarantee under races.
    ConcurrentModification,
    /// `Cursor::remove` was called before any entry was yielded, or twice
    /// without an intervening `Cursor::next`.
    NoLastEntry,
}

impl fmt::Display for IterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterError::ConcurrentModification => {
                f.write_str("map structurally modified during cursor traversal")
            }
            IterError::NoLastEntry => {
                f.write_str("cursor has no last-yielded entry to remove")
            }
        }
    }
}

impl std::error::Error for IterError {}

/// Iterator over entries in list order.
pub struct Iter<'a, K, V> {
    list: &'a OrderList<K, V>,
    forward: DefaultKey,
    back: DefaultKey,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(list: &'a OrderList<K, V>) -> Self {
        Iter {
            list,
            forward: list.next(list.sentinel()),
            back: list.prev(list.sentinel()),
            remaining: list.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            forward: self.forward,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.forward;
        self.forward = self.list.next(node);
        self.remaining -= 1;
        let data = self.list.data(node);
        Some((&data.key, &data.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back;
        self.back = self.list.prev(node);
        self.remaining -= 1;
        let data = self.list.data(node);
        Some((&data.key, &data.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys in list order.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(list: &'a OrderList<K, V>) -> Self {
        Keys {
            iter: Iter::new(list),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> core::iter::FusedIterator for Keys<'_, K, V> {}

/// Iterator over values in list order.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(list: &'a OrderList<K, V>) -> Self {
        Values {
            iter: Iter::new(list),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> core::iter::FusedIterator for Values<'_, K, V> {}

/// Owning iterator, consuming entries in list order.
pub struct IntoIter<K, V> {
    list: OrderList<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.list.head()?;
        let data = self.list.remove(head);
        Some((data.key, data.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tail = self.list.tail()?;
        let data = self.list.remove(tail);
        Some((data.key, data.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> core::iter::FusedIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for OrderedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            list: self.into_list(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Detached fail-fast iterator.
///
/// The cursor holds no borrow of the map; each operation takes the map that
/// created it. At creation it captures the map's modification counter, and
/// every operation re-validates it first: any structural change made behind
/// the cursor's back (new key, removal, clear, eviction) surfaces as
/// [`IterError::ConcurrentModification`] instead of silently continuing.
///
/// Access-order relinks caused by reads do not bump the counter, so a
/// cursor cannot detect them; such a traversal may visit a relinked entry
/// again or skip it. Removing through [`Cursor::remove`] is the one
/// sanctioned mid-traversal mutation: it resynchronizes the captured
/// counter so traversal continues.
///
/// A cursor must only be used with the map it was created from; passing a
/// different map is detected on a best-effort basis only.
#[derive(Debug, Clone)]
pub struct Cursor {
    next: DefaultKey,
    last: Option<DefaultKey>,
    expected_mod_count: u64,
}

impl Cursor {
    pub(crate) fn new<K, V, S>(map: &OrderedHashMap<K, V, S>) -> Self {
        Cursor {
            next: map.list.next(map.list.sentinel()),
            last: None,
            expected_mod_count: map.mod_count,
        }
    }

    /// Yields the next entry in order, or `Ok(None)` once the traversal
    /// reaches the sentinel. A fresh cursor is needed to re-scan.
    pub fn next<'m, K, V, S>(
        &mut self,
        map: &'m OrderedHashMap<K, V, S>,
    ) -> Result<Option<(&'m K, &'m V)>, IterError> {
        if self.expected_mod_count != map.mod_count {
            return Err(IterError::ConcurrentModification);
        }
        if self.next == map.list.sentinel() {
            return Ok(None);
        }
        if !map.list.contains(self.next) {
            // Counter matched but the node is gone: cursor used with a map
            // it does not belong to.
            return Err(IterError::ConcurrentModification);
        }
        let node = self.next;
        self.next = map.list.next(node);
        self.last = Some(node);
        let data = map.list.data(node);
        Ok(Some((&data.key, &data.value)))
    }

    /// Removes the last entry yielded by [`Cursor::next`] from the map and
    /// returns it, then resynchronizes the captured counter so traversal
    /// can continue.
    pub fn remove<K, V, S>(
        &mut self,
        map: &mut OrderedHashMap<K, V, S>,
    ) -> Result<(K, V), IterError>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        let node = self.last.ok_or(IterError::NoLastEntry)?;
        if self.expected_mod_count != map.mod_count {
            return Err(IterError::ConcurrentModification);
        }
        let removed = map.remove_node(node);
        self.last = None;
        self.expected_mod_count = map.mod_count;
        Ok(removed)
    }
}
