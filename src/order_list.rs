//! OrderList: arena-backed circular doubly-linked list with a sentinel node.
//!
//! All linkage is expressed as slotmap keys rather than owning pointers, so
//! the cyclic structure (the sentinel points at itself when the list is
//! empty) involves no ownership cycles. The slotmap owns every node,
//! including the sentinel; links are plain data.

use slotmap::{DefaultKey, SlotMap};

/// Payload of a live entry. The cached hash lets the index re-bucket
/// entries without ever re-running user `Hash` code.
#[derive(Debug)]
pub(crate) struct EntryData<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug)]
struct Node<K, V> {
    before: DefaultKey,
    after: DefaultKey,
    // `None` only for the sentinel.
    data: Option<EntryData<K, V>>,
}

/// Doubly-linked traversal order, independent of hash-bucket placement.
///
/// Invariant: following `after` links from the sentinel visits every live
/// node exactly once and returns to the sentinel; following `before` links
/// yields the exact reverse. An empty list is the sentinel linked to itself.
#[derive(Debug)]
pub(crate) struct OrderList<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
    sentinel: DefaultKey,
}

impl<K, V> OrderList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        // One extra slot for the sentinel.
        let mut slots = SlotMap::with_capacity(capacity + 1);
        let sentinel = slots.insert(Node {
            before: DefaultKey::default(),
            after: DefaultKey::default(),
            data: None,
        });
        slots[sentinel].before = sentinel;
        slots[sentinel].after = sentinel;
        OrderList { slots, sentinel }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn sentinel(&self) -> DefaultKey {
        self.sentinel
    }

    /// True for keys of live entries; the sentinel is not an entry.
    pub(crate) fn contains(&self, node: DefaultKey) -> bool {
        node != self.sentinel && self.slots.contains_key(node)
    }

    /// First live node in order, if any.
    pub(crate) fn head(&self) -> Option<DefaultKey> {
        let first = self.slots[self.sentinel].after;
        (first != self.sentinel).then_some(first)
    }

    /// Last live node in order, if any.
    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        let last = self.slots[self.sentinel].before;
        (last != self.sentinel).then_some(last)
    }

    pub(crate) fn next(&self, node: DefaultKey) -> DefaultKey {
        self.slots[node].after
    }

    pub(crate) fn prev(&self, node: DefaultKey) -> DefaultKey {
        self.slots[node].before
    }

    pub(crate) fn data(&self, node: DefaultKey) -> &EntryData<K, V> {
        self.slots[node]
            .data
            .as_ref()
            .expect("sentinel holds no entry data")
    }

    pub(crate) fn data_mut(&mut self, node: DefaultKey) -> &mut EntryData<K, V> {
        self.slots[node]
            .data
            .as_mut()
            .expect("sentinel holds no entry data")
    }

    pub(crate) fn hash(&self, node: DefaultKey) -> u64 {
        self.data(node).hash
    }

    /// Allocates a node for a new entry and appends it at the tail.
    pub(crate) fn push_back(&mut self, hash: u64, key: K, value: V) -> DefaultKey {
        let node = self.slots.insert(Node {
            before: DefaultKey::default(),
            after: DefaultKey::default(),
            data: Some(EntryData { hash, key, value }),
        });
        self.link_before(self.sentinel, node);
        node
    }

    /// Splices `node` immediately before `existing`. O(1).
    fn link_before(&mut self, existing: DefaultKey, node: DefaultKey) {
        let before = self.slots[existing].before;
        self.slots[node].before = before;
        self.slots[node].after = existing;
        self.slots[before].after = node;
        self.slots[existing].before = node;
    }

    /// Repoints the neighbors of `node` past it. O(1). The node's slot and
    /// payload are untouched; callers either relink or remove it next.
    pub(crate) fn unlink(&mut self, node: DefaultKey) {
        debug_assert_ne!(node, self.sentinel, "the sentinel is never unlinked");
        let (before, after) = {
            let n = &self.slots[node];
            (n.before, n.after)
        };
        self.slots[before].after = after;
        self.slots[after].before = before;
    }

    /// Access-order touch: relinks `node` to the tail position.
    pub(crate) fn move_to_back(&mut self, node: DefaultKey) {
        self.unlink(node);
        self.link_before(self.sentinel, node);
    }

    /// Unlinks `node` and frees its slot, returning the payload.
    pub(crate) fn remove(&mut self, node: DefaultKey) -> EntryData<K, V> {
        self.unlink(node);
        self.slots
            .remove(node)
            .and_then(|n| n.data)
            .expect("removed node must hold entry data")
    }

    /// Drops every live node and restores the empty sentinel cycle. The
    /// sentinel key itself stays stable across clears.
    pub(crate) fn clear(&mut self) {
        let sentinel = self.sentinel;
        self.slots.retain(|key, _| key == sentinel);
        let s = &mut self.slots[sentinel];
        s.before = sentinel;
        s.after = sentinel;
    }
}
