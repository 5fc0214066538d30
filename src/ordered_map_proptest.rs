#![cfg(test)]

// Property tests for OrderedHashMap kept inside the crate so they do not
// require feature gates to access internal modules.

use core::hash::{BuildHasher, Hasher};
use core::mem;

use proptest::prelude::*;

use crate::{EvictionPolicy, MapConfig, OrderedHashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(usize),
    RemoveEldest,
    Clear,
    Iterate,
    ReverseIterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            3 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Contains),
            1 => Just(OpI::RemoveEldest),
            1 => Just(OpI::Clear),
            2 => Just(OpI::Iterate),
            1 => Just(OpI::ReverseIterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Reference model: a Vec kept in the exact order the map should expose.
struct Model {
    entries: Vec<(String, i32)>,
    access_order: bool,
}

impl Model {
    fn new(access_order: bool) -> Self {
        Model {
            entries: Vec::new(),
            access_order,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn touch(&mut self, pos: usize) {
        if self.access_order {
            let entry = self.entries.remove(pos);
            self.entries.push(entry);
        }
    }

    fn put(&mut self, key: String, value: i32) -> Option<i32> {
        match self.position(&key) {
            Some(pos) => {
                let old = mem::replace(&mut self.entries[pos].1, value);
                self.touch(pos);
                Some(old)
            }
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    fn get(&mut self, key: &str) -> Option<i32> {
        let pos = self.position(key)?;
        let value = self.entries[pos].1;
        self.touch(pos);
        Some(value)
    }

    fn remove(&mut self, key: &str) -> Option<i32> {
        let pos = self.position(key)?;
        Some(self.entries.remove(pos).1)
    }

    fn remove_eldest(&mut self) -> Option<(String, i32)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}

fn run_scenario<S: BuildHasher>(
    mut sut: OrderedHashMap<String, i32, S>,
    access_order: bool,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model = Model::new(access_order);

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let key = pool[i].clone();
                prop_assert_eq!(sut.put(key.clone(), v), model.put(key, v));
            }
            OpI::Get(i) => {
                let key = &pool[i];
                prop_assert_eq!(sut.get(key).copied(), model.get(key));
            }
            OpI::Remove(i) => {
                let key = &pool[i];
                prop_assert_eq!(sut.remove(key), model.remove(key));
            }
            OpI::Contains(i) => {
                let key = &pool[i];
                prop_assert_eq!(sut.contains_key(key), model.position(key).is_some());
                // Lookups without access recording must not reorder.
                prop_assert_eq!(sut.peek(key).copied(), model.position(key).map(|p| model.entries[p].1));
            }
            OpI::RemoveEldest => {
                prop_assert_eq!(sut.remove_eldest(), model.remove_eldest());
            }
            OpI::Clear => {
                sut.clear();
                model.entries.clear();
                prop_assert!(sut.is_empty());
            }
            OpI::Iterate => {
                let got: Vec<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&got, &model.entries);
            }
            OpI::ReverseIterate => {
                let got: Vec<(String, i32)> =
                    sut.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
                let expected: Vec<(String, i32)> =
                    model.entries.iter().rev().cloned().collect();
                prop_assert_eq!(got, expected);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
        prop_assert_eq!(
            sut.eldest().map(|(k, v)| (k.clone(), *v)),
            model.entries.first().cloned()
        );
        prop_assert_eq!(
            sut.newest().map(|(k, v)| (k.clone(), *v)),
            model.entries.last().cloned()
        );
    }

    // Final full-order check in both directions.
    let forward: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(&forward, &model.entries);
    let backward: Vec<(String, i32)> = sut.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
    let expected_backward: Vec<(String, i32)> = model.entries.into_iter().rev().collect();
    prop_assert_eq!(backward, expected_backward);
    Ok(())
}

// Property: State-machine equivalence against a Vec-based order model, in
// both ordering modes. Invariants exercised across random op sequences:
// - put/get/remove/contains/remove_eldest return-value parity with the model.
// - Iteration (forward and reverse) equals the model's exact order.
// - eldest/newest always mirror the model's ends; len/is_empty parity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(
        (pool, ops) in arb_scenario(),
        access_order in any::<bool>(),
    ) {
        let sut: OrderedHashMap<String, i32> = OrderedHashMap::with_config(
            MapConfig::default().with_access_order(access_order),
        );
        run_scenario(sut, access_order, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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
        0
    }
}

// Property: Same state-machine invariants under worst-case collision
// behavior (constant hasher): order maintenance and lookups must depend
// only on key equality, never on hash distribution.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(
        (pool, ops) in arb_scenario(),
        access_order in any::<bool>(),
    ) {
        let sut: OrderedHashMap<String, i32, ConstBuildHasher> =
            OrderedHashMap::with_policy_and_hasher(
                MapConfig::default().with_access_order(access_order),
                EvictionPolicy::Never,
                ConstBuildHasher,
            );
        run_scenario(sut, access_order, &pool, ops)?;
    }
}

// Property: a MaxLen-bounded access-order map behaves as an LRU cache. The
// model applies the same rule by hand: on a new key, append, then drop the
// front while over capacity. Membership AND order must match at every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_bounded_lru_matches_model(
        capacity in 1usize..=4,
        ops in proptest::collection::vec((0usize..6, any::<i32>(), any::<bool>()), 1..120),
    ) {
        let mut sut: OrderedHashMap<String, i32> = OrderedHashMap::bounded(capacity);
        let mut model = Model::new(true);

        for (raw_key, value, is_put) in ops {
            let key = format!("k{raw_key}");
            if is_put {
                let previous = model.put(key.clone(), value);
                if previous.is_none() && model.entries.len() > capacity {
                    model.entries.remove(0);
                }
                prop_assert_eq!(sut.put(key, value), previous);
            } else {
                prop_assert_eq!(sut.get(&key).copied(), model.get(&key));
            }

            prop_assert!(sut.len() <= capacity);
            let got: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
            prop_assert_eq!(&got, &model.entries);
        }
    }
}
