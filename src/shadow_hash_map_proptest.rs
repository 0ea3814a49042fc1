#![cfg(test)]

// Property tests for ShadowHashMap kept inside the crate so they can assert
// structural invariants (witness placement, arena accounting) that the
// public API does not expose.

use crate::test_hasher::{ConstBuildHasher, IdentityBuildHasher};
use crate::{Config, ShadowHashMap};
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations: indices shrink to earlier keys, and values come
// from a small range so many keys share a value.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, u8),
    Remove(usize),
    Get(usize),
    GetKeys(u8),
    GetFirstKey(u8),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let val = 0u8..6;
        let op = prop_oneof![
            4 => (idx.clone(), val.clone()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Get),
            1 => val.clone().prop_map(Op::GetKeys),
            1 => val.prop_map(Op::GetFirstKey),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_keys(model: &HashMap<String, u8>, v: u8) -> BTreeSet<String> {
    model
        .iter()
        .filter(|(_, &mv)| mv == v)
        .map(|(k, _)| k.clone())
        .collect()
}

// State-machine equivalence against std::collections::HashMap. Checked after
// every op:
// - insert/remove/get results match the model; updates keep len;
// - get_keys(v) is exactly the model's preimage of v, and every returned key
//   maps back to v; get_first_key(v) is one of them;
// - iteration yields every live key once;
// - table invariants: entries ahead of markers, one live witness per entry
//   in its value bucket, no leaked nodes, len within the load factor;
// - capacity never shrinks.
fn run<S: BuildHasher>(mut sut: ShadowHashMap<String, u8, S>, pool: Vec<String>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, u8> = HashMap::new();
    let mut capacity = sut.capacity();
    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let expected = model.insert(k.clone(), v);
                prop_assert_eq!(sut.insert(k, v), expected);
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k.as_str()), model.remove(k));
                prop_assert!(!sut.contains_key(k.as_str()));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            Op::GetKeys(v) => {
                let keys = sut.get_keys(&v);
                let got: BTreeSet<String> = keys.iter().map(|k| (*k).clone()).collect();
                prop_assert_eq!(got.len(), keys.len(), "get_keys returned a duplicate");
                prop_assert_eq!(&got, &model_keys(&model, v));
                for k in keys {
                    prop_assert_eq!(sut.get(k), Some(&v));
                }
            }
            Op::GetFirstKey(v) => {
                let expected = model_keys(&model, v);
                match sut.get_first_key(&v) {
                    Some(k) => prop_assert!(expected.contains(k)),
                    None => prop_assert!(expected.is_empty()),
                }
                prop_assert_eq!(sut.contains_value(&v), !expected.is_empty());
            }
            Op::Iterate => {
                let keys: Vec<&String> = sut.keys().collect();
                let s_keys: BTreeSet<String> = keys.iter().map(|k| (*k).clone()).collect();
                prop_assert_eq!(keys.len(), s_keys.len());
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= capacity, "capacity shrank");
        capacity = sut.capacity();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(ShadowHashMap::new(), pool, ops)?;
    }
}

// Worst-case collisions: every key and every value hashes to bucket 0, so
// forward entries, witnesses and markers all share one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(ShadowHashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// One bucket to start and a full load factor: almost every new key forces
// a rebuild, which must regenerate all witnesses.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_frequent_resizes((pool, ops) in arb_scenario()) {
        let cfg = Config::default().with_initial_capacity(1).with_load_factor(1.0);
        run(ShadowHashMap::with_config(cfg).unwrap(), pool, ops)?;
    }
}

// Integer keys and values with the identity hasher, so key and value
// buckets coincide often and entries frequently witness each other or
// themselves.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_overlapping_key_and_value_buckets(
        ops in proptest::collection::vec((any::<bool>(), 0u64..24, 0u64..24), 1..120)
    ) {
        let cfg = Config::default().with_initial_capacity(4).with_load_factor(0.75);
        let mut sut: ShadowHashMap<u64, u64, IdentityBuildHasher> =
            ShadowHashMap::with_config_and_hasher(cfg, IdentityBuildHasher).unwrap();
        let mut model: HashMap<u64, u64> = HashMap::new();
        for (insert, k, v) in ops {
            if insert {
                prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
            } else {
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            sut.assert_invariants();
            for (mk, mv) in &model {
                prop_assert_eq!(sut.get(mk), Some(mv));
                prop_assert!(sut.get_keys(mv).contains(&mk));
            }
        }
    }
}
