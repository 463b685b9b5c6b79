#![cfg(test)]

// Property tests for both backends kept inside the crate so they can check
// the hash backend's private bucket invariants after every step.

use crate::binding::Handle;
use crate::hash_table::HashTable;
use crate::list_table::ListTable;
use crate::table::SymbolTable;
use crate::InsertError;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Scale(i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            (-3i32..=3).prop_map(OpI::Scale),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drive `sut` and a std HashMap model through the same operations.
// Invariants exercised across random operation sequences:
// - Duplicate puts fail and leave the stored value alone.
// - `replace`/`remove` on absent keys return None and change nothing.
// - Live handles keep resolving to their key; removed ones never resolve.
// - `map` touches every value exactly once; `iter` yields the model's key set.
// - `len`/`is_empty` parity with the model after each op.
fn run_state_machine<T>(
    sut: &mut T,
    pool: &[String],
    ops: Vec<OpI>,
    check: impl Fn(&T),
) -> Result<(), TestCaseError>
where
    T: SymbolTable<Value = i32>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = &pool[i];
                let already = model.contains_key(k);
                match sut.try_put(k, v) {
                    Ok(h) => {
                        prop_assert!(!already, "put must fail on duplicate");
                        prop_assert!(live.insert(k.clone(), h).is_none());
                        model.insert(k.clone(), v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
            OpI::Replace(i, v) => {
                let k = &pool[i];
                let old = sut.replace(k, v);
                let expected = model.get_mut(k).map(|m| core::mem::replace(m, v));
                prop_assert_eq!(old, expected);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                if let Some(h) = live.remove(k) {
                    stale.push(h);
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                let found = sut.find(k);
                prop_assert_eq!(found, live.get(k).copied());
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            OpI::Scale(factor) => {
                let mut visits = 0usize;
                sut.map(&factor, |_, v, f| {
                    *v = v.wrapping_mul(*f);
                    visits += 1;
                });
                prop_assert_eq!(visits, model.len());
                for v in model.values_mut() {
                    *v = v.wrapping_mul(factor);
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<String> = sut.iter().map(|(k, _)| k.to_string()).collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        for &h in &stale {
            prop_assert!(h.value(&*sut).is_none());
        }
        for (k, h) in &live {
            prop_assert_eq!(h.key(&*sut), Some(k.as_str()));
            prop_assert_eq!(h.value(&*sut), model.get(k));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check(&*sut);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_hash_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: HashTable<i32> = HashTable::new();
        run_state_machine(&mut sut, &pool, ops, HashTable::assert_invariants)?;
    }

    #[test]
    fn prop_list_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ListTable<i32> = ListTable::new();
        run_state_machine(&mut sut, &pool, ops, |_| {})?;
    }
}

// Growth: inserting past one or more bucket-count thresholds never disturbs
// earlier bindings, and the bucket invariant holds after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 8, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_bindings(n in 500usize..2100, seed in any::<u32>()) {
        let mut sut: HashTable<usize> = HashTable::new();
        let keys: Vec<String> = (0..n).map(|i| format!("{seed:x}-{i}")).collect();
        for (i, k) in keys.iter().enumerate() {
            prop_assert!(sut.put(k, i));
        }
        sut.assert_invariants();
        let expected = crate::BUCKET_COUNTS
            .iter()
            .copied()
            .find(|&c| c >= n)
            .unwrap();
        prop_assert_eq!(sut.bucket_count(), expected);
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.get(k), Some(&i));
        }
        for k in keys.iter().step_by(3) {
            prop_assert!(sut.remove(k).is_some());
        }
        sut.assert_invariants();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.contains(k), i % 3 != 0);
        }
    }
}
