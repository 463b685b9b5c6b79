//! HashTable: bucket array of chains over a binding arena, with stepped growth.

use crate::binding::{alloc_binding, check_key, Arena, Binding, Handle};
use crate::chain::{self, Head, Iter};
use crate::error::{InsertError, TableError};
use crate::growth::{self, BUCKET_COUNTS, INITIAL_CLASS};
use crate::hash::bucket_index;
use crate::table::SymbolTable;
use core::fmt;
use log::{debug, trace};
use std::collections::TryReserveError;

type Buckets = Vec<Head>;

fn alloc_buckets(count: usize) -> Result<Buckets, TryReserveError> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(count)?;
    buckets.resize(count, None);
    Ok(buckets)
}

/// Chained hash table: one chain per bucket, new bindings at the tail of
/// their bucket's chain, bucket count stepping through [`BUCKET_COUNTS`]
/// as the table fills.
pub struct HashTable<V> {
    buckets: Buckets,
    class: usize, // position of buckets.len() in BUCKET_COUNTS
    slots: Arena<V>,
}

impl<V> HashTable<V> {
    /// Empty table with the first bucket count.
    ///
    /// Aborts like any other collection if the bucket array cannot be
    /// allocated; use [`HashTable::try_new`] to observe that instead.
    pub fn new() -> Self {
        Self::with_buckets(vec![None; BUCKET_COUNTS[INITIAL_CLASS]])
    }

    pub fn try_new() -> Result<Self, TableError> {
        Self::try_new_with(alloc_buckets)
    }

    fn try_new_with<A>(alloc: A) -> Result<Self, TableError>
    where
        A: FnOnce(usize) -> Result<Buckets, TryReserveError>,
    {
        let count = BUCKET_COUNTS[INITIAL_CLASS];
        let buckets = alloc(count).map_err(|source| TableError::Unavailable {
            buckets: count,
            source,
        })?;
        Ok(Self::with_buckets(buckets))
    }

    fn with_buckets(buckets: Buckets) -> Self {
        Self {
            buckets,
            class: INITIAL_CLASS,
            slots: Arena::new(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, key: &str) -> usize {
        bucket_index(key, self.buckets.len())
    }

    fn lookup(&self, key: &str) -> Option<slotmap::DefaultKey> {
        check_key(key);
        chain::find(&self.slots, self.buckets[self.bucket_of(key)], key)
    }

    /// Insert with `alloc` supplying the arena slot and key copy.
    fn try_put_with<A>(&mut self, key: &str, value: V, alloc: A) -> Result<Handle, InsertError>
    where
        A: FnOnce(&mut Arena<V>, &str, V) -> Result<Binding<V>, TryReserveError>,
    {
        if self.lookup(key).is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let binding = alloc(&mut self.slots, key, value).map_err(|e| {
            debug!("symtable: cannot allocate binding for {}-byte key: {}", key.len(), e);
            e
        })?;
        let idx = self.bucket_of(key);
        let k = self.slots.insert(binding);
        chain::append(&mut self.slots, &mut self.buckets[idx], k);

        if growth::overloaded(self.slots.len(), self.buckets.len()) {
            self.grow();
        }
        Ok(Handle::new(k))
    }

    fn grow(&mut self) {
        self.grow_with(alloc_buckets)
    }

    /// Move to the next bucket count if there is one. Allocation failure
    /// abandons the step and leaves the table as it was.
    fn grow_with<A>(&mut self, alloc: A)
    where
        A: FnOnce(usize) -> Result<Buckets, TryReserveError>,
    {
        let Some(next) = growth::next_class(self.class) else {
            return;
        };
        let new_count = BUCKET_COUNTS[next];
        let mut new_buckets = match alloc(new_count) {
            Ok(b) => b,
            Err(e) => {
                debug!(
                    "symtable: growth {} -> {} buckets abandoned: {}",
                    self.buckets.len(),
                    new_count,
                    e
                );
                return;
            }
        };
        debug_assert_eq!(new_buckets.len(), new_count);

        for i in 0..self.buckets.len() {
            let mut cur = self.buckets[i].take();
            while let Some(k) = cur {
                cur = self.slots[k].next.take();
                let idx = bucket_index(&self.slots[k].key, new_count);
                chain::append(&mut self.slots, &mut new_buckets[idx], k);
            }
        }

        trace!(
            "symtable: grew {} -> {} buckets, rehomed {} bindings",
            self.buckets.len(),
            new_count,
            self.slots.len()
        );
        self.buckets = new_buckets;
        self.class = next;
    }

    /// Check that every binding sits in the bucket its key hashes to and
    /// that chains account for every arena slot.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.buckets.len(), BUCKET_COUNTS[self.class]);
        let mut reachable = 0;
        for (i, &head) in self.buckets.iter().enumerate() {
            for (key, _) in Iter::new(&self.slots, core::slice::from_ref(&head)) {
                assert_eq!(bucket_index(key, self.buckets.len()), i, "{key:?} in wrong bucket");
                reachable += 1;
            }
        }
        assert_eq!(reachable, self.slots.len());
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolTable for HashTable<V> {
    type Value = V;

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn try_put(&mut self, key: &str, value: V) -> Result<Handle, InsertError> {
        self.try_put_with(key, value, alloc_binding)
    }

    fn replace(&mut self, key: &str, value: V) -> Option<V> {
        let k = self.lookup(key)?;
        Some(core::mem::replace(&mut self.slots[k].value, value))
    }

    fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn get(&self, key: &str) -> Option<&V> {
        let k = self.lookup(key)?;
        Some(&self.slots[k].value)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.lookup(key)?;
        Some(&mut self.slots[k].value)
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        check_key(key);
        let idx = self.bucket_of(key);
        let k = chain::unlink(&mut self.slots, &mut self.buckets[idx], key)?;
        self.slots.remove(k).map(|b| b.value)
    }

    fn map<E: ?Sized, F>(&mut self, extra: &E, mut visit: F)
    where
        F: FnMut(&str, &mut V, &E),
    {
        chain::visit_mut(&mut self.slots, &self.buckets, |k, v| visit(k, v, extra));
    }

    fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.slots, &self.buckets)
    }

    fn find(&self, key: &str) -> Option<Handle> {
        self.lookup(key).map(Handle::new)
    }

    fn handle_key(&self, h: Handle) -> Option<&str> {
        self.slots.get(h.raw_handle()).map(|b| &*b.key)
    }

    fn handle_value(&self, h: Handle) -> Option<&V> {
        self.slots.get(h.raw_handle()).map(|b| &b.value)
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn alloc_failure() -> TryReserveError {
        Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err()
    }

    /// Invariant: Duplicate keys are rejected and the table remains unchanged.
    #[test]
    fn duplicate_put_rejected() {
        let mut t: HashTable<i32> = HashTable::new();
        assert!(t.put("dup", 1));
        match t.try_put("dup", 2) {
            Err(InsertError::DuplicateKey) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(t.get("dup"), Some(&1));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `find(k).is_some() == contains(k)` for present/absent keys.
    #[test]
    fn find_contains_parity() {
        let mut t: HashTable<usize> = HashTable::new();
        let present = ["a", "b", "c"];
        for (i, k) in present.iter().enumerate() {
            assert!(t.put(k, i));
        }
        for k in present {
            assert!(t.find(k).is_some());
            assert!(t.contains(k));
        }
        for k in ["x", "y", "z", "A", "a "] {
            assert!(t.find(k).is_none());
            assert!(!t.contains(k));
        }
    }

    /// Invariant: a new binding goes to the tail of its bucket's chain.
    #[test]
    fn colliding_keys_chain_in_insertion_order() {
        // Search for keys that share a bucket with "seed".
        let mut t: HashTable<u32> = HashTable::new();
        let target = bucket_index("seed", t.bucket_count());
        let colliding: Vec<String> = (0u32..)
            .map(|n| format!("k{n}"))
            .filter(|k| bucket_index(k, 509) == target)
            .take(3)
            .collect();
        assert!(t.put("seed", 0));
        for (i, k) in colliding.iter().enumerate() {
            assert!(t.put(k, i as u32 + 1));
        }
        let chain: Vec<&str> = Iter::new(&t.slots, core::slice::from_ref(&t.buckets[target]))
            .map(|(k, _)| k)
            .collect();
        let mut expected = vec!["seed"];
        expected.extend(colliding.iter().map(String::as_str));
        assert_eq!(chain, expected);

        // Removing from the middle keeps the rest reachable.
        assert_eq!(t.remove(&colliding[0]), Some(1));
        assert_eq!(t.get(&colliding[1]), Some(&2));
        assert_eq!(t.get(&colliding[2]), Some(&3));
        assert_eq!(t.get("seed"), Some(&0));
        t.assert_invariants();
    }

    /// Invariant: exceeding one binding per bucket steps to the next count,
    /// and handles and values survive the move.
    #[test]
    fn growth_is_transparent() {
        let mut t: HashTable<usize> = HashTable::new();
        let mut handles = Vec::new();
        for i in 0..509 {
            handles.push(t.try_put(&format!("key{i}"), i).unwrap());
        }
        assert_eq!(t.bucket_count(), 509, "len == bucket_count does not grow");

        handles.push(t.try_put("key509", 509).unwrap());
        assert_eq!(t.bucket_count(), 1021);
        t.assert_invariants();

        for (i, h) in handles.iter().enumerate() {
            let key = format!("key{i}");
            assert_eq!(h.key(&t), Some(key.as_str()));
            assert_eq!(h.value(&t), Some(&i));
            assert_eq!(t.find(&key), Some(*h));
            assert_eq!(t.get(&key), Some(&i));
        }
    }

    /// Invariant: failed growth is silent; the put stands and the table keeps
    /// working at its old size.
    #[test]
    fn failed_growth_keeps_old_buckets() {
        let mut t: HashTable<usize> = HashTable::new();
        for i in 0..510 {
            // Fill past the threshold without triggering growth.
            let key = format!("key{i}");
            t.check_and_put_without_growth(&key, i);
        }
        t.grow_with(|_| Err(alloc_failure()));
        assert_eq!(t.bucket_count(), 509);
        assert_eq!(t.len(), 510);
        t.assert_invariants();

        // Next successful put retries and succeeds.
        assert!(t.put("one-more", 510));
        assert_eq!(t.bucket_count(), 1021);
        assert_eq!(t.get("key0"), Some(&0));
        t.assert_invariants();
    }

    #[test]
    fn growth_stops_at_last_count() {
        let mut t: HashTable<u8> = HashTable::new();
        t.class = BUCKET_COUNTS.len() - 1;
        t.buckets = alloc_buckets(*BUCKET_COUNTS.last().unwrap()).unwrap();
        t.grow_with(|_| panic!("no allocation past the last bucket count"));
        assert_eq!(t.bucket_count(), 65521);
    }

    #[test]
    fn remove_then_reinsert_same_key_yields_new_handle() {
        let mut t: HashTable<i32> = HashTable::new();
        let h1 = t.try_put("k", 1).unwrap();
        assert_eq!(t.remove("k"), Some(1));
        assert!(!t.contains("k"));
        assert!(h1.value(&t).is_none());
        assert_eq!(t.remove("k"), None);

        let h2 = t.try_put("k", 2).expect("reinsert allowed");
        assert_ne!(h1, h2, "old handle must not alias new entry");
        assert!(h1.value(&t).is_none(), "stale handle stays invalid");
        assert_eq!(h2.value(&t), Some(&2));
    }

    /// Invariant: `map` visits each binding once and may rewrite values in place.
    #[test]
    fn map_visits_every_binding_once() {
        let mut t: HashTable<i64> = HashTable::new();
        for (i, k) in ["k1", "k2", "k3"].iter().enumerate() {
            t.put(k, i as i64);
        }
        let mut seen = BTreeSet::new();
        t.map(&10i64, |k, v, add| {
            assert!(seen.insert(k.to_string()), "visited twice: {k}");
            *v += *add;
        });
        assert_eq!(seen.len(), 3);
        assert_eq!(t.get("k1"), Some(&10));
        assert_eq!(t.get("k2"), Some(&11));
        assert_eq!(t.get("k3"), Some(&12));

        let order: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        let mut sorted_by_bucket = order.clone();
        sorted_by_bucket.sort_by_key(|k| bucket_index(k, 509));
        assert_eq!(order, sorted_by_bucket, "iteration follows bucket order");
    }

    /// Invariant: a put whose binding cannot be allocated reports
    /// `OutOfMemory`, drops the value and leaves the table as it was.
    #[test]
    fn failed_binding_alloc_leaves_table_unchanged() {
        let mut t: HashTable<Rc<i32>> = HashTable::new();
        assert!(t.put("a", Rc::new(1)));
        assert!(t.put("b", Rc::new(2)));
        let before: Vec<(String, i32)> = t.iter().map(|(k, v)| (k.to_string(), **v)).collect();

        let rejected = Rc::new(3);
        let res = t.try_put_with("c", Rc::clone(&rejected), |_, _, _| Err(alloc_failure()));
        assert!(matches!(res, Err(InsertError::OutOfMemory(_))));
        assert_eq!(Rc::strong_count(&rejected), 1, "rejected value dropped");

        assert_eq!(t.len(), 2);
        assert!(!t.contains("c"));
        let after: Vec<(String, i32)> = t.iter().map(|(k, v)| (k.to_string(), **v)).collect();
        assert_eq!(after, before);
        t.assert_invariants();

        assert!(t.put("c", rejected));
        assert_eq!(t.get("c").map(|v| **v), Some(3));
    }

    #[test]
    fn try_new_reports_unavailable_buckets() {
        match HashTable::<i32>::try_new_with(|_| Err(alloc_failure())) {
            Err(TableError::Unavailable { buckets: 509, .. }) => {}
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
        let t: HashTable<i32> = HashTable::try_new().unwrap();
        assert_eq!(t.bucket_count(), 509);
    }

    /// Invariant: replace rewrites the value in place; chain order and
    /// length are untouched.
    #[test]
    fn replace_keeps_chain_order() {
        let mut t: HashTable<u32> = HashTable::new();
        let target = bucket_index("seed", t.bucket_count());
        let colliding: Vec<String> = (0u32..)
            .map(|n| format!("k{n}"))
            .filter(|k| bucket_index(k, 509) == target)
            .take(2)
            .collect();
        assert!(t.put("seed", 0));
        assert!(t.put(&colliding[0], 1));
        assert!(t.put(&colliding[1], 2));
        let chain_of = |t: &HashTable<u32>| -> Vec<(String, u32)> {
            Iter::new(&t.slots, core::slice::from_ref(&t.buckets[target]))
                .map(|(k, v)| (k.to_string(), *v))
                .collect()
        };

        assert_eq!(t.replace(&colliding[0], 10), Some(1));
        assert_eq!(
            chain_of(&t),
            [
                ("seed".to_string(), 0),
                (colliding[0].clone(), 10),
                (colliding[1].clone(), 2),
            ]
        );
        assert_eq!(t.len(), 3);
        t.assert_invariants();
    }

    #[test]
    fn len_and_is_empty_behaviors() {
        let mut t: HashTable<i32> = HashTable::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        t.put("a", 1);
        assert!(!t.put("a", 2));
        assert_eq!(t.len(), 1);
        t.put("b", 2);
        assert_eq!(t.len(), 2);
        t.remove("a");
        t.remove("b");
        assert!(t.is_empty());
    }

    #[test]
    #[should_panic(expected = "NUL byte")]
    fn nul_key_is_contract_violation() {
        let mut t: HashTable<i32> = HashTable::new();
        t.put("bad\0key", 1);
    }

    #[test]
    fn empty_key_is_a_key() {
        let mut t: HashTable<i32> = HashTable::new();
        assert!(t.put("", 7));
        assert_eq!(t.get(""), Some(&7));
        assert_eq!(t.remove(""), Some(7));
    }

    impl<V> HashTable<V> {
        fn check_and_put_without_growth(&mut self, key: &str, value: V) {
            assert!(self.lookup(key).is_none());
            let idx = self.bucket_of(key);
            let k = self.slots.insert(Binding::try_new(key, value).unwrap());
            chain::append(&mut self.slots, &mut self.buckets[idx], k);
        }
    }
}
