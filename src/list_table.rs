//! ListTable: every binding on one unordered chain.

use crate::binding::{alloc_binding, check_key, Arena, Binding, Handle};
use crate::chain::{self, Head, Iter};
use crate::error::InsertError;
use crate::table::SymbolTable;
use core::fmt;
use log::debug;
use std::collections::TryReserveError;

/// Same contract as [`crate::HashTable`] with O(n) lookups and no growth.
/// New bindings go to the front of the chain.
pub struct ListTable<V> {
    head: Head,
    slots: Arena<V>,
}

impl<V> ListTable<V> {
    pub fn new() -> Self {
        Self {
            head: None,
            slots: Arena::new(),
        }
    }

    fn lookup(&self, key: &str) -> Option<slotmap::DefaultKey> {
        check_key(key);
        chain::find(&self.slots, self.head, key)
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
        let k = self.slots.insert(binding);
        chain::push_front(&mut self.slots, &mut self.head, k);
        Ok(Handle::new(k))
    }

    fn heads(&self) -> &[Head] {
        core::slice::from_ref(&self.head)
    }
}

impl<V> Default for ListTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolTable for ListTable<V> {
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
        self.lookup(key).map(|k| &self.slots[k].value)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.lookup(key)?;
        Some(&mut self.slots[k].value)
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        check_key(key);
        let k = chain::unlink(&mut self.slots, &mut self.head, key)?;
        self.slots.remove(k).map(|b| b.value)
    }

    fn map<E: ?Sized, F>(&mut self, extra: &E, mut visit: F)
    where
        F: FnMut(&str, &mut V, &E),
    {
        let head = self.head;
        chain::visit_mut(&mut self.slots, &[head], |k, v| visit(k, v, extra));
    }

    fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.slots, self.heads())
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

impl<V: fmt::Debug> fmt::Debug for ListTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
