//! Bindings, the arena that stores them, and the handles that name them.

use crate::table::SymbolTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::TryReserveError;

/// Stable name for one binding. Survives growth; stops resolving once the
/// binding is removed and never aliases a binding inserted later.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn key<'a, T: SymbolTable>(&self, table: &'a T) -> Option<&'a str> {
        table.handle_key(*self)
    }

    pub fn value<'a, T: SymbolTable>(&self, table: &'a T) -> Option<&'a T::Value> {
        table.handle_value(*self)
    }
}

#[derive(Debug)]
pub(crate) struct Binding<V> {
    pub(crate) key: Box<str>,
    pub(crate) value: V,
    pub(crate) next: Option<DefaultKey>,
}

pub(crate) type Arena<V> = SlotMap<DefaultKey, Binding<V>>;

impl<V> Binding<V> {
    /// Copy `key` into storage owned by the binding.
    pub(crate) fn try_new(key: &str, value: V) -> Result<Self, TryReserveError> {
        let mut owned = String::new();
        owned.try_reserve_exact(key.len())?;
        owned.push_str(key);
        Ok(Self {
            key: owned.into_boxed_str(),
            value,
            next: None,
        })
    }
}

/// Reserve an arena slot for one more binding, then copy `key` into a new
/// binding. On failure the arena holds the same bindings as before.
pub(crate) fn alloc_binding<V>(
    slots: &mut Arena<V>,
    key: &str,
    value: V,
) -> Result<Binding<V>, TryReserveError> {
    slots.try_reserve(1)?;
    Binding::try_new(key, value)
}

/// Keys keep C-string semantics, so an interior NUL is a caller bug.
#[inline]
#[track_caller]
pub(crate) fn check_key(key: &str) {
    assert!(
        !key.as_bytes().contains(&0),
        "symbol table key contains a NUL byte: {key:?}"
    );
}
