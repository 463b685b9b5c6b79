//! The contract shared by both backends, and a backend-selecting wrapper.

use crate::binding::Handle;
use crate::chain::Iter;
use crate::error::{InsertError, TableError};
use crate::hash_table::HashTable;
use crate::list_table::ListTable;
use core::fmt;

/// A map from owned string keys to values of type `Value`.
///
/// Keys are copied on insertion; values are stored as given and never
/// inspected. Every key-taking method panics if the key contains a NUL byte.
pub trait SymbolTable {
    type Value;

    /// Number of bindings. O(1).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind `key` to `value` unless `key` is already bound. On error the
    /// table is unchanged and `value` is dropped.
    fn try_put(&mut self, key: &str, value: Self::Value) -> Result<Handle, InsertError>;

    /// `try_put` collapsed to whether the binding was added.
    fn put(&mut self, key: &str, value: Self::Value) -> bool {
        self.try_put(key, value).is_ok()
    }

    /// Swap the value bound to `key`, returning the previous one. Absent
    /// keys leave the table untouched and yield `None`.
    fn replace(&mut self, key: &str, value: Self::Value) -> Option<Self::Value>;

    fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    fn get(&self, key: &str) -> Option<&Self::Value>;

    fn get_mut(&mut self, key: &str) -> Option<&mut Self::Value>;

    /// Remove the binding for `key`, returning its value.
    fn remove(&mut self, key: &str) -> Option<Self::Value>;

    /// Call `visit(key, value, extra)` once per binding, in chain order.
    fn map<E: ?Sized, F>(&mut self, extra: &E, visit: F)
    where
        F: FnMut(&str, &mut Self::Value, &E);

    /// Bindings in the order `map` visits them.
    fn iter(&self) -> Iter<'_, Self::Value>;

    /// Handle of the binding for `key`, if bound.
    fn find(&self, key: &str) -> Option<Handle>;

    /// Key of the binding `h` names; `None` once it has been removed.
    fn handle_key(&self, h: Handle) -> Option<&str>;

    /// Value of the binding `h` names; `None` once it has been removed.
    fn handle_value(&self, h: Handle) -> Option<&Self::Value>;
}

/// Storage strategy picked when a [`SymTable`] is built.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Backend {
    /// Chained hash table with stepped growth.
    #[default]
    Hash,
    /// One unordered chain; O(n) lookups.
    List,
}

/// A symbol table whose backend is chosen at construction time.
pub enum SymTable<V> {
    Hash(HashTable<V>),
    List(ListTable<V>),
}

macro_rules! dispatch {
    ($self:expr, $t:ident => $e:expr) => {
        match $self {
            SymTable::Hash($t) => $e,
            SymTable::List($t) => $e,
        }
    };
}

impl<V> SymTable<V> {
    pub fn new() -> Self {
        Self::with_backend(Backend::default())
    }

    pub fn with_backend(backend: Backend) -> Self {
        match backend {
            Backend::Hash => SymTable::Hash(HashTable::new()),
            Backend::List => SymTable::List(ListTable::new()),
        }
    }

    pub fn try_with_backend(backend: Backend) -> Result<Self, TableError> {
        Ok(match backend {
            Backend::Hash => SymTable::Hash(HashTable::try_new()?),
            Backend::List => SymTable::List(ListTable::new()),
        })
    }

    pub fn backend(&self) -> Backend {
        match self {
            SymTable::Hash(_) => Backend::Hash,
            SymTable::List(_) => Backend::List,
        }
    }
}

impl<V> Default for SymTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolTable for SymTable<V> {
    type Value = V;

    fn len(&self) -> usize {
        dispatch!(self, t => t.len())
    }

    fn try_put(&mut self, key: &str, value: V) -> Result<Handle, InsertError> {
        dispatch!(self, t => t.try_put(key, value))
    }

    fn replace(&mut self, key: &str, value: V) -> Option<V> {
        dispatch!(self, t => t.replace(key, value))
    }

    fn contains(&self, key: &str) -> bool {
        dispatch!(self, t => t.contains(key))
    }

    fn get(&self, key: &str) -> Option<&V> {
        dispatch!(self, t => t.get(key))
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        dispatch!(self, t => t.get_mut(key))
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        dispatch!(self, t => t.remove(key))
    }

    fn map<E: ?Sized, F>(&mut self, extra: &E, visit: F)
    where
        F: FnMut(&str, &mut V, &E),
    {
        dispatch!(self, t => t.map(extra, visit))
    }

    fn iter(&self) -> Iter<'_, V> {
        dispatch!(self, t => t.iter())
    }

    fn find(&self, key: &str) -> Option<Handle> {
        dispatch!(self, t => t.find(key))
    }

    fn handle_key(&self, h: Handle) -> Option<&str> {
        dispatch!(self, t => t.handle_key(h))
    }

    fn handle_value(&self, h: Handle) -> Option<&V> {
        dispatch!(self, t => t.handle_value(h))
    }
}

impl<V: fmt::Debug> fmt::Debug for SymTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, t => fmt::Debug::fmt(t, f))
    }
}
